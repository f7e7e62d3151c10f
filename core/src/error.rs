use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    Config { reason: String },

    #[error(
        "Referential integrity violation: {count} {table} row(s) reference \
         unknown customers (sample: {sample_keys:?})"
    )]
    ReferentialIntegrity {
        table: &'static str,
        count: u64,
        sample_keys: Vec<String>,
    },

    #[error("Outcome for unknown customer '{customer_id}'")]
    UnknownCustomer { customer_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
