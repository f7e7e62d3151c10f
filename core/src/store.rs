//! SQLite record store.
//!
//! RULE: Only store.rs and its submodules talk to the database.
//! The engine consumes typed rows — it never executes SQL directly.
//!
//! Date columns come back as raw TEXT; validation and parsing happen at
//! snapshot ingest so one malformed row never poisons a whole load.

use crate::error::EngineResult;
use rusqlite::Connection;

mod billing;
mod customer;
mod outcome;

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (or create) the record store at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (used in tests and demo runs).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_schema.sql"))?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Raw row types ──────────────────────────────────────────────────
//
// One struct per table, column-for-column. Date fields stay String
// until snapshot ingest validates them.

#[derive(Debug, Clone)]
pub struct BillRow {
    pub bill_id: i64,
    pub customer_id: String,
    pub bill_period_end: String,
    pub due_date: String,
    pub bill_amount: f64,
    pub usage_m3: f64,
}

#[derive(Debug, Clone)]
pub struct PaymentRow {
    pub payment_id: i64,
    pub customer_id: String,
    pub payment_date: String,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct ActionRow {
    pub action_id: i64,
    pub customer_id: String,
    pub action_date: String,
    pub action_type: String,
}

#[derive(Debug, Clone)]
pub struct BillTargetRow {
    pub customer_id: String,
    pub bill_period_end: String,
    pub due_date: String,
    pub bill_amount: f64,
    pub usage_m3: f64,
    pub paid_in_window: f64,
    pub default_60d: bool,
}
