//! Arrears window-matching & KPI aggregation engine.
//!
//! Decides, for every bill in a metered-utility portfolio, how much of
//! it was paid inside its eligibility window and whether it defaulted,
//! then rolls the outcomes up by month, income band and region.
//!
//! Pipeline: record store → portfolio snapshot → window resolver →
//! per-bill outcomes → rollup aggregator → segment/time summaries.

pub mod config;
pub mod engine;
pub mod error;
pub mod records;
pub mod resolver;
pub mod rollup;
pub mod snapshot;
pub mod store;
pub mod synthetic;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
