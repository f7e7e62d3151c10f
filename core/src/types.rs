//! Shared primitive types used across the entire engine.

/// A stable, unique identifier for a customer.
pub type CustomerId = String;

/// Monetary amount in account currency. The record store keeps REAL
/// columns, so amounts are plain f64 throughout.
pub type Money = f64;

/// A year-month bucket key, formatted "YYYY-MM".
pub type MonthKey = String;

/// The canonical analysis-run identifier.
pub type RunId = String;
