//! Input record types — the four per-customer series supplied by the
//! record store, in validated, typed form.
//!
//! RULE: Records are immutable for the analysis horizon. The engine
//! never mutates them; every derived value lives in a fresh collection.

use crate::types::{CustomerId, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dates are stored as ISO-8601 TEXT in the record store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored date column. Returns None for anything unparsable;
/// the caller decides how to report the offending row.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub region: String,
    pub income_band: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub customer_id: CustomerId,
    pub bill_period_end: NaiveDate,
    pub due_date: NaiveDate,
    pub bill_amount: Money,
    pub usage_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub customer_id: CustomerId,
    pub payment_date: NaiveDate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionAction {
    pub customer_id: CustomerId,
    pub action_date: NaiveDate,
    pub action_type: String,
}
