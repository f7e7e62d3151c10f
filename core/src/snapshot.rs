//! Portfolio snapshot — the validated, in-memory input to one analysis run.
//!
//! RULES:
//!   - All inputs are loaded fully before resolution begins.
//!   - A malformed row is excluded and reported; it never fails the batch
//!     and never affects another customer's records.
//!   - Rows referencing unknown customers are excluded and reported; in
//!     strict mode they abort the run instead.

use crate::{
    error::{EngineError, EngineResult},
    records::{parse_date, Bill, CollectionAction, Customer, Payment},
    store::RecordStore,
    types::CustomerId,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// At most this many offending keys are kept per issue class.
pub const SAMPLE_KEY_CAP: usize = 5;

#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueCounter {
    pub count: u64,
    pub sample_keys: Vec<String>,
}

impl IssueCounter {
    fn record(&mut self, key: String) {
        self.count += 1;
        if self.sample_keys.len() < SAMPLE_KEY_CAP {
            self.sample_keys.push(key);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Per-run summary of every excluded row, always surfaced to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub orphaned_bills: IssueCounter,
    pub orphaned_payments: IssueCounter,
    pub orphaned_actions: IssueCounter,
    pub malformed_bills: IssueCounter,
    pub malformed_payments: IssueCounter,
    pub malformed_actions: IssueCounter,
}

impl IngestReport {
    pub fn total_skipped(&self) -> u64 {
        self.orphaned_bills.count
            + self.orphaned_payments.count
            + self.orphaned_actions.count
            + self.malformed_bills.count
            + self.malformed_payments.count
            + self.malformed_actions.count
    }

    pub fn has_orphans(&self) -> bool {
        !self.orphaned_bills.is_empty()
            || !self.orphaned_payments.is_empty()
            || !self.orphaned_actions.is_empty()
    }

    fn log_warnings(&self) {
        for (label, counter) in [
            ("bills referencing unknown customers", &self.orphaned_bills),
            ("payments referencing unknown customers", &self.orphaned_payments),
            ("actions referencing unknown customers", &self.orphaned_actions),
            ("bills with malformed or inconsistent dates", &self.malformed_bills),
            ("payments with malformed dates", &self.malformed_payments),
            ("actions with malformed dates", &self.malformed_actions),
        ] {
            if !counter.is_empty() {
                log::warn!(
                    "ingest: skipped {} {label} (sample: {:?})",
                    counter.count,
                    counter.sample_keys,
                );
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioSnapshot {
    /// Keyed by customer id; BTreeMap so every downstream iteration is
    /// in deterministic id order.
    pub customers: BTreeMap<CustomerId, Customer>,
    pub bills_by_customer: BTreeMap<CustomerId, Vec<Bill>>,
    pub payments_by_customer: BTreeMap<CustomerId, Vec<Payment>>,
    pub actions: Vec<CollectionAction>,
    pub report: IngestReport,
}

impl PortfolioSnapshot {
    /// Load and validate all four series from the record store.
    pub fn load(store: &RecordStore, strict: bool) -> EngineResult<Self> {
        let mut report = IngestReport::default();

        let customers: BTreeMap<CustomerId, Customer> = store
            .load_customers()?
            .into_iter()
            .map(|c| (c.customer_id.clone(), c))
            .collect();

        let mut bills_by_customer: BTreeMap<CustomerId, Vec<Bill>> = BTreeMap::new();
        for row in store.load_bills()? {
            if !customers.contains_key(&row.customer_id) {
                report.orphaned_bills.record(row.customer_id);
                continue;
            }
            let (Some(bill_period_end), Some(due_date)) =
                (parse_date(&row.bill_period_end), parse_date(&row.due_date))
            else {
                report.malformed_bills.record(format!("bill_id={}", row.bill_id));
                continue;
            };
            if due_date < bill_period_end {
                report.malformed_bills.record(format!("bill_id={}", row.bill_id));
                continue;
            }
            bills_by_customer.entry(row.customer_id.clone()).or_default().push(Bill {
                customer_id: row.customer_id,
                bill_period_end,
                due_date,
                bill_amount: row.bill_amount,
                usage_m3: row.usage_m3,
            });
        }

        let mut payments_by_customer: BTreeMap<CustomerId, Vec<Payment>> = BTreeMap::new();
        for row in store.load_payments()? {
            if !customers.contains_key(&row.customer_id) {
                report.orphaned_payments.record(row.customer_id);
                continue;
            }
            let Some(payment_date) = parse_date(&row.payment_date) else {
                report
                    .malformed_payments
                    .record(format!("payment_id={}", row.payment_id));
                continue;
            };
            payments_by_customer.entry(row.customer_id.clone()).or_default().push(Payment {
                customer_id: row.customer_id,
                payment_date,
                amount: row.amount,
            });
        }

        let mut actions = Vec::new();
        for row in store.load_actions()? {
            if !customers.contains_key(&row.customer_id) {
                report.orphaned_actions.record(row.customer_id);
                continue;
            }
            let Some(action_date) = parse_date(&row.action_date) else {
                report
                    .malformed_actions
                    .record(format!("action_id={}", row.action_id));
                continue;
            };
            actions.push(CollectionAction {
                customer_id: row.customer_id,
                action_date,
                action_type: row.action_type,
            });
        }

        report.log_warnings();

        if strict {
            for (table, counter) in [
                ("bills", &report.orphaned_bills),
                ("payments", &report.orphaned_payments),
                ("collections_actions", &report.orphaned_actions),
            ] {
                if !counter.is_empty() {
                    return Err(EngineError::ReferentialIntegrity {
                        table,
                        count: counter.count,
                        sample_keys: counter.sample_keys.clone(),
                    });
                }
            }
        }

        Ok(Self {
            customers,
            bills_by_customer,
            payments_by_customer,
            actions,
            report,
        })
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn bill_count(&self) -> usize {
        self.bills_by_customer.values().map(Vec::len).sum()
    }

    pub fn payment_count(&self) -> usize {
        self.payments_by_customer.values().map(Vec::len).sum()
    }
}
