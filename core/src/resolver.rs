//! Window resolver — per-bill payment-window matching.
//!
//! For every bill, decide how much of it was paid inside its eligibility
//! window `(due_date - lead, due_date + grace]` and whether it defaulted.
//!
//! RULES:
//!   - Eligibility is evaluated independently per bill. Two bills whose
//!     windows overlap both count a payment that falls in the overlap —
//!     callers wanting exclusive allocation must pre-allocate payments
//!     upstream.
//!   - Each customer's payments are sorted once into a ledger; every
//!     bill's window bounds are then located with two binary searches.
//!     A forward-only two-pointer is not used: windows are per-bill and
//!     may regress relative to the previous bill's window.
//!   - The lower bound is strictly exclusive, the upper bound inclusive.
//!     The asymmetry decides boundary-day eligibility and must be
//!     preserved exactly.

use crate::{
    records::{Bill, Payment},
    snapshot::PortfolioSnapshot,
    types::{CustomerId, Money},
};
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    pub lead_days: i64,
    pub grace_days: i64,
    pub tolerance: f64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            lead_days: 3,
            grace_days: 60,
            tolerance: 1.0,
        }
    }
}

impl WindowPolicy {
    /// Eligibility window for a bill as (open, close). A payment is
    /// eligible iff `open < payment_date <= close`.
    pub fn window(&self, due_date: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            due_date - Duration::days(self.lead_days),
            due_date + Duration::days(self.grace_days),
        )
    }

    /// Default test. Zero-amount bills can never default, whatever the
    /// payment series looks like.
    pub fn is_default(&self, bill_amount: Money, paid_in_window: Money) -> bool {
        if bill_amount <= 0.0 {
            return false;
        }
        paid_in_window < bill_amount - self.tolerance
    }
}

/// The resolved outcome for one bill. A pure function of the bill and
/// its customer's payment series — recomputed fully on every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillOutcome {
    pub customer_id: CustomerId,
    pub bill_period_end: NaiveDate,
    pub due_date: NaiveDate,
    pub bill_amount: Money,
    pub usage_m3: f64,
    pub paid_in_window: Money,
    pub is_default: bool,
}

/// One customer's payments, sorted once, supporting O(log n) window sums.
pub struct PaymentLedger {
    dates: Vec<NaiveDate>,
    amounts: Vec<Money>,
}

impl PaymentLedger {
    /// Sorted by (date, amount) — a total order over the entries, so the
    /// ledger and every window sum it produces are identical no matter
    /// how the input payments were ordered.
    pub fn new(payments: &[Payment]) -> Self {
        let mut entries: Vec<(NaiveDate, Money)> = payments
            .iter()
            .map(|p| (p.payment_date, p.amount))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        Self {
            dates: entries.iter().map(|e| e.0).collect(),
            amounts: entries.iter().map(|e| e.1).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Sum of amounts with `open_excl < date <= close_incl`. Both bounds
    /// are found by binary search; the sub-range is summed in sorted
    /// order.
    pub fn sum_window(&self, open_excl: NaiveDate, close_incl: NaiveDate) -> Money {
        let lo = self.dates.partition_point(|d| *d <= open_excl);
        let hi = self.dates.partition_point(|d| *d <= close_incl);
        self.amounts[lo..hi].iter().sum()
    }
}

pub fn resolve_bill(policy: &WindowPolicy, bill: &Bill, ledger: &PaymentLedger) -> BillOutcome {
    let (open, close) = policy.window(bill.due_date);
    let paid_in_window = ledger.sum_window(open, close);
    BillOutcome {
        customer_id: bill.customer_id.clone(),
        bill_period_end: bill.bill_period_end,
        due_date: bill.due_date,
        bill_amount: bill.bill_amount,
        usage_m3: bill.usage_m3,
        paid_in_window,
        is_default: policy.is_default(bill.bill_amount, paid_in_window),
    }
}

/// Resolve one customer's bills against their payment series. A customer
/// with no payments resolves every bill at `paid_in_window = 0` — that
/// is a classification, not an error.
pub fn resolve_customer(
    policy: &WindowPolicy,
    bills: &[Bill],
    payments: &[Payment],
) -> Vec<BillOutcome> {
    let ledger = PaymentLedger::new(payments);
    bills
        .iter()
        .map(|bill| resolve_bill(policy, bill, &ledger))
        .collect()
}

/// Resolve every bill in the snapshot, parallel by customer.
///
/// Customers are fully independent units (no shared mutable state), so
/// they fan out across rayon workers. Output order is deterministic:
/// ascending customer id, then the snapshot's per-customer bill order.
pub fn resolve_portfolio(policy: &WindowPolicy, snapshot: &PortfolioSnapshot) -> Vec<BillOutcome> {
    let groups: Vec<(&CustomerId, &Vec<Bill>)> = snapshot.bills_by_customer.iter().collect();
    let per_customer: Vec<Vec<BillOutcome>> = groups
        .par_iter()
        .map(|(customer_id, bills)| {
            let payments = snapshot
                .payments_by_customer
                .get(*customer_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            resolve_customer(policy, bills, payments)
        })
        .collect();
    per_customer.into_iter().flatten().collect()
}
