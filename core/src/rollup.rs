//! Rollup aggregator — KPI summaries over the resolved outcome set.
//!
//! Aggregation is a pure reduction: integer counts and float sums folded
//! in deterministic bucket order, with fresh output collections. The
//! only ordering that is not the reduction itself is presentation order,
//! documented per dimension below.

use crate::{
    error::{EngineError, EngineResult},
    records::{CollectionAction, Customer},
    resolver::BillOutcome,
    types::{CustomerId, Money, MonthKey},
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Bill period end truncated to year-month; chronological ascending.
    Month,
    /// Customer income band; descending default rate, ties lexical.
    IncomeBand,
    /// Customer region; descending default rate, ties lexical.
    Region,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Month => "month",
            Dimension::IncomeBand => "income_band",
            Dimension::Region => "region",
        }
    }
}

/// Aggregated statistics for one bucket. `default_rate` is None when the
/// bucket holds no bills — an explicit no-data marker, never a NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRollup {
    pub bucket: String,
    pub bill_count: u64,
    pub default_count: u64,
    pub default_rate: Option<f64>,
    pub total_billed: Money,
    pub total_paid: Money,
}

/// Portfolio-level totals, bill-weighted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub bill_count: u64,
    pub default_count: u64,
    pub default_rate: Option<f64>,
    pub total_billed: Money,
    pub total_paid: Money,
    pub collection_rate: Option<f64>,
}

/// Collection-action volume for one action type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionVolume {
    pub action_type: String,
    pub count: u64,
}

pub fn month_key(date: NaiveDate) -> MonthKey {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Guarded ratio: None on a zero denominator.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

#[derive(Default)]
struct Accumulator {
    bill_count: u64,
    default_count: u64,
    total_billed: Money,
    total_paid: Money,
}

/// Group the outcome set by `dimension` and fold each bucket's totals.
///
/// Categorical buckets are seeded from the customer table's distinct
/// attribute values, so a segment with customers but no bills still
/// reports (with an undefined rate). An outcome that cannot be joined to
/// a customer is a data-integrity error surfaced to the caller.
pub fn aggregate(
    outcomes: &[BillOutcome],
    customers: &BTreeMap<CustomerId, Customer>,
    dimension: Dimension,
) -> EngineResult<Vec<SegmentRollup>> {
    let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();

    match dimension {
        Dimension::Month => {}
        Dimension::IncomeBand => {
            for c in customers.values() {
                buckets.entry(c.income_band.clone()).or_default();
            }
        }
        Dimension::Region => {
            for c in customers.values() {
                buckets.entry(c.region.clone()).or_default();
            }
        }
    }

    for outcome in outcomes {
        let key = match dimension {
            Dimension::Month => month_key(outcome.bill_period_end),
            Dimension::IncomeBand | Dimension::Region => {
                let customer = customers.get(&outcome.customer_id).ok_or_else(|| {
                    EngineError::UnknownCustomer {
                        customer_id: outcome.customer_id.clone(),
                    }
                })?;
                match dimension {
                    Dimension::IncomeBand => customer.income_band.clone(),
                    _ => customer.region.clone(),
                }
            }
        };
        let acc = buckets.entry(key).or_default();
        acc.bill_count += 1;
        if outcome.is_default {
            acc.default_count += 1;
        }
        acc.total_billed += outcome.bill_amount;
        acc.total_paid += outcome.paid_in_window;
    }

    // BTreeMap iteration is ascending by key — for Month that is already
    // the chronological presentation order ("YYYY-MM" sorts that way).
    let mut rollups: Vec<SegmentRollup> = buckets
        .into_iter()
        .map(|(bucket, acc)| SegmentRollup {
            bucket,
            bill_count: acc.bill_count,
            default_count: acc.default_count,
            default_rate: ratio(acc.default_count as f64, acc.bill_count as f64),
            total_billed: acc.total_billed,
            total_paid: acc.total_paid,
        })
        .collect();

    if dimension != Dimension::Month {
        rollups.sort_by(|a, b| {
            let by_rate = match (a.default_rate, b.default_rate) {
                (Some(ra), Some(rb)) => rb.total_cmp(&ra),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_rate.then_with(|| a.bucket.cmp(&b.bucket))
        });
    }

    Ok(rollups)
}

pub fn portfolio_summary(outcomes: &[BillOutcome]) -> PortfolioSummary {
    let mut acc = Accumulator::default();
    for outcome in outcomes {
        acc.bill_count += 1;
        if outcome.is_default {
            acc.default_count += 1;
        }
        acc.total_billed += outcome.bill_amount;
        acc.total_paid += outcome.paid_in_window;
    }
    PortfolioSummary {
        bill_count: acc.bill_count,
        default_count: acc.default_count,
        default_rate: ratio(acc.default_count as f64, acc.bill_count as f64),
        total_billed: acc.total_billed,
        total_paid: acc.total_paid,
        collection_rate: ratio(acc.total_paid, acc.total_billed),
    }
}

/// Count collection actions per type, ordered by descending volume,
/// ties broken by ascending action type.
pub fn action_volume(actions: &[CollectionAction]) -> Vec<ActionVolume> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for action in actions {
        *counts.entry(action.action_type.as_str()).or_default() += 1;
    }
    let mut volumes: Vec<ActionVolume> = counts
        .into_iter()
        .map(|(action_type, count)| ActionVolume {
            action_type: action_type.to_string(),
            count,
        })
        .collect();
    volumes.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.action_type.cmp(&b.action_type))
    });
    volumes
}
