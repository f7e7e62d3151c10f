//! Deterministic demo portfolio generator.
//!
//! Stands in for the CSV feeds of a real deployment: a synthetic book of
//! customers, monthly bills, payment behavior and collection actions,
//! fully reproducible from a single seed.
//!
//! RULE: Nothing here may call a platform RNG. All randomness flows from
//! the caller's seed, so a given (seed, customers, months) triple always
//! generates byte-identical records.

use crate::{
    error::EngineResult,
    records::{Bill, CollectionAction, Customer, Payment},
    store::RecordStore,
};
use chrono::{Duration, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub const REGIONS: &[&str] = &[
    "North",
    "North East",
    "Midlands",
    "East",
    "South East",
    "South West",
    "Wales",
];

/// One income band's billing and payment behavior. Weights are relative
/// population shares; miss/partial probabilities are per bill.
struct BandProfile {
    band: &'static str,
    weight: f64,
    base_bill: f64,
    miss_p: f64,
    partial_p: f64,
}

const BANDS: &[BandProfile] = &[
    BandProfile { band: "A",  weight: 0.08, base_bill: 68.0, miss_p: 0.01, partial_p: 0.02 },
    BandProfile { band: "B",  weight: 0.16, base_bill: 62.0, miss_p: 0.02, partial_p: 0.03 },
    BandProfile { band: "C1", weight: 0.22, base_bill: 55.0, miss_p: 0.04, partial_p: 0.05 },
    BandProfile { band: "C2", weight: 0.22, base_bill: 50.0, miss_p: 0.06, partial_p: 0.07 },
    BandProfile { band: "D",  weight: 0.18, base_bill: 44.0, miss_p: 0.10, partial_p: 0.10 },
    BandProfile { band: "E",  weight: 0.14, base_bill: 40.0, miss_p: 0.16, partial_p: 0.13 },
];

/// Volumetric charge per m3, used to back usage out of the bill amount.
const RATE_PER_M3: f64 = 3.1;

#[derive(Debug, Clone)]
pub struct DemoProfile {
    pub customers: usize,
    pub months: u32,
    pub seed: u64,
}

impl Default for DemoProfile {
    fn default() -> Self {
        Self {
            customers: 500,
            months: 24,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DemoPortfolio {
    pub customers: Vec<Customer>,
    pub bills: Vec<Bill>,
    pub payments: Vec<Payment>,
    pub actions: Vec<CollectionAction>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid demo date")
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    date(next_year, next_month, 1) - Duration::days(1)
}

fn pick_band(rng: &mut Pcg64Mcg) -> &'static BandProfile {
    let total: f64 = BANDS.iter().map(|b| b.weight).sum();
    let mut roll = rng.gen::<f64>() * total;
    for band in BANDS {
        roll -= band.weight;
        if roll < 0.0 {
            return band;
        }
    }
    &BANDS[BANDS.len() - 1]
}

/// Generate a full demo book. Billing starts January 2023 and runs for
/// `months` monthly cycles; bills fall due 14 days after period end.
pub fn generate(profile: &DemoProfile) -> DemoPortfolio {
    let mut rng = Pcg64Mcg::seed_from_u64(profile.seed);
    let mut book = DemoPortfolio::default();

    for index in 0..profile.customers {
        let customer_id = format!("C{:05}", index + 1);
        let band = pick_band(&mut rng);
        let region = REGIONS[rng.gen_range(0..REGIONS.len())];

        book.customers.push(Customer {
            customer_id: customer_id.clone(),
            region: region.to_string(),
            income_band: band.band.to_string(),
        });

        for month_index in 0..profile.months {
            let year = 2023 + (month_index / 12) as i32;
            let month = month_index % 12 + 1;
            let period_end = month_end(year, month);
            let due_date = period_end + Duration::days(14);

            // Seasonal swing plus per-bill noise.
            let seasonal = 1.0 + 0.12 * ((month as f64 - 7.0) / 6.0).abs();
            let bill_amount =
                (band.base_bill * seasonal * (0.85 + 0.3 * rng.gen::<f64>()) * 100.0).round()
                    / 100.0;
            let usage_m3 = (bill_amount / RATE_PER_M3 * 10.0).round() / 10.0;

            book.bills.push(Bill {
                customer_id: customer_id.clone(),
                bill_period_end: period_end,
                due_date,
                bill_amount,
                usage_m3,
            });

            let roll = rng.gen::<f64>();
            if roll < band.miss_p {
                // Missed bill: no payment, escalating collections.
                push_actions(&mut rng, &mut book.actions, &customer_id, due_date, true);
            } else if roll < band.miss_p + band.partial_p {
                let fraction = 0.3 + 0.4 * rng.gen::<f64>();
                let amount = (bill_amount * fraction * 100.0).round() / 100.0;
                let payment_date = due_date + Duration::days(rng.gen_range(0..=40));
                book.payments.push(Payment {
                    customer_id: customer_id.clone(),
                    payment_date,
                    amount,
                });
                push_actions(&mut rng, &mut book.actions, &customer_id, due_date, false);
            } else {
                let payment_date = due_date + Duration::days(rng.gen_range(-2..=25));
                book.payments.push(Payment {
                    customer_id: customer_id.clone(),
                    payment_date,
                    amount: bill_amount,
                });
            }
        }
    }

    book
}

fn push_actions(
    rng: &mut Pcg64Mcg,
    actions: &mut Vec<CollectionAction>,
    customer_id: &str,
    due_date: NaiveDate,
    missed: bool,
) {
    let mut push = |action_type: &str, offset: i64| {
        actions.push(CollectionAction {
            customer_id: customer_id.to_string(),
            action_date: due_date + Duration::days(offset),
            action_type: action_type.to_string(),
        });
    };
    if rng.gen::<f64>() < 0.80 {
        push("reminder_letter", 35);
    }
    if rng.gen::<f64>() < 0.40 {
        push("phone_call", 45);
    }
    if rng.gen::<f64>() < 0.10 {
        push("field_visit", 55);
    }
    if missed && rng.gen::<f64>() < 0.05 {
        push("disconnection_notice", 58);
    }
}

/// Generate a demo book and insert every record into the store.
pub fn seed_store(store: &RecordStore, profile: &DemoProfile) -> EngineResult<DemoPortfolio> {
    let book = generate(profile);
    for customer in &book.customers {
        store.insert_customer(customer)?;
    }
    for bill in &book.bills {
        store.insert_bill(bill)?;
    }
    for payment in &book.payments {
        store.insert_payment(payment)?;
    }
    for action in &book.actions {
        store.insert_action(action)?;
    }
    log::info!(
        "seeded demo portfolio: {} customers, {} bills, {} payments, {} actions (seed {})",
        book.customers.len(),
        book.bills.len(),
        book.payments.len(),
        book.actions.len(),
        profile.seed,
    );
    Ok(book)
}
