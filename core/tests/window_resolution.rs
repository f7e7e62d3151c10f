use arrears_core::records::{Bill, Payment};
use arrears_core::resolver::{resolve_bill, resolve_customer, PaymentLedger, WindowPolicy};
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn bill(period_end: &str, due: &str, amount: f64) -> Bill {
    Bill {
        customer_id: "C00001".into(),
        bill_period_end: d(period_end),
        due_date: d(due),
        bill_amount: amount,
        usage_m3: amount / 3.1,
    }
}

fn payment(date: &str, amount: f64) -> Payment {
    Payment {
        customer_id: "C00001".into(),
        payment_date: d(date),
        amount,
    }
}

fn policy() -> WindowPolicy {
    WindowPolicy::default()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The upper bound is inclusive: a payment exactly 60 days after the due
/// date is eligible; one day later it is not.
#[test]
fn upper_bound_is_inclusive() {
    let b = bill("2024-01-15", "2024-01-31", 100.0);

    let on_close = resolve_customer(&policy(), &[b.clone()], &[payment("2024-03-31", 100.0)]);
    assert_eq!(on_close[0].paid_in_window, 100.0);
    assert!(!on_close[0].is_default, "payment on due+60 must count");

    let past_close = resolve_customer(&policy(), &[b], &[payment("2024-04-01", 100.0)]);
    assert_eq!(past_close[0].paid_in_window, 0.0);
    assert!(past_close[0].is_default, "payment on due+61 must not count");
}

/// The lower bound is strictly exclusive: a payment exactly 3 days before
/// the due date is NOT eligible; 2 days before, it is.
#[test]
fn lower_bound_is_exclusive() {
    let b = bill("2024-01-15", "2024-01-31", 100.0);

    let on_open = resolve_customer(&policy(), &[b.clone()], &[payment("2024-01-28", 100.0)]);
    assert_eq!(on_open[0].paid_in_window, 0.0, "payment on due-3 must not count");

    let inside = resolve_customer(&policy(), &[b], &[payment("2024-01-29", 100.0)]);
    assert_eq!(inside[0].paid_in_window, 100.0, "payment on due-2 must count");
}

/// A zero-amount bill is never in default, whatever the payments look
/// like — including a negative payment sum in its window.
#[test]
fn zero_amount_bill_never_defaults() {
    let b = bill("2024-01-15", "2024-01-31", 0.0);

    let no_payments = resolve_customer(&policy(), &[b.clone()], &[]);
    assert!(!no_payments[0].is_default);

    let negative = resolve_customer(&policy(), &[b], &[payment("2024-02-10", -25.0)]);
    assert!(!negative[0].is_default, "zero bill must not default on negative payments");
}

/// Zero and negative payment amounts must not crash the resolver; they
/// simply contribute to the window sum.
#[test]
fn zero_and_negative_payments_are_tolerated() {
    let b = bill("2024-01-15", "2024-01-31", 100.0);
    let outcomes = resolve_customer(
        &policy(),
        &[b],
        &[
            payment("2024-02-01", 0.0),
            payment("2024-02-05", -10.0),
            payment("2024-02-10", 110.0),
        ],
    );
    assert_eq!(outcomes[0].paid_in_window, 100.0);
    assert!(!outcomes[0].is_default);
}

/// paid_in_window is the exact sum of eligible payments and does not
/// depend on the order the payment series arrived in.
#[test]
fn resolution_is_input_order_independent() {
    let b = bill("2024-01-15", "2024-01-31", 200.0);
    let payments = vec![
        payment("2024-02-01", 50.25),
        payment("2024-02-14", 30.10),
        payment("2024-02-14", 19.65),
        payment("2024-03-20", 100.0),
        payment("2024-05-01", 400.0), // outside window
    ];

    let forward = resolve_customer(&policy(), &[b.clone()], &payments);

    let mut reversed = payments.clone();
    reversed.reverse();
    let backward = resolve_customer(&policy(), &[b.clone()], &reversed);

    let mut rotated = payments.clone();
    rotated.rotate_left(2);
    let shuffled = resolve_customer(&policy(), &[b], &rotated);

    assert_eq!(forward[0].paid_in_window, 200.0);
    assert_eq!(forward[0].paid_in_window, backward[0].paid_in_window);
    assert_eq!(forward[0].paid_in_window, shuffled[0].paid_in_window);
}

/// Overlap property from the window policy: bills due less than 63 days
/// apart share part of their windows, and a payment in the overlap is
/// counted toward BOTH bills independently.
#[test]
fn overlapping_windows_double_count_payments() {
    let bill_a = bill("2023-12-20", "2024-01-10", 80.0);
    let bill_b = bill("2024-01-20", "2024-02-05", 80.0);
    let pay = payment("2024-01-20", 80.0);

    let outcomes = resolve_customer(&policy(), &[bill_a, bill_b], &[pay]);

    assert_eq!(outcomes[0].paid_in_window, 80.0, "payment counts for bill A");
    assert_eq!(outcomes[1].paid_in_window, 80.0, "payment counts for bill B");
    assert!(!outcomes[0].is_default);
    assert!(!outcomes[1].is_default);
}

/// Windows are per-bill, not monotonically advancing: a bill listed after
/// another may open an earlier window, and its eligible payments must be
/// re-included. Binary search per bill handles the regression.
#[test]
fn regressing_windows_re_include_earlier_payments() {
    let late_due = bill("2024-02-15", "2024-03-01", 60.0);
    let early_due = bill("2024-01-15", "2024-01-20", 60.0);
    let pay = payment("2024-01-25", 60.0);

    // Bills deliberately out of due-date order.
    let outcomes = resolve_customer(&policy(), &[late_due, early_due], &[pay]);

    assert_eq!(outcomes[0].paid_in_window, 0.0, "payment precedes late bill's window");
    assert!(outcomes[0].is_default);
    assert_eq!(outcomes[1].paid_in_window, 60.0, "early bill's window regressed and matched");
    assert!(!outcomes[1].is_default);
}

/// A bill with no payments at all resolves cleanly to zero paid.
#[test]
fn no_payments_is_a_classification_not_an_error() {
    let outcomes = resolve_customer(&policy(), &[bill("2024-01-15", "2024-01-31", 42.0)], &[]);
    assert_eq!(outcomes[0].paid_in_window, 0.0);
    assert!(outcomes[0].is_default);
}

/// End-to-end scenario: bill of 100 due 2024-01-31; 40 paid on Feb 1 and
/// 60 on Mar 1 both land in (2024-01-28, 2024-03-31] — cured.
#[test]
fn split_payments_inside_window_cure_the_bill() {
    let outcomes = resolve_customer(
        &policy(),
        &[bill("2024-01-15", "2024-01-31", 100.0)],
        &[payment("2024-02-01", 40.0), payment("2024-03-01", 60.0)],
    );
    assert_eq!(outcomes[0].paid_in_window, 100.0);
    assert!(!outcomes[0].is_default);
}

/// End-to-end scenario: same bill, single 50 payment — short of
/// 100 - 1.0, so the bill defaults.
#[test]
fn short_payment_defaults_the_bill() {
    let outcomes = resolve_customer(
        &policy(),
        &[bill("2024-01-15", "2024-01-31", 100.0)],
        &[payment("2024-02-15", 50.0)],
    );
    assert_eq!(outcomes[0].paid_in_window, 50.0);
    assert!(outcomes[0].is_default);
}

/// Tolerance boundary: 98.7 paid against a 99.5 bill clears the
/// 99.5 - 1.0 = 98.5 threshold — cured.
#[test]
fn tolerance_absorbs_small_shortfall() {
    let outcomes = resolve_customer(
        &policy(),
        &[bill("2024-01-15", "2024-01-31", 99.5)],
        &[payment("2024-02-10", 98.7)],
    );
    assert!(!outcomes[0].is_default);
}

/// The ledger's window sum matches a naive filter over the same series.
#[test]
fn ledger_window_sum_matches_naive_scan() {
    let payments: Vec<Payment> = (0..120i64)
        .map(|i| Payment {
            customer_id: "C00001".into(),
            payment_date: d("2024-01-01") + chrono::Duration::days((i * 7) % 200),
            amount: (i as f64) * 1.5,
        })
        .collect();
    let ledger = PaymentLedger::new(&payments);

    let open = d("2024-02-10");
    let close = d("2024-04-10");
    let expected: f64 = payments
        .iter()
        .filter(|p| p.payment_date > open && p.payment_date <= close)
        .map(|p| p.amount)
        .sum();

    assert_eq!(ledger.sum_window(open, close), expected);
}

/// resolve_bill carries every bill column through to the outcome.
#[test]
fn outcome_preserves_bill_columns() {
    let b = bill("2024-03-31", "2024-04-14", 75.5);
    let ledger = PaymentLedger::new(&[payment("2024-04-20", 75.5)]);
    let outcome = resolve_bill(&policy(), &b, &ledger);

    assert_eq!(outcome.customer_id, b.customer_id);
    assert_eq!(outcome.bill_period_end, b.bill_period_end);
    assert_eq!(outcome.due_date, b.due_date);
    assert_eq!(outcome.bill_amount, b.bill_amount);
    assert_eq!(outcome.usage_m3, b.usage_m3);
    assert_eq!(outcome.paid_in_window, 75.5);
    assert!(!outcome.is_default);
}
