//! kpi-runner: headless arrears analysis runner.
//!
//! Usage:
//!   kpi-runner --db portfolio.db
//!   kpi-runner --demo --seed 42 --customers 500 --months 24
//!   kpi-runner --db portfolio.db --config engine.json --strict
//!   kpi-runner --demo --json

use anyhow::Result;
use arrears_core::{
    engine::{run_analysis, AnalysisRun},
    rollup::Dimension,
    store::RecordStore,
    synthetic::{seed_store, DemoProfile},
    EngineConfig,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 500usize);
    let months = parse_arg(&args, "--months", 24u32);
    let strict = args.iter().any(|a| a == "--strict");
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    // An in-memory store has nothing to analyze unless we seed it.
    let demo = args.iter().any(|a| a == "--demo") || db == ":memory:";

    for flag in args.iter().filter(|a| a.starts_with("--")) {
        if !matches!(
            flag.as_str(),
            "--seed" | "--customers" | "--months" | "--strict" | "--json" | "--db" | "--config"
                | "--demo"
        ) {
            log::warn!("Unknown flag: {flag}");
        }
    }

    if !json {
        println!("Arrears KPI runner");
        println!("  db:      {db}");
        if demo {
            println!("  demo:    seed {seed}, {customers} customers, {months} months");
        }
        println!();
    }

    let store = RecordStore::open(db)?;
    store.migrate()?;

    if demo {
        seed_store(
            &store,
            &DemoProfile {
                customers,
                months,
                seed,
            },
        )?;
    }

    let mut config = match config_path {
        Some(path) => EngineConfig::from_file(Path::new(path))?,
        None => EngineConfig::default(),
    };
    if strict {
        config.strict = true;
    }

    let run = run_analysis(&store, &config)?;
    run.persist_outcomes(&store)?;

    if json {
        let document = serde_json::json!({
            "run_id": run.run_id,
            "skipped": run.report(),
            "summary": run.portfolio_summary(),
            "monthly": run.rollup(Dimension::Month)?,
            "income_band": run.rollup(Dimension::IncomeBand)?,
            "region": run.rollup(Dimension::Region)?,
            "actions": run.action_volume(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    print_ingest_report(&run);
    print_monthly(&run)?;
    print_segments(&run, Dimension::IncomeBand)?;
    print_segments(&run, Dimension::Region)?;
    print_actions(&run);
    print_insights(&run)?;

    Ok(())
}

fn fmt_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

fn print_ingest_report(run: &AnalysisRun) {
    let report = run.report();
    if report.total_skipped() == 0 {
        return;
    }
    println!("=== SKIPPED RECORDS ===");
    for (label, counter) in [
        ("orphaned bills", &report.orphaned_bills),
        ("orphaned payments", &report.orphaned_payments),
        ("orphaned actions", &report.orphaned_actions),
        ("malformed bills", &report.malformed_bills),
        ("malformed payments", &report.malformed_payments),
        ("malformed actions", &report.malformed_actions),
    ] {
        if !counter.is_empty() {
            println!(
                "  {label:<20} {:>6}  sample: {:?}",
                counter.count, counter.sample_keys
            );
        }
    }
    println!();
}

fn print_monthly(run: &AnalysisRun) -> Result<()> {
    println!("=== MONTHLY DEFAULT RATE ===");
    println!(
        "  {:<8} {:>6} {:>9} {:>7} {:>12} {:>12}",
        "month", "bills", "defaults", "rate", "billed", "paid"
    );
    for row in run.rollup(Dimension::Month)? {
        println!(
            "  {:<8} {:>6} {:>9} {:>7} {:>12.2} {:>12.2}",
            row.bucket,
            row.bill_count,
            row.default_count,
            fmt_rate(row.default_rate),
            row.total_billed,
            row.total_paid,
        );
    }
    println!();
    Ok(())
}

fn print_segments(run: &AnalysisRun, dimension: Dimension) -> Result<()> {
    match dimension {
        Dimension::IncomeBand => println!("=== DEFAULT RATE BY INCOME BAND ==="),
        Dimension::Region => println!("=== DEFAULT RATE BY REGION ==="),
        Dimension::Month => println!("=== DEFAULT RATE BY MONTH ==="),
    }
    println!(
        "  {:<12} {:>6} {:>9} {:>7} {:>12}",
        dimension.label(),
        "bills",
        "defaults",
        "rate",
        "avg bill"
    );
    for row in run.rollup(dimension)? {
        let avg_bill = if row.bill_count > 0 {
            format!("{:.2}", row.total_billed / row.bill_count as f64)
        } else {
            "n/a".to_string()
        };
        println!(
            "  {:<12} {:>6} {:>9} {:>7} {:>12}",
            row.bucket,
            row.bill_count,
            row.default_count,
            fmt_rate(row.default_rate),
            avg_bill,
        );
    }
    println!();
    Ok(())
}

fn print_actions(run: &AnalysisRun) {
    let volumes = run.action_volume();
    if volumes.is_empty() {
        return;
    }
    println!("=== COLLECTIONS ACTIONS ===");
    for volume in &volumes {
        println!("  {:<22} {:>7}", volume.action_type, volume.count);
    }
    println!();
}

fn print_insights(run: &AnalysisRun) -> Result<()> {
    let summary = run.portfolio_summary();
    let bands = run.rollup(Dimension::IncomeBand)?;
    let regions = run.rollup(Dimension::Region)?;
    let actions = run.action_volume();

    println!("=== KEY INSIGHTS ===");
    println!("  run_id:          {}", run.run_id);
    println!("  bills resolved:  {}", summary.bill_count);
    println!("  default rate:    {}", fmt_rate(summary.default_rate));
    println!("  total billed:    {:.2}", summary.total_billed);
    println!("  total collected: {:.2}", summary.total_paid);
    println!("  collection rate: {}", fmt_rate(summary.collection_rate));
    if let Some(worst) = bands.first() {
        println!(
            "  highest risk income band: {} ({})",
            worst.bucket,
            fmt_rate(worst.default_rate)
        );
    }
    if let Some(worst) = regions.first() {
        println!(
            "  highest risk region:      {} ({})",
            worst.bucket,
            fmt_rate(worst.default_rate)
        );
    }
    let total_actions: u64 = actions.iter().map(|v| v.count).sum();
    println!("  collections actions:      {total_actions}");
    if let Some(top) = actions.first() {
        println!(
            "  most common action:       {} ({} times)",
            top.action_type, top.count
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
