//! Engine entry point — one batch analysis run.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Snapshot ingest   (load + validate all four series)
//!   2. Window resolution (per-bill outcomes, parallel by customer)
//!   3. Rollups           (on demand, from the materialized outcome set)
//!
//! RULES:
//!   - The store handle is borrowed for the duration of a call only;
//!     the engine holds no connection state between calls.
//!   - Resolution never starts before the snapshot is complete, and
//!     aggregation only ever reads the finished outcome set.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    resolver::{resolve_portfolio, BillOutcome},
    rollup::{self, ActionVolume, Dimension, PortfolioSummary, SegmentRollup},
    snapshot::{IngestReport, PortfolioSnapshot},
    store::RecordStore,
    types::RunId,
};
use uuid::Uuid;

/// The finished product of one batch run: the validated snapshot it ran
/// against, plus the full per-bill outcome set.
pub struct AnalysisRun {
    pub run_id: RunId,
    pub snapshot: PortfolioSnapshot,
    pub outcomes: Vec<BillOutcome>,
}

/// Run the full batch: ingest, then resolve every bill.
pub fn run_analysis(store: &RecordStore, config: &EngineConfig) -> EngineResult<AnalysisRun> {
    config.validate()?;
    let run_id: RunId = Uuid::new_v4().to_string();

    let snapshot = PortfolioSnapshot::load(store, config.strict)?;
    log::info!(
        "run {run_id}: loaded {} customers, {} bills, {} payments, {} actions ({} rows skipped)",
        snapshot.customer_count(),
        snapshot.bill_count(),
        snapshot.payment_count(),
        snapshot.actions.len(),
        snapshot.report.total_skipped(),
    );

    let outcomes = resolve_portfolio(&config.window_policy(), &snapshot);
    let defaults = outcomes.iter().filter(|o| o.is_default).count();
    log::info!(
        "run {run_id}: resolved {} bills, {defaults} in default",
        outcomes.len(),
    );

    Ok(AnalysisRun {
        run_id,
        snapshot,
        outcomes,
    })
}

impl AnalysisRun {
    pub fn report(&self) -> &IngestReport {
        &self.snapshot.report
    }

    /// Segment/time rollup for one dimension, in presentation order.
    pub fn rollup(&self, dimension: Dimension) -> EngineResult<Vec<SegmentRollup>> {
        rollup::aggregate(&self.outcomes, &self.snapshot.customers, dimension)
    }

    pub fn portfolio_summary(&self) -> PortfolioSummary {
        rollup::portfolio_summary(&self.outcomes)
    }

    pub fn action_volume(&self) -> Vec<ActionVolume> {
        rollup::action_volume(&self.snapshot.actions)
    }

    /// Materialize the outcome set to the bill_targets table.
    pub fn persist_outcomes(&self, store: &RecordStore) -> EngineResult<()> {
        store.replace_bill_targets(&self.outcomes)?;
        log::debug!(
            "run {}: materialized {} bill_targets rows",
            self.run_id,
            self.outcomes.len(),
        );
        Ok(())
    }
}
