use super::{BillTargetRow, RecordStore};
use crate::{error::EngineResult, records::DATE_FORMAT, resolver::BillOutcome};
use rusqlite::params;

impl RecordStore {
    // ── Materialized outcomes ─────────────────────────────────────

    /// Rewrite bill_targets from a full outcome set. The table is
    /// derived output only — rewritten wholesale on every run.
    pub fn replace_bill_targets(&self, outcomes: &[BillOutcome]) -> EngineResult<()> {
        self.conn().execute_batch("BEGIN")?;
        let result = self.write_bill_targets(outcomes);
        match result {
            Ok(()) => {
                self.conn().execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn().execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    fn write_bill_targets(&self, outcomes: &[BillOutcome]) -> EngineResult<()> {
        self.conn().execute("DELETE FROM bill_targets", [])?;
        let mut stmt = self.conn().prepare(
            "INSERT INTO bill_targets (
                customer_id, bill_period_end, due_date, bill_amount, usage_m3,
                paid_in_window, default_60d
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for o in outcomes {
            stmt.execute(params![
                &o.customer_id,
                o.bill_period_end.format(DATE_FORMAT).to_string(),
                o.due_date.format(DATE_FORMAT).to_string(),
                o.bill_amount,
                o.usage_m3,
                o.paid_in_window,
                if o.is_default { 1 } else { 0 },
            ])?;
        }
        Ok(())
    }

    pub fn load_bill_targets(&self) -> EngineResult<Vec<BillTargetRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT customer_id, bill_period_end, due_date, bill_amount, usage_m3,
                    paid_in_window, default_60d
             FROM bill_targets
             ORDER BY customer_id ASC, due_date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BillTargetRow {
                customer_id: row.get(0)?,
                bill_period_end: row.get(1)?,
                due_date: row.get(2)?,
                bill_amount: row.get(3)?,
                usage_m3: row.get(4)?,
                paid_in_window: row.get(5)?,
                default_60d: row.get::<_, i64>(6)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn bill_target_count(&self) -> EngineResult<i64> {
        let count =
            self.conn()
                .query_row("SELECT COUNT(*) FROM bill_targets", [], |row| row.get(0))?;
        Ok(count)
    }
}
