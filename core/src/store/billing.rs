use super::{ActionRow, BillRow, PaymentRow, RecordStore};
use crate::{
    error::EngineResult,
    records::{Bill, CollectionAction, Payment, DATE_FORMAT},
};
use rusqlite::params;

impl RecordStore {
    // ── Bills ─────────────────────────────────────────────────────

    pub fn insert_bill(&self, b: &Bill) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO bills (customer_id, bill_period_end, due_date, bill_amount, usage_m3)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &b.customer_id,
                b.bill_period_end.format(DATE_FORMAT).to_string(),
                b.due_date.format(DATE_FORMAT).to_string(),
                b.bill_amount,
                b.usage_m3,
            ],
        )?;
        Ok(())
    }

    /// Insert a bill exactly as it arrived from an upstream feed. Dates
    /// are stored unvalidated; snapshot ingest screens them.
    pub fn insert_bill_raw(
        &self,
        customer_id: &str,
        bill_period_end: &str,
        due_date: &str,
        bill_amount: f64,
        usage_m3: f64,
    ) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO bills (customer_id, bill_period_end, due_date, bill_amount, usage_m3)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![customer_id, bill_period_end, due_date, bill_amount, usage_m3],
        )?;
        Ok(())
    }

    /// All bill rows, raw. Ordered by (customer_id, due_date) so the
    /// resolver sees each customer's bills in due-date order.
    pub fn load_bills(&self) -> EngineResult<Vec<BillRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT bill_id, customer_id, bill_period_end, due_date, bill_amount, usage_m3
             FROM bills ORDER BY customer_id ASC, due_date ASC, bill_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(BillRow {
                bill_id: row.get(0)?,
                customer_id: row.get(1)?,
                bill_period_end: row.get(2)?,
                due_date: row.get(3)?,
                bill_amount: row.get(4)?,
                usage_m3: row.get(5)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Payments ──────────────────────────────────────────────────

    pub fn insert_payment(&self, p: &Payment) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO payments (customer_id, payment_date, amount)
             VALUES (?1, ?2, ?3)",
            params![
                &p.customer_id,
                p.payment_date.format(DATE_FORMAT).to_string(),
                p.amount,
            ],
        )?;
        Ok(())
    }

    pub fn insert_payment_raw(
        &self,
        customer_id: &str,
        payment_date: &str,
        amount: f64,
    ) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO payments (customer_id, payment_date, amount)
             VALUES (?1, ?2, ?3)",
            params![customer_id, payment_date, amount],
        )?;
        Ok(())
    }

    pub fn load_payments(&self) -> EngineResult<Vec<PaymentRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT payment_id, customer_id, payment_date, amount
             FROM payments ORDER BY customer_id ASC, payment_date ASC, payment_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PaymentRow {
                payment_id: row.get(0)?,
                customer_id: row.get(1)?,
                payment_date: row.get(2)?,
                amount: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Collection actions ────────────────────────────────────────

    pub fn insert_action(&self, a: &CollectionAction) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO collections_actions (customer_id, action_date, action)
             VALUES (?1, ?2, ?3)",
            params![
                &a.customer_id,
                a.action_date.format(DATE_FORMAT).to_string(),
                &a.action_type,
            ],
        )?;
        Ok(())
    }

    pub fn insert_action_raw(
        &self,
        customer_id: &str,
        action_date: &str,
        action_type: &str,
    ) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO collections_actions (customer_id, action_date, action)
             VALUES (?1, ?2, ?3)",
            params![customer_id, action_date, action_type],
        )?;
        Ok(())
    }

    pub fn load_actions(&self) -> EngineResult<Vec<ActionRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT action_id, customer_id, action_date, action
             FROM collections_actions
             ORDER BY customer_id ASC, action_date ASC, action_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ActionRow {
                action_id: row.get(0)?,
                customer_id: row.get(1)?,
                action_date: row.get(2)?,
                action_type: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
