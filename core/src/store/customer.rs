use super::RecordStore;
use crate::{error::EngineResult, records::Customer};
use rusqlite::params;

impl RecordStore {
    // ── Customers ─────────────────────────────────────────────────

    pub fn insert_customer(&self, c: &Customer) -> EngineResult<()> {
        self.conn().execute(
            "INSERT INTO customers (customer_id, region, income_band)
             VALUES (?1, ?2, ?3)",
            params![&c.customer_id, &c.region, &c.income_band],
        )?;
        Ok(())
    }

    /// All customers, ordered by id for deterministic downstream iteration.
    pub fn load_customers(&self) -> EngineResult<Vec<Customer>> {
        let mut stmt = self.conn().prepare(
            "SELECT customer_id, region, income_band
             FROM customers ORDER BY customer_id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Customer {
                customer_id: row.get(0)?,
                region: row.get(1)?,
                income_band: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn customer_count(&self) -> EngineResult<i64> {
        let count =
            self.conn()
                .query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        Ok(count)
    }
}
