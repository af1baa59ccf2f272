use rusqlite::params;

use crate::Db;
use crate::error::Result;

pub const SPOOLMAN_URL_KEY: &str = "spoolman_url";
pub const FLOW_COMPENSATION_KEY: &str = "flow_compensation_g";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM setting WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get::<_, String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_spoolman_url(&self) -> Result<Option<String>> {
        self.get_setting(SPOOLMAN_URL_KEY)
    }

    pub fn set_spoolman_url(&self, url: &str) -> Result<()> {
        self.set_setting(SPOOLMAN_URL_KEY, url)
    }

    pub fn get_flow_compensation(&self) -> Result<Option<f64>> {
        let value = self
            .get_setting(FLOW_COMPENSATION_KEY)?
            .and_then(|value| value.parse::<f64>().ok());
        Ok(value)
    }

    pub fn set_flow_compensation(&self, grams: f64) -> Result<()> {
        self.set_setting(FLOW_COMPENSATION_KEY, &grams.to_string())
    }
}
