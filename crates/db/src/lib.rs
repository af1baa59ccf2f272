mod error;
mod migrations;
mod settings;
mod usage;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use settings::{FLOW_COMPENSATION_KEY, SPOOLMAN_URL_KEY};

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }
}
