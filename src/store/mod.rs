//! SQLite completion record.
//!
//! One row per network that reached a terminal outcome:
//! - cracked, with the recovered passphrase
//! - exhausted, the wordlist ran out
//! - error, the external tool failed (reason kept for the report)
//!
//! Rows are written immediately after each queue item finishes so an
//! interrupted run loses only the in-flight item. A network present here is
//! never queued again until `capcrack forget` removes it.

use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Terminal outcome for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    Cracked(String),
    Exhausted,
    Error(String),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Cracked(_) => "cracked",
            Outcome::Exhausted => "exhausted",
            Outcome::Error(_) => "error",
        }
    }
}

/// One record row, as listed by `capcrack report`.
#[derive(Debug, Serialize)]
pub struct RecordRow {
    pub essid: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub capture: Option<String>,
    pub completed_at: i64,
}

/// Get the database path (~/.local/share/capcrack/capcrack.db or platform equivalent)
fn get_db_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = directories::ProjectDirs::from("", "", "capcrack")
        .ok_or("Could not determine data directory")?
        .data_dir()
        .to_path_buf();

    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("capcrack.db"))
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS networks (
            essid TEXT PRIMARY KEY,
            outcome TEXT NOT NULL,
            secret TEXT,
            detail TEXT,
            capture TEXT,
            completed_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Database handle. Open once per command, reuse across all operations.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = get_db_path()?;
        Self::open_at(&db_path)
    }

    /// Open at an explicit path. Tests use this to stay inside a tempdir.
    pub fn open_at(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(Store { conn })
    }

    /// Record a terminal outcome for one network. An earlier row for the
    /// same ESSID is replaced.
    pub fn record(
        &mut self,
        essid: &str,
        outcome: &Outcome,
        capture: Option<&Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)?
            .as_secs() as i64;

        let (secret, detail) = match outcome {
            Outcome::Cracked(secret) => (Some(secret.as_str()), None),
            Outcome::Exhausted => (None, None),
            Outcome::Error(reason) => (None, Some(reason.as_str())),
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO networks (essid, outcome, secret, detail, capture, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                essid,
                outcome.as_str(),
                secret,
                detail,
                capture.map(|p| p.to_string_lossy().to_string()),
                timestamp
            ],
        )?;

        Ok(())
    }

    pub fn contains(&self, essid: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM networks WHERE essid = ?1",
            params![essid],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All ESSIDs with a terminal outcome; the queue builder's dedup set.
    pub fn processed_ids(&self) -> Result<HashSet<String>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare("SELECT essid FROM networks")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    pub fn list(&self) -> Result<Vec<RecordRow>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT essid, outcome, secret, detail, capture, completed_at
             FROM networks
             ORDER BY completed_at DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let essid: String = row.get(0)?;
                let outcome_str: String = row.get(1)?;
                let secret: Option<String> = row.get(2)?;
                let detail: Option<String> = row.get(3)?;
                let capture: Option<String> = row.get(4)?;
                let completed_at: i64 = row.get(5)?;

                let outcome = match outcome_str.as_str() {
                    "cracked" => Outcome::Cracked(secret.unwrap_or_default()),
                    "error" => Outcome::Error(detail.unwrap_or_default()),
                    _ => Outcome::Exhausted,
                };

                Ok(RecordRow { essid, outcome, capture, completed_at })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Remove one network so it can be reattempted. Returns whether a row
    /// actually existed.
    pub fn forget(&mut self, essid: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let changed = self
            .conn
            .execute("DELETE FROM networks WHERE essid = ?1", params![essid])?;
        Ok(changed > 0)
    }
}
