//! Per-run diagnostics log.
//!
//! All raw tool output and per-item failure detail lands in a timestamped
//! file under the data dir, never on the console. The console stays focused
//! on identifier / status / secret.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

pub struct RunLog {
    file: File,
    path: PathBuf,
}

impl RunLog {
    /// Create `capcrack_YYYYMMDD_HHMMSS.log` in the platform data dir.
    pub fn create() -> Result<Self, Box<dyn std::error::Error>> {
        let log_dir = directories::ProjectDirs::from("", "", "capcrack")
            .ok_or("Could not determine data directory")?
            .data_dir()
            .join("logs");

        fs::create_dir_all(&log_dir)?;

        let name = format!("capcrack_{}.log", Local::now().format("%Y%m%d_%H%M%S"));
        Self::at_path(&log_dir.join(name))
    }

    /// Open at an explicit path. Tests use this to stay inside a tempdir.
    pub fn at_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(RunLog { file, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Log failures are swallowed: diagnostics
    /// must never abort the run they describe.
    pub fn line(&mut self, message: &str) {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(self.file, "[{stamp}] {message}");
    }

    /// Append a block of raw tool output under a header.
    pub fn raw(&mut self, header: &str, output: &str) {
        self.line(header);
        for line in output.lines() {
            let _ = writeln!(self.file, "    {line}");
        }
    }
}
