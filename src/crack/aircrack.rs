//! aircrack-ng integration.
//!
//! Two invocations per queue item:
//! - `aircrack-ng <capture>`: summary probe for the ESSID and handshake
//!   presence, a short blocking call
//! - `aircrack-ng -w <wordlist> <capture>`: the actual crack, streamed line
//!   by line so the key is picked up the moment it appears and an interrupt
//!   can kill the child mid-wordlist
//!
//! Handles gracefully: binary missing, abnormal exit, unparseable output.

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::runlog::RunLog;
use super::parser::{self, Signal};

/// What the summary probe learned about a capture.
pub struct ProbeReport {
    pub essid: Option<String>,
    pub has_handshake: bool,
}

/// Terminal result of one crack invocation. The ESSID carried here is the
/// authoritative one from the tool's own output, when it printed one.
pub enum CrackOutcome {
    Cracked { essid: Option<String>, secret: String },
    Exhausted { essid: Option<String> },
    Failed(String),
    Interrupted,
}

/// Seam between the queue runner and the external tool. Tests substitute a
/// scripted implementation; production uses [`Aircrack`].
pub trait Cracker {
    fn probe(&self, capture: &Path, log: &mut RunLog) -> Result<ProbeReport, String>;

    fn crack(
        &self,
        capture: &Path,
        wordlist: &Path,
        stop: &AtomicBool,
        log: &mut RunLog,
    ) -> CrackOutcome;
}

pub struct Aircrack;

impl Cracker for Aircrack {
    fn probe(&self, capture: &Path, log: &mut RunLog) -> Result<ProbeReport, String> {
        // stdin is closed: with multiple networks in one capture the tool
        // prompts for a target index and would otherwise block forever
        let output = Command::new("aircrack-ng")
            .arg(capture)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to run aircrack-ng: {e}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        log.raw(&format!("probe output for {}:", capture.display()), &stdout);

        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log.raw("probe stderr:", &stderr);
            return Err(format!("aircrack-ng probe failed: {}", stderr.trim()));
        }

        Ok(ProbeReport {
            essid: parser::essid_from_summary(&stdout),
            has_handshake: parser::has_handshake(&stdout),
        })
    }

    fn crack(
        &self,
        capture: &Path,
        wordlist: &Path,
        stop: &AtomicBool,
        log: &mut RunLog,
    ) -> CrackOutcome {
        let mut child = match Command::new("aircrack-ng")
            .arg("-w")
            .arg(wordlist)
            .arg(capture)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => return CrackOutcome::Failed(format!("failed to start aircrack-ng: {e}")),
        };

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return CrackOutcome::Failed("aircrack-ng stdout not captured".to_string());
        };
        let Some(stderr) = child.stderr.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return CrackOutcome::Failed("aircrack-ng stderr not captured".to_string());
        };

        let (stdout_tx, stdout_rx) = mpsc::channel::<String>();
        let (stderr_tx, stderr_rx) = mpsc::channel::<String>();

        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(Result::ok) {
                let _ = stdout_tx.send(line);
            }
        });

        thread::spawn(move || {
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(Result::ok) {
                let _ = stderr_tx.send(line);
            }
        });

        let mut essid: Option<String> = None;
        let mut exhausted = false;
        let mut last_progress: Option<String> = None;

        loop {
            if stop.load(Ordering::Acquire) {
                let _ = child.kill();
                let _ = child.wait();
                return CrackOutcome::Interrupted;
            }

            while let Ok(line) = stdout_rx.try_recv() {
                log.line(&line);

                if parser::is_progress(&line) {
                    last_progress = Some(line.trim().to_string());
                }

                match parser::classify(&line) {
                    Signal::KeyFound(secret) => {
                        // aircrack keeps printing key material after this;
                        // the secret is all we need
                        let _ = child.kill();
                        let _ = child.wait();
                        return CrackOutcome::Cracked { essid, secret };
                    }
                    Signal::Essid(name) => essid = Some(name),
                    Signal::Exhausted => exhausted = true,
                    Signal::Unrecognized => {}
                }
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    // drain whatever arrived between the last poll and exit
                    while let Ok(line) = stdout_rx.try_recv() {
                        log.line(&line);
                        if parser::is_progress(&line) {
                            last_progress = Some(line.trim().to_string());
                        }
                        match parser::classify(&line) {
                            Signal::KeyFound(secret) => {
                                return CrackOutcome::Cracked { essid, secret };
                            }
                            Signal::Essid(name) => essid = Some(name),
                            Signal::Exhausted => exhausted = true,
                            Signal::Unrecognized => {}
                        }
                    }

                    let mut stderr_lines = Vec::new();
                    while let Ok(line) = stderr_rx.try_recv() {
                        log.line(&line);
                        stderr_lines.push(line);
                    }

                    if exhausted {
                        return CrackOutcome::Exhausted { essid };
                    }

                    if !status.success() {
                        let mut detail = stderr_lines.last().cloned().unwrap_or_default();
                        if let Some(progress) = &last_progress {
                            detail = format!("{detail} (last progress: {progress})");
                        }
                        return CrackOutcome::Failed(format!(
                            "aircrack-ng exited with {status}: {detail}"
                        ));
                    }

                    let reason = match &last_progress {
                        Some(progress) => format!(
                            "aircrack-ng finished without a recognizable result (last progress: {progress})"
                        ),
                        None => "aircrack-ng finished without a recognizable result".to_string(),
                    };
                    return CrackOutcome::Failed(reason);
                }
                Ok(None) => {}
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return CrackOutcome::Failed(format!("failed to wait on aircrack-ng: {e}"));
                }
            }

            thread::sleep(Duration::from_millis(50));
        }
    }
}
