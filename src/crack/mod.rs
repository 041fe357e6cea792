//! Queue runner.
//!
//! Processes work items strictly in builder order, one child process at a
//! time. The external tool saturates the CPU on its own, so no concurrency
//! is attempted. After every item reaches a terminal outcome the completion
//! record is updated immediately; an interrupted in-flight item is never
//! recorded, so it stays eligible for the next run.

pub mod aircrack;
pub mod parser;

pub use aircrack::{Aircrack, CrackOutcome, Cracker, ProbeReport};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::config::Config;
use crate::queue::WorkItem;
use crate::runlog::RunLog;
use crate::store::{Outcome, Store};
use crate::util::{format_bytes, format_elapsed, sanitize_essid};

#[derive(Debug, Serialize)]
pub struct CrackedNetwork {
    pub essid: String,
    pub secret: String,
    pub result_file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct FailedItem {
    pub essid: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub attempted: usize,
    pub cracked: Vec<CrackedNetwork>,
    pub exhausted: Vec<String>,
    pub failed: Vec<FailedItem>,
    /// Items dropped mid-run because the authoritative ESSID turned out to
    /// be already recorded (the filename hint disagreed with the tool).
    pub skipped: usize,
    pub interrupted: bool,
    pub duration_ms: u128,
}

impl RunReport {
    fn empty() -> Self {
        RunReport {
            attempted: 0,
            cracked: Vec::new(),
            exhausted: Vec::new(),
            failed: Vec::new(),
            skipped: 0,
            interrupted: false,
            duration_ms: 0,
        }
    }
}

pub fn run_queue(
    items: &[WorkItem],
    cracker: &dyn Cracker,
    store: &mut Store,
    config: &Config,
    stop: &AtomicBool,
    log: &mut RunLog,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mut report = RunReport::empty();
    let total = items.len();

    for (index, item) in items.iter().enumerate() {
        if stop.load(Ordering::Acquire) {
            report.interrupted = true;
            break;
        }

        eprintln!(
            "[{}/{}] {} ({})",
            index + 1,
            total,
            item.path.display(),
            format_bytes(item.size_bytes)
        );

        // resolve the authoritative network id before spending wordlist time
        let probe = match cracker.probe(&item.path, log) {
            Ok(p) => p,
            Err(reason) => {
                log.line(&format!("probe failed for {}: {reason}", item.path.display()));
                record_outcome(store, &item.essid_hint, Outcome::Error(reason), item, &mut report)?;
                continue;
            }
        };

        let essid = probe
            .essid
            .as_deref()
            .map(sanitize_essid)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| item.essid_hint.clone());

        // the filename hint passed the builder's dedup, but the tool may
        // report a name that was already attempted under a different file
        if essid != item.essid_hint && store.contains(&essid)? {
            eprintln!("  {essid} already attempted, skipping");
            report.skipped += 1;
            continue;
        }

        if !probe.has_handshake {
            eprintln!("  no 4-way handshake detected in {}", item.path.display());
            record_outcome(
                store,
                &essid,
                Outcome::Error("no handshake detected".to_string()),
                item,
                &mut report,
            )?;
            continue;
        }

        eprintln!("  cracking {essid}...");
        report.attempted += 1;
        let item_start = Instant::now();

        match cracker.crack(&item.path, &config.wordlist, stop, log) {
            CrackOutcome::Cracked { essid: reported, secret } => {
                let final_essid = reported
                    .as_deref()
                    .map(sanitize_essid)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(essid);

                let elapsed = format_elapsed(item_start.elapsed().as_secs());
                let result_file = match write_result_artifact(
                    &config.results_dir,
                    &final_essid,
                    &item.path,
                    &config.wordlist,
                    &secret,
                    &elapsed,
                ) {
                    Ok(path) => path,
                    Err(e) => {
                        // the secret is still reported and recorded; only
                        // the artifact is missing
                        log.line(&format!("failed to write result file: {e}"));
                        PathBuf::new()
                    }
                };

                println!("\nKEY FOUND for {final_essid}: {secret}  (took {elapsed})");
                if result_file.as_os_str().is_empty() {
                    eprintln!("  warning: result file could not be written, see {}", log.path().display());
                } else {
                    println!("  saved to {}", result_file.display());
                }

                store.record(&final_essid, &Outcome::Cracked(secret.clone()), Some(&item.path))?;
                report.cracked.push(CrackedNetwork { essid: final_essid, secret, result_file });
            }
            CrackOutcome::Exhausted { essid: reported } => {
                let final_essid = reported
                    .as_deref()
                    .map(sanitize_essid)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(essid);

                eprintln!("  passphrase not in wordlist for {final_essid}");
                store.record(&final_essid, &Outcome::Exhausted, Some(&item.path))?;
                report.exhausted.push(final_essid);
            }
            CrackOutcome::Failed(reason) => {
                eprintln!("  cracking failed for {essid}, see {}", log.path().display());
                log.line(&format!("crack failed for {}: {reason}", item.path.display()));
                store.record(&essid, &Outcome::Error(reason.clone()), Some(&item.path))?;
                report.failed.push(FailedItem { essid, reason });
            }
            CrackOutcome::Interrupted => {
                // the in-flight item stays unrecorded on purpose
                report.interrupted = true;
                break;
            }
        }
    }

    report.duration_ms = start.elapsed().as_millis();
    Ok(report)
}

fn record_outcome(
    store: &mut Store,
    essid: &str,
    outcome: Outcome,
    item: &WorkItem,
    report: &mut RunReport,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Outcome::Error(reason) = &outcome {
        report.failed.push(FailedItem { essid: essid.to_string(), reason: reason.clone() });
    }
    store.record(essid, &outcome, Some(&item.path))?;
    Ok(())
}

/// One result file per cracked network: `<essid>_cracked_password.txt`.
fn write_result_artifact(
    results_dir: &Path,
    essid: &str,
    capture: &Path,
    wordlist: &Path,
    secret: &str,
    elapsed: &str,
) -> Result<PathBuf, String> {
    fs::create_dir_all(results_dir)
        .map_err(|e| format!("failed to create {}: {}", results_dir.display(), e))?;

    let path = results_dir.join(format!("{essid}_cracked_password.txt"));
    let capture_name = capture
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| capture.display().to_string());
    let wordlist_name = wordlist
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| wordlist.display().to_string());

    let contents = format!(
        "Network (ESSID): {essid}\n\
         Handshake File: {capture_name}\n\
         Wordlist Used: {wordlist_name}\n\
         Password Found: {secret}\n\
         Time Taken: {elapsed}\n"
    );

    fs::write(&path, contents).map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Scripted stand-in for aircrack-ng, keyed by capture filename stem.
    struct FakeCracker {
        probes: HashMap<String, Result<(Option<String>, bool), String>>,
        outcomes: RefCell<HashMap<String, CrackOutcome>>,
        /// When set, flips the stop flag after this many crack calls.
        stop_after: Option<usize>,
        calls: RefCell<usize>,
    }

    impl FakeCracker {
        fn new() -> Self {
            FakeCracker {
                probes: HashMap::new(),
                outcomes: RefCell::new(HashMap::new()),
                stop_after: None,
                calls: RefCell::new(0),
            }
        }

        fn stem(path: &Path) -> String {
            path.file_stem().unwrap().to_string_lossy().to_string()
        }

        fn script(&mut self, stem: &str, essid: Option<&str>, handshake: bool, outcome: CrackOutcome) {
            self.probes.insert(
                stem.to_string(),
                Ok((essid.map(|s| s.to_string()), handshake)),
            );
            self.outcomes.borrow_mut().insert(stem.to_string(), outcome);
        }
    }

    impl Cracker for FakeCracker {
        fn probe(&self, capture: &Path, _log: &mut RunLog) -> Result<ProbeReport, String> {
            match self.probes.get(&Self::stem(capture)) {
                Some(Ok((essid, has_handshake))) => Ok(ProbeReport {
                    essid: essid.clone(),
                    has_handshake: *has_handshake,
                }),
                Some(Err(e)) => Err(e.clone()),
                None => Err("unscripted probe".to_string()),
            }
        }

        fn crack(
            &self,
            capture: &Path,
            _wordlist: &Path,
            stop: &AtomicBool,
            _log: &mut RunLog,
        ) -> CrackOutcome {
            *self.calls.borrow_mut() += 1;
            if let Some(n) = self.stop_after {
                if *self.calls.borrow() >= n {
                    stop.store(true, Ordering::Release);
                }
            }

            self.outcomes
                .borrow_mut()
                .remove(&Self::stem(capture))
                .unwrap_or(CrackOutcome::Failed("unscripted crack".to_string()))
        }
    }

    struct Fixture {
        _tmp: TempDir,
        store: Store,
        config: Config,
        log: RunLog,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let store = Store::open_at(&tmp.path().join("capcrack.db")).unwrap();
        let log = RunLog::at_path(&tmp.path().join("run.log")).unwrap();

        let config = Config {
            handshake_dir: tmp.path().join("handshakes"),
            wordlist: tmp.path().join("wifite.txt"),
            results_dir: tmp.path().join("cracked_results"),
            json_output: false,
            verbose: false,
        };

        Fixture { _tmp: tmp, store, config, log }
    }

    fn item(stem: &str, size: u64) -> WorkItem {
        WorkItem {
            path: PathBuf::from(format!("/captures/{stem}.cap")),
            size_bytes: size,
            essid_hint: stem.to_string(),
        }
    }

    #[test]
    fn test_success_records_and_writes_artifact() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script(
            "home",
            Some("HomeNet"),
            true,
            CrackOutcome::Cracked { essid: Some("HomeNet".into()), secret: "hunter2".into() },
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert_eq!(report.cracked.len(), 1);
        assert_eq!(report.cracked[0].essid, "HomeNet");
        assert_eq!(report.cracked[0].secret, "hunter2");
        assert!(fx.store.contains("HomeNet").unwrap());

        let artifact = fx.config.results_dir.join("HomeNet_cracked_password.txt");
        let contents = fs::read_to_string(artifact).unwrap();
        assert!(contents.contains("Network (ESSID): HomeNet"));
        assert!(contents.contains("Password Found: hunter2"));
    }

    #[test]
    fn test_exhaustion_recorded_without_artifact_and_loop_continues() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script(
            "home",
            Some("HomeNet"),
            true,
            CrackOutcome::Exhausted { essid: Some("HomeNet".into()) },
        );
        cracker.script(
            "office",
            Some("OfficeNet"),
            true,
            CrackOutcome::Cracked { essid: Some("OfficeNet".into()), secret: "letmein".into() },
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000), item("office", 200_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert_eq!(report.exhausted, vec!["HomeNet".to_string()]);
        assert_eq!(report.cracked.len(), 1);
        assert!(fx.store.contains("HomeNet").unwrap());
        assert!(fx.store.contains("OfficeNet").unwrap());
        assert!(!fx.config.results_dir.join("HomeNet_cracked_password.txt").exists());
    }

    #[test]
    fn test_tool_failure_recorded_and_loop_continues() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script(
            "home",
            Some("HomeNet"),
            true,
            CrackOutcome::Failed("aircrack-ng exited with signal 9".into()),
        );
        cracker.script(
            "office",
            Some("OfficeNet"),
            true,
            CrackOutcome::Exhausted { essid: None },
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000), item("office", 200_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].essid, "HomeNet");
        // a failed item still counts as attempted for future dedup
        assert!(fx.store.contains("HomeNet").unwrap());
        assert!(fx.store.contains("OfficeNet").unwrap());
    }

    #[test]
    fn test_no_handshake_records_error_without_cracking() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script(
            "home",
            Some("HomeNet"),
            false,
            CrackOutcome::Failed("should never be invoked".into()),
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert_eq!(report.attempted, 0);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].reason, "no handshake detected");
        assert!(fx.store.contains("HomeNet").unwrap());
        assert_eq!(*cracker.calls.borrow(), 0);
    }

    #[test]
    fn test_authoritative_essid_already_recorded_skips_item() {
        let mut fx = fixture();
        fx.store
            .record("RealNet", &Outcome::Exhausted, None)
            .unwrap();

        let mut cracker = FakeCracker::new();
        // filename says "home", the tool says "RealNet"
        cracker.script(
            "home",
            Some("RealNet"),
            true,
            CrackOutcome::Failed("should never be invoked".into()),
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.attempted, 0);
        assert_eq!(*cracker.calls.borrow(), 0);
    }

    #[test]
    fn test_interrupted_item_not_recorded() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script("home", Some("HomeNet"), true, CrackOutcome::Interrupted);
        cracker.script(
            "office",
            Some("OfficeNet"),
            true,
            CrackOutcome::Failed("should never be invoked".into()),
        );

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000), item("office", 200_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert!(report.interrupted);
        assert!(!fx.store.contains("HomeNet").unwrap());
        assert!(!fx.store.contains("OfficeNet").unwrap());
    }

    #[test]
    fn test_stop_flag_between_items_halts_loop() {
        let mut fx = fixture();
        let mut cracker = FakeCracker::new();
        cracker.script(
            "home",
            Some("HomeNet"),
            true,
            CrackOutcome::Exhausted { essid: None },
        );
        cracker.script(
            "office",
            Some("OfficeNet"),
            true,
            CrackOutcome::Failed("should never be invoked".into()),
        );
        cracker.stop_after = Some(1);

        let stop = AtomicBool::new(false);
        let report = run_queue(
            &[item("home", 500_000), item("office", 200_000)],
            &cracker,
            &mut fx.store,
            &fx.config,
            &stop,
            &mut fx.log,
        )
        .unwrap();

        assert!(report.interrupted);
        // the completed item keeps its terminal outcome
        assert!(fx.store.contains("HomeNet").unwrap());
        assert!(!fx.store.contains("OfficeNet").unwrap());
        assert_eq!(*cracker.calls.borrow(), 1);
    }
}
