//! User-facing output: the end-of-run summary and the completion-record
//! listing. Secrets are printed prominently; everything verbose lives in
//! the run log instead.

use crate::config::Config;
use crate::crack::RunReport;
use crate::store::{Outcome, RecordRow};
use crate::util::format_bytes;

pub fn print_run_summary(report: &RunReport, builder_skipped: usize, config: &Config) {
    if config.json_output {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize run summary: {e}"),
        }
        return;
    }

    println!();
    if report.interrupted {
        println!("Run interrupted.");
    } else {
        println!("Queue processed.");
    }

    println!(
        "  attempted: {}, cracked: {}, exhausted: {}, failed: {}",
        report.attempted,
        report.cracked.len(),
        report.exhausted.len(),
        report.failed.len()
    );

    let skipped = builder_skipped + report.skipped;
    if skipped > 0 {
        println!("  skipped {skipped} file(s) for already-attempted networks");
    }

    for network in &report.cracked {
        println!("  {} -> {}", network.essid, network.secret);
    }

    let duration_sec = report.duration_ms as f64 / 1000.0;
    println!("\nrun completed in {duration_sec:.2}s");

    if config.verbose {
        if let Some(usage) = memory_stats::memory_stats() {
            println!("peak memory: {}", format_bytes(usage.physical_mem as u64));
        }
    }
}

pub fn print_record(rows: &[RecordRow], json: bool) {
    if json {
        match serde_json::to_string_pretty(rows) {
            Ok(out) => println!("{out}"),
            Err(e) => eprintln!("failed to serialize record: {e}"),
        }
        return;
    }

    print!("{}", render_record_table(rows));
}

fn render_record_table(rows: &[RecordRow]) -> String {
    if rows.is_empty() {
        return String::from("No networks attempted yet. Run 'capcrack run' to start.\n");
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<24} {:<10} {:<20} {:<20}\n",
        "ESSID", "Outcome", "Secret", "Date"
    ));
    output.push_str(&"-".repeat(76));
    output.push('\n');

    for row in rows {
        let secret = match &row.outcome {
            Outcome::Cracked(secret) => secret.as_str(),
            _ => "-",
        };

        let date = chrono::DateTime::from_timestamp(row.completed_at, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        output.push_str(&format!(
            "{:<24} {:<10} {:<20} {:<20}\n",
            truncate(&row.essid, 24),
            row.outcome.as_str(),
            truncate(secret, 20),
            date
        ));
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
