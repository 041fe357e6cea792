use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use capcrack::cli::{Cli, Command, RunArgs};
use capcrack::config::Config;
use capcrack::crack::{self, Aircrack};
use capcrack::platform;
use capcrack::prompt::{self, Mode};
use capcrack::queue::{self, QueueBuild};
use capcrack::report;
use capcrack::runlog::RunLog;
use capcrack::store::Store;

fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Report(args) => cmd_report(args.json),
        Command::Forget(args) => cmd_forget(&args.essid),
    };

    std::process::exit(code);
}

fn cmd_run(args: RunArgs) -> i32 {
    let config = Config::from_run_args(&args);

    if !platform::aircrack_available() {
        eprintln!("aircrack-ng is not installed or not in PATH.");
        eprintln!("Install it first (e.g. 'sudo apt-get install aircrack-ng' on Debian/Ubuntu).");
        return 1;
    }

    if !config.wordlist.exists() {
        eprintln!("Wordlist not found: {}", config.wordlist.display());
        eprintln!("Pass one with --wordlist or set it in the config file.");
        return 1;
    }

    let mut store = match Store::open() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error opening completion record: {e}");
            return 1;
        }
    };

    let mut log = match RunLog::create() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error creating run log: {e}");
            return 1;
        }
    };

    let processed = match store.processed_ids() {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("Error reading completion record: {e}");
            return 1;
        }
    };

    if !processed.is_empty() {
        eprintln!(
            "{} previously attempted network(s) will be skipped if encountered again.",
            processed.len()
        );
    }

    // mode selection: positional files or a flag bypass the menu
    let mut menu_auto = false;
    let mut build: QueueBuild = if !args.files.is_empty() {
        queue::build_from_paths(&args.files, &processed)
    } else if args.auto {
        queue::build_from_dir(&config.handshake_dir, &processed)
    } else if args.manual {
        match collect_manual(&processed) {
            Ok(b) => b,
            Err(code) => return code,
        }
    } else {
        match prompt::choose_mode() {
            Ok(Mode::Auto) => {
                menu_auto = true;
                queue::build_from_dir(&config.handshake_dir, &processed)
            }
            Ok(Mode::Manual) => match collect_manual(&processed) {
                Ok(b) => b,
                Err(code) => return code,
            },
            Ok(Mode::Exit) => return 0,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                return 1;
            }
        }
    };

    // an interactive scan that found no files at all offers manual entry
    // before giving up (deduped-away files mean manual entry won't help)
    if menu_auto && build.is_empty() && build.skipped == 0 {
        println!(
            "No .cap/.pcap files found in {}.",
            config.handshake_dir.display()
        );
        match prompt::confirm("Switch to manual input?") {
            Ok(true) => {
                build = match collect_manual(&processed) {
                    Ok(b) => b,
                    Err(code) => return code,
                };
            }
            Ok(false) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                return 1;
            }
        }
    }

    for diagnostic in &build.diagnostics {
        log.line(diagnostic);
        if config.verbose {
            eprintln!("[diagnostic] {diagnostic}");
        }
    }

    if build.is_empty() {
        if build.skipped > 0 {
            println!(
                "Nothing to do: all {} matching file(s) were already attempted.",
                build.skipped
            );
        } else {
            println!("Nothing to do: no .cap/.pcap files found.");
        }
        return 0;
    }

    eprintln!(
        "Processing {} handshake file(s), largest first ({} skipped as already attempted).",
        build.items.len(),
        build.skipped
    );
    eprintln!("Using wordlist: {}", config.wordlist.display());
    eprintln!("Press Ctrl+C to stop; the in-flight capture stays eligible for the next run.");

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("\nInterrupt received, stopping after the current child exits...");
            stop.store(true, Ordering::Release);
        }) {
            eprintln!("warning: failed to set Ctrl-C handler: {e}");
        }
    }

    match crack::run_queue(&build.items, &Aircrack, &mut store, &config, &stop, &mut log) {
        Ok(run_report) => {
            report::print_run_summary(&run_report, build.skipped, &config);
            if !run_report.failed.is_empty() {
                eprintln!("details in {}", log.path().display());
            }
            if run_report.interrupted {
                130
            } else {
                0
            }
        }
        Err(e) => {
            eprintln!("Error during run: {e}");
            1
        }
    }
}

fn collect_manual(
    processed: &std::collections::HashSet<String>,
) -> Result<QueueBuild, i32> {
    match prompt::collect_manual_paths() {
        Ok(paths) => Ok(queue::build_from_paths(&paths, processed)),
        Err(e) => {
            eprintln!("Error reading input: {e}");
            Err(1)
        }
    }
}

fn cmd_report(json: bool) -> i32 {
    let store = match Store::open() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error opening completion record: {e}");
            return 1;
        }
    };

    match store.list() {
        Ok(rows) => {
            report::print_record(&rows, json);
            0
        }
        Err(e) => {
            eprintln!("Error listing completion record: {e}");
            1
        }
    }
}

fn cmd_forget(essid: &str) -> i32 {
    let mut store = match Store::open() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error opening completion record: {e}");
            return 1;
        }
    };

    match store.forget(essid) {
        Ok(true) => {
            println!("Removed {essid}; it will be attempted on the next run.");
            0
        }
        Ok(false) => {
            eprintln!("No record for {essid}.");
            1
        }
        Err(e) => {
            eprintln!("Error updating completion record: {e}");
            1
        }
    }
}
