use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "capcrack")]
#[command(about = "Queue captured Wi-Fi handshakes against a wordlist via aircrack-ng")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a queue of capture files and crack them one by one
    Run(RunArgs),

    /// List previously attempted networks and their outcomes
    Report(ReportArgs),

    /// Remove a network from the completion record so it can be reattempted
    Forget(ForgetArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Capture files to process, in the given order (skips the mode menu)
    pub files: Vec<PathBuf>,

    /// Directory scanned for .cap/.pcap files in auto mode
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Wordlist passed to aircrack-ng
    #[arg(long, short = 'w')]
    pub wordlist: Option<PathBuf>,

    /// Scan the handshake directory without showing the mode menu
    #[arg(long, default_value_t = false, conflicts_with = "manual")]
    pub auto: bool,

    /// Prompt for capture paths one by one without showing the mode menu
    #[arg(long, default_value_t = false)]
    pub manual: bool,

    /// Directory where per-network result files are written
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Output the run summary as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Show detailed output including diagnostics and peak memory
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ForgetArgs {
    /// Network name (ESSID) to remove from the completion record
    pub essid: String,
}
