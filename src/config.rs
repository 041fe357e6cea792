use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::cli::RunArgs;

pub struct Config {
    pub handshake_dir: PathBuf,
    pub wordlist: PathBuf,
    pub results_dir: PathBuf,
    pub json_output: bool,
    pub verbose: bool,
}

/// Optional on-disk overrides (~/.config/capcrack/config.toml).
/// Every field is optional so a partial file is fine.
#[derive(Deserialize, Default)]
struct FileConfig {
    handshake_dir: Option<PathBuf>,
    wordlist: Option<PathBuf>,
    results_dir: Option<PathBuf>,
}

fn load_file_config() -> FileConfig {
    let Some(dirs) = directories::ProjectDirs::from("", "", "capcrack") else {
        return FileConfig::default();
    };

    let path = dirs.config_dir().join("config.toml");
    let Ok(contents) = fs::read_to_string(&path) else {
        return FileConfig::default();
    };

    match toml::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("warning: ignoring malformed config {}: {}", path.display(), e);
            FileConfig::default()
        }
    }
}

impl Config {
    /// Precedence: CLI flag, then config file, then built-in default.
    pub fn from_run_args(args: &RunArgs) -> Self {
        let file = load_file_config();

        let handshake_dir = args.dir.clone()
            .or(file.handshake_dir)
            .unwrap_or_else(|| PathBuf::from("handshakes"));

        let wordlist = args.wordlist.clone()
            .or(file.wordlist)
            .unwrap_or_else(|| PathBuf::from("wifite.txt"));

        let results_dir = args.results_dir.clone()
            .or(file.results_dir)
            .unwrap_or_else(|| PathBuf::from("cracked_results"));

        Config {
            handshake_dir,
            wordlist,
            results_dir,
            json_output: args.json,
            verbose: args.verbose,
        }
    }
}
