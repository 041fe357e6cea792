use std::process::{Command, Stdio};

/// aircrack-ng exits non-zero when run with --help on some builds, so
/// availability means "the binary could be spawned", not "it returned 0".
pub fn aircrack_available() -> bool {
    Command::new("aircrack-ng")
        .arg("--help")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}
