//! Interactive input: the mode menu and the manual path-entry loop.
//!
//! Kept apart from the queue builder so input collection can be swapped or
//! fed from a buffer in tests. Invalid entries re-prompt, they never abort.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::queue::has_capture_extension;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Auto,
    Manual,
    Exit,
}

/// Numeric mode menu. Choices keep the historical numbering (0/1/3).
pub fn choose_mode() -> io::Result<Mode> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("Choose input mode:");
    println!("  0. Auto (scan the handshake directory for .cap/.pcap files)");
    println!("  1. Manual (enter capture paths one by one)");
    println!("  3. Exit");

    loop {
        print!("Mode (0/1/3): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            // EOF behaves like exit
            return Ok(Mode::Exit);
        }

        match line.trim() {
            "0" => return Ok(Mode::Auto),
            "1" => return Ok(Mode::Manual),
            "3" => return Ok(Mode::Exit),
            other => println!("Invalid input '{other}'. Please enter 0, 1 or 3."),
        }
    }
}

/// y/n confirmation, re-prompting until an answer. EOF counts as no.
pub fn confirm(question: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    read_confirm(stdin.lock(), question, true)
}

fn read_confirm<R: BufRead>(mut input: R, question: &str, interactive: bool) -> io::Result<bool> {
    loop {
        if interactive {
            print!("{question} (y/n): ");
            io::stdout().flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {
                if interactive {
                    println!("Please enter 'y' or 'n'.");
                }
            }
        }
    }
}

/// Manual mode: read capture paths until `done`/`q` or EOF. Each path must
/// exist and carry a .cap/.pcap extension; anything else re-prompts.
pub fn collect_manual_paths() -> io::Result<Vec<PathBuf>> {
    println!("Enter handshake file paths (.cap/.pcap) one by one.");
    println!("Type 'done' or 'q' to finish.");

    let stdin = io::stdin();
    read_paths(stdin.lock(), true)
}

fn read_paths<R: BufRead>(mut input: R, interactive: bool) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    loop {
        if interactive {
            print!("Handshake {} path: ", paths.len() + 1);
            io::stdout().flush()?;
        }

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let entry = line.trim();
        if entry.is_empty() {
            continue;
        }

        if entry.eq_ignore_ascii_case("done") || entry.eq_ignore_ascii_case("q") {
            break;
        }

        let path = PathBuf::from(entry);
        if !path.exists() {
            println!("File not found: {entry}");
            continue;
        }
        if !has_capture_extension(&path) {
            println!("Not a .cap or .pcap file: {entry}");
            continue;
        }

        println!("Added {entry} to queue.");
        paths.push(path);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_sentinel_terminates_loop() {
        let tmp = TempDir::new().unwrap();
        let cap = tmp.path().join("home.cap");
        File::create(&cap).unwrap();

        let input = format!("{}\ndone\n{}\n", cap.display(), cap.display());
        let paths = read_paths(Cursor::new(input), false).unwrap();

        assert_eq!(paths, vec![cap]);
    }

    #[test]
    fn test_q_sentinel_and_case_insensitivity() {
        let paths = read_paths(Cursor::new("Q\n"), false).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_invalid_entries_are_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let cap = tmp.path().join("office.pcap");
        File::create(&cap).unwrap();
        let txt = tmp.path().join("notes.txt");
        File::create(&txt).unwrap();

        let input = format!(
            "/does/not/exist.cap\n{}\n{}\nq\n",
            txt.display(),
            cap.display()
        );
        let paths = read_paths(Cursor::new(input), false).unwrap();

        assert_eq!(paths, vec![cap]);
    }

    #[test]
    fn test_confirm_accepts_yes_and_no() {
        assert!(read_confirm(Cursor::new("y\n"), "?", false).unwrap());
        assert!(read_confirm(Cursor::new("YES\n"), "?", false).unwrap());
        assert!(!read_confirm(Cursor::new("n\n"), "?", false).unwrap());
    }

    #[test]
    fn test_confirm_reprompts_until_answer() {
        assert!(read_confirm(Cursor::new("maybe\n\ny\n"), "?", false).unwrap());
    }

    #[test]
    fn test_confirm_eof_means_no() {
        assert!(!read_confirm(Cursor::new(""), "?", false).unwrap());
    }

    #[test]
    fn test_eof_finishes_with_collected_paths() {
        let tmp = TempDir::new().unwrap();
        let cap = tmp.path().join("cafe.cap");
        File::create(&cap).unwrap();

        let input = format!("{}\n", cap.display());
        let paths = read_paths(Cursor::new(input), false).unwrap();

        assert_eq!(paths.len(), 1);
    }
}
