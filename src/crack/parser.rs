//! Classification of aircrack-ng output lines.
//!
//! The tool's line grammar is treated as a stable-enough contract to
//! pattern-match. Three signals matter:
//! - a network identifier announcement (summary row or "SSID:" line)
//! - success carrying the recovered passphrase ("KEY FOUND! [ ... ]")
//! - wordlist exhaustion ("Passphrase not in dictionary" / "KEY NOT FOUND")
//!
//! Everything else is Unrecognized and ignored, never fatal. Kept isolated
//! here so the matching rules can change without touching queue logic.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Essid(String),
    KeyFound(String),
    Exhausted,
    Unrecognized,
}

pub fn classify(line: &str) -> Signal {
    let trimmed = line.trim();

    if let Some(secret) = extract_key(trimmed) {
        return Signal::KeyFound(secret);
    }

    if trimmed.contains("Passphrase not in dictionary") || trimmed.contains("KEY NOT FOUND") {
        return Signal::Exhausted;
    }

    if let Some(essid) = extract_essid(trimmed) {
        return Signal::Essid(essid);
    }

    Signal::Unrecognized
}

/// "KEY FOUND! [ hunter2 ]" -> "hunter2"
fn extract_key(line: &str) -> Option<String> {
    if !line.contains("KEY FOUND!") {
        return None;
    }

    let start = line.find('[')? + 1;
    let end = line[start..].find(']')? + start;
    let secret = line[start..end].trim();

    if secret.is_empty() {
        None
    } else {
        Some(secret.to_string())
    }
}

fn extract_essid(line: &str) -> Option<String> {
    // summary row: "   1  DA:97:8D:FB:3E:BD   HomeNet   WPA (1 handshake)"
    // the index column puts the BSSID at a varying offset, so scan for it
    if let Some(pos) = find_bssid(line) {
        let rest = line[pos + 17..].trim();
        if let Some(cut) = rest.find(" WPA").or_else(|| rest.find(" WEP")) {
            if let Some(essid) = accept_essid(rest[..cut].trim()) {
                return Some(essid);
            }
        }
    }

    // summary/announcement form: "SSID: HomeNet" or "ESSID: HomeNet (DA:97:...)"
    if let Some(pos) = line.find("SSID:") {
        let mut name = line[pos + 5..].trim();

        // strip a trailing parenthesized BSSID
        if name.ends_with(')') {
            if let Some(open) = name.rfind('(') {
                name = name[..open].trim();
            }
        }

        return accept_essid(name);
    }

    None
}

fn accept_essid(name: &str) -> Option<String> {
    if name.is_empty() || name == "<hidden>" {
        None
    } else {
        Some(name.to_string())
    }
}

/// Byte offset of the first BSSID in the line, if any.
/// get() keeps the scan safe around multi-byte chars in ESSIDs.
fn find_bssid(line: &str) -> Option<usize> {
    if line.len() < 17 {
        return None;
    }

    (0..=line.len() - 17).find(|&i| line.get(i..i + 17).is_some_and(is_bssid))
}

/// Six hex pairs separated by colons, e.g. "DA:97:8D:FB:3E:BD".
fn is_bssid(s: &str) -> bool {
    if s.len() != 17 {
        return false;
    }

    s.bytes().enumerate().all(|(i, b)| {
        if i % 3 == 2 {
            b == b':'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}

/// Scan the `aircrack-ng <capture>` summary for the network name.
pub fn essid_from_summary(output: &str) -> Option<String> {
    output.lines().find_map(|line| match classify(line) {
        Signal::Essid(essid) => Some(essid),
        _ => None,
    })
}

/// The summary prints "N handshake" per network when a full 4-way
/// exchange is present in the capture.
pub fn has_handshake(output: &str) -> bool {
    output.contains("1 handshake")
}

/// Progress line: "1234/9999 keys tested (832.41 k/s)". The last one seen
/// is carried into the failure reason when the tool dies mid-run.
pub fn is_progress(line: &str) -> bool {
    line.contains("keys tested")
}
