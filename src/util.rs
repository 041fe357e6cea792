use std::path::Path;

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1_024;
    const MB: u64 = KB * 1_024;
    const GB: u64 = MB * 1_024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Make an ESSID safe for use as a filename and as a dedup key.
/// Strips path-hostile characters and replaces spaces with underscores.
pub fn sanitize_essid(essid: &str) -> String {
    essid
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Filename stem used as the best-effort network id before the tool
/// reports the real ESSID.
pub fn essid_hint(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());
    sanitize_essid(&stem)
}

/// mm:ss display for crack duration in result files and summaries.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1_024 * 1_024), "5.00 MB");
    }

    #[test]
    fn test_sanitize_essid() {
        assert_eq!(sanitize_essid("Home Net"), "Home_Net");
        assert_eq!(sanitize_essid("a/b\\c:d"), "abcd");
        assert_eq!(sanitize_essid("  cafe*wifi?  "), "cafewifi");
    }

    #[test]
    fn test_essid_hint_uses_stem() {
        assert_eq!(essid_hint(&PathBuf::from("/tmp/HomeNet.cap")), "HomeNet");
        assert_eq!(essid_hint(&PathBuf::from("office net.pcap")), "office_net");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3_599), "59:59");
    }
}
