//! Queue builder for capture files.
//!
//! Turns a directory scan or a caller-supplied path list into an ordered
//! work queue:
//! - validates the .cap/.pcap extension (case-insensitive)
//! - sorts largest file first, ties broken by path for determinism
//! - drops files whose network id was already attempted, either in the
//!   completion record or earlier in the same batch
//!
//! An empty queue is "nothing to do", not an error.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::util::essid_hint;

#[derive(Debug, Clone)]
pub struct WorkItem {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Filename-derived network id, used for pre-invocation dedup.
    /// The authoritative ESSID from the tool supersedes it for record-keeping.
    pub essid_hint: String,
}

pub struct QueueBuild {
    pub items: Vec<WorkItem>,
    /// Files dropped because their network id was already attempted.
    pub skipped: usize,
    pub diagnostics: Vec<String>,
}

impl QueueBuild {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn has_capture_extension(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            ext == "cap" || ext == "pcap"
        }
        None => false,
    }
}

/// Auto mode: recursively collect .cap/.pcap files under `dir`.
/// Non-matching files are silently excluded.
pub fn build_from_dir(dir: &Path, processed: &HashSet<String>) -> QueueBuild {
    let mut diagnostics = Vec::new();

    if !dir.exists() {
        diagnostics.push(format!("handshake directory not found: {}", dir.display()));
        return QueueBuild { items: Vec::new(), skipped: 0, diagnostics };
    }

    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                diagnostics.push(format!("scan error under {}: {}", dir.display(), e));
                continue;
            }
        };

        if entry.file_type().is_file() && has_capture_extension(entry.path()) {
            candidates.push(entry.into_path());
        }
    }

    assemble(candidates, processed, diagnostics)
}

/// Manual mode: the prompt loop already validated existence and extension,
/// but re-check here so the builder holds its own contract.
pub fn build_from_paths(paths: &[PathBuf], processed: &HashSet<String>) -> QueueBuild {
    let mut diagnostics = Vec::new();
    let mut candidates = Vec::new();

    for path in paths {
        if !path.exists() {
            diagnostics.push(format!("file not found: {}", path.display()));
            continue;
        }
        if !has_capture_extension(path) {
            diagnostics.push(format!("not a .cap/.pcap file: {}", path.display()));
            continue;
        }
        candidates.push(path.clone());
    }

    assemble(candidates, processed, diagnostics)
}

fn assemble(
    candidates: Vec<PathBuf>,
    processed: &HashSet<String>,
    mut diagnostics: Vec<String>,
) -> QueueBuild {
    let mut items = Vec::with_capacity(candidates.len());

    for path in candidates {
        let size_bytes = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                diagnostics.push(format!("failed to stat {}: {}", path.display(), e));
                continue;
            }
        };

        let essid_hint = essid_hint(&path);
        items.push(WorkItem { path, size_bytes, essid_hint });
    }

    // largest first; equal sizes fall back to path order so repeated builds
    // over the same tree produce the same queue
    items.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.path.cmp(&b.path))
    });

    // dedup after sorting so the largest capture per network survives
    let mut seen: HashSet<String> = HashSet::new();
    let mut skipped = 0;
    items.retain(|item| {
        if processed.contains(&item.essid_hint) || !seen.insert(item.essid_hint.clone()) {
            skipped += 1;
            false
        } else {
            true
        }
    });

    QueueBuild { items, skipped, diagnostics }
}
