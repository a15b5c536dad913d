use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use walkdir::WalkDir;

/// A file whose opening lines differ from the required header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: PathBuf,
    /// The first lines actually found (at most as many as required).
    pub lines: Vec<String>,
}

/// Walk `root` and return every file ending in `suffix` whose first lines are
/// not exactly `required`. Only the line terminator is stripped before
/// comparing. Results are in path order.
pub fn scan(root: &Path, suffix: &str, required: &[&str]) -> Result<Vec<Violation>> {
    if !root.is_dir() {
        bail!("source directory not found: {}", root.display());
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    let mut violations = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !has_suffix(entry.path(), suffix) {
            continue;
        }
        let path = entry.path();
        let lines = head(path, required.len())?;
        if lines.iter().map(String::as_str).ne(required.iter().copied()) {
            violations.push(Violation {
                path: path.to_path_buf(),
                lines,
            });
        }
    }

    Ok(violations)
}

/// Run [`scan`] and report each violation on stderr. Returns the count.
pub fn check_headers(root: &Path, suffix: &str, required: &[&str]) -> Result<usize> {
    let violations = scan(root, suffix, required)?;
    for v in &violations {
        eprintln!("Bad copyright header in {}: {:?}", v.path.display(), v.lines);
    }
    debug!(root = %root.display(), count = violations.len(), "header scan finished");
    Ok(violations.len())
}

/// Dot-entries below the root (`.venv`, `.ipynb_checkpoints`, `.hidden.py`).
fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

/// Read up to `n` lines, without their terminators. Bytes that are not UTF-8
/// are replaced rather than treated as an error.
fn head(path: &Path, n: usize) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(n);
    let mut buf = Vec::new();

    while lines.len() < n {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(lines)
}
