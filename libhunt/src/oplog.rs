//! Per-hunt append-only operation log.
//!
//! One free-text line per mutating operation. A `logged_hunt-<hunt>` symlink
//! is published next to the hunt directories and re-pointed on every append
//! so the latest log is always reachable from the base directory.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const LOG_FILE: &str = "logged_hunt";

pub fn link_name(hunt: &str) -> String {
    format!("{LOG_FILE}-{hunt}")
}

pub fn append_entry(base: &Path, hunt: &str, line: &str) -> std::io::Result<()> {
    let log_path = base.join(hunt).join(LOG_FILE);
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    writeln!(log, "{line}")?;
    refresh_link(base, hunt)
}

fn refresh_link(base: &Path, hunt: &str) -> std::io::Result<()> {
    let link = base.join(link_name(hunt));
    match std::fs::remove_file(&link) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    // Relative target so the base directory stays relocatable.
    let target = Path::new(hunt).join(LOG_FILE);
    std::os::unix::fs::symlink(target, &link)
}

/// Remove a hunt's published log pointer, if any.
pub fn remove_link(base: &Path, hunt: &str) -> std::io::Result<()> {
    match std::fs::remove_file(base.join(link_name(hunt))) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
