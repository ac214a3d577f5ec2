//! Hunt enumeration over a base directory.

use std::path::Path;

use crate::error::HuntError;
use crate::record::RECORD_WIDTH;
use crate::store::TREASURE_FILE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntSummary {
    pub id: String,
    pub records: u64,
}

/// Enumerate the hunts under `base` with their record counts.
///
/// Non-directories and directories without a record file are skipped.
/// Order follows filesystem enumeration and must not be assumed sorted.
pub fn list_hunts(base: &Path) -> Result<Vec<HuntSummary>, HuntError> {
    let mut hunts = Vec::new();
    for entry in std::fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let record_file = entry.path().join(TREASURE_FILE);
        let Ok(meta) = record_file.metadata() else {
            continue; // not a hunt
        };
        hunts.push(HuntSummary {
            id: entry.file_name().to_string_lossy().into_owned(),
            records: meta.len() / RECORD_WIDTH as u64,
        });
    }
    Ok(hunts)
}
