//! File-backed record store for one base directory of hunts.
//!
//! Each hunt owns a subdirectory `<base>/<hunt>` holding a `treasures` record
//! file (fixed-width blocks, see [`crate::record`]) and a `logged_hunt`
//! operation log. The store takes no locks: concurrent writers on the same
//! hunt are a documented hazard and must be serialized by the caller.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::HuntError;
use crate::oplog;
use crate::record::{RECORD_WIDTH, Treasure, TreasureFields};

pub const TREASURE_FILE: &str = "treasures";
const TMP_FILE: &str = "treasures.tmp";

pub struct HuntStore {
    base: PathBuf,
}

impl HuntStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn hunt_dir(&self, hunt: &str) -> PathBuf {
        self.base.join(hunt)
    }

    fn record_file(&self, hunt: &str) -> PathBuf {
        self.hunt_dir(hunt).join(TREASURE_FILE)
    }

    pub fn hunt_exists(&self, hunt: &str) -> bool {
        self.record_file(hunt).is_file()
    }

    /// Number of records in the hunt, derived from the file length.
    pub fn record_count(&self, hunt: &str) -> Result<u64, HuntError> {
        let meta = match self.record_file(hunt).metadata() {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HuntError::HuntNotFound(hunt.to_string()));
            }
            Err(e) => return Err(HuntError::Io(e)),
        };
        Ok(meta.len() / RECORD_WIDTH as u64)
    }

    /// Append one record, creating the hunt on first write.
    ///
    /// The new id is always one greater than the current maximum of the file.
    pub fn append(&self, hunt: &str, fields: TreasureFields) -> Result<u32, HuntError> {
        let dir = self.hunt_dir(hunt);
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
            tracing::info!(hunt, "created new hunt");
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(self.record_file(hunt))?;
        let id = (file.metadata()?.len() / RECORD_WIDTH as u64) as u32 + 1;

        let record = Treasure::new(id, fields);
        file.seek(SeekFrom::End(0))?;
        file.write_all(&record.encode())?;

        oplog::append_entry(
            &self.base,
            hunt,
            &format!("Added treasure {id} to hunt {hunt}"),
        )?;
        tracing::debug!(hunt, id, "appended record");
        Ok(id)
    }

    /// Lazy scan over the hunt's records in file order.
    ///
    /// The iterator yields records oldest-first; a trailing block shorter
    /// than the record width is treated as end-of-data, not an error.
    pub fn scan(&self, hunt: &str) -> Result<ScanIter, HuntError> {
        let path = self.record_file(hunt);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HuntError::HuntNotFound(hunt.to_string())
            } else {
                HuntError::Io(e)
            }
        })?;
        Ok(ScanIter {
            reader: BufReader::new(file),
        })
    }

    /// Linear lookup by id; short-circuits on the first match.
    pub fn lookup(&self, hunt: &str, id: u32) -> Result<Treasure, HuntError> {
        for record in self.scan(hunt)? {
            let record = record?;
            if record.id == id {
                return Ok(record);
            }
        }
        Err(HuntError::RecordNotFound {
            hunt: hunt.to_string(),
            id,
        })
    }

    /// Remove one record by compaction.
    ///
    /// Survivors are renumbered 1..N-1 in scan order into a temporary file
    /// which atomically replaces the original. The delete commits only at
    /// the final rename; any earlier failure leaves the original file
    /// untouched and discards the temporary.
    pub fn delete(&self, hunt: &str, id: u32) -> Result<(), HuntError> {
        if !self.hunt_exists(hunt) {
            return Err(HuntError::HuntNotFound(hunt.to_string()));
        }
        let tmp_path = self.hunt_dir(hunt).join(TMP_FILE);

        let found = match self.write_compacted(hunt, id, &tmp_path) {
            Ok(found) => found,
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(e);
            }
        };
        if !found {
            std::fs::remove_file(&tmp_path)?;
            return Err(HuntError::RecordNotFound {
                hunt: hunt.to_string(),
                id,
            });
        }

        let path = self.record_file(hunt);
        std::fs::remove_file(&path)?;
        std::fs::rename(&tmp_path, &path)?;

        oplog::append_entry(
            &self.base,
            hunt,
            &format!("Removed treasure {id} from hunt {hunt}"),
        )?;
        tracing::debug!(hunt, id, "compacted record file");
        Ok(())
    }

    fn write_compacted(&self, hunt: &str, id: u32, tmp_path: &Path) -> Result<bool, HuntError> {
        let mut out = BufWriter::new(File::create(tmp_path)?);
        let mut found = false;
        let mut next_id = 1u32;
        for record in self.scan(hunt)? {
            let record = record?;
            if record.id == id {
                found = true;
                continue;
            }
            out.write_all(&record.with_id(next_id).encode())?;
            next_id += 1;
        }
        out.flush()?;
        Ok(found)
    }

    /// Remove a hunt and everything it owns: record file, operation log,
    /// published log pointer and the directory itself. Foreign files left in
    /// the directory make the final removal fail with the underlying error.
    pub fn remove_hunt(&self, hunt: &str) -> Result<(), HuntError> {
        let dir = self.hunt_dir(hunt);
        if !dir.is_dir() {
            return Err(HuntError::HuntNotFound(hunt.to_string()));
        }
        for owned in [TREASURE_FILE, oplog::LOG_FILE] {
            match std::fs::remove_file(dir.join(owned)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        oplog::remove_link(&self.base, hunt)?;
        std::fs::remove_dir(&dir)?;
        tracing::info!(hunt, "removed hunt");
        Ok(())
    }
}

pub struct ScanIter {
    reader: BufReader<File>,
}

impl Iterator for ScanIter {
    type Item = Result<Treasure, HuntError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = [0u8; RECORD_WIDTH];
        match self.reader.read_exact(&mut block) {
            Ok(()) => Some(Treasure::decode(&block)),
            // Anything shorter than a full block is end-of-data.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}
