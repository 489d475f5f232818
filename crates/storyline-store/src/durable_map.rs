//! Log-backed ordered map.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use storyline_core::error::DomainError;
use storyline_core::store::OrderedStore;
use tracing::{debug, info, instrument, warn};

use crate::config::{HEADER_LEN, StoreConfig};
use crate::error::StoreError;
use crate::record::{self, Decoded, Record};

/// A persistent map from string keys to bytes, iterated in key order.
///
/// Every mutation is appended to the log and synced before the in-memory
/// index changes, so a failed write is never visible to readers.
#[derive(Debug)]
pub struct DurableMap {
    path: PathBuf,
    config: StoreConfig,
    file: File,
    /// Length of the log up to the last committed record.
    committed_len: u64,
    entries: BTreeMap<String, Vec<u8>>,
    /// Records in the log that no longer describe a live entry.
    stale_records: u64,
}

impl DurableMap {
    /// Opens the log at `path`, creating it when absent, and replays it.
    ///
    /// A record cut short at the end of the log (a crash during append) is
    /// discarded and truncated away, as is a header cut short before any
    /// record was written.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConfigMismatch` if the log was created with other
    /// constants, `StoreError::Corrupt` if damaged data is followed by more
    /// records, and `StoreError::Io` on filesystem failures.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let header = config.encode_header();
        if bytes.len() < HEADER_LEN && header.starts_with(&bytes) {
            if bytes.is_empty() {
                info!("created new store log");
            } else {
                warn!(
                    header_bytes = bytes.len(),
                    "rewriting header left incomplete by an earlier run"
                );
            }
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&header)?;
            file.sync_all()?;
            return Ok(Self {
                path,
                config,
                file,
                committed_len: HEADER_LEN as u64,
                entries: BTreeMap::new(),
                stale_records: 0,
            });
        }

        config.verify_header(&bytes)?;
        let (entries, stale_records, valid_len) = replay(&bytes, &config)?;

        if valid_len < bytes.len() {
            warn!(
                discarded_bytes = bytes.len() - valid_len,
                "truncating torn record at end of log"
            );
            file.set_len(valid_len as u64)?;
            file.sync_all()?;
        }
        file.seek(SeekFrom::Start(valid_len as u64))?;

        info!(entries = entries.len(), stale_records, "opened store log");
        Ok(Self {
            path,
            config,
            file,
            committed_len: valid_len as u64,
            entries,
            stale_records,
        })
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// Returns `KeyTooLarge`, `ValueTooLarge` or `CapacityExceeded` when a
    /// bound is violated and `Io` when the log write fails. The map is
    /// unchanged in every error case.
    pub fn insert(&mut self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_key(key)?;
        if value.len() > self.config.max_value_size as usize {
            return Err(StoreError::ValueTooLarge {
                len: value.len(),
                max: self.config.max_value_size,
            });
        }
        if !self.entries.contains_key(key) && self.entries.len() as u64 >= self.config.max_entries
        {
            return Err(StoreError::CapacityExceeded {
                max: self.config.max_entries,
            });
        }

        self.append(&Record::Put { key, value })?;
        let previous = self.entries.insert(key.to_owned(), value.to_vec());
        if previous.is_some() {
            self.stale_records += 1;
        }
        debug!(key, value_len = value.len(), "inserted entry");
        Ok(previous)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key`, returning the value it held. Removing an absent key
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the log write fails; the entry is then kept.
    pub fn delete(&mut self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if !self.entries.contains_key(key) {
            return Ok(None);
        }

        self.append(&Record::Delete { key })?;
        // The put record and this delete record are both dead weight now.
        self.stale_records += 2;
        debug!(key, "deleted entry");
        Ok(self.entries.remove(key))
    }

    /// Returns every value in key order.
    pub fn values(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.values().map(Vec::as_slice)
    }

    /// Returns every key in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns how many log records no longer describe a live entry.
    #[must_use]
    pub fn stale_records(&self) -> u64 {
        self.stale_records
    }

    /// Returns the configuration the log was opened with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Rewrites the log so that it holds one record per live entry.
    ///
    /// The compacted log is written beside the current one, synced, and
    /// renamed over it, so a crash at any point leaves one complete log.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the replacement log cannot be written or renamed. The
    /// current log stays in use in that case and the partial replacement is
    /// removed. A failure to sync the directory after the rename is also
    /// `Io`; the compacted log is already in use by then.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn compact(&mut self) -> Result<(), StoreError> {
        let tmp_path = self.compaction_path();
        let written = self.write_compacted(&tmp_path).and_then(|written| {
            fs::rename(&tmp_path, &self.path)?;
            Ok(written)
        });
        let (tmp, len) = match written {
            Ok(written) => written,
            Err(err) => {
                match fs::remove_file(&tmp_path) {
                    Err(remove_err) if remove_err.kind() != ErrorKind::NotFound => {
                        warn!(error = %remove_err, "failed to remove partial compacted log");
                    }
                    _ => {}
                }
                return Err(err);
            }
        };

        // The open handle follows the file through the rename and is left
        // positioned at the end of the compacted log. Adopt it before syncing
        // the directory so later appends never reach the replaced file.
        info!(
            entries = self.entries.len(),
            reclaimed_records = self.stale_records,
            "compacted store log"
        );
        self.file = tmp;
        self.committed_len = len;
        self.stale_records = 0;
        sync_parent_dir(&self.path)
    }

    /// Writes one put record per live entry to `tmp_path` and syncs it.
    fn write_compacted(&self, tmp_path: &Path) -> Result<(File, u64), StoreError> {
        let mut tmp = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(tmp_path)?;
        tmp.write_all(&self.config.encode_header())?;
        let mut len = HEADER_LEN as u64;
        for (key, value) in &self.entries {
            let bytes = Record::Put { key, value }.encode();
            tmp.write_all(&bytes)?;
            len += bytes.len() as u64;
        }
        tmp.sync_all()?;
        Ok((tmp, len))
    }

    fn check_key(&self, key: &str) -> Result<(), StoreError> {
        if key.len() > self.config.max_key_size as usize {
            return Err(StoreError::KeyTooLarge {
                len: key.len(),
                max: self.config.max_key_size,
            });
        }
        Ok(())
    }

    fn compaction_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".compact");
        self.path.with_file_name(name)
    }

    /// Appends one record and syncs it. On failure the log is cut back to
    /// the last committed record.
    fn append(&mut self, record: &Record<'_>) -> Result<(), StoreError> {
        let bytes = record.encode();
        let written = self
            .file
            .write_all(&bytes)
            .and_then(|()| self.file.sync_data());

        if let Err(err) = written {
            let rolled_back = self
                .file
                .set_len(self.committed_len)
                .and_then(|()| self.file.seek(SeekFrom::Start(self.committed_len)));
            if let Err(rollback_err) = rolled_back {
                warn!(
                    key = record.key(),
                    error = %rollback_err,
                    "failed to cut log back after write error"
                );
            }
            return Err(err.into());
        }

        self.committed_len += bytes.len() as u64;
        Ok(())
    }
}

/// Makes a rename within the directory holding `path` durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened for syncing here; the rename is left to the OS.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

type Replayed = (BTreeMap<String, Vec<u8>>, u64, usize);

/// Applies every record after the header. Returns the entries, the stale
/// record count, and the length of the log up to its last valid record.
fn replay(bytes: &[u8], config: &StoreConfig) -> Result<Replayed, StoreError> {
    let mut entries = BTreeMap::new();
    let mut stale_records = 0u64;
    let mut offset = HEADER_LEN;

    while offset < bytes.len() {
        match record::decode(&bytes[offset..], config) {
            Decoded::Record(Record::Put { key, value }, len) => {
                if entries.insert(key.to_owned(), value.to_vec()).is_some() {
                    stale_records += 1;
                }
                offset += len;
            }
            Decoded::Record(Record::Delete { key }, len) => {
                if entries.remove(key).is_some() {
                    stale_records += 1;
                }
                stale_records += 1;
                offset += len;
            }
            Decoded::Incomplete => break,
            Decoded::ChecksumMismatch { len } if offset + len == bytes.len() => break,
            Decoded::ChecksumMismatch { .. } => {
                return Err(StoreError::Corrupt {
                    offset: offset as u64,
                    reason: "checksum mismatch".to_owned(),
                });
            }
            Decoded::Malformed(reason) => {
                return Err(StoreError::Corrupt {
                    offset: offset as u64,
                    reason,
                });
            }
        }
    }

    Ok((entries, stale_records, offset))
}

impl OrderedStore for DurableMap {
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(DurableMap::insert(self, key, value)?)
    }

    fn get(&self, key: &str) -> Option<Vec<u8>> {
        DurableMap::get(self, key).map(<[u8]>::to_vec)
    }

    fn contains(&self, key: &str) -> bool {
        DurableMap::contains(self, key)
    }

    fn delete(&mut self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        Ok(DurableMap::delete(self, key)?)
    }

    fn values(&self) -> Vec<Vec<u8>> {
        DurableMap::values(self).map(<[u8]>::to_vec).collect()
    }
}
