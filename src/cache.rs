//! Content-addressed on-disk result cache.
//!
//! One YAML file per fingerprint at a deterministic path. A hit is loaded
//! and normalized; a miss invokes the producer (the probe executor), persists
//! its raw stdout, then loads it through the same normalization path.
//!
//! Normalization does two things:
//! - when the record carries repeated runs, the last (cache-warmed) run's
//!   scalar fields are merged onto the top level, keeping the sequence;
//! - records missing harness metadata get stamped with timestamp, version,
//!   mode and arguments, and the entry is rewritten in place. Already-stamped
//!   entries are never rewritten, so re-reads leave the file byte-identical.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::{HarnessError, Result};
use crate::schema::{Fingerprint, ResultRecord};

pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache slot for a fingerprint. Injective over version, mode and the
    /// ordered argument vector.
    pub fn path(&self, fp: &Fingerprint) -> PathBuf {
        self.root.join(format!("{}.yaml", fp.file_stem()))
    }

    /// Return the normalized record for `fp`, producing and persisting it
    /// first when absent (or when `force` is set).
    ///
    /// The producer's output is written only on success; a failed producer
    /// leaves no file behind. An unparseable existing entry is an error, not
    /// a miss.
    pub fn get_or_run<F>(&self, fp: &Fingerprint, producer: F, force: bool) -> Result<ResultRecord>
    where
        F: FnOnce(&Fingerprint) -> Result<Vec<u8>>,
    {
        let path = self.path(fp);

        if force || !path.exists() {
            fs::create_dir_all(&self.root).map_err(|source| HarnessError::CacheIo {
                path: self.root.clone(),
                source,
            })?;

            let raw = producer(fp)?;
            fs::write(&path, &raw).map_err(|source| HarnessError::CacheIo {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), "saved benchmark result");
        } else {
            debug!(
                version = %fp.version,
                mode = %fp.mode,
                args = ?fp.arguments,
                "using cached result"
            );
        }

        self.load(fp, &path)
    }

    fn load(&self, fp: &Fingerprint, path: &Path) -> Result<ResultRecord> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::CacheIo {
            path: path.to_path_buf(),
            source,
        })?;

        let mut record: ResultRecord =
            serde_yaml::from_str(&text).map_err(|source| HarnessError::CorruptCache {
                path: path.to_path_buf(),
                source,
            })?;

        merge_last_repeat(&mut record);

        if !record.has_metadata() {
            record.timestamp = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
            record.runtime_version = Some(fp.version.clone());
            record.mode = Some(fp.mode);
            record.arguments = Some(fp.arguments.clone());

            // Upgrade the entry in place without changing its path.
            let stamped =
                serde_yaml::to_string(&record).map_err(|source| HarnessError::CorruptCache {
                    path: path.to_path_buf(),
                    source,
                })?;
            fs::write(path, stamped).map_err(|source| HarnessError::CacheIo {
                path: path.to_path_buf(),
                source,
            })?;
        }

        Ok(record)
    }
}

/// Merge the last repeated run's scalar measurement fields onto the top
/// level, keeping the repeat sequence intact. The last repeat is the
/// cache-warmed outcome and is what the summary tables report.
pub fn merge_last_repeat(record: &mut ResultRecord) {
    if let Some(last) = record.repeated_runs.last().cloned() {
        record.count = last.count;
        record.switches_per_unit = last.switches_per_unit;
        record.total_switches = last.total_switches;
        record.elapsed_ms = last.elapsed_ms;
        record.creation_rate_per_sec = last.creation_rate_per_sec;
        record.switch_rate_per_sec = last.switch_rate_per_sec;
    }
}
