//! Error taxonomy for the harness.
//!
//! Two failure classes are fatal and propagate unmodified to the report
//! driver: a probe invocation that fails, and a cache entry that cannot be
//! parsed. Neither is retried or silently discarded. Undefined metrics
//! (zero/missing denominators) are not errors; see [`crate::metrics::Metric`].

use std::path::PathBuf;

use thiserror::Error;

use crate::Mode;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// The probe exited non-zero (or its producer failed). Carries enough
    /// context to reproduce the exact invocation.
    #[error("benchmark failed for {version} {mode} {args:?} (exit status: {status:?})")]
    Execution {
        version: String,
        mode: Mode,
        args: Vec<String>,
        /// Exit code, when the process terminated normally.
        status: Option<i32>,
    },

    /// A stored cache entry could not be parsed. A partially written or
    /// hand-mangled entry surfaces here rather than being treated as a miss.
    #[error("corrupt cache entry at '{path}': {source}")]
    CorruptCache {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Cache directory or file I/O failed.
    #[error("cache I/O failed at '{path}': {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container engine binary could not be launched at all.
    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
