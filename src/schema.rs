//! Record schema for benchmark results.
//!
//! Probes emit one YAML document per run on stdout; cache entries are that
//! document, possibly extended with harness metadata. The decoder is
//! schema-aware: wire keys map straight onto typed fields, and any fields
//! this harness does not know about (platform strings, repeat counts) ride
//! along in a flattened extras map so a metadata rewrite never loses data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Mode;

/// Identity of one benchmark configuration: which runtime image, which
/// concurrency primitive, and the exact argument vector handed to the probe.
/// Argument order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub version: String,
    pub mode: Mode,
    pub arguments: Vec<String>,
}

impl Fingerprint {
    pub fn new<I, S>(version: &str, mode: Mode, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: version.to_string(),
            mode,
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }

    /// File stem for this fingerprint's cache slot:
    /// `<mode>-<version-safe>-<args-joined>`. Path-unsafe characters in the
    /// version tag (`:`, `/`) are replaced with `-`.
    pub fn file_stem(&self) -> String {
        let safe_version = self.version.replace([':', '/'], "-");
        format!(
            "{}-{}-{}",
            self.mode.as_str(),
            safe_version,
            self.arguments.join("-")
        )
    }
}

/// Memory readings taken around the measured section.
///
/// `used_bytes` is the raw delta `final - initial` and may be negative when
/// collection frees more than the benchmark allocated between the two
/// reference points; it propagates unclamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    #[serde(rename = "memory_used_bytes")]
    pub used_bytes: i64,
    #[serde(rename = "memory_per_unit_bytes")]
    pub per_unit_bytes: i64,
    #[serde(rename = "initial_memory")]
    pub initial_bytes: i64,
    #[serde(rename = "final_memory")]
    pub final_bytes: i64,
    #[serde(rename = "gc_objects_initial")]
    pub live_objects_initial: i64,
    #[serde(rename = "gc_objects_final")]
    pub live_objects_final: i64,
}

/// One benchmark outcome.
///
/// The same shape covers both the top-level document and the entries of its
/// `benchmarks` repeat sequence (repeats carry only the scalar measurement
/// fields). After normalization the top-level scalars equal the last repeat's
/// fields and the metadata block is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,

    pub count: u64,
    #[serde(rename = "switches")]
    pub switches_per_unit: u64,
    pub total_switches: u64,
    #[serde(rename = "time_ms")]
    pub elapsed_ms: f64,
    #[serde(rename = "creation_rate")]
    pub creation_rate_per_sec: f64,
    #[serde(rename = "switch_rate")]
    pub switch_rate_per_sec: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage: Option<MemoryUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Every timed execution of the probe's internal repeat loop, in order.
    /// The final element is the cache-warmed run.
    #[serde(rename = "benchmarks", default, skip_serializing_if = "Vec::is_empty")]
    pub repeated_runs: Vec<ResultRecord>,

    /// Probe fields the harness does not interpret, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl ResultRecord {
    /// True once harness metadata has been stamped onto the record.
    pub fn has_metadata(&self) -> bool {
        self.timestamp.is_some()
    }
}
