//! Derived metrics over result records.
//!
//! Pure functions, deterministic and side-effect-free. Every division guards
//! its denominator: a zero or missing denominator yields [`Metric::Undefined`]
//! rather than a panic or an infinity. Derived values are never persisted;
//! they are recomputed on every report run and formatted only at the
//! presentation boundary.

use crate::schema::ResultRecord;

/// A computed ratio/rate value. `Undefined` is a first-class renderable
/// outcome ("N/A"), not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Undefined,
}

impl Metric {
    /// Guarded division. A zero or non-finite denominator is undefined.
    pub fn ratio(numerator: f64, denominator: f64) -> Metric {
        if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
            Metric::Undefined
        } else {
            Metric::Value(numerator / denominator)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined => None,
        }
    }

    /// Fixed-precision rendering with an optional suffix (`"x"` for ratios).
    /// Undefined renders as `N/A`.
    pub fn format(&self, precision: usize, suffix: &str) -> String {
        match self {
            Metric::Value(v) => format!("{v:.precision$}{suffix}"),
            Metric::Undefined => "N/A".to_string(),
        }
    }
}

/// Elapsed-time ratio of comparison over baseline (e.g. threads over tasks).
pub fn allocation_ratio(baseline: &ResultRecord, comparison: &ResultRecord) -> Metric {
    Metric::ratio(comparison.elapsed_ms, baseline.elapsed_ms)
}

/// Time per allocation in microseconds, over `total_ops` allocations.
pub fn per_unit_allocation_micros(record: &ResultRecord, total_ops: u64) -> Metric {
    Metric::ratio(record.elapsed_ms * 1000.0, total_ops as f64)
}

/// Time per context switch in microseconds, over `total_switches` switches.
pub fn per_switch_micros(record: &ResultRecord, total_switches: u64) -> Metric {
    Metric::ratio(record.elapsed_ms * 1000.0, total_switches as f64)
}

/// Memory cost per allocated unit, in bytes. Integer division truncating
/// toward zero, matching the raw cache values; negative deltas pass through
/// unclamped. `None` when memory data is absent or the count is zero.
pub fn memory_per_unit(record: &ResultRecord) -> Option<i64> {
    let memory = record.memory_usage.as_ref()?;
    if record.count == 0 {
        return None;
    }
    Some(memory.used_bytes / record.count as i64)
}

/// Cold-start to cache-warmed improvement ratio, computed from the first and
/// last repeats' creation rates: `(1/first_rate) / (1/last_rate)`. Undefined
/// with fewer than two repeats.
pub fn cache_warming_improvement(record: &ResultRecord) -> Metric {
    if record.repeated_runs.len() < 2 {
        return Metric::Undefined;
    }
    let first = &record.repeated_runs[0];
    let last = record.repeated_runs.last().unwrap_or(first);

    let first_per_alloc = Metric::ratio(1.0, first.creation_rate_per_sec);
    let last_per_alloc = Metric::ratio(1.0, last.creation_rate_per_sec);
    match (first_per_alloc, last_per_alloc) {
        (Metric::Value(first_us), Metric::Value(last_us)) => Metric::ratio(first_us, last_us),
        _ => Metric::Undefined,
    }
}

/// Theoretical maximum throughput in units per second, assuming one
/// primitive per unit of work.
pub fn max_throughput(record: &ResultRecord, total_units: u64) -> Metric {
    match Metric::ratio(total_units as f64, record.elapsed_ms) {
        Metric::Value(per_ms) => Metric::Value(per_ms * 1000.0),
        Metric::Undefined => Metric::Undefined,
    }
}
