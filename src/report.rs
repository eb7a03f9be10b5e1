//! Comparison table rendering.
//!
//! A fixed sequence of five tables across an ordered version list, one row
//! per version (one sub-row per mode where needed). Columns are
//! pipe-delimited, left-justified and statically sized; widths are not
//! content-adaptive so report diffs stay stable across runs. Reports are
//! all-or-nothing: any lookup failure aborts the whole render.

use crate::cache::CacheStore;
use crate::error::Result;
use crate::executor::Executor;
use crate::metrics::{self, Metric};
use crate::schema::{Fingerprint, ResultRecord};
use crate::{Mode, ModeTable};

// Standard argument sets. Allocation-heavy: many units, few switches.
// Switch-heavy: few workers, many switches each.
const ALLOC_COUNT: u64 = 10_000;
const ALLOC_SWITCHES: u64 = 2;
const SWITCH_WORKERS: u64 = 2;
const SWITCH_COUNT: u64 = 10_000;
const WARMING_REPEATS: u64 = 10;
const THROUGHPUT_UNITS: u64 = 1_000;
const THROUGHPUT_SWITCHES: u64 = 100;

fn alloc_args() -> Vec<String> {
    vec![ALLOC_COUNT.to_string(), ALLOC_SWITCHES.to_string()]
}

fn switch_args() -> Vec<String> {
    vec![SWITCH_WORKERS.to_string(), SWITCH_COUNT.to_string()]
}

fn warming_args() -> Vec<String> {
    vec![
        ALLOC_COUNT.to_string(),
        ALLOC_SWITCHES.to_string(),
        WARMING_REPEATS.to_string(),
    ]
}

fn throughput_args() -> Vec<String> {
    vec![
        THROUGHPUT_UNITS.to_string(),
        THROUGHPUT_SWITCHES.to_string(),
        WARMING_REPEATS.to_string(),
    ]
}

/// Group an integer with thousands separators: `1234567` → `"1,234,567"`.
/// Invoked only at render time; cache values stay raw.
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn cell(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

/// Assembles derived metrics across runtime versions into formatted
/// comparison tables, pulling records through the cache (and the executor on
/// a miss).
pub struct Reporter<'a> {
    cache: &'a CacheStore,
    executor: &'a Executor,
    modes: &'a ModeTable,
    force: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(
        cache: &'a CacheStore,
        executor: &'a Executor,
        modes: &'a ModeTable,
        force: bool,
    ) -> Self {
        Self {
            cache,
            executor,
            modes,
            force,
        }
    }

    fn record(&self, version: &str, mode: Mode, args: &[String]) -> Result<ResultRecord> {
        let fp = Fingerprint::new(version, mode, args.iter().cloned());
        let probe = &self.modes.get(mode).probe;
        self.cache
            .get_or_run(&fp, |fp| self.executor.execute(fp, probe), self.force)
    }

    /// Render all table blocks in fixed order. Errors abort the whole
    /// report; no partial table is ever produced.
    pub fn render(&self, versions: &[String]) -> Result<Vec<String>> {
        Ok(vec![
            self.performance_summary(versions)?,
            self.switching_throughput(versions)?,
            self.memory_per_unit(versions)?,
            self.cache_warming(versions)?,
            self.max_throughput(versions)?,
        ])
    }

    pub fn performance_summary(&self, versions: &[String]) -> Result<String> {
        let mut out = String::new();
        out.push_str("### Performance Summary\n\n");
        out.push_str("| Runtime Version | Task Alloc (μs) | Thread Alloc (μs) | Allocation Ratio | Task Switch (μs) | Thread Switch (μs) | Switch Ratio |\n");
        out.push_str("|-----------------|-----------------|-------------------|------------------|------------------|--------------------|--------------|\n");

        let total_switches = SWITCH_WORKERS * SWITCH_COUNT;
        for version in versions {
            let task_alloc = self.record(version, Mode::Task, &alloc_args())?;
            let thread_alloc = self.record(version, Mode::Thread, &alloc_args())?;
            let task_switch = self.record(version, Mode::Task, &switch_args())?;
            let thread_switch = self.record(version, Mode::Thread, &switch_args())?;

            let allocation_ratio = metrics::allocation_ratio(&task_alloc, &thread_alloc);
            let switch_ratio = metrics::allocation_ratio(&task_switch, &thread_switch);

            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                cell(version, 15),
                cell(
                    &metrics::per_unit_allocation_micros(&task_alloc, ALLOC_COUNT).format(3, ""),
                    15
                ),
                cell(
                    &metrics::per_unit_allocation_micros(&thread_alloc, ALLOC_COUNT).format(3, ""),
                    17
                ),
                cell(&allocation_ratio.format(1, "x"), 16),
                cell(
                    &metrics::per_switch_micros(&task_switch, total_switches).format(3, ""),
                    16
                ),
                cell(
                    &metrics::per_switch_micros(&thread_switch, total_switches).format(3, ""),
                    18
                ),
                cell(&switch_ratio.format(1, "x"), 12),
            ));
        }

        out.push_str(&format!(
            "\n*Allocation times are per individual task/thread ({} total allocations)*\n",
            group_thousands(ALLOC_COUNT as i64)
        ));
        out.push_str(&format!(
            "*Context switch times are per individual switch ({} workers × {} switches = {} total)*\n",
            SWITCH_WORKERS,
            group_thousands(SWITCH_COUNT as i64),
            group_thousands(total_switches as i64)
        ));
        Ok(out)
    }

    pub fn switching_throughput(&self, versions: &[String]) -> Result<String> {
        let mut out = String::new();
        out.push_str("### Context Switching Performance\n\n");
        out.push_str(
            "| Runtime Version | Task Switches/sec | Thread Switches/sec | Performance Ratio |\n",
        );
        out.push_str(
            "|-----------------|-------------------|---------------------|-------------------|\n",
        );

        for version in versions {
            let task = self.record(version, Mode::Task, &switch_args())?;
            let thread = self.record(version, Mode::Thread, &switch_args())?;
            let ratio = metrics::allocation_ratio(&task, &thread);

            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(version, 15),
                cell(&group_thousands(task.switch_rate_per_sec as i64), 17),
                cell(&group_thousands(thread.switch_rate_per_sec as i64), 19),
                cell(&ratio.format(1, "x"), 17),
            ));
        }
        Ok(out)
    }

    pub fn memory_per_unit(&self, versions: &[String]) -> Result<String> {
        let mut out = String::new();
        out.push_str("### Memory Usage Per Unit\n\n");
        out.push_str("| Runtime Version | Count      | Task Memory (bytes) | Thread Memory (bytes) | Task Total (MB) | Thread Total (MB) |\n");
        out.push_str("|-----------------|------------|---------------------|-----------------------|-----------------|-------------------|\n");

        for version in versions {
            let task = self.record(version, Mode::Task, &alloc_args())?;
            let thread = self.record(version, Mode::Thread, &alloc_args())?;

            let per_unit = |r: &ResultRecord| {
                metrics::memory_per_unit(r)
                    .map(group_thousands)
                    .unwrap_or_else(|| "N/A".to_string())
            };
            let total_mb = |r: &ResultRecord| {
                r.memory_usage
                    .as_ref()
                    .map(|m| format!("{:.1}", m.used_bytes as f64 / 1024.0 / 1024.0))
                    .unwrap_or_else(|| "N/A".to_string())
            };

            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                cell(version, 15),
                cell(&task.count.to_string(), 10),
                cell(&per_unit(&task), 19),
                cell(&per_unit(&thread), 21),
                cell(&total_mb(&task), 15),
                cell(&total_mb(&thread), 17),
            ));
        }
        Ok(out)
    }

    pub fn cache_warming(&self, versions: &[String]) -> Result<String> {
        let mut out = String::new();
        out.push_str("### Cache Warming Performance\n\n");
        out.push_str("| Runtime Version | Mode    | First Alloc (μs) | Last Alloc (μs) | Improvement |\n");
        out.push_str("|-----------------|---------|------------------|-----------------|-------------|\n");

        for version in versions {
            for (i, mode) in [Mode::Task, Mode::Thread].into_iter().enumerate() {
                let record = self.record(version, mode, &warming_args())?;

                // Per-allocation time from the creation rate, cold vs warmed.
                let alloc_micros = |r: Option<&ResultRecord>| match r {
                    Some(r) if record.repeated_runs.len() >= 2 => {
                        Metric::ratio(1_000_000.0, r.creation_rate_per_sec)
                    }
                    _ => Metric::Undefined,
                };
                let first = alloc_micros(record.repeated_runs.first());
                let last = alloc_micros(record.repeated_runs.last());
                let improvement = metrics::cache_warming_improvement(&record);

                let version_cell = if i == 0 { version.as_str() } else { "" };
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    cell(version_cell, 15),
                    cell(self.modes.get(mode).label, 7),
                    cell(&first.format(3, ""), 16),
                    cell(&last.format(3, ""), 15),
                    cell(&improvement.format(1, "x"), 11),
                ));
            }
        }

        out.push_str(
            "\n*Shows allocation time improvement from cold start to cache-warmed state*\n",
        );
        out.push_str(&format!(
            "*Cache warming: {} tasks/threads with {} switches each, {} repeats*\n",
            group_thousands(ALLOC_COUNT as i64),
            ALLOC_SWITCHES,
            WARMING_REPEATS
        ));
        Ok(out)
    }

    pub fn max_throughput(&self, versions: &[String]) -> Result<String> {
        let mut out = String::new();
        out.push_str("### Throughput Performance\n\n");
        out.push_str(
            "| Runtime Version | Mode    | Total Time (ms) | Concurrency | Max Throughput (req/s) |\n",
        );
        out.push_str(
            "|-----------------|---------|-----------------|-------------|------------------------|\n",
        );

        for version in versions {
            for (i, mode) in [Mode::Task, Mode::Thread].into_iter().enumerate() {
                // Cache-warmed figures: normalization has already merged the
                // last repeat onto the top level.
                let record = self.record(version, mode, &throughput_args())?;
                let throughput = metrics::max_throughput(&record, THROUGHPUT_UNITS);

                let version_cell = if i == 0 { version.as_str() } else { "" };
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    cell(version_cell, 15),
                    cell(self.modes.get(mode).label, 7),
                    cell(&format!("{:.1}", record.elapsed_ms), 15),
                    cell(&group_thousands(THROUGHPUT_UNITS as i64), 11),
                    cell(&throughput.format(0, ""), 22),
                ));
            }
        }

        out.push_str("\n*Shows maximum throughput in cache-warmed state*\n");
        out.push_str(&format!(
            "*Throughput test: {} tasks/threads with {} switches, {} repeats*\n",
            group_thousands(THROUGHPUT_UNITS as i64),
            THROUGHPUT_SWITCHES,
            WARMING_REPEATS
        ));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(-5_000), "-5,000");
    }

    fn scalar_doc(elapsed_ms: f64, count: u64, switch_rate: u64) -> String {
        format!(
            "count: {count}\n\
             switches: 2\n\
             total_switches: 20000\n\
             time_ms: {elapsed_ms}\n\
             creation_rate: 100000\n\
             switch_rate: {switch_rate}\n\
             memory_usage:\n\
             \x20 memory_used_bytes: 1000000\n\
             \x20 memory_per_unit_bytes: 100\n\
             \x20 initial_memory: 0\n\
             \x20 final_memory: 1000000\n\
             \x20 gc_objects_initial: 0\n\
             \x20 gc_objects_final: 0\n"
        )
    }

    fn repeats_doc(rates: &[u64], last_time_ms: f64) -> String {
        let mut doc = String::from(
            "count: 1000\n\
             switches: 100\n\
             total_switches: 100000\n\
             time_ms: 0.0\n\
             creation_rate: 0\n\
             switch_rate: 0\n\
             benchmarks:\n",
        );
        for rate in rates {
            doc.push_str(&format!(
                "  - {{ count: 1000, switches: 100, total_switches: 100000, time_ms: {last_time_ms}, creation_rate: {rate}, switch_rate: 1000000 }}\n"
            ));
        }
        doc
    }

    fn seed(cache: &CacheStore, fp: &Fingerprint, doc: &str) {
        fs::create_dir_all(cache.path(fp).parent().unwrap()).unwrap();
        fs::write(cache.path(fp), doc).unwrap();
    }

    /// Executor that must never actually run: `false` exits non-zero, so any
    /// cache miss fails the report.
    fn cache_only_executor() -> Executor {
        Executor::new("/bench").with_engine("false")
    }

    #[test]
    fn performance_summary_reports_allocation_ratio() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let executor = cache_only_executor();
        let modes = ModeTable::default();
        let versions = vec!["X:1.0".to_string()];

        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Task, ["10000", "2"]),
            &scalar_doc(50.0, 10_000, 400_000),
        );
        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Thread, ["10000", "2"]),
            &scalar_doc(120.0, 10_000, 160_000),
        );
        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Task, ["2", "10000"]),
            &scalar_doc(40.0, 2, 500_000),
        );
        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Thread, ["2", "10000"]),
            &scalar_doc(80.0, 2, 250_000),
        );

        let reporter = Reporter::new(&cache, &executor, &modes, false);
        let table = reporter.performance_summary(&versions).unwrap();

        let row = table
            .lines()
            .find(|line| line.starts_with("| X:1.0"))
            .expect("row for version X:1.0");
        // 120 ms / 50 ms.
        assert!(row.contains("2.4x"), "row was: {row}");
        // 50 ms over 10,000 allocations.
        assert!(row.contains("5.000"), "row was: {row}");
    }

    #[test]
    fn switching_table_groups_rates() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let executor = cache_only_executor();
        let modes = ModeTable::default();
        let versions = vec!["X:1.0".to_string()];

        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Task, ["2", "10000"]),
            &scalar_doc(40.0, 2, 1_234_567),
        );
        seed(
            &cache,
            &Fingerprint::new("X:1.0", Mode::Thread, ["2", "10000"]),
            &scalar_doc(80.0, 2, 250_000),
        );

        let reporter = Reporter::new(&cache, &executor, &modes, false);
        let table = reporter.switching_throughput(&versions).unwrap();
        assert!(table.contains("1,234,567"));
        assert!(table.contains("250,000"));
    }

    #[test]
    fn cache_warming_and_throughput_use_repeats() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let executor = cache_only_executor();
        let modes = ModeTable::default();
        let versions = vec!["X:1.0".to_string()];

        for mode in [Mode::Task, Mode::Thread] {
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["10000", "2", "10"]),
                // 10k/s cold, 20k/s warmed: 100 μs down to 50 μs, 2.0x.
                &repeats_doc(&[10_000, 15_000, 20_000], 60.0),
            );
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["1000", "100", "10"]),
                // Warmed run takes 50 ms for 1,000 units: 20,000 req/s.
                &repeats_doc(&[10_000, 20_000], 50.0),
            );
        }

        let reporter = Reporter::new(&cache, &executor, &modes, false);

        let warming = reporter.cache_warming(&versions).unwrap();
        assert!(warming.contains("100.000"), "table was: {warming}");
        assert!(warming.contains("50.000"), "table was: {warming}");
        assert!(warming.contains("2.0x"), "table was: {warming}");
        assert!(warming.contains("| Tasks"));
        assert!(warming.contains("| Threads"));

        let throughput = reporter.max_throughput(&versions).unwrap();
        assert!(throughput.contains("50.0"), "table was: {throughput}");
        assert!(throughput.contains("20000"), "table was: {throughput}");
        assert!(throughput.contains("1,000"));
    }

    #[test]
    fn render_is_all_or_nothing() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let executor = cache_only_executor();
        let modes = ModeTable::default();
        let versions = vec!["X:1.0".to_string()];

        // Empty cache plus an executor that always fails: the first lookup
        // aborts the entire report.
        let reporter = Reporter::new(&cache, &executor, &modes, false);
        let err = reporter.render(&versions).unwrap_err();
        assert!(matches!(err, HarnessError::Execution { .. }));
    }

    #[test]
    fn full_render_produces_five_blocks() {
        let dir = tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let executor = cache_only_executor();
        let modes = ModeTable::default();
        let versions = vec!["X:1.0".to_string()];

        for mode in [Mode::Task, Mode::Thread] {
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["10000", "2"]),
                &scalar_doc(50.0, 10_000, 400_000),
            );
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["2", "10000"]),
                &scalar_doc(40.0, 2, 500_000),
            );
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["10000", "2", "10"]),
                &repeats_doc(&[10_000, 20_000], 60.0),
            );
            seed(
                &cache,
                &Fingerprint::new("X:1.0", mode, ["1000", "100", "10"]),
                &repeats_doc(&[10_000, 20_000], 50.0),
            );
        }

        let reporter = Reporter::new(&cache, &executor, &modes, false);
        let blocks = reporter.render(&versions).unwrap();
        assert_eq!(blocks.len(), 5);
        assert!(blocks[0].starts_with("### Performance Summary"));
        assert!(blocks[1].starts_with("### Context Switching Performance"));
        assert!(blocks[2].starts_with("### Memory Usage Per Unit"));
        assert!(blocks[3].starts_with("### Cache Warming Performance"));
        assert!(blocks[4].starts_with("### Throughput Performance"));
    }
}
