use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod report;
pub mod schema;

/// Concurrency primitive under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Cooperative lightweight tasks (fibers, green threads).
    Task,
    /// OS threads.
    Thread,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Task => "task",
            Mode::Thread => "thread",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe binding for one mode: which script to run and how to label it in
/// report tables.
#[derive(Clone, Debug)]
pub struct ModeConfig {
    pub probe: String,
    pub label: &'static str,
}

/// Immutable mode configuration, fixed at start-up. Both modes are always
/// present so lookups cannot fail.
#[derive(Clone, Debug)]
pub struct ModeTable {
    pub task: ModeConfig,
    pub thread: ModeConfig,
}

impl ModeTable {
    pub fn get(&self, mode: Mode) -> &ModeConfig {
        match mode {
            Mode::Task => &self.task,
            Mode::Thread => &self.thread,
        }
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self {
            task: ModeConfig {
                probe: "tasks.rb".to_string(),
                label: "Tasks",
            },
            thread: ModeConfig {
                probe: "threads.rb".to_string(),
                label: "Threads",
            },
        }
    }
}

/// Runtime versions benchmarked when no explicit subset is given. Treated as
/// opaque container image tags; order here is report row order.
pub const DEFAULT_VERSIONS: &[&str] = &[
    "ruby:2.5",
    "ruby:2.6",
    "ruby:2.7",
    "ruby:3.0",
    "ruby:3.1",
    "ruby:3.2",
    "ruby:3.3",
    "ruby:3.4",
    "ruby:3.5-rc",
];
