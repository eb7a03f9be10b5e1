//! Isolated probe execution.
//!
//! One probe run is one container invocation: the workspace holding the probe
//! scripts is mounted read-only, the runtime version tag selects the image,
//! and the argument vector is passed through verbatim and positionally.
//! Structured results come back on stdout; stderr is inherited so probe
//! diagnostics reach the operator but are never parsed.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{HarnessError, Result};
use crate::schema::Fingerprint;

/// Runs one probe per call, blocking until the container exits. No retries
/// and no timeout: a probe that hangs, hangs the harness, so probes must
/// self-terminate.
#[derive(Clone, Debug)]
pub struct Executor {
    engine: String,
    interpreter: String,
    workspace: PathBuf,
}

impl Executor {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            engine: "docker".to_string(),
            interpreter: "ruby".to_string(),
            workspace: workspace.into(),
        }
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// The full argv for one probe invocation, engine binary first.
    pub fn command_line(&self, fp: &Fingerprint, probe: &str) -> Vec<String> {
        let mut argv = vec![
            self.engine.clone(),
            "run".to_string(),
            "--rm".to_string(),
            "-v".to_string(),
            format!("{}:/workspace:ro", self.workspace.display()),
            fp.version.clone(),
            self.interpreter.clone(),
            format!("/workspace/{probe}"),
        ];
        argv.extend(fp.arguments.iter().cloned());
        argv
    }

    /// Execute the probe for `fp` and return its raw stdout bytes.
    ///
    /// Non-zero exit maps to [`HarnessError::Execution`] carrying the exact
    /// version/mode/argument context of the failed invocation.
    pub fn execute(&self, fp: &Fingerprint, probe: &str) -> Result<Vec<u8>> {
        let argv = self.command_line(fp, probe);
        info!(
            version = %fp.version,
            mode = %fp.mode,
            args = ?fp.arguments,
            "running benchmark probe"
        );

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| HarnessError::Spawn {
                command: argv.join(" "),
                source,
            })?;

        if !output.status.success() {
            return Err(HarnessError::Execution {
                version: fp.version.clone(),
                mode: fp.mode,
                args: fp.arguments.clone(),
                status: output.status.code(),
            });
        }

        Ok(output.stdout)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}
