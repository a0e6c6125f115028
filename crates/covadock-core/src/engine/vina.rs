use super::config::DockingConfig;
use super::error::EngineError;
use super::process::{ExternalProcess, Invocation, ProcessOutput};
use super::workspace::write_atomically;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything a successful engine run leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRun {
    pub stdout: String,
    pub stderr: String,
    pub config_path: PathBuf,
    pub output_path: PathBuf,
}

impl EngineRun {
    pub fn output_text(&self) -> Result<String, EngineError> {
        Ok(std::fs::read_to_string(&self.output_path)?)
    }
}

/// Wrapper for AutoDock Vina execution.
///
/// Parameters travel through a `config.txt` in the request's working directory rather than
/// on the command line, so the exact run can be replayed from a kept workspace.
pub struct VinaRunner<'a> {
    executable: PathBuf,
    process: &'a dyn ExternalProcess,
}

impl<'a> VinaRunner<'a> {
    pub const CONFIG_FILE: &'static str = "config.txt";
    pub const OUTPUT_FILE: &'static str = "docked.pdbqt";

    pub fn new(executable: impl Into<PathBuf>, process: &'a dyn ExternalProcess) -> Self {
        Self {
            executable: executable.into(),
            process,
        }
    }

    /// Probes `vina --version` and returns the reported version line.
    pub fn check_available(&self) -> Result<String, EngineError> {
        let invocation = Invocation::new(&self.executable).arg("--version");
        let output = self
            .process
            .run(&invocation)
            .map_err(|e| self.failure(&invocation, None, None, e.to_string()))?;
        if !output.success() {
            return Err(self.failure(&invocation, None, output.status, output.stderr_excerpt(5)));
        }
        let text = if output.stdout.trim().is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Runs one docking job in `workdir`.
    ///
    /// Fails when the engine cannot start, exits non-zero, or exits cleanly without
    /// writing a non-empty output file.
    pub fn run(&self, config: &DockingConfig, workdir: &Path) -> Result<EngineRun, EngineError> {
        let config_path = workdir.join(Self::CONFIG_FILE);
        let output_path = workdir.join(Self::OUTPUT_FILE);
        write_atomically(&config_path, &config.to_engine_text())?;

        let invocation = Invocation::new(&self.executable)
            .arg("--config")
            .arg(&config_path)
            .arg("--out")
            .arg(&output_path)
            .current_dir(workdir);
        info!(ligand = %config.ligand.display(), "Running AutoDock Vina");
        debug!(command = %invocation.display(), "Engine invocation");

        let output: ProcessOutput = self
            .process
            .run(&invocation)
            .map_err(|e| self.failure(&invocation, Some(config), None, e.to_string()))?;

        if !output.success() {
            let reason = match output.stderr_excerpt(5) {
                excerpt if excerpt.is_empty() => "engine exited unsuccessfully".to_string(),
                excerpt => excerpt,
            };
            return Err(self.failure(&invocation, Some(config), output.status, reason));
        }

        let written = std::fs::metadata(&output_path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(self.failure(
                &invocation,
                Some(config),
                output.status,
                format!("no output written to {}", output_path.display()),
            ));
        }

        debug!(output = %output_path.display(), "AutoDock Vina completed");
        Ok(EngineRun {
            stdout: output.stdout,
            stderr: output.stderr,
            config_path,
            output_path,
        })
    }

    fn failure(
        &self,
        invocation: &Invocation,
        config: Option<&DockingConfig>,
        exit_code: Option<i32>,
        reason: String,
    ) -> EngineError {
        let path = |p: Option<&PathBuf>| p.map_or_else(String::new, |p| p.display().to_string());
        EngineError::DockingEngineFailure {
            command: invocation.display(),
            receptor: path(config.map(|c| &c.receptor)),
            ligand: path(config.map(|c| &c.ligand)),
            exit_code,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::DockingConfigBuilder;
    use crate::engine::process::testing::{ScriptedProcess, exit, flag_value};
    use std::fs;
    use tempfile::tempdir;

    fn config(dir: &Path) -> DockingConfig {
        DockingConfigBuilder::new()
            .receptor(dir.join("receptor.pdbqt"))
            .ligand(dir.join("ligand.pdbqt"))
            .build()
            .unwrap()
    }

    #[test]
    fn run_writes_config_and_returns_output() {
        let dir = tempdir().unwrap();
        let process = ScriptedProcess::new(|inv| {
            let config = fs::read_to_string(flag_value(inv, "--config").unwrap()).unwrap();
            assert!(config.contains("num_modes = 9"));
            fs::write(flag_value(inv, "--out").unwrap(), "MODEL 1\nENDMDL\n").unwrap();
            exit(0, "mode | affinity\n", "")
        });
        let run = VinaRunner::new("vina", &process)
            .run(&config(dir.path()), dir.path())
            .unwrap();
        assert_eq!(run.stdout, "mode | affinity\n");
        assert!(run.config_path.ends_with("config.txt"));
        assert_eq!(run.output_text().unwrap(), "MODEL 1\nENDMDL\n");
    }

    #[test]
    fn non_zero_exit_is_an_engine_failure() {
        let dir = tempdir().unwrap();
        let process = ScriptedProcess::new(|_| exit(1, "", "ERROR: could not open receptor"));
        let err = VinaRunner::new("vina", &process)
            .run(&config(dir.path()), dir.path())
            .unwrap_err();
        match err {
            EngineError::DockingEngineFailure {
                exit_code,
                reason,
                receptor,
                ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert!(reason.contains("could not open receptor"));
                assert!(receptor.ends_with("receptor.pdbqt"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn clean_exit_without_output_is_an_engine_failure() {
        let dir = tempdir().unwrap();
        let process = ScriptedProcess::new(|_| exit(0, "", ""));
        let err = VinaRunner::new("vina", &process)
            .run(&config(dir.path()), dir.path())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DockingEngineFailure { exit_code: Some(0), .. }
        ));
    }

    #[test]
    fn launch_failure_is_an_engine_failure() {
        let dir = tempdir().unwrap();
        let process = ScriptedProcess::new(|_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
        });
        let err = VinaRunner::new("/opt/vina", &process)
            .check_available()
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::DockingEngineFailure { exit_code: None, .. }
        ));
        assert!(err.to_string().contains("/opt/vina --version"));
    }
}
