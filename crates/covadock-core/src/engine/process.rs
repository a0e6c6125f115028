use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program invocation handed to an [`ExternalProcess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// The invocation as a single shell-like line, for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Builds the equivalent [`std::process::Command`].
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the process was terminated by a signal or timed out.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// The last `max_lines` non-empty stderr lines, for error messages.
    pub fn stderr_excerpt(&self, max_lines: usize) -> String {
        let lines: Vec<&str> = self.stderr.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

impl From<std::process::Output> for ProcessOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs external programs to completion.
///
/// Implementations block until the program exits. `Err` means the program could not be
/// run at all; a program that ran and failed is an `Ok` with a non-zero status.
pub trait ExternalProcess: Send + Sync {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// Runs programs directly with [`std::process::Command`], without a timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcess;

impl ExternalProcess for SystemProcess {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        invocation.to_command().output().map(ProcessOutput::from)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    type Handler = dyn Fn(&Invocation) -> io::Result<ProcessOutput> + Send + Sync;

    /// An [`ExternalProcess`] that records invocations and answers them with a closure.
    pub struct ScriptedProcess {
        handler: Box<Handler>,
        pub calls: Mutex<Vec<Invocation>>,
    }

    impl ScriptedProcess {
        pub fn new(
            handler: impl Fn(&Invocation) -> io::Result<ProcessOutput> + Send + Sync + 'static,
        ) -> Self {
            Self {
                handler: Box::new(handler),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn program_names(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|i| i.program.to_string_lossy().into_owned())
                .collect()
        }
    }

    impl ExternalProcess for ScriptedProcess {
        fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(invocation.clone());
            (self.handler)(invocation)
        }
    }

    pub fn exit(status: i32, stdout: &str, stderr: &str) -> io::Result<ProcessOutput> {
        Ok(ProcessOutput {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        })
    }

    /// The value following `flag` in the invocation's arguments.
    pub fn flag_value(invocation: &Invocation, flag: &str) -> Option<PathBuf> {
        let mut args = invocation.args.iter();
        args.find(|a| a.as_os_str() == flag)?;
        args.next().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_arguments() {
        let invocation = Invocation::new("vina")
            .args(["--config", "/tmp/w/config.txt"])
            .arg("--out")
            .arg("/tmp/w/out.pdbqt");
        assert_eq!(
            invocation.display(),
            "vina --config /tmp/w/config.txt --out /tmp/w/out.pdbqt"
        );
    }

    #[test]
    fn stderr_excerpt_keeps_the_tail() {
        let output = ProcessOutput {
            status: Some(1),
            stdout: String::new(),
            stderr: "a\n\nb\nc\nd\n".into(),
        };
        assert!(!output.success());
        assert_eq!(output.stderr_excerpt(2), "c\nd");
        assert_eq!(output.stderr_excerpt(10), "a\nb\nc\nd");
    }

    #[test]
    fn missing_program_is_an_io_error() {
        let result = SystemProcess.run(&Invocation::new("/nonexistent/covadock-test-binary"));
        assert!(result.is_err());
    }
}
