use covadock::engine::process::{ExternalProcess, Invocation, ProcessOutput};
use std::io;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{trace, warn};

/// Runs external programs on the tokio runtime, killing any that outlive `timeout`.
///
/// Callers are synchronous pipeline code, so each run blocks on the runtime handle. This
/// is safe from rayon workers and from inside `tokio::task::block_in_place`.
#[derive(Clone)]
pub struct TimedProcess {
    handle: Handle,
    timeout: Option<Duration>,
}

impl TimedProcess {
    pub fn new(handle: Handle, timeout: Option<Duration>) -> Self {
        Self { handle, timeout }
    }
}

impl ExternalProcess for TimedProcess {
    fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        let mut command = tokio::process::Command::from(invocation.to_command());
        command.kill_on_drop(true);
        trace!(command = %invocation.display(), "Spawning external process");

        self.handle.block_on(async {
            let output = match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                    Ok(output) => output?,
                    Err(_) => {
                        warn!(
                            command = %invocation.display(),
                            seconds = limit.as_secs(),
                            "External process timed out and was killed"
                        );
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("timed out after {}s", limit.as_secs()),
                        ));
                    }
                },
                None => command.output().await?,
            };
            Ok(ProcessOutput::from(output))
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_output_of_a_finished_process() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let process = TimedProcess::new(runtime.handle().clone(), Some(Duration::from_secs(10)));
        let output = process
            .run(&Invocation::new("sh").arg("-c").arg("echo hello; echo oops >&2; exit 3"))
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
    }

    #[test]
    fn slow_process_times_out() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let process = TimedProcess::new(runtime.handle().clone(), Some(Duration::from_millis(100)));
        let err = process
            .run(&Invocation::new("sh").arg("-c").arg("sleep 5"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let process = TimedProcess::new(runtime.handle().clone(), None);
        assert!(process.run(&Invocation::new("/nonexistent/covadock-tool")).is_err());
    }
}
