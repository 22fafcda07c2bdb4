use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to collect command output: {0}")]
    Io(#[from] io::Error),
    #[error("command did not finish within {0:?}")]
    TimedOut(Duration),
}

pub trait RunCommand {
    async fn run<S: AsRef<OsStr>>(
        &self,
        program: &Path,
        args: &[S],
    ) -> Result<CommandOutput, RunError>;
}

/// Runs the program on the tokio runtime, optionally bounded by a timeout.
#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl RunCommand for TokioCommandRunner {
    async fn run<S: AsRef<OsStr>>(
        &self,
        program: &Path,
        args: &[S],
    ) -> Result<CommandOutput, RunError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        let mut stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("stdout was not captured"))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("stderr was not captured"))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        let collect = async {
            let (status, _, _) = tokio::try_join!(
                child.wait(),
                stdout_pipe.read_to_end(&mut stdout),
                stderr_pipe.read_to_end(&mut stderr),
            )?;
            Ok::<_, io::Error>(status)
        };

        let status = match self.timeout {
            Some(limit) => {
                let waited = tokio::time::timeout(limit, collect).await;
                match waited {
                    Ok(status) => status?,
                    Err(_) => {
                        // kill() also waits, so the child is reaped here.
                        if let Err(err) = child.kill().await {
                            log::warn!("Failed to kill timed out command: {err}");
                        }
                        return Err(RunError::TimedOut(limit));
                    }
                }
            }
            None => collect.await?,
        };

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }
}
