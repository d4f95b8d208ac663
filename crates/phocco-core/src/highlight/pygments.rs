//! Local highlighting through the `pygmentize` command.

use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{HighlightError, Highlighter};

/// Executable used when none is configured.
pub const DEFAULT_COMMAND: &str = "pygmentize";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Exit status shells use for "command not found".
const EXIT_NOT_FOUND: i32 = 127;

/// Runs a Pygments-compatible command as `<command> -l <lexer> -f html`.
#[derive(Debug, Clone)]
pub struct Pygments {
    command: String,
    timeout: Duration,
}

impl Pygments {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    fn unavailable(&self) -> HighlightError {
        HighlightError::Unavailable {
            tool: self.command.clone(),
        }
    }

    /// Wait for the child, killing it once the timeout has passed.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, HighlightError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= self.timeout {
                warn!(command = %self.command, "highlighter timed out, killing it");
                // The child may have exited between the two calls.
                let _ = child.kill();
                let _ = child.wait();
                return Err(HighlightError::Timeout {
                    tool: self.command.clone(),
                    timeout: self.timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Highlighter for Pygments {
    fn name(&self) -> &str {
        &self.command
    }

    fn highlight(&self, lexer: &str, code: &str) -> Result<String, HighlightError> {
        let spawned = Command::new(&self.command)
            .args(["-l", lexer, "-f", "html"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(self.unavailable()),
            Err(err) => return Err(err.into()),
        };
        debug!(command = %self.command, lexer, "spawned highlighter");

        // The writer closes stdin when it finishes; stdout and stderr are
        // drained on their own threads so a full pipe cannot stall either side.
        let stdin = child.stdin.take();
        let input = code.to_owned();
        let writer = thread::spawn(move || -> io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let written = join(writer)?;
        let stdout = join(stdout)??;
        let stderr = String::from_utf8_lossy(&join(stderr)??).into_owned();

        if !status.success() {
            if status.code() == Some(EXIT_NOT_FOUND) || reports_missing(&stderr) {
                return Err(self.unavailable());
            }
            return Err(HighlightError::Failed {
                tool: self.command.clone(),
                status,
                stderr: stderr.trim().to_string(),
            });
        }
        // A successful run that did not take all of its input is still a failure.
        written?;

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<T>) -> Result<T, HighlightError> {
    handle
        .join()
        .map_err(|_| io::Error::other("highlighter pipe thread panicked").into())
}

/// Whether the diagnostic stream says the tool itself is missing.
fn reports_missing(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    ["command not found", "no such file or directory", "is not recognized"]
        .iter()
        .any(|needle| stderr.contains(needle))
}
