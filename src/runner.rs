//! # Subject Execution
//!
//! Runs the program under test against a single input file and captures its
//! error stream. The exit status is logged and otherwise ignored: a compiler
//! is allowed to exit non-zero when it reports a diagnostic, and the
//! transcript is what gets judged.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::KatsError;

/// How often a deadline-bound run polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long the stderr reader gets to catch up once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(50);

/// Raw bytes the subject wrote to its error stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capture {
    pub stderr: Vec<u8>,
    /// The subject hit the configured deadline and was killed. `stderr` holds
    /// whatever it wrote before that.
    pub timed_out: bool,
}

impl Capture {
    pub fn new(stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            stderr: stderr.into(),
            timed_out: false,
        }
    }
}

/// Executes the subject for one input file.
///
/// The harness only depends on this trait, which keeps the reporter testable
/// without spawning processes.
pub trait SubjectRunner {
    /// Runs the subject on `input` and returns its error stream. Launch
    /// failures are errors; a non-zero exit is not.
    fn run(&self, input: &Path) -> Result<Capture, KatsError>;
}

impl<R: SubjectRunner + ?Sized> SubjectRunner for &R {
    fn run(&self, input: &Path) -> Result<Capture, KatsError> {
        (**self).run(input)
    }
}

/// The real subject binary, invoked as `<program> <input>`.
#[derive(Debug, Clone)]
pub struct Subject {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Subject {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kills the subject if it has not exited after `timeout`. Without one a
    /// hung subject hangs the whole run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn spawn(&self, input: &Path) -> Result<Child, KatsError> {
        Command::new(&self.program)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| KatsError::SubjectLaunch {
                subject: self.program.clone(),
                source,
            })
    }

    fn run_to_completion(&self, input: &Path) -> Result<Capture, KatsError> {
        let child = self.spawn(input)?;
        let output = child.wait_with_output().map_err(|e| wait_error(input, e))?;
        debug!(input = %input.display(), status = %output.status, "subject exited");
        Ok(Capture::new(output.stderr))
    }

    fn run_with_deadline(&self, input: &Path, limit: Duration) -> Result<Capture, KatsError> {
        let mut child = self.spawn(input)?;
        let pipe = child.stderr.take().ok_or_else(|| {
            wait_error(input, io::Error::new(io::ErrorKind::Other, "stderr was not captured"))
        })?;
        // The pipe is drained concurrently so a chatty subject cannot block on
        // a full buffer while we poll for exit. Bytes land in a shared buffer:
        // a grandchild holding the pipe open must not keep us from returning.
        let sink = Arc::new(Mutex::new(Vec::new()));
        let (done, drained) = mpsc::channel();
        let reader_sink = Arc::clone(&sink);
        thread::spawn(move || {
            let _ = done.send(drain_into(pipe, &reader_sink));
        });

        let started = Instant::now();
        let mut timed_out = loop {
            match child.try_wait().map_err(|e| wait_error(input, e))? {
                Some(status) => {
                    debug!(input = %input.display(), %status, "subject exited");
                    break false;
                }
                None if started.elapsed() >= limit => {
                    warn!(input = %input.display(), ?limit, "subject timed out, killing it");
                    kill_and_reap(&mut child, input);
                    break true;
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let budget = if timed_out {
            DRAIN_GRACE
        } else {
            limit.saturating_sub(started.elapsed()).max(DRAIN_GRACE)
        };
        match drained.recv_timeout(budget) {
            Ok(result) => result.map_err(|e| wait_error(input, e))?,
            Err(RecvTimeoutError::Timeout) => {
                if !timed_out {
                    warn!(input = %input.display(), ?limit, "subject exited but its stderr stayed open past the deadline");
                    timed_out = true;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(wait_error(
                    input,
                    io::Error::new(io::ErrorKind::Other, "stderr reader panicked"),
                ));
            }
        }

        let stderr = match sink.lock() {
            Ok(mut buf) => std::mem::take(&mut *buf),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        Ok(Capture { stderr, timed_out })
    }
}

impl SubjectRunner for Subject {
    #[tracing::instrument(skip(self), fields(subject = %self.program.display()))]
    fn run(&self, input: &Path) -> Result<Capture, KatsError> {
        match self.timeout {
            None => self.run_to_completion(input),
            Some(limit) => self.run_with_deadline(input, limit),
        }
    }
}

fn drain_into(mut pipe: ChildStderr, sink: &Mutex<Vec<u8>>) -> io::Result<()> {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(n) => match sink.lock() {
                Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                Err(poisoned) => poisoned.into_inner().extend_from_slice(&chunk[..n]),
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

fn kill_and_reap(child: &mut Child, input: &Path) {
    if let Err(e) = child.kill() {
        debug!(input = %input.display(), error = %e, "failed to kill subject");
    }
    if let Err(e) = child.wait() {
        debug!(input = %input.display(), error = %e, "failed to reap subject");
    }
}

fn wait_error(input: &Path, source: io::Error) -> KatsError {
    KatsError::SubjectWait {
        input: input.to_path_buf(),
        source,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    // `sh` takes the input path as a script, which makes any shell snippet a
    // stand-in subject without writing an executable.
    fn script(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn captures_stderr_and_ignores_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(
            &dir,
            "fails.sh",
            "echo 'on stdout'\necho 'error[E001]: type mismatch' >&2\nexit 3\n",
        );
        let capture = Subject::new("sh").run(&input).unwrap();
        assert_eq!(capture.stderr, b"error[E001]: type mismatch\n");
        assert!(!capture.timed_out);
    }

    #[test]
    fn silent_subject_yields_empty_capture() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "quiet.sh", "true\n");
        assert_eq!(Subject::new("sh").run(&input).unwrap(), Capture::default());
    }

    #[test]
    fn bytes_are_passed_through_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "raw.sh", "printf 'a\\\\nb\\377' >&2\n");
        let capture = Subject::new("sh").run(&input).unwrap();
        assert_eq!(capture.stderr, b"a\\nb\xff");
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "any.ke", "");
        let err = Subject::new(dir.path().join("no-such-kestrel"))
            .run(&input)
            .unwrap_err();
        assert!(matches!(err, KatsError::SubjectLaunch { .. }));
    }

    #[test]
    fn deadline_run_captures_like_a_plain_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "fast.sh", "echo done >&2\nexit 1\n");
        let capture = Subject::new("sh")
            .with_timeout(Duration::from_secs(30))
            .run(&input)
            .unwrap();
        assert_eq!(capture.stderr, b"done\n");
        assert!(!capture.timed_out);
    }

    #[test]
    fn hung_subject_is_killed_at_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "hang.sh", "echo started >&2\nexec sleep 30\n");
        let started = Instant::now();
        let capture = Subject::new("sh")
            .with_timeout(Duration::from_millis(200))
            .run(&input)
            .unwrap();
        assert!(capture.timed_out);
        assert_eq!(capture.stderr, b"started\n");
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn deadline_holds_when_a_grandchild_keeps_stderr_open() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "wrapper.sh", "echo started >&2\nsleep 6\necho late >&2\n");
        let started = Instant::now();
        let capture = Subject::new("sh")
            .with_timeout(Duration::from_millis(200))
            .run(&input)
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(capture.timed_out);
        assert_eq!(capture.stderr, b"started\n");
    }

    #[test]
    fn background_child_holding_stderr_counts_as_a_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let input = script(&dir, "detach.sh", "echo started >&2\nsleep 6 &\n");
        let started = Instant::now();
        let capture = Subject::new("sh")
            .with_timeout(Duration::from_millis(200))
            .run(&input)
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(capture.timed_out);
        assert_eq!(capture.stderr, b"started\n");
    }
}
