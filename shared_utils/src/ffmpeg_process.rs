//! External transcoder process execution.
//!
//! ffmpeg writes its whole log to stderr; stdout is discarded and stderr is
//! drained on a separate thread so a chatty encode can never fill the pipe
//! and stall the child.

use crate::errors::ConvertError;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, warn};

/// A running transcoder whose stderr is being collected in the background.
pub struct FfmpegProcess {
    program: String,
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    /// Spawn `cmd` with stdin/stdout detached and stderr captured.
    pub fn spawn(cmd: &mut Command) -> Result<Self, ConvertError> {
        let program = cmd.get_program().to_string_lossy().to_string();
        debug!(command = ?cmd, "Executing transcoder");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ConvertError::Launch {
            program: program.clone(),
            source,
        })?;

        let stderr_thread = child.stderr.take().map(|stderr| {
            let program = program.clone();
            thread::spawn(move || drain_stderr(&program, stderr))
        });

        Ok(Self {
            program,
            child,
            stderr_thread,
        })
    }

    /// Wait for exit and return the status together with the full stderr text.
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String), ConvertError> {
        let status = self
            .child
            .wait()
            .map_err(|source| ConvertError::Wait {
                program: self.program.clone(),
                source,
            })?;
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();
        Ok((status, stderr))
    }
}

/// Read `reader` to the end. A read error keeps whatever arrived before it
/// and is logged, since the text is then incomplete.
fn drain_stderr<R: Read>(program: &str, mut reader: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf) {
        warn!(
            program,
            bytes_read = buf.len(),
            error = %e,
            "Transcoder stderr was truncated"
        );
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Run `cmd` to completion. A zero exit is `Ok`; anything else carries the
/// exit code and the verbatim stderr.
pub fn run_to_completion(cmd: &mut Command) -> Result<(), ConvertError> {
    let started = Instant::now();
    let (status, stderr) = FfmpegProcess::spawn(cmd)?.wait_with_output()?;

    debug!(
        exit_code = status.code(),
        duration_secs = started.elapsed().as_secs_f64(),
        "Transcoder finished"
    );

    if status.success() {
        Ok(())
    } else {
        Err(ConvertError::Exit {
            code: status.code(),
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_success_exit() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo noise >&2; exit 0"]);
        assert!(run_to_completion(&mut cmd).is_ok());
    }

    #[test]
    fn test_failure_captures_stderr_verbatim() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "printf 'line one\\nline two\\n' >&2; exit 3"]);
        match run_to_completion(&mut cmd) {
            Err(ConvertError::Exit { code, stderr }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "line one\nline two\n");
            }
            other => panic!("expected exit failure, got {:?}", other),
        }
    }

    struct FailsAfter {
        data: &'static [u8],
    }

    impl Read for FailsAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "pipe broke"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_drain_stderr_keeps_text_read_before_error() {
        let text = drain_stderr("ffmpeg", FailsAfter { data: b"partial line\n" });
        assert_eq!(text, "partial line\n");
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let mut cmd = Command::new("/nonexistent/definitely-not-ffmpeg");
        match run_to_completion(&mut cmd) {
            Err(ConvertError::Launch { program, .. }) => {
                assert_eq!(program, "/nonexistent/definitely-not-ffmpeg");
            }
            other => panic!("expected launch failure, got {:?}", other),
        }
    }

    #[test]
    fn test_large_stderr_does_not_block() {
        let mut cmd = Command::new("sh");
        cmd.args([
            "-c",
            "i=0; while [ $i -lt 5000 ]; do echo 'frame= 1 fps=0.0 q=0.0 size=0kB' >&2; i=$((i+1)); done; exit 1",
        ]);
        let err = run_to_completion(&mut cmd).unwrap_err();
        assert_eq!(err.stderr().lines().count(), 5000);
    }
}
