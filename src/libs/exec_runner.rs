//! Process execution.
//!
//! The one place in the crate that spawns external commands. Output is fully
//! buffered: both streams are drained on background threads while the parent
//! waits for the child, so large outputs cannot deadlock the pipe. A command
//! whose streams fail to close within the configured window after exit is
//! reported as a structured timeout, distinguishable from an ordinary
//! failure even though the rendered message keeps the same shape.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::errors::{Error, Result};
use crate::log_debug;

/// Options for a single execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Suppress echoing the child's captured output. On by default; the
    /// `gcloud` wrapper logs outcomes itself.
    pub silent: bool,
    /// Return a non-zero exit as data instead of an error. On by default so
    /// the caller above decides how to present the failure.
    pub ignore_return_code: bool,
    /// Bytes written to the child's stdin, then closed. Used to pass
    /// credential JSON without it ever appearing in a process listing.
    pub input: Option<Vec<u8>>,
    /// How long to wait for the output streams to close after the child
    /// exits before giving up on them.
    pub stream_timeout: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            silent: true,
            ignore_return_code: true,
            input: None,
            stream_timeout: Duration::from_secs(10),
        }
    }
}

/// The outcome of one execution. Produced once; never retried automatically.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs an external command, captures its streams and returns the exit code.
pub trait ExecRunner {
    fn exec(&self, command: &str, args: &[String], options: &ExecOptions) -> Result<ExecResult>;
}

/// The production runner, backed by `std::process`.
pub struct SystemRunner;

impl ExecRunner for SystemRunner {
    fn exec(&self, command: &str, args: &[String], options: &ExecOptions) -> Result<ExecResult> {
        let rendered = render_command(command, args);
        log_debug!("[Exec] Running `{rendered}`");

        let mut child = Command::new(command)
            .args(args)
            .stdin(if options.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(format!("failed to spawn `{rendered}`"), e))?;

        if let Some(input) = &options.input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(input)
                    .map_err(|e| Error::io(format!("failed to write stdin of `{rendered}`"), e))?;
                // Dropping stdin closes the pipe so the child sees EOF.
            }
        }

        let stdout_rx = drain_stream(child.stdout.take());
        let stderr_rx = drain_stream(child.stderr.take());

        let status = child
            .wait()
            .map_err(|e| Error::io(format!("failed to wait for `{rendered}`"), e))?;

        let stdout = collect_stream(&stdout_rx, options.stream_timeout, &rendered, "stdout")?;
        let stderr = collect_stream(&stderr_rx, options.stream_timeout, &rendered, "stderr")?;

        let exit_code = status.code().unwrap_or(-1);

        if !options.silent {
            if !stdout.is_empty() {
                eprint!("{stdout}");
            }
            if !stderr.is_empty() {
                eprint!("{stderr}");
            }
        }

        if !options.ignore_return_code && exit_code != 0 {
            return Err(Error::CommandFailed {
                command: rendered,
                stderr: failure_detail(exit_code, &stderr),
            });
        }

        Ok(ExecResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// Renders the full command line for error messages.
pub fn render_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

/// What goes into a failure report: the captured stderr, or a synthetic note
/// when the child produced none. The caller never sees a bare exit code.
pub fn failure_detail(exit_code: i32, stderr: &str) -> String {
    if stderr.trim().is_empty() {
        format!("exited with code {exit_code} and produced no output on stderr")
    } else {
        stderr.to_string()
    }
}

fn drain_stream<R: Read + Send + 'static>(
    stream: Option<R>,
) -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = match stream {
            Some(mut reader) => {
                let mut buffer = String::new();
                reader.read_to_string(&mut buffer).map(|_| buffer)
            }
            None => Ok(String::new()),
        };
        // A send failure means the parent gave up waiting; nothing to do.
        let _ = tx.send(result);
    });
    rx
}

fn collect_stream(
    rx: &mpsc::Receiver<std::io::Result<String>>,
    timeout: Duration,
    rendered: &str,
    stream_name: &str,
) -> Result<String> {
    match rx.recv_timeout(timeout) {
        Ok(Ok(buffer)) => Ok(buffer),
        Ok(Err(e)) => Err(Error::io(
            format!("failed to read {stream_name} of `{rendered}`"),
            e,
        )),
        Err(_) => Err(Error::CommandTimeout {
            command: rendered.to_string(),
        }),
    }
}
