//! External process execution.
//!
//! The inspection tool is driven entirely through sub-commands, some of which
//! dump very large documents. Stdout either goes straight to a file (no pipe
//! involved) or is captured; stderr is always piped and drained on its own
//! thread while the child runs, so a full pipe buffer can never block the
//! child. Both streams are complete before the exit status is inspected.

use anyhow::{anyhow, bail, Context, Result};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

/// Where a child's standard output should go.
pub enum OutputTo<'a> {
    /// Redirect stdout to a fresh file, bypassing pipe buffering. Used for
    /// graph dumps and per-summary JSON, which can be arbitrarily large.
    File(&'a Path),
    /// Capture stdout in memory.
    Capture,
}

/// Streams collected from a finished invocation. Empty streams are `None`.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Capability interface over process execution, so extraction pipelines can
/// run against a scripted double in tests.
pub trait ToolRunner {
    /// Run `program` with `args`, sending stdout to `output`. A non-zero
    /// exit status is an error carrying the captured stderr.
    fn run(&self, program: &str, args: &[String], output: OutputTo<'_>) -> Result<RunOutput>;
}

/// Real runner backed by `std::process::Command`, resolving `program` via
/// `PATH`.
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, program: &str, args: &[String], output: OutputTo<'_>) -> Result<RunOutput> {
        let mut command = Command::new(program);
        command.args(args);
        command.stdin(Stdio::null());
        command.stderr(Stdio::piped());

        let capture_stdout = match output {
            OutputTo::File(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create {}", parent.display()))?;
                }
                // Fresh file each time; stale content from a previous
                // invocation must never leak into this one.
                let file =
                    File::create(path).with_context(|| format!("create {}", path.display()))?;
                command.stdout(Stdio::from(file));
                false
            }
            OutputTo::Capture => {
                command.stdout(Stdio::piped());
                true
            }
        };

        let mut child = command
            .spawn()
            .with_context(|| format!("spawn {program}"))?;

        let stderr_handle = child.stderr.take();
        let stderr_reader = thread::spawn(move || read_stream(stderr_handle));
        let stdout = if capture_stdout {
            read_stream(child.stdout.take())
        } else {
            None
        };

        let status = child
            .wait()
            .with_context(|| format!("wait for {program}"))?;
        let stderr = stderr_reader
            .join()
            .map_err(|_| anyhow!("stderr reader for {program} panicked"))?;

        if !status.success() {
            match &stderr {
                Some(text) => bail!(
                    "{program} exited with {}: {}",
                    exit_status_string(&status),
                    text.trim()
                ),
                None => bail!("{program} exited with {}", exit_status_string(&status)),
            }
        }

        Ok(RunOutput { stdout, stderr })
    }
}

fn read_stream<R: Read>(stream: Option<R>) -> Option<String> {
    let mut stream = stream?;
    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer).ok()?;
    if buffer.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn exit_status_string(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("code {code}"),
        None => "termination by signal".to_string(),
    }
}
