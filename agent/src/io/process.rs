//! Child process execution with a timeout and bounded output capture.

use std::io::{self, ErrorKind, Read, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes discarded beyond the output limit, stdout and stderr combined.
    pub truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Last few hundred bytes of stderr, for error messages.
    pub fn stderr_tail(&self) -> String {
        const TAIL: usize = 400;
        let text = String::from_utf8_lossy(&self.stderr);
        let trimmed = text.trim();
        let start = trimmed.len().saturating_sub(TAIL);
        let start = (start..trimmed.len())
            .find(|idx| trimmed.is_char_boundary(*idx))
            .unwrap_or(trimmed.len());
        trimmed[start..].to_string()
    }
}

/// Spawn `cmd`, feed `stdin`, and wait at most `timeout` for it to exit.
///
/// Stdin is written and stdout/stderr are drained on background threads, so
/// neither a large input nor a chatty child can hold up the timeout; at most
/// `output_limit_bytes` of each output stream are kept. A child that outlives
/// the timeout is killed and reported with `timed_out`.
#[instrument(
    skip_all,
    fields(timeout_secs = timeout.as_secs(), output_limit_bytes = output_limit_bytes)
)]
pub fn run_command_with_timeout(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        kill_and_reap(&mut child);
        bail!("stdout and stderr were not piped");
    };
    let stdout_handle = thread::spawn(move || read_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || read_limited(stderr, output_limit_bytes));

    let stdin_handle = match (stdin, child.stdin.take()) {
        (Some(input), Some(child_stdin)) => {
            let input = input.to_vec();
            Some(thread::spawn(move || write_stdin(child_stdin, &input)))
        }
        (Some(_), None) => {
            kill_and_reap(&mut child);
            bail!("stdin was not piped");
        }
        (None, _) => None,
    };

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            timed_out = true;
            child.kill().context("kill command")?;
            child.wait().context("wait command after kill")?
        }
        Err(err) => {
            kill_and_reap(&mut child);
            return Err(err).context("wait for command");
        }
    };

    if let Some(handle) = stdin_handle {
        handle
            .join()
            .map_err(|_| anyhow!("stdin writer thread panicked"))?
            .context("write stdin")?;
    }
    let (stdout, stdout_truncated) = join_reader(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_reader(stderr_handle).context("join stderr")?;
    let truncated = stdout_truncated + stderr_truncated;
    if truncated > 0 {
        warn!(truncated, "command output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        truncated,
        timed_out,
    })
}

/// Write all of `input`, then close the pipe.
///
/// The child may exit, or be killed, without reading everything.
fn write_stdin(mut child_stdin: ChildStdin, input: &[u8]) -> io::Result<()> {
    match child_stdin.write_all(input) {
        Err(err) if err.kind() == ErrorKind::BrokenPipe => {
            debug!("child closed stdin early");
            Ok(())
        }
        result => result,
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!(error = %err, "kill child");
    }
    if let Err(err) = child.wait() {
        debug!(error = %err, "reap child");
    }
}

fn join_reader(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader thread panicked"))?
}

fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(buf.len()));
        buf.extend_from_slice(&chunk[..keep]);
        truncated += n - keep;
    }

    Ok((buf, truncated))
}
