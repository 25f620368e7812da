//! External process execution with streamed output.
//!
//! Both pipes are drained by their own reader task into one bounded channel,
//! so the caller sees lines in arrival order and a chatty stderr can never
//! block a quiet stdout. Both readers are joined before the exit status is
//! read.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lines buffered between the pipe readers and the sink.
const LINE_BUFFER: usize = 256;

/// Lines kept by [`summarize_output`].
const SUMMARY_LINES: usize = 6;

/// Outcome of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunResult {
    /// True iff the process started and exited with status 0
    pub success: bool,
    /// Combined stdout and stderr, one line per output line, or the spawn error
    pub output: String,
}

/// Runs `program` in `cwd`, forwarding every output line to `on_line`.
///
/// Never fails: a spawn error becomes an unsuccessful result carrying the
/// error message. When `cancel` fires the child is killed and the result is
/// unsuccessful; callers check the token to tell cancellation apart.
pub async fn run_process<I, S, F>(
    program: &str,
    args: I,
    cwd: &Path,
    cancel: Option<&CancellationToken>,
    mut on_line: F,
) -> ProcessRunResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    F: FnMut(&str),
{
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("Running {} in {}", program, cwd.display());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::debug!("Failed to start {}: {}", program, e);
            return ProcessRunResult {
                success: false,
                output: e.to_string(),
            };
        }
    };

    let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
    let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(stderr, tx.clone()));
    }
    drop(tx);

    let mut output = String::new();
    loop {
        let next = match cancel {
            Some(token) => tokio::select! {
                line = rx.recv() => Some(line),
                _ = token.cancelled() => None,
            },
            None => Some(rx.recv().await),
        };

        match next {
            Some(Some(line)) => {
                on_line(&line);
                output.push_str(&line);
                output.push('\n');
            }
            Some(None) => break,
            None => return abort_child(child, readers, output, program).await,
        }
    }

    join_readers(readers, program).await;

    let waited = match cancel {
        Some(token) => tokio::select! {
            status = child.wait() => Some(status),
            _ = token.cancelled() => None,
        },
        None => Some(child.wait().await),
    };
    let Some(status) = waited else {
        return abort_child(child, Vec::new(), output, program).await;
    };

    match status {
        Ok(status) => {
            log::debug!("{} exited with {}", program, status);
            ProcessRunResult {
                success: status.success(),
                output,
            }
        }
        Err(e) => ProcessRunResult {
            success: false,
            output: if output.is_empty() {
                e.to_string()
            } else {
                output
            },
        },
    }
}

/// Forwards each line of `reader`, decoding invalid UTF-8 lossily.
///
/// Reads until EOF so the child never writes into a closed pipe.
fn spawn_line_reader<R>(reader: R, tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches('\n').trim_end_matches('\r');
                    if tx.send(line.to_string()).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("Stopped reading process output: {}", e);
                    break;
                }
            }
        }
    })
}

/// Waits for the pipe readers, returning how many of them failed.
async fn join_readers(readers: Vec<JoinHandle<()>>, program: &str) -> usize {
    let mut failed = 0;
    for reader in readers {
        if let Err(e) = reader.await {
            log::warn!("Output reader for {} failed: {}", program, e);
            failed += 1;
        }
    }
    failed
}

async fn abort_child(
    mut child: tokio::process::Child,
    readers: Vec<JoinHandle<()>>,
    mut output: String,
    program: &str,
) -> ProcessRunResult {
    log::info!("Cancelling {}", program);
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill {}: {}", program, e);
    }
    for reader in readers {
        reader.abort();
    }
    output.push_str("cancelled\n");
    ProcessRunResult {
        success: false,
        output,
    }
}

/// Condenses tool output for error messages.
///
/// Keeps the first six non-empty lines and counts the rest; blank output
/// becomes `<no output>`.
pub fn summarize_output(output: &str) -> String {
    let lines: Vec<&str> = output
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();

    if lines.iter().all(|line| line.trim().is_empty()) {
        return "<no output>".to_string();
    }

    let mut summary = lines
        .iter()
        .take(SUMMARY_LINES)
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if lines.len() > SUMMARY_LINES {
        summary.push_str(&format!("\n... ({} more lines)", lines.len() - SUMMARY_LINES));
    }
    summary
}
