//! Subprocess runner on top of `tokio::process`
//!
//! stdout and stderr are drained concurrently into one buffer while the child
//! runs, so a chatty process never blocks on a full pipe.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const READ_CHUNK: usize = 8 * 1024;

/// Process runner backed by tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessPort for TokioProcessRunner {
    async fn run_cancellable(
        &self,
        program: &Path,
        args: &[OsString],
        cancel: &CancellationToken,
    ) -> DomainResult<ProcessResult> {
        debug!(program = %program.display(), args = ?args, "Spawning process");
        let started = Instant::now();

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::SpawnFailed {
                program: program.to_path_buf(),
                message: e.to_string(),
            })?;

        let buffer = Mutex::new(Vec::new());

        let outcome = tokio::select! {
            status = collect(&mut child, &buffer) => Some(status),
            _ = cancel.cancelled() => None,
        };

        let status = match outcome {
            Some(status) => status.map_err(|e| DomainError::ProcessIo {
                program: program.to_path_buf(),
                message: e.to_string(),
            })?,
            None => {
                if let Err(e) = child.kill().await {
                    warn!(program = %program.display(), error = %e, "Failed to kill cancelled process");
                }
                debug!(program = %program.display(), "Process cancelled");
                return Err(DomainError::Cancelled);
            }
        };

        let bytes = buffer.into_inner().unwrap_or_else(PoisonError::into_inner);
        let exit_code = status.code().unwrap_or(-1);
        debug!(
            program = %program.display(),
            exit_code,
            output_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Process finished"
        );

        Ok(ProcessResult {
            exit_code,
            output: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Drain both pipes into `buffer`, then wait for the exit status
async fn collect(child: &mut Child, buffer: &Mutex<Vec<u8>>) -> io::Result<ExitStatus> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out, err) = tokio::join!(drain(stdout, buffer), drain(stderr, buffer));
    out?;
    err?;

    child.wait().await
}

async fn drain<R>(reader: Option<R>, buffer: &Mutex<Vec<u8>>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(());
    };

    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(&chunk[..read]);
    }
}
