use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::foundation::error::{SlidecastError, SlidecastResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Shared cancellation flag for a run.
///
/// Clones observe the same flag. A [`child`](Self::child) token is cancelled when either it or
/// its parent is; cancelling the child leaves the parent alone. External processes started
/// through [`run_tool`] are killed once the token is cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that also observes `self`, for work that may be abandoned on its own.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::clone(&self.flag)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// `true` once this token or its parent has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.load(Ordering::SeqCst))
    }

    /// Return [`SlidecastError::Cancelled`] when cancelled.
    pub fn check(&self) -> SlidecastResult<()> {
        if self.is_cancelled() {
            return Err(SlidecastError::Cancelled);
        }
        Ok(())
    }
}

/// Captured output of a successful tool invocation.
#[derive(Debug)]
pub struct ToolOutput {
    /// Raw stdout.
    pub stdout: Vec<u8>,
    /// Raw stderr (warnings are kept for debug logging).
    pub stderr: Vec<u8>,
}

/// Run `cmd` to completion, honoring `cancel`.
///
/// stdout and stderr are drained on helper threads so a chatty tool cannot block on a full pipe.
/// A non-zero exit becomes [`SlidecastError::Encode`] with stderr verbatim.
pub fn run_tool(tool: &str, mut cmd: Command, cancel: &CancelToken) -> SlidecastResult<ToolOutput> {
    cancel.check()?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!(tool, command = ?cmd, "spawning");
    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SlidecastError::ToolMissing(tool.to_owned())
        } else {
            SlidecastError::Other(anyhow::anyhow!("failed to spawn {tool}: {e}"))
        }
    })?;

    let stdout_drain = drain(child.stdout.take());
    let stderr_drain = drain(child.stderr.take());

    let status = wait_or_kill(&mut child, cancel, tool)?;
    let stdout = join_drain(stdout_drain, tool)?;
    let stderr = join_drain(stderr_drain, tool)?;

    let Some(status) = status else {
        return Err(SlidecastError::Cancelled);
    };
    if !status.success() {
        return Err(SlidecastError::Encode {
            tool: tool.to_owned(),
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
        });
    }
    Ok(ToolOutput { stdout, stderr })
}

/// Return `true` when `tool -version` runs successfully.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn wait_or_kill(
    child: &mut Child,
    cancel: &CancelToken,
    tool: &str,
) -> SlidecastResult<Option<ExitStatus>> {
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| SlidecastError::Other(anyhow::anyhow!("failed to wait for {tool}: {e}")))?;
        if let Some(status) = polled {
            return Ok(Some(status));
        }
        if cancel.is_cancelled() {
            tracing::warn!(tool, "cancel requested, killing child process");
            // The child may exit between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

type Drain = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Drain {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut bytes = Vec::new();
            pipe.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
    })
}

fn join_drain(handle: Drain, tool: &str) -> SlidecastResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| SlidecastError::Other(anyhow::anyhow!("{tool} output drain panicked")))?
            .map_err(|e| SlidecastError::Other(anyhow::anyhow!("{tool} output read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/process.rs"]
mod tests;
