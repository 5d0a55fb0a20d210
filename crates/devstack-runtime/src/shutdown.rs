//! Reverse-order shutdown with SIGTERM -> SIGKILL escalation.
//!
//! Two passes: signal everything first, then wait. The grace periods run
//! concurrently with each other, so total shutdown latency is bounded by
//! the single longest straggler rather than the sum of all stragglers.

use std::time::Duration;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::types::{ProcessHandle, Stage};

/// Per-process grace period between terminate and force-kill.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Terminate every still-running process in reverse start order, then
/// reap them all, force-killing anything that outlives its grace period.
///
/// Returns the stages that received a terminate signal, in signal order.
/// Once begun, this runs to completion regardless of further signals.
pub async fn shutdown_all(handles: &mut Vec<ProcessHandle>) -> Vec<Stage> {
    let mut signalled = Vec::new();

    // Pass 1: terminate, reverse start order.
    for handle in handles.iter_mut().rev() {
        if matches!(handle.child.try_wait(), Ok(Some(_))) {
            debug!(stage = %handle.stage, "Process already exited, skipping terminate");
            continue;
        }
        terminate(handle.stage, &mut handle.child);
        signalled.push(handle.stage);
    }

    // Pass 2: bounded wait, then kill.
    for handle in handles.iter_mut().rev() {
        match timeout(SHUTDOWN_GRACE, handle.child.wait()).await {
            Ok(Ok(status)) => debug!(stage = %handle.stage, %status, "Process exited"),
            Ok(Err(e)) => warn!(stage = %handle.stage, error = %e, "Failed to reap process"),
            Err(_) => {
                warn!(stage = %handle.stage, "Process ignored terminate, killing");
                if let Err(e) = handle.child.kill().await {
                    warn!(stage = %handle.stage, error = %e, "Failed to kill process");
                }
            }
        }
    }

    handles.clear();
    signalled
}

#[cfg(unix)]
fn terminate(stage: Stage, child: &mut Child) {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return; // already reaped
    };
    debug!(stage = %stage, pid, "Sending SIGTERM");
    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        // ESRCH means the process beat us to the exit.
        if e != Errno::ESRCH {
            warn!(stage = %stage, pid, error = %e, "SIGTERM failed");
        }
    }
}

#[cfg(not(unix))]
fn terminate(stage: Stage, child: &mut Child) {
    // No graceful signal on this platform; go straight to kill.
    debug!(stage = %stage, "Terminating process");
    let _ = child.start_kill();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;
    use tokio::time::sleep;

    fn spawn_sleeper(stage: Stage) -> ProcessHandle {
        let child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");
        ProcessHandle::new(stage, child)
    }

    #[tokio::test]
    async fn terminates_in_reverse_start_order() {
        let mut handles = vec![
            spawn_sleeper(Stage::Tracing),
            spawn_sleeper(Stage::Proxy),
            spawn_sleeper(Stage::McpServer),
        ];

        let order = shutdown_all(&mut handles).await;

        assert_eq!(order, vec![Stage::McpServer, Stage::Proxy, Stage::Tracing]);
        assert!(handles.is_empty());
    }

    #[tokio::test]
    async fn already_exited_processes_are_not_signalled() {
        let quick = Command::new("echo")
            .arg("done")
            .stdout(std::process::Stdio::null())
            .spawn()
            .expect("failed to spawn echo");
        let mut handles = vec![
            spawn_sleeper(Stage::Tracing),
            ProcessHandle::new(Stage::Client, quick),
        ];

        // Give the echo time to exit.
        sleep(Duration::from_millis(200)).await;

        let order = shutdown_all(&mut handles).await;
        assert_eq!(order, vec![Stage::Tracing]);
    }

    #[tokio::test]
    async fn shutdown_of_nothing_is_a_no_op() {
        let mut handles = Vec::new();
        assert!(shutdown_all(&mut handles).await.is_empty());
    }
}
