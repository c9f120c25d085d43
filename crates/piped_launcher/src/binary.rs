//! Running auxiliary binaries.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{LauncherError, LauncherResult};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Start `executable` with `args`.
pub fn run_binary<S: AsRef<str>>(executable: &str, args: &[S]) -> LauncherResult<RunningBinary> {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();

    let child = Command::new(executable)
        .args(&args)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| LauncherError::Spawn {
            program: executable.to_string(),
            source,
        })?;

    let pid = child.id();
    info!("Started {} (pid {})", executable, pid);

    Ok(RunningBinary {
        program: executable.to_string(),
        args,
        pid,
        child: Mutex::new(child),
    })
}

/// Handle to a started binary.
pub struct RunningBinary {
    program: String,
    args: Vec<String>,
    pid: u32,
    child: Mutex<Child>,
}

impl RunningBinary {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the process has not exited yet.
    ///
    /// Does not wait for the process, and does not wait for a
    /// [`RunningBinary::graceful_stop`] running on another thread.
    pub fn is_running(&self) -> bool {
        matches!(self.child.lock().try_wait(), Ok(None))
    }

    /// Exit status, once the process has exited.
    pub fn exit_status(&self) -> LauncherResult<Option<ExitStatus>> {
        Ok(self.child.lock().try_wait()?)
    }

    /// Ask the process to terminate, and kill it if it is still running
    /// after `timeout`.
    ///
    /// Returns the exit status. Calling this on a process that has already
    /// exited just returns its status.
    ///
    /// The child lock is held only for each poll, never across the sleeps
    /// between polls.
    pub fn graceful_stop(&self, timeout: Duration) -> LauncherResult<ExitStatus> {
        if let Some(status) = self.exit_status()? {
            debug!("{} (pid {}) already exited: {}", self.program, self.pid, status);
            return Ok(status);
        }

        info!(
            "Stopping {} (pid {}), waiting up to {:?}",
            self.program, self.pid, timeout
        );
        request_termination(&mut self.child.lock(), self.pid)?;

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.exit_status()? {
                info!("{} (pid {}) exited: {}", self.program, self.pid, status);
                return Ok(status);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(POLL_INTERVAL.min(deadline - now));
        }

        warn!(
            "{} (pid {}) did not exit within {:?}, killing",
            self.program, self.pid, timeout
        );
        let mut child = self.child.lock();
        // The process may exit between the last poll and the kill.
        if let Err(e) = child.kill() {
            debug!("Kill of pid {} failed: {}", self.pid, e);
        }
        Ok(child.wait()?)
    }
}

impl std::fmt::Debug for RunningBinary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningBinary")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("pid", &self.pid)
            .finish()
    }
}

#[cfg(unix)]
fn request_termination(_child: &mut Child, pid: u32) -> LauncherResult<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| LauncherError::Signal {
        pid,
        message: "pid out of range".to_string(),
    })?;
    kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(|e| LauncherError::Signal {
        pid,
        message: e.to_string(),
    })
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child, _pid: u32) -> LauncherResult<()> {
    // No termination request without signals; stop immediately.
    Ok(child.kill()?)
}
