//! Supervisor: owns the monitor worker's lifecycle and the command channel.
//!
//! All lifecycle state lives in this struct, never in process-wide globals:
//! the child handle, the recorded [`MonitorState`] and the outstanding-command
//! bookkeeping the channel itself cannot provide. Worker termination is
//! observed with a non-blocking reap (`try_wait`) at every entry point, so a
//! submit that races with the worker exiting re-checks state after the reap
//! and is rejected cleanly instead of signalling a dead pid.

use std::path::{Path, PathBuf};
use std::process::{Child, Command as ProcessCommand, ExitStatus};
use std::time::Duration;

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::channel::{Command, CommandChannel};
use crate::error::HubError;

const READY_WAIT_STEPS: u32 = 500;
const READY_WAIT_STEP: Duration = Duration::from_millis(10);

/// Supervisor's view of the worker lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    NotRunning,
    Running,
    StoppingRequested,
}

pub struct Supervisor {
    channel: CommandChannel,
    worker_program: PathBuf,
    worker_args: Vec<String>,
    worker: Option<Child>,
    state: MonitorState,
}

impl Supervisor {
    /// Supervisor whose worker is this executable's own `monitor` subcommand.
    pub fn new(base: &Path) -> Result<Self, HubError> {
        let program = std::env::current_exe()?;
        let args = vec![
            "--base".to_string(),
            base.display().to_string(),
            "monitor".to_string(),
        ];
        Ok(Self::with_worker_command(base, program, args))
    }

    /// Supervisor with an explicit worker command line. Used by tests.
    pub fn with_worker_command(base: &Path, program: PathBuf, args: Vec<String>) -> Self {
        Self {
            channel: CommandChannel::new(base),
            worker_program: program,
            worker_args: args,
            worker: None,
            state: MonitorState::NotRunning,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn worker_pid(&self) -> Option<u32> {
        self.worker.as_ref().map(|c| c.id())
    }

    /// Start exactly one worker. Rejected while one is tracked as alive.
    ///
    /// Returns once the worker has published its readiness marker, meaning
    /// it has masked the wake-up signal; a submit immediately afterwards
    /// cannot kill it. A command left unacknowledged by a dead worker can
    /// never be consumed, so the slot is cleared here before the spawn.
    pub fn start(&mut self) -> Result<u32, HubError> {
        self.reap()?;
        if self.state != MonitorState::NotRunning {
            return Err(HubError::MonitorAlreadyRunning(
                self.worker_pid().unwrap_or_default(),
            ));
        }
        if self.channel.pending() {
            tracing::warn!("discarding command left unacknowledged by a dead worker");
            self.channel.clear()?;
        }
        self.channel.clear_ready()?;

        let child = ProcessCommand::new(&self.worker_program)
            .args(&self.worker_args)
            .spawn()?;
        let pid = child.id();
        self.worker = Some(child);
        self.state = MonitorState::Running;
        self.await_ready()?;
        tracing::info!(pid, "monitor worker started");
        Ok(pid)
    }

    fn await_ready(&mut self) -> Result<(), HubError> {
        for _ in 0..READY_WAIT_STEPS {
            if self.channel.ready() {
                return Ok(());
            }
            if let Some(status) = self.reap()? {
                return Err(HubError::Io(std::io::Error::other(format!(
                    "monitor worker exited during startup ({status})"
                ))));
            }
            std::thread::sleep(READY_WAIT_STEP);
        }
        Err(HubError::Io(std::io::Error::other(
            "monitor worker did not become ready",
        )))
    }

    /// Submit a command and wake the worker.
    ///
    /// Only legal while the worker is Running; the channel itself rejects a
    /// second command while the previous one is unacknowledged.
    pub fn submit(&mut self, cmd: Command) -> Result<(), HubError> {
        // Re-check state after reaping: the worker may have exited between
        // the caller's last interaction and now.
        self.reap()?;
        match self.state {
            MonitorState::NotRunning => return Err(HubError::MonitorNotRunning),
            MonitorState::StoppingRequested => return Err(HubError::MonitorStopping),
            MonitorState::Running => {}
        }
        self.channel.submit(&cmd)?;
        self.wake()
    }

    /// Request worker shutdown via the channel's `stop` command.
    pub fn stop(&mut self) -> Result<(), HubError> {
        self.reap()?;
        match self.state {
            MonitorState::NotRunning => return Err(HubError::MonitorNotRunning),
            MonitorState::StoppingRequested => return Err(HubError::MonitorStopping),
            MonitorState::Running => {}
        }
        self.channel.submit(&Command::Stop)?;
        self.wake()?;
        self.state = MonitorState::StoppingRequested;
        Ok(())
    }

    /// Observe worker termination without blocking.
    ///
    /// Transitions to NotRunning and clears any stopping flag when the child
    /// has exited. Returns the exit status on the transition.
    pub fn reap(&mut self) -> Result<Option<ExitStatus>, HubError> {
        let Some(child) = self.worker.as_mut() else {
            return Ok(None);
        };
        match child.try_wait()? {
            Some(status) => {
                tracing::info!(pid = child.id(), %status, "monitor worker terminated");
                self.worker = None;
                self.state = MonitorState::NotRunning;
                Ok(Some(status))
            }
            None => Ok(None),
        }
    }

    fn wake(&self) -> Result<(), HubError> {
        let Some(pid) = self.worker_pid() else {
            return Err(HubError::MonitorNotRunning);
        };
        kill(Pid::from_raw(pid as i32), Signal::SIGUSR1)
            .map_err(|e| HubError::Io(std::io::Error::from(e)))
    }
}
