//! Single-slot command mailbox between supervisor and monitor worker.
//!
//! The mailbox is a shared file under `<base>/.thub` holding one encoded
//! command (`verb param`, one parameter token). The file itself carries no
//! locking; consumption is confirmed by an explicit acknowledgment marker the
//! worker writes after dispatch, and the supervisor refuses to submit while a
//! command sits in the slot unacknowledged. A readiness marker published by
//! the worker once its signal mask is in place completes the handshake: the
//! supervisor holds back wake-ups until the marker exists. The wake-up signal
//! itself is the supervisor's concern, not the channel's.

use std::path::{Path, PathBuf};

use crate::error::HubError;

const CHANNEL_DIR: &str = ".thub";
const COMMAND_FILE: &str = "command";
const ACK_FILE: &str = "command.ack";
const READY_FILE: &str = "monitor.ready";

/// Fixed command vocabulary the monitor understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListHunts,
    ListTreasures(String),
    ViewTreasure { hunt: String, id: u32 },
    Stop,
}

impl Command {
    pub fn encode(&self) -> String {
        match self {
            Command::ListHunts => "list_hunts".into(),
            Command::ListTreasures(hunt) => format!("list_treasures {hunt}"),
            Command::ViewTreasure { hunt, id } => format!("view_treasure {hunt}:{id}"),
            Command::Stop => "stop".into(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, HubError> {
        let mut tokens = text.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| HubError::MalformedCommand("empty mailbox".into()))?;
        let param = tokens.next();
        if tokens.next().is_some() {
            return Err(HubError::MalformedCommand(format!(
                "trailing tokens after {verb}"
            )));
        }
        match (verb, param) {
            ("list_hunts", None) => Ok(Command::ListHunts),
            ("stop", None) => Ok(Command::Stop),
            ("list_treasures", Some(hunt)) => Ok(Command::ListTreasures(hunt.to_string())),
            ("view_treasure", Some(param)) => {
                let (hunt, id) = param.split_once(':').ok_or_else(|| {
                    HubError::MalformedCommand(format!("view_treasure wants hunt:id, got {param}"))
                })?;
                let id = id.parse().map_err(|_| {
                    HubError::MalformedCommand(format!("bad treasure id in {param}"))
                })?;
                Ok(Command::ViewTreasure {
                    hunt: hunt.to_string(),
                    id,
                })
            }
            ("list_treasures" | "view_treasure", None) => Err(HubError::MalformedCommand(
                format!("{verb} needs a parameter"),
            )),
            (verb, _) => Err(HubError::MalformedCommand(format!("unknown verb {verb}"))),
        }
    }
}

pub struct CommandChannel {
    dir: PathBuf,
}

impl CommandChannel {
    pub fn new(base: &Path) -> Self {
        Self {
            dir: base.join(CHANNEL_DIR),
        }
    }

    fn command_path(&self) -> PathBuf {
        self.dir.join(COMMAND_FILE)
    }

    fn ack_path(&self) -> PathBuf {
        self.dir.join(ACK_FILE)
    }

    fn ready_path(&self) -> PathBuf {
        self.dir.join(READY_FILE)
    }

    /// True while a submitted command has not been acknowledged.
    pub fn pending(&self) -> bool {
        self.command_path().exists() && !self.ack_path().exists()
    }

    /// Place a command in the slot.
    ///
    /// Fails with [`HubError::ChannelBusy`] while the previous command is
    /// unacknowledged; the slot contents are left untouched in that case.
    pub fn submit(&self, cmd: &Command) -> Result<(), HubError> {
        if self.pending() {
            return Err(HubError::ChannelBusy);
        }
        std::fs::create_dir_all(&self.dir)?;
        match std::fs::remove_file(self.ack_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        std::fs::write(self.command_path(), format!("{}\n", cmd.encode()))?;
        tracing::debug!(command = %cmd.encode(), "submitted to mailbox");
        Ok(())
    }

    /// Read and decode the slot. Called from the worker's main loop only.
    pub fn receive(&self) -> Result<Command, HubError> {
        let text = std::fs::read_to_string(self.command_path()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HubError::MalformedCommand("empty mailbox".into())
            } else {
                HubError::Io(e)
            }
        })?;
        Command::parse(&text)
    }

    /// Mark the slot consumed: drop the command, publish the ack marker.
    pub fn acknowledge(&self) -> Result<(), HubError> {
        match std::fs::remove_file(self.command_path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        std::fs::write(self.ack_path(), "ok\n")?;
        Ok(())
    }

    /// Drop whatever is in the slot, consumed or not.
    ///
    /// Only legal while no worker is alive: a command a dead worker never
    /// acknowledged can never be consumed, so the supervisor clears it
    /// before spawning a fresh worker.
    pub fn clear(&self) -> Result<(), HubError> {
        for path in [self.command_path(), self.ack_path()] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Worker side: announce that the wake-up signal is safely masked and
    /// the mailbox will be serviced.
    pub fn publish_ready(&self) -> Result<(), HubError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.ready_path(), format!("{}\n", std::process::id()))?;
        Ok(())
    }

    /// True once the worker has published its readiness marker.
    pub fn ready(&self) -> bool {
        self.ready_path().exists()
    }

    /// Retract the readiness marker; stale markers from a previous worker
    /// are cleared by the supervisor before each spawn.
    pub fn clear_ready(&self) -> Result<(), HubError> {
        match std::fs::remove_file(self.ready_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
