use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("a command is already pending in the channel")]
    ChannelBusy,

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("monitor is already running (pid {0})")]
    MonitorAlreadyRunning(u32),

    #[error("monitor is not running")]
    MonitorNotRunning,

    #[error("monitor is stopping; wait for it to terminate")]
    MonitorStopping,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
