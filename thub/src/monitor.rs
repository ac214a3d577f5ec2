//! Monitor worker: the long-running process the supervisor spawns.
//!
//! The worker blocks SIGUSR1 and consumes it synchronously with
//! `SigSet::wait()` in its main loop, so every mailbox read and every report
//! happens in ordinary blocking context rather than inside a signal handler.
//! A wake-up with nothing usable in the mailbox (spurious redelivery, stale
//! slot) is reported and ignored; the worker goes back to waiting.

use std::io::Write;
use std::path::Path;

use libhunt::store::HuntStore;
use libhunt::{HuntError, catalog};
use nix::sys::signal::{SigSet, Signal};

use crate::channel::{Command, CommandChannel};
use crate::error::HubError;

/// Worker lifecycle, driven by the wake-up loop in [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Executing,
    Terminated,
}

/// Worker entry point; returns when a `stop` command has been dispatched.
pub fn run(base: &Path) -> Result<(), HubError> {
    let channel = CommandChannel::new(base);
    let mut mask = SigSet::empty();
    mask.add(Signal::SIGUSR1);
    mask.thread_block().map_err(std::io::Error::from)?;
    // Only now is an early wake-up harmless: it stays pending in the mask
    // instead of hitting the default disposition. Tell the supervisor so.
    channel.publish_ready()?;

    let mut stdout = std::io::stdout();
    println!("Monitor started (pid {}), waiting for commands.", std::process::id());

    let mut state = WorkerState::Idle;
    while state != WorkerState::Terminated {
        mask.wait().map_err(std::io::Error::from)?;
        state = WorkerState::Executing;
        tracing::trace!(state = ?state, "wake-up received");

        match channel.receive() {
            Ok(cmd) => {
                let stopped = dispatch(base, &cmd, &mut stdout)?;
                channel.acknowledge()?;
                state = if stopped {
                    WorkerState::Terminated
                } else {
                    WorkerState::Idle
                };
            }
            Err(e) => {
                // Spurious wake-up or garbage in the slot; report and carry on.
                tracing::warn!(error = %e, "wake-up without a dispatchable command");
                println!("Monitor: {e}");
                state = WorkerState::Idle;
            }
        }
        stdout.flush()?;
    }
    channel.clear_ready()?;
    Ok(())
}

/// Execute one command against the store, writing the report to `out`.
///
/// Returns true when the command was `stop`. Store and catalog errors become
/// report lines; they never abort the worker.
pub fn dispatch(base: &Path, cmd: &Command, out: &mut impl Write) -> Result<bool, HubError> {
    let store = HuntStore::new(base);
    match cmd {
        Command::ListHunts => {
            writeln!(out, "--- MONITOR: LISTING ALL HUNTS ---")?;
            match catalog::list_hunts(base) {
                Ok(hunts) => {
                    if hunts.is_empty() {
                        writeln!(out, "No hunts found.")?;
                    }
                    for hunt in hunts {
                        writeln!(out, "Hunt: {} - Total treasures: {}", hunt.id, hunt.records)?;
                    }
                }
                Err(e) => writeln!(out, "Error: {e}")?,
            }
            writeln!(out, "--- END OF HUNT LISTING ---")?;
        }
        Command::ListTreasures(hunt) => {
            writeln!(out, "--- MONITOR: LISTING TREASURES FOR HUNT: {hunt} ---")?;
            match store.scan(hunt) {
                Ok(records) => {
                    let mut count = 0u64;
                    for record in records {
                        match record {
                            Ok(t) => {
                                write_record(out, &t)?;
                                count += 1;
                            }
                            Err(e) => writeln!(out, "Error: {e}")?,
                        }
                    }
                    if count == 0 {
                        writeln!(out, "No treasures found in this hunt.")?;
                    }
                }
                Err(HuntError::HuntNotFound(_)) => {
                    writeln!(out, "Error: Hunt '{hunt}' not found")?;
                }
                Err(e) => writeln!(out, "Error: {e}")?,
            }
        }
        Command::ViewTreasure { hunt, id } => {
            writeln!(out, "--- MONITOR: VIEWING TREASURE {id} IN HUNT: {hunt} ---")?;
            match store.lookup(hunt, *id) {
                Ok(t) => write_record(out, &t)?,
                Err(HuntError::HuntNotFound(_)) => {
                    writeln!(out, "Error: Hunt '{hunt}' not found")?;
                }
                Err(HuntError::RecordNotFound { .. }) => {
                    writeln!(out, "Treasure with ID {id} not found in hunt {hunt}")?;
                }
                Err(e) => writeln!(out, "Error: {e}")?,
            }
        }
        Command::Stop => {
            writeln!(out, "Monitor (pid {}) shutting down.", std::process::id())?;
            return Ok(true);
        }
    }
    Ok(false)
}

fn write_record(out: &mut impl Write, t: &libhunt::Treasure) -> std::io::Result<()> {
    writeln!(out, "ID: {}", t.id)?;
    writeln!(out, "User: {}", t.user)?;
    writeln!(out, "Location: {:.6}, {:.6}", t.latitude, t.longitude)?;
    writeln!(out, "Clue: {}", t.clue)?;
    writeln!(out, "Value: {}", t.value)?;
    writeln!(out, "-------------------")
}

#[cfg(test)]
mod tests {
    use super::*;
    use libhunt::record::TreasureFields;
    use libhunt::store::TREASURE_FILE;

    fn fields(user: &str, value: i32) -> TreasureFields {
        TreasureFields {
            user: user.into(),
            latitude: 1.5,
            longitude: -2.5,
            clue: "dig here".into(),
            value,
        }
    }

    fn render(base: &Path, cmd: &Command) -> (bool, String) {
        let mut out = Vec::new();
        let stopped = dispatch(base, cmd, &mut out).unwrap();
        (stopped, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_list_treasures_empty_hunt_is_not_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        store.append("h", fields("al", 5))?;
        store.delete("h", 1)?;

        let (_, report) = render(dir.path(), &Command::ListTreasures("h".into()));
        assert!(report.contains("No treasures found in this hunt."));
        Ok(())
    }

    #[test]
    fn test_list_treasures_missing_hunt_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_, report) = render(dir.path(), &Command::ListTreasures("ghost".into()));
        assert!(report.contains("Hunt 'ghost' not found"));
    }

    #[test]
    fn test_view_absent_id_reports_and_leaves_file_alone() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        store.append("h", fields("al", 5))?;
        let path = dir.path().join("h").join(TREASURE_FILE);
        let before = std::fs::read(&path)?;

        let (_, report) = render(
            dir.path(),
            &Command::ViewTreasure {
                hunt: "h".into(),
                id: 9,
            },
        );
        assert!(report.contains("Treasure with ID 9 not found in hunt h"));
        assert_eq!(std::fs::read(&path)?, before);
        Ok(())
    }

    #[test]
    fn test_view_found_prints_details() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        store.append("h", fields("bo", 7))?;

        let (stopped, report) = render(
            dir.path(),
            &Command::ViewTreasure {
                hunt: "h".into(),
                id: 1,
            },
        );
        assert!(!stopped);
        assert!(report.contains("User: bo"));
        assert!(report.contains("Value: 7"));
        Ok(())
    }

    #[test]
    fn test_list_hunts_report() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = HuntStore::new(dir.path());
        store.append("pirates", fields("al", 5))?;
        store.append("pirates", fields("bo", 7))?;

        let (_, report) = render(dir.path(), &Command::ListHunts);
        assert!(report.contains("Hunt: pirates - Total treasures: 2"));
        Ok(())
    }

    #[test]
    fn test_stop_requests_termination() {
        let dir = tempfile::tempdir().unwrap();
        let (stopped, report) = render(dir.path(), &Command::Stop);
        assert!(stopped);
        assert!(report.contains("shutting down"));
    }
}
