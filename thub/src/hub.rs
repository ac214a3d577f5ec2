//! Interactive front-end for the hub.
//!
//! All prompting happens here: a command value is fully formed before it is
//! handed to the supervisor, so neither the channel nor the worker ever
//! blocks on interactive input. Lifecycle and channel violations print as
//! report lines; nothing here terminates the hub.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::channel::Command;
use crate::supervisor::{MonitorState, Supervisor};

pub fn run(base: &Path) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let mut supervisor = Supervisor::new(base)?;

    writeln!(output, "Treasure Hub - Interactive Interface")?;
    writeln!(
        output,
        "Commands: start_monitor, list_hunts, list_treasures, view_treasure, stop_monitor, exit"
    )?;

    loop {
        if let Some(status) = supervisor.reap()? {
            writeln!(output, "Monitor terminated ({status}).")?;
        }
        write!(output, "\n> ")?;
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            break; // EOF behaves like exit, minus the prompt
        };
        let outcome = match line.as_str() {
            "" => continue,
            "start_monitor" => match supervisor.start() {
                Ok(pid) => {
                    writeln!(output, "Started monitor process with PID: {pid}")?;
                    continue;
                }
                Err(e) => Err(e),
            },
            "list_hunts" => supervisor.submit(Command::ListHunts),
            "list_treasures" => match prompt(&mut input, &mut output, "Enter hunt ID: ")? {
                Some(hunt) => supervisor.submit(Command::ListTreasures(hunt)),
                None => break,
            },
            "view_treasure" => match prompt_view(&mut input, &mut output)? {
                Some(cmd) => supervisor.submit(cmd),
                None => break,
            },
            "stop_monitor" => supervisor.stop(),
            "exit" => {
                supervisor.reap()?;
                if supervisor.state() != MonitorState::NotRunning {
                    writeln!(
                        output,
                        "Error: Cannot exit while monitor is running. Use 'stop_monitor' first."
                    )?;
                    continue;
                }
                writeln!(output, "Exiting Treasure Hub...")?;
                break;
            }
            other => {
                writeln!(output, "Unknown command: {other}")?;
                continue;
            }
        };
        if let Err(e) = outcome {
            writeln!(output, "Error: {e}")?;
        }
    }
    drain_worker(&mut supervisor, &mut output)
}

/// Last line of defense on the EOF path: the hub must not exit leaving an
/// orphaned running worker, so request a stop and wait for the termination
/// to be observed.
fn drain_worker(supervisor: &mut Supervisor, output: &mut impl Write) -> anyhow::Result<()> {
    supervisor.reap()?;
    if supervisor.state() == MonitorState::Running {
        if let Err(e) = supervisor.stop() {
            writeln!(output, "Error: {e}")?;
        }
    }
    for _ in 0..100 {
        if supervisor.state() == MonitorState::NotRunning {
            return Ok(());
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
        supervisor.reap()?;
    }
    writeln!(output, "Error: monitor did not terminate; leaving it behind.")?;
    Ok(())
}

/// Build a complete view command: hunt id and treasure id gathered up front.
fn prompt_view(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> std::io::Result<Option<Command>> {
    let Some(hunt) = prompt(input, output, "Enter hunt ID: ")? else {
        return Ok(None);
    };
    let id = loop {
        let Some(raw) = prompt(input, output, "Enter treasure ID to view: ")? else {
            return Ok(None);
        };
        match raw.parse() {
            Ok(id) => break id,
            Err(_) => writeln!(output, "Not a treasure ID: {raw}")?,
        }
    };
    Ok(Some(Command::ViewTreasure { hunt, id }))
}

fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    text: &str,
) -> std::io::Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;
    read_line(input)
}

fn read_line(input: &mut impl BufRead) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
