//! Line-driven classification pass run after `practice stop`.
//!
//! ```text
//! c N   complete item N
//! w N   mark item N worked on
//! t N   toggle worked on for item N
//! u     undo the last completion (within the undo window)
//! d     done, log the session
//! ```
//!
//! End of input counts as `d` so a closed terminal still logs the session.
//! If that final commit fails the error is returned and the session stays
//! in the shadow slot for the next run.

use std::io::{BufRead, Write};

use practice_core::{PracticeEngine, PracticeError, SessionPhase};

use crate::error::CliResult;
use crate::render::flush_events;

const HELP: &str = "c N complete, w N worked on, t N toggle, u undo, d done";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Complete(usize),
    WorkedOn(usize),
    Toggle(usize),
    Undo,
    Done,
    Help,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    let index = parts.next().and_then(|n| n.parse::<usize>().ok());
    if parts.next().is_some() {
        return None;
    }
    match (verb, index) {
        ("c", Some(n)) => Some(Command::Complete(n)),
        ("w", Some(n)) => Some(Command::WorkedOn(n)),
        ("t", Some(n)) => Some(Command::Toggle(n)),
        ("u", None) => Some(Command::Undo),
        ("d", None) => Some(Command::Done),
        ("?" | "h" | "help", None) => Some(Command::Help),
        _ => None,
    }
}

fn print_items<W: Write>(engine: &PracticeEngine, out: &mut W) -> std::io::Result<()> {
    for (i, item) in engine.classification_items().iter().enumerate() {
        let mark = if item.worked_on { "~" } else { " " };
        writeln!(out, "{:>3}. [{}] {}", i + 1, mark, item.text)?;
    }
    Ok(())
}

/// Resolves a 1-based position in the current list to an item id.
fn item_at(engine: &PracticeEngine, n: usize) -> Option<String> {
    let items = engine.classification_items();
    n.checked_sub(1)
        .and_then(|i| items.get(i))
        .map(|item| item.id.clone())
}

/// Runs the prompt until the session is finalized.
pub fn run<R: BufRead, W: Write>(
    engine: &mut PracticeEngine,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    writeln!(out, "Classify this session's items ({})", HELP)?;
    print_items(engine, out)?;
    write!(out, "> ")?;
    out.flush()?;

    let mut lines = input.lines();
    let mut input_done = false;
    while engine.phase() == SessionPhase::Classifying {
        let command = match lines.next() {
            Some(line) => parse_command(&line?),
            None => {
                input_done = true;
                Some(Command::Done)
            }
        };
        engine.poll_undo();

        let result = match command {
            Some(Command::Complete(n)) => with_item(engine, n, |e, id| e.mark_completed(id)),
            Some(Command::WorkedOn(n)) => with_item(engine, n, |e, id| e.mark_worked_on(id)),
            Some(Command::Toggle(n)) => {
                with_item(engine, n, |e, id| e.toggle_worked_on(id).map(|_| ()))
            }
            Some(Command::Undo) => {
                if engine.undo_last().is_none() {
                    writeln!(out, "Nothing to undo")?;
                }
                Ok(())
            }
            Some(Command::Done) => engine.finalize().map(|_| ()),
            Some(Command::Help) => {
                writeln!(out, "{}", HELP)?;
                Ok(())
            }
            None => {
                writeln!(out, "Unknown command ({})", HELP)?;
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(PracticeError::ItemNotFound(_)) => writeln!(out, "No such item")?,
            Err(err) if input_done => {
                tracing::warn!(error = %err, "Finalize failed after end of input");
                return Err(err.into());
            }
            Err(err) => {
                tracing::warn!(error = %err, "Classification command failed");
                writeln!(out, "Error: {}", err)?;
            }
        }

        flush_events(engine, out)?;
        if engine.phase() == SessionPhase::Classifying {
            print_items(engine, out)?;
            write!(out, "> ")?;
            out.flush()?;
        }
    }
    Ok(())
}

fn with_item<F>(engine: &mut PracticeEngine, n: usize, apply: F) -> Result<(), PracticeError>
where
    F: FnOnce(&mut PracticeEngine, &str) -> Result<(), PracticeError>,
{
    let id = item_at(engine, n).ok_or_else(|| PracticeError::ItemNotFound(n.to_string()))?;
    apply(engine, &id)
}
