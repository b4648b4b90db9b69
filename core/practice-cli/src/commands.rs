//! Subcommand implementations.
//!
//! Every invocation is a fresh process, so a session started by an earlier
//! `practice start` comes back through the recovery check. Commands that
//! continue a session resume it; `discard` drops it.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use practice_core::{
    export_file_name, format_date, format_duration, format_short_date, PracticeEngine,
    SessionPhase, StopOutcome,
};

use crate::classify;
use crate::error::{CliError, CliResult};
use crate::render::{flush_events, session_line};

/// Picks up a session left running by a previous invocation.
fn resume_pending(engine: &mut PracticeEngine) -> CliResult<()> {
    if engine.recovery_offer().is_some() {
        engine.resume()?;
        engine.drain_events();
    }
    Ok(())
}

pub fn add(engine: &mut PracticeEngine, texts: &[String]) -> CliResult<()> {
    let added = engine.add_items(&texts.join("\n"))?;
    for item in added {
        println!("Added {}  [{}]", item.text, item.id);
    }
    Ok(())
}

pub fn list(engine: &PracticeEngine) -> CliResult<()> {
    let pool = &engine.data().pool;
    if pool.is_empty() {
        println!("Pool is empty. Add items with `practice add`.");
        return Ok(());
    }
    for item in pool {
        let worked = if item.worked_count > 0 {
            format!("  x{}", item.worked_count)
        } else {
            String::new()
        };
        println!("{}{}  [{}]", item.text, worked, item.id);
    }
    Ok(())
}

pub fn remove(engine: &mut PracticeEngine, id: &str) -> CliResult<()> {
    let item = engine.remove_item(id)?;
    println!("Removed {}", item.text);
    Ok(())
}

pub fn start(engine: &mut PracticeEngine) -> CliResult<()> {
    if engine.recovery_offer().is_some() {
        return Err(CliError::Usage(
            "A session is already running. Use `practice stop` or `practice discard`.".to_string(),
        ));
    }
    let session = engine.start()?;
    println!("Started practice at {}", format_date(session.started_at));
    Ok(())
}

pub fn stop(engine: &mut PracticeEngine) -> CliResult<()> {
    resume_pending(engine)?;
    let outcome = engine.stop()?;
    let mut out = io::stdout().lock();
    match outcome {
        StopOutcome::Finalized(_) => flush_events(engine, &mut out)?,
        StopOutcome::Classifying => {
            engine.drain_events();
            classify::run(engine, io::stdin().lock(), &mut out)?;
        }
    }
    Ok(())
}

pub fn status(engine: &mut PracticeEngine) -> CliResult<()> {
    resume_pending(engine)?;
    match (engine.phase(), engine.active_session()) {
        (SessionPhase::Idle, _) | (_, None) => println!("No session running"),
        (_, Some(session)) => println!(
            "Practicing since {} ({})",
            format_date(session.started_at),
            format_duration(engine.elapsed_secs().unwrap_or(0))
        ),
    }
    println!("Pool: {} items", engine.data().pool.len());
    Ok(())
}

pub fn discard(engine: &mut PracticeEngine) -> CliResult<()> {
    if engine.recovery_offer().is_none() {
        println!("No session running");
        return Ok(());
    }
    engine.drain_events();
    engine.discard()?;
    flush_events(engine, &mut io::stdout().lock())?;
    Ok(())
}

pub fn history(engine: &PracticeEngine) -> CliResult<()> {
    let sessions = engine.sessions();
    if sessions.is_empty() {
        println!("No sessions yet");
        return Ok(());
    }
    println!(
        "{} sessions, {} total",
        sessions.len(),
        format_duration(engine.total_practice_secs())
    );
    for record in sessions {
        println!("{}", session_line(record));
        if !record.note.is_empty() {
            println!("    {}", record.note);
        }
    }
    Ok(())
}

pub fn archive(engine: &PracticeEngine) -> CliResult<()> {
    let view = engine.archive_view();
    if view.in_progress.is_empty() && view.completed.is_empty() {
        println!("Nothing worked on or completed yet");
        return Ok(());
    }
    if !view.in_progress.is_empty() {
        println!("In progress:");
        for item in &view.in_progress {
            println!("  {}  x{}", item.text, item.worked_count);
        }
    }
    if !view.completed.is_empty() {
        println!("Completed:");
        for entry in &view.completed {
            println!("  {}  {}", format_short_date(entry.completed_at), entry.text);
        }
    }
    Ok(())
}

pub fn note(engine: &mut PracticeEngine, session_id: &str, text: &str) -> CliResult<()> {
    engine.set_note(session_id, text.trim())?;
    println!("Note saved");
    Ok(())
}

pub fn delete_session(engine: &mut PracticeEngine, session_id: &str) -> CliResult<()> {
    let record = engine.remove_session(session_id)?;
    println!("Deleted session from {}", format_date(record.started_at));
    Ok(())
}

pub fn share(engine: &PracticeEngine, session_id: &str) -> CliResult<()> {
    println!("{}", engine.share_text(session_id)?);
    Ok(())
}

pub fn export(engine: &PracticeEngine, path: Option<PathBuf>) -> CliResult<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(Utc::now())));
    let json = engine.export_envelope().to_json()?;
    fs_err::write(&path, json)?;
    tracing::info!(path = %path.display(), "Exported practice data");
    println!("Exported to {}", path.display());
    Ok(())
}

pub fn import(engine: &mut PracticeEngine, path: &Path) -> CliResult<()> {
    let json = fs_err::read_to_string(path)?;
    engine.import_envelope(&json)?;
    let data = engine.data();
    println!(
        "Imported {} pool items, {} sessions, {} archived items",
        data.pool.len(),
        data.sessions.len(),
        data.archive.len()
    );
    Ok(())
}
