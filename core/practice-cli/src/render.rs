//! Terminal rendering of engine events and data.

use std::io::Write;

use practice_core::{
    format_date, format_duration, summary_line, EngineEvent, ItemOutcome, PracticeEngine,
    SessionRecord,
};

/// One line for an event, or `None` for events the terminal doesn't show.
pub fn describe(event: &EngineEvent, engine: &PracticeEngine) -> Option<String> {
    match event {
        EngineEvent::ItemClassified { item_id, outcome } => {
            let name = engine.item_name(item_id);
            Some(match outcome {
                ItemOutcome::Completed => format!("Completed: {} (u to undo)", name),
                ItemOutcome::WorkedOn => format!("Worked on: {}", name),
                ItemOutcome::Unclassified => format!("Cleared: {}", name),
            })
        }
        EngineEvent::UndoApplied { item_id } => {
            Some(format!("Undid completion of {}", engine.item_name(item_id)))
        }
        EngineEvent::SessionFinalized(record) => Some(format!(
            "Logged {} - {}",
            format_duration(record.duration),
            summary_line(record)
        )),
        EngineEvent::RecoveryOffered(offer) => Some(format!(
            "Found session started {} ({} ago)",
            format_date(offer.session.started_at),
            format_duration(offer.elapsed_secs)
        )),
        EngineEvent::SessionDiscarded { .. } => Some("Discarded interrupted session".to_string()),
        EngineEvent::PhaseChanged { .. }
        | EngineEvent::UndoArmed { .. }
        | EngineEvent::UndoExpired { .. } => None,
    }
}

/// Drains buffered events and writes the visible ones.
pub fn flush_events<W: Write>(engine: &mut PracticeEngine, out: &mut W) -> std::io::Result<()> {
    for event in engine.drain_events() {
        if let Some(line) = describe(&event, engine) {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

pub fn session_line(record: &SessionRecord) -> String {
    format!(
        "{}  {:>7}  {}  [{}]",
        format_date(record.started_at),
        format_duration(record.duration),
        summary_line(record),
        record.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use practice_core::{ManualClock, MemoryStore, PracticeConfig, SequentialIds};

    fn engine() -> PracticeEngine {
        PracticeEngine::open(
            Box::new(MemoryStore::new()),
            Box::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
            )),
            Box::new(SequentialIds::default()),
            PracticeConfig::default(),
        )
    }

    #[test]
    fn test_classification_events_use_item_names() {
        let mut engine = engine();
        let id = engine.add_items("Scales").unwrap()[0].id.clone();
        engine.start().unwrap();
        engine.stop().unwrap();
        engine.drain_events();

        engine.mark_worked_on(&id).unwrap();

        let mut out = Vec::new();
        flush_events(&mut engine, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Worked on: Scales\n");
    }

    #[test]
    fn test_phase_changes_are_silent() {
        let mut engine = engine();
        engine.add_items("Scales").unwrap();
        engine.start().unwrap();

        let mut out = Vec::new();
        flush_events(&mut engine, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
