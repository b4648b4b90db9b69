//! PracticeEngine - the main entry point for practice-log clients.
//!
//! One engine per process. It owns the loaded aggregate, the session state
//! machine, the classification ledger, the gesture classifier and the undo
//! window, and it sequences every durable write:
//!
//! - `start`: shadow slot written before the session counts as Active
//! - `finalize`: main slot written first, shadow slot cleared second
//! - everything else: main slot written before memory is updated
//!
//! A failed write leaves the engine exactly as it was before the call.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use practice_core::{PracticeEngine, StopOutcome};
//!
//! let mut engine = PracticeEngine::new();
//! if engine.recovery_offer().is_some() {
//!     engine.resume()?;
//! } else {
//!     engine.start()?;
//! }
//! if let StopOutcome::Classifying = engine.stop()? {
//!     engine.mark_completed(&item_id)?;
//!     engine.finalize()?;
//! }
//! ```

use crate::clock::{Clock, IdSource, SystemClock, UlidIds};
use crate::config::{load_config_with_storage, PracticeConfig};
use crate::error::{PracticeError, Result};
use crate::events::EngineEvent;
use crate::export::{parse_import, ExportEnvelope};
use crate::format::share_text;
use crate::gesture::{GestureClassifier, GestureOutcome, SwipeFeedback};
use crate::session::{
    apply_session, RecoveryChoice, RecoveryManager, RecoveryOffer, SessionMachine, SessionPhase,
};
use crate::storage::StorageConfig;
use crate::store::{FileStore, PracticeStore};
use crate::types::{
    whole_seconds_between, ActiveSession, ArchiveEntry, ClassificationItem, ItemOutcome,
    PoolItem, PracticeData, SessionRecord, DELETED_ITEM_LABEL,
};
use crate::undo::{UndoSlot, UndoWindow};

/// Result of stopping a session.
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// Pool items are waiting to be classified; call `finalize` when done.
    Classifying,
    /// The pool was empty, so the session was finalized immediately.
    Finalized(SessionRecord),
}

/// Items for the archive view.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveView {
    /// Pool items worked on at least once, in pool order.
    pub in_progress: Vec<PoolItem>,
    /// Archive entries, newest first.
    pub completed: Vec<ArchiveEntry>,
}

pub struct PracticeEngine {
    store: Box<dyn PracticeStore>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
    config: PracticeConfig,
    data: PracticeData,
    started_fresh: bool,
    machine: SessionMachine,
    recovery: RecoveryManager,
    classifier: GestureClassifier,
    undo: UndoSlot,
    events: Vec<EngineEvent>,
}

impl PracticeEngine {
    /// Opens the engine on the default storage root (`~/.practice-log/`).
    pub fn new() -> Self {
        Self::with_storage(StorageConfig::default())
    }

    /// Opens the engine on file storage under `storage`, with wall-clock
    /// time, ULID ids and the preferences found in `config.json`.
    pub fn with_storage(storage: StorageConfig) -> Self {
        let config = load_config_with_storage(&storage);
        Self::open(
            Box::new(FileStore::new(&storage)),
            Box::new(SystemClock),
            Box::new(UlidIds),
            config,
        )
    }

    /// Loads the aggregate and runs the recovery check.
    ///
    /// Never fails: unreadable data degrades to an empty aggregate and an
    /// unreadable shadow slot to "no session in flight", both logged.
    pub fn open(
        store: Box<dyn PracticeStore>,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdSource>,
        config: PracticeConfig,
    ) -> Self {
        let config = config.sanitized();
        let mut started_fresh = false;
        let data = match store.load_data() {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load practice data, starting fresh");
                started_fresh = true;
                PracticeData::default()
            }
        };

        let shadow = match store.load_active() {
            Ok(shadow) => shadow,
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring unreadable active session");
                None
            }
        };

        let mut engine = PracticeEngine {
            store,
            clock,
            ids,
            classifier: GestureClassifier::new(&config),
            config,
            data,
            started_fresh,
            machine: SessionMachine::default(),
            recovery: RecoveryManager::default(),
            undo: UndoSlot::default(),
            events: Vec::new(),
        };
        engine.detect_recovery(shadow);
        engine
    }

    fn detect_recovery(&mut self, shadow: Option<ActiveSession>) {
        // A shadow whose record already exists means the commit landed but
        // the shadow clear did not; redoing it would duplicate the session.
        if let Some(session) = shadow.as_ref() {
            if self.data.session(&session.id).is_some() {
                tracing::info!(session_id = %session.id, "Clearing shadow of committed session");
                if let Err(err) = self.store.save_active(None) {
                    tracing::warn!(error = %err, "Failed to clear stale active session");
                }
                return;
            }
        }

        self.recovery = RecoveryManager::detect(shadow, self.clock.now());
        if let Some(offer) = self.recovery.offer() {
            tracing::info!(
                session_id = %offer.session.id,
                elapsed_secs = offer.elapsed_secs,
                "Interrupted practice session found"
            );
            self.events.push(EngineEvent::RecoveryOffered(offer.clone()));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.machine.session()
    }

    pub fn data(&self) -> &PracticeData {
        &self.data
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    /// True when the stored aggregate was unreadable and the engine started
    /// from an empty one.
    pub fn started_fresh(&self) -> bool {
        self.started_fresh
    }

    /// Seconds practiced so far in the current session.
    pub fn elapsed_secs(&self) -> Option<u64> {
        let session = self.machine.session()?;
        let end = session.ended_at.unwrap_or_else(|| self.clock.now());
        Some(whole_seconds_between(session.started_at, end))
    }

    /// Returns and clears the buffered events.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit_phase(&mut self, from: SessionPhase) {
        let to = self.machine.phase();
        if from != to {
            self.events.push(EngineEvent::PhaseChanged { from, to });
        }
    }

    /// Writes `next` and adopts it only if the write succeeded.
    fn commit_data(&mut self, next: PracticeData) -> Result<()> {
        self.store.save_data(&next)?;
        self.data = next;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Recovery
    // ─────────────────────────────────────────────────────────────────────────────

    /// The interrupted session awaiting a decision, if any.
    pub fn recovery_offer(&self) -> Option<&RecoveryOffer> {
        self.recovery.offer()
    }

    /// Continues the interrupted session from its original start.
    pub fn resume(&mut self) -> Result<ActiveSession> {
        let session = self
            .recovery
            .offer()
            .map(|offer| offer.session.clone())
            .ok_or(PracticeError::NoRecoveryPending)?;
        let from = self.machine.phase();
        let resumed = self.machine.resume(session)?.clone();
        self.recovery.resolve(RecoveryChoice::Resume)?;
        self.emit_phase(from);
        Ok(resumed)
    }

    /// Drops the interrupted session. No record is written.
    pub fn discard(&mut self) -> Result<ActiveSession> {
        if !self.recovery.is_pending() {
            return Err(PracticeError::NoRecoveryPending);
        }
        self.store.save_active(None)?;
        let session = self.recovery.resolve(RecoveryChoice::Discard)?;
        self.events.push(EngineEvent::SessionDiscarded {
            session_id: session.id.clone(),
        });
        Ok(session)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn start(&mut self) -> Result<ActiveSession> {
        if self.recovery.is_pending() {
            return Err(PracticeError::RecoveryPending);
        }
        if self.machine.phase() != SessionPhase::Idle {
            return Err(PracticeError::AlreadyActive);
        }

        let id = self.ids.new_id("s");
        let now = self.clock.now();
        let from = self.machine.phase();
        let session = self.machine.start(id, now)?.clone();

        if let Err(err) = self.store.save_active(Some(&session)) {
            self.machine.finish();
            return Err(err);
        }

        tracing::info!(session_id = %session.id, "Practice session started");
        self.emit_phase(from);
        Ok(session)
    }

    /// Stops the clock and opens classification. With an empty pool the
    /// session is finalized right away.
    pub fn stop(&mut self) -> Result<StopOutcome> {
        if self.recovery.is_pending() {
            return Err(PracticeError::RecoveryPending);
        }

        let now = self.clock.now();
        let from = self.machine.phase();
        let session = self.machine.stop(now)?;
        tracing::info!(
            session_id = %session.id,
            duration = session.duration.unwrap_or(0),
            "Practice session stopped"
        );
        self.emit_phase(from);

        if self.data.pool.is_empty() {
            return self.finalize().map(StopOutcome::Finalized);
        }
        Ok(StopOutcome::Classifying)
    }

    /// Commits the classification pass and returns to Idle.
    ///
    /// On a failed write the engine stays in Classifying with the ledger and
    /// shadow slot intact, so the call can be retried.
    pub fn finalize(&mut self) -> Result<SessionRecord> {
        let now = self.clock.now();
        let (session, ledger) = self.machine.finalize_inputs()?;

        let mut next = self.data.clone();
        let (record, summary) = apply_session(&mut next, session, ledger, now);
        self.store.save_data(&next)?;
        self.data = next;

        let from = self.machine.phase();
        self.machine.finish();
        self.undo.disarm();
        self.classifier.cancel();

        // The aggregate is durable at this point; a stale shadow is cleaned
        // up by the next recovery check.
        if let Err(err) = self.store.save_active(None) {
            tracing::warn!(error = %err, "Failed to clear active session after commit");
        }

        tracing::info!(
            session_id = %record.id,
            duration = record.duration,
            archived = summary.archived,
            worked = summary.worked,
            skipped = summary.skipped,
            "Practice session finalized"
        );
        self.emit_phase(from);
        self.events
            .push(EngineEvent::SessionFinalized(record.clone()));
        Ok(record)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Classification
    // ─────────────────────────────────────────────────────────────────────────────

    fn check_classifiable(&mut self, id: &str) -> Result<()> {
        self.machine.ledger_mut()?;
        if !self.data.contains_pool_item(id) {
            return Err(PracticeError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Pool items still open for classification, in pool order.
    pub fn classification_items(&self) -> Vec<ClassificationItem> {
        let Some(ledger) = self.machine.ledger() else {
            return Vec::new();
        };
        self.data
            .pool
            .iter()
            .filter(|p| !ledger.is_completed(&p.id))
            .map(|p| ClassificationItem {
                id: p.id.clone(),
                text: p.text.clone(),
                worked_on: ledger.is_worked_on(&p.id),
            })
            .collect()
    }

    pub fn outcome_of(&self, id: &str) -> ItemOutcome {
        self.machine
            .ledger()
            .map_or(ItemOutcome::Unclassified, |l| l.outcome(id))
    }

    /// Marks an item completed and arms the undo window for it.
    pub fn mark_completed(&mut self, id: &str) -> Result<()> {
        self.check_classifiable(id)?;
        if !self.machine.ledger_mut()?.mark_completed(id) {
            return Ok(());
        }

        let now = self.clock.now();
        let length = self.config.undo_window();
        self.undo.arm(id, now, length);
        self.events.push(EngineEvent::ItemClassified {
            item_id: id.to_string(),
            outcome: ItemOutcome::Completed,
        });
        self.events.push(EngineEvent::UndoArmed {
            item_id: id.to_string(),
            expires_at: now + length,
        });
        Ok(())
    }

    pub fn mark_worked_on(&mut self, id: &str) -> Result<()> {
        self.check_classifiable(id)?;
        if self.machine.ledger_mut()?.mark_worked_on(id) {
            self.events.push(EngineEvent::ItemClassified {
                item_id: id.to_string(),
                outcome: ItemOutcome::WorkedOn,
            });
        }
        Ok(())
    }

    pub fn toggle_worked_on(&mut self, id: &str) -> Result<ItemOutcome> {
        self.check_classifiable(id)?;
        let outcome = self.machine.ledger_mut()?.toggle_worked_on(id);
        if outcome != ItemOutcome::Completed {
            self.events.push(EngineEvent::ItemClassified {
                item_id: id.to_string(),
                outcome,
            });
        }
        Ok(outcome)
    }

    /// Reverts a completion while its undo window is open. Returns false
    /// (and changes nothing) once the window closed or the session ended.
    pub fn undo_completed(&mut self, id: &str) -> bool {
        if self.machine.phase() != SessionPhase::Classifying {
            return false;
        }
        let now = self.clock.now();
        if !self.undo.take_if_open(id, now) {
            return false;
        }
        let Ok(ledger) = self.machine.ledger_mut() else {
            return false;
        };
        ledger.undo_completed(id);

        tracing::debug!(item_id = %id, "Completion undone");
        self.events.push(EngineEvent::UndoApplied {
            item_id: id.to_string(),
        });
        self.events.push(EngineEvent::ItemClassified {
            item_id: id.to_string(),
            outcome: ItemOutcome::Unclassified,
        });
        true
    }

    /// Undoes the most recent completion if its window is still open.
    pub fn undo_last(&mut self) -> Option<String> {
        let id = self.undo.current()?.item_id.clone();
        self.undo_completed(&id).then_some(id)
    }

    /// The open undo window, if any.
    pub fn undo_window(&self) -> Option<&UndoWindow> {
        self.undo.current()
    }

    /// Closes the undo window once its deadline passed. Clients call this
    /// from their UI tick to hide the undo affordance.
    pub fn poll_undo(&mut self) -> Option<String> {
        let expired = self.undo.expire(self.clock.now())?;
        self.events.push(EngineEvent::UndoExpired {
            item_id: expired.item_id.clone(),
        });
        Some(expired.item_id)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pointer Gestures
    // ─────────────────────────────────────────────────────────────────────────────

    /// Begins a drag on a classification row. Returns false if rejected.
    pub fn pointer_down(&mut self, item_id: &str, x: f64, y: f64) -> bool {
        if self.machine.phase() != SessionPhase::Classifying
            || !self.data.contains_pool_item(item_id)
        {
            return false;
        }
        let removing = self
            .machine
            .ledger()
            .is_some_and(|l| l.is_completed(item_id));
        self.classifier.down(item_id, x, y, removing)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<SwipeFeedback> {
        self.classifier.move_to(x, y)
    }

    /// Ends the drag and applies its outcome to the ledger.
    pub fn pointer_up(&mut self) -> Result<Option<GestureOutcome>> {
        let Some(release) = self.classifier.up() else {
            return Ok(None);
        };
        match release.outcome {
            GestureOutcome::Completed => self.mark_completed(&release.item_id)?,
            GestureOutcome::WorkedOn => self.mark_worked_on(&release.item_id)?,
            GestureOutcome::ToggleWorkedOn => {
                self.toggle_worked_on(&release.item_id)?;
            }
            GestureOutcome::None => {}
        }
        Ok(Some(release.outcome))
    }

    pub fn pointer_cancel(&mut self) {
        self.classifier.cancel();
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Pool
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds one pool item per non-blank line of `text`.
    pub fn add_items(&mut self, text: &str) -> Result<Vec<PoolItem>> {
        let now = self.clock.now();
        let added: Vec<PoolItem> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| PoolItem {
                id: self.ids.new_id("p"),
                text: line.to_string(),
                created_at: now,
                worked_count: 0,
            })
            .collect();

        if added.is_empty() {
            return Err(PracticeError::EmptyItemText);
        }

        let mut next = self.data.clone();
        next.pool.extend(added.iter().cloned());
        self.commit_data(next)?;
        tracing::debug!(count = added.len(), "Pool items added");
        Ok(added)
    }

    /// Deletes a pool item. Allowed mid-session; its marks are skipped at
    /// finalize.
    pub fn remove_item(&mut self, id: &str) -> Result<PoolItem> {
        let index = self
            .data
            .pool
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PracticeError::ItemNotFound(id.to_string()))?;

        let mut next = self.data.clone();
        let removed = next.pool.remove(index);
        self.commit_data(next)?;
        Ok(removed)
    }

    /// Display name for an item id, falling back to a placeholder for ids
    /// that are no longer in the pool or archive.
    pub fn item_name(&self, id: &str) -> String {
        self.data
            .pool
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.text.clone())
            .or_else(|| {
                self.data
                    .archive
                    .iter()
                    .find(|a| a.id == id)
                    .map(|a| a.text.clone())
            })
            .unwrap_or_else(|| DELETED_ITEM_LABEL.to_string())
    }

    pub fn archive_view(&self) -> ArchiveView {
        ArchiveView {
            in_progress: self
                .data
                .pool
                .iter()
                .filter(|p| p.worked_count > 0)
                .cloned()
                .collect(),
            completed: self.data.archive.iter().rev().cloned().collect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────────

    /// Finished sessions, most recent first.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.data.sessions
    }

    pub fn total_practice_secs(&self) -> u64 {
        self.data.sessions.iter().map(|s| s.duration).sum()
    }

    pub fn set_note(&mut self, session_id: &str, note: &str) -> Result<()> {
        let mut next = self.data.clone();
        let record = next
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| PracticeError::SessionNotFound(session_id.to_string()))?;
        record.note = note.to_string();
        self.commit_data(next)
    }

    pub fn remove_session(&mut self, session_id: &str) -> Result<SessionRecord> {
        let index = self
            .data
            .sessions
            .iter()
            .position(|s| s.id == session_id)
            .ok_or_else(|| PracticeError::SessionNotFound(session_id.to_string()))?;

        let mut next = self.data.clone();
        let removed = next.sessions.remove(index);
        self.commit_data(next)?;
        Ok(removed)
    }

    pub fn share_text(&self, session_id: &str) -> Result<String> {
        let record = self
            .data
            .session(session_id)
            .ok_or_else(|| PracticeError::SessionNotFound(session_id.to_string()))?;
        Ok(share_text(record, |id| self.item_name(id)))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Export / Import
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn export_envelope(&self) -> ExportEnvelope {
        ExportEnvelope::new(&self.data, self.clock.now())
    }

    /// Replaces the aggregate with an exported one. Nothing changes unless
    /// the envelope validates and the write succeeds.
    pub fn import_envelope(&mut self, json: &str) -> Result<()> {
        let imported = parse_import(json)?;
        tracing::info!(
            pool = imported.pool.len(),
            sessions = imported.sessions.len(),
            archive = imported.archive.len(),
            "Importing practice data"
        );
        self.commit_data(imported)
    }
}

impl Default for PracticeEngine {
    fn default() -> Self {
        Self::new()
    }
}
