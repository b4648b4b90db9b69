//! Per-session classification ledger.
//!
//! Records which pool item ids were marked completed or worked-on during the
//! current classification pass. Ids keep the order in which they were first
//! marked, which is the order they appear in the resulting `SessionRecord`.
//!
//! Invariant: the completed and worked-on sequences are always disjoint.
//! Completion wins: marking completed drops a prior worked-on mark, and
//! marking worked-on is ignored for a completed id.

use crate::types::ItemOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationLedger {
    completed: Vec<String>,
    worked_on: Vec<String>,
}

impl ClassificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already completed.
    pub fn mark_completed(&mut self, id: &str) -> bool {
        self.worked_on.retain(|x| x != id);
        if self.is_completed(id) {
            return false;
        }
        self.completed.push(id.to_string());
        true
    }

    /// Returns false if the id was already worked-on or is completed.
    pub fn mark_worked_on(&mut self, id: &str) -> bool {
        if self.is_completed(id) || self.is_worked_on(id) {
            return false;
        }
        self.worked_on.push(id.to_string());
        true
    }

    /// Flips the worked-on mark. Completed ids are left alone.
    /// Returns the id's outcome afterwards.
    pub fn toggle_worked_on(&mut self, id: &str) -> ItemOutcome {
        if self.is_completed(id) {
            return ItemOutcome::Completed;
        }
        if self.is_worked_on(id) {
            self.worked_on.retain(|x| x != id);
            ItemOutcome::Unclassified
        } else {
            self.worked_on.push(id.to_string());
            ItemOutcome::WorkedOn
        }
    }

    /// Returns the id to unclassified. Returns false if it was not completed.
    pub fn undo_completed(&mut self, id: &str) -> bool {
        let before = self.completed.len();
        self.completed.retain(|x| x != id);
        self.completed.len() != before
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.iter().any(|x| x == id)
    }

    pub fn is_worked_on(&self, id: &str) -> bool {
        self.worked_on.iter().any(|x| x == id)
    }

    pub fn outcome(&self, id: &str) -> ItemOutcome {
        if self.is_completed(id) {
            ItemOutcome::Completed
        } else if self.is_worked_on(id) {
            ItemOutcome::WorkedOn
        } else {
            ItemOutcome::Unclassified
        }
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn worked_on(&self) -> &[String] {
        &self.worked_on
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.worked_on.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint(ledger: &ClassificationLedger) {
        for id in ledger.completed() {
            assert!(!ledger.is_worked_on(id), "{} is in both sets", id);
        }
    }

    #[test]
    fn test_mark_completed_is_idempotent() {
        let mut once = ClassificationLedger::new();
        once.mark_completed("a");

        let mut twice = ClassificationLedger::new();
        assert!(twice.mark_completed("a"));
        assert!(!twice.mark_completed("a"));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_completion_overrides_worked_on() {
        let mut ledger = ClassificationLedger::new();
        ledger.mark_worked_on("a");
        ledger.mark_completed("a");

        assert_eq!(ledger.outcome("a"), ItemOutcome::Completed);
        assert!(ledger.worked_on().is_empty());
    }

    #[test]
    fn test_worked_on_ignored_for_completed_id() {
        let mut ledger = ClassificationLedger::new();
        ledger.mark_completed("a");
        assert!(!ledger.mark_worked_on("a"));
        assert_eq!(ledger.toggle_worked_on("a"), ItemOutcome::Completed);
        assert!(ledger.worked_on().is_empty());
    }

    #[test]
    fn test_toggle_worked_on_flips() {
        let mut ledger = ClassificationLedger::new();
        assert_eq!(ledger.toggle_worked_on("a"), ItemOutcome::WorkedOn);
        assert_eq!(ledger.toggle_worked_on("a"), ItemOutcome::Unclassified);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_undo_completed_restores_unclassified() {
        let mut ledger = ClassificationLedger::new();
        ledger.mark_completed("a");
        assert!(ledger.undo_completed("a"));
        assert_eq!(ledger.outcome("a"), ItemOutcome::Unclassified);
        assert!(!ledger.undo_completed("a"));

        // Eligible again for a fresh mark.
        assert!(ledger.mark_worked_on("a"));
    }

    #[test]
    fn test_marks_keep_first_marked_order() {
        let mut ledger = ClassificationLedger::new();
        ledger.mark_completed("c");
        ledger.mark_completed("a");
        ledger.mark_worked_on("b");
        ledger.mark_worked_on("d");
        assert_eq!(ledger.completed(), ["c", "a"]);
        assert_eq!(ledger.worked_on(), ["b", "d"]);
    }

    #[test]
    fn test_sets_stay_disjoint_over_mixed_sequences() {
        let ids = ["a", "b", "c"];
        // Every sequence of 4 operations over 3 ids and 4 operation kinds.
        for seq in 0..(12u32.pow(4)) {
            let mut ledger = ClassificationLedger::new();
            let mut n = seq;
            for _ in 0..4 {
                let step = n % 12;
                n /= 12;
                let id = ids[(step % 3) as usize];
                match step / 3 {
                    0 => {
                        ledger.mark_completed(id);
                    }
                    1 => {
                        ledger.mark_worked_on(id);
                    }
                    2 => {
                        ledger.toggle_worked_on(id);
                    }
                    _ => {
                        ledger.undo_completed(id);
                    }
                }
                assert_disjoint(&ledger);
            }
        }
    }
}
