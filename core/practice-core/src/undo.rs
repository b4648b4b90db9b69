//! The undo window for the most recent completion.
//!
//! Deadline based: nothing fires on its own. The engine checks the deadline
//! when an undo is requested and when the client polls for expiry. Arming a
//! new window replaces the previous one, so only the latest completion is
//! ever undoable.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoWindow {
    pub item_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UndoSlot {
    window: Option<UndoWindow>,
}

impl UndoSlot {
    /// Arms a window for `item_id`, returning the one it replaced.
    pub fn arm(
        &mut self,
        item_id: &str,
        now: DateTime<Utc>,
        length: Duration,
    ) -> Option<UndoWindow> {
        self.window.replace(UndoWindow {
            item_id: item_id.to_string(),
            expires_at: now + length,
        })
    }

    pub fn current(&self) -> Option<&UndoWindow> {
        self.window.as_ref()
    }

    /// Consumes the window if it is for `item_id` and still open.
    pub fn take_if_open(&mut self, item_id: &str, now: DateTime<Utc>) -> bool {
        match &self.window {
            Some(w) if w.item_id == item_id && now < w.expires_at => {
                self.window = None;
                true
            }
            _ => false,
        }
    }

    /// Removes and returns the window once its deadline has passed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> Option<UndoWindow> {
        if self.window.as_ref().is_some_and(|w| now >= w.expires_at) {
            return self.window.take();
        }
        None
    }

    pub fn disarm(&mut self) -> Option<UndoWindow> {
        self.window.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_take_within_window() {
        let mut slot = UndoSlot::default();
        slot.arm("a", t0(), Duration::seconds(4));
        assert!(slot.take_if_open("a", t0() + Duration::milliseconds(3_999)));
        assert!(slot.current().is_none());
    }

    #[test]
    fn test_take_at_deadline_fails() {
        let mut slot = UndoSlot::default();
        slot.arm("a", t0(), Duration::seconds(4));
        assert!(!slot.take_if_open("a", t0() + Duration::seconds(4)));
    }

    #[test]
    fn test_take_for_other_item_fails() {
        let mut slot = UndoSlot::default();
        slot.arm("a", t0(), Duration::seconds(4));
        assert!(!slot.take_if_open("b", t0()));
        assert!(slot.current().is_some());
    }

    #[test]
    fn test_arming_replaces_previous_window() {
        let mut slot = UndoSlot::default();
        slot.arm("a", t0(), Duration::seconds(4));
        let replaced = slot.arm("b", t0() + Duration::seconds(1), Duration::seconds(4));

        assert_eq!(replaced.map(|w| w.item_id), Some("a".to_string()));
        assert!(!slot.take_if_open("a", t0() + Duration::seconds(2)));
        assert!(slot.take_if_open("b", t0() + Duration::seconds(2)));
    }

    #[test]
    fn test_expire_only_after_deadline() {
        let mut slot = UndoSlot::default();
        slot.arm("a", t0(), Duration::seconds(4));
        assert!(slot.expire(t0() + Duration::seconds(3)).is_none());
        let expired = slot.expire(t0() + Duration::seconds(4)).unwrap();
        assert_eq!(expired.item_id, "a");
        assert!(slot.expire(t0() + Duration::seconds(5)).is_none());
    }
}
