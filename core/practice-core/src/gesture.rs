//! Pointer-gesture classification for the classification pass.
//!
//! Turns one pointer interaction (down, zero or more moves, up or cancel)
//! on a list row into a discrete outcome.
//!
//! ```text
//! down ──move past jitter──▶ axis locked ──release──▶ outcome
//!   │                          │ horizontal: feedback per move
//!   │                          └ vertical:   scroll, ignored
//!   └──release without lock──▶ tap (per TapPolicy)
//! ```
//!
//! Release rules for a horizontal drag with net displacement `dx` against
//! threshold `T`: `dx >= T` completes, `dx <= -T` marks worked-on, anything
//! in between is a no-op.
//!
//! Only one interaction is tracked at a time. The classifier never touches
//! the ledger; the engine applies the outcome.

use crate::config::{PracticeConfig, TapPolicy};

/// Discrete result of a finished interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Completed,
    WorkedOn,
    /// A tap under [`TapPolicy::ToggleWorkedOn`].
    ToggleWorkedOn,
    None,
}

/// Advisory visual feedback while a horizontal drag is in progress.
///
/// `complete` and `worked_on` are in `0.0..=1.0`; at most one is non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeFeedback {
    pub offset: f64,
    pub complete: f64,
    pub worked_on: f64,
}

/// Outcome of a released interaction, tagged with the item it targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureRelease {
    pub item_id: String,
    pub outcome: GestureOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
struct Drag {
    item_id: String,
    start_x: f64,
    start_y: f64,
    current_x: f64,
    axis: Option<Axis>,
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    threshold: f64,
    jitter_radius: f64,
    edge_margin: f64,
    tap_policy: TapPolicy,
    drag: Option<Drag>,
}

impl GestureClassifier {
    pub fn new(config: &PracticeConfig) -> Self {
        GestureClassifier {
            threshold: config.swipe_threshold,
            jitter_radius: config.jitter_radius,
            edge_margin: config.edge_margin,
            tap_policy: config.tap_policy,
            drag: None,
        }
    }

    pub fn tap_policy(&self) -> TapPolicy {
        self.tap_policy
    }

    /// Item id of the interaction in flight, if any.
    pub fn in_flight(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.item_id.as_str())
    }

    /// Begins an interaction. Returns false when it is rejected: another
    /// interaction is in flight, the item is being removed, or the pointer
    /// went down inside the reserved left edge.
    pub fn down(&mut self, item_id: &str, x: f64, y: f64, removing: bool) -> bool {
        if self.drag.is_some() || removing || x < self.edge_margin {
            return false;
        }
        self.drag = Some(Drag {
            item_id: item_id.to_string(),
            start_x: x,
            start_y: y,
            current_x: x,
            axis: None,
        });
        true
    }

    /// Feeds a pointer move. Returns feedback only for a horizontal drag.
    pub fn move_to(&mut self, x: f64, y: f64) -> Option<SwipeFeedback> {
        let drag = self.drag.as_mut()?;
        let dx = x - drag.start_x;
        let dy = y - drag.start_y;

        if drag.axis.is_none() && (dx.abs() > self.jitter_radius || dy.abs() > self.jitter_radius)
        {
            drag.axis = Some(if dx.abs() > dy.abs() {
                Axis::Horizontal
            } else {
                Axis::Vertical
            });
        }

        if drag.axis != Some(Axis::Horizontal) {
            return None;
        }

        drag.current_x = x;
        let strength = (dx.abs() / self.threshold).min(1.0);
        Some(if dx > 0.0 {
            SwipeFeedback {
                offset: dx,
                complete: strength,
                worked_on: 0.0,
            }
        } else {
            SwipeFeedback {
                offset: dx,
                complete: 0.0,
                worked_on: strength,
            }
        })
    }

    /// Ends the interaction and classifies it.
    pub fn up(&mut self) -> Option<GestureRelease> {
        let drag = self.drag.take()?;
        let dx = drag.current_x - drag.start_x;

        let outcome = match drag.axis {
            Some(Axis::Horizontal) if dx >= self.threshold => GestureOutcome::Completed,
            Some(Axis::Horizontal) if dx <= -self.threshold => GestureOutcome::WorkedOn,
            Some(_) => GestureOutcome::None,
            None => match self.tap_policy {
                TapPolicy::Ignore => GestureOutcome::None,
                TapPolicy::ToggleWorkedOn => GestureOutcome::ToggleWorkedOn,
            },
        };

        Some(GestureRelease {
            item_id: drag.item_id,
            outcome,
        })
    }

    /// Abandons the interaction without an outcome.
    pub fn cancel(&mut self) -> Option<String> {
        self.drag.take().map(|d| d.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> GestureClassifier {
        GestureClassifier::new(&PracticeConfig::default())
    }

    fn swipe(c: &mut GestureClassifier, dx: f64, dy: f64) -> GestureOutcome {
        assert!(c.down("p_1", 100.0, 200.0, false));
        c.move_to(100.0 + dx, 200.0 + dy);
        c.up().unwrap().outcome
    }

    #[test]
    fn test_right_swipe_past_threshold_completes() {
        assert_eq!(swipe(&mut classifier(), 80.0, 3.0), GestureOutcome::Completed);
    }

    #[test]
    fn test_left_swipe_past_threshold_marks_worked_on() {
        assert_eq!(swipe(&mut classifier(), -95.0, 0.0), GestureOutcome::WorkedOn);
    }

    #[test]
    fn test_short_horizontal_swipe_is_noop() {
        assert_eq!(swipe(&mut classifier(), 79.0, 0.0), GestureOutcome::None);
    }

    #[test]
    fn test_vertical_drag_is_ignored_even_with_large_dx() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        // Locks vertical on the first move past the jitter radius.
        assert!(c.move_to(102.0, 220.0).is_none());
        assert!(c.move_to(300.0, 230.0).is_none());
        assert_eq!(c.up().unwrap().outcome, GestureOutcome::None);
    }

    #[test]
    fn test_jitter_does_not_lock_axis() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        assert!(c.move_to(106.0, 205.0).is_none());
        // Still unlocked, so a later horizontal move can lock horizontal.
        assert!(c.move_to(190.0, 205.0).is_some());
        assert_eq!(c.up().unwrap().outcome, GestureOutcome::Completed);
    }

    #[test]
    fn test_feedback_is_normalized_against_threshold() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));

        let half = c.move_to(140.0, 200.0).unwrap();
        assert_eq!(half.complete, 0.5);
        assert_eq!(half.worked_on, 0.0);

        let past = c.move_to(400.0, 200.0).unwrap();
        assert_eq!(past.complete, 1.0);

        let back = c.move_to(60.0, 200.0).unwrap();
        assert_eq!(back.complete, 0.0);
        assert_eq!(back.worked_on, 0.5);
    }

    #[test]
    fn test_release_uses_last_horizontal_position() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        c.move_to(200.0, 200.0);
        c.move_to(150.0, 200.0);
        assert_eq!(c.up().unwrap().outcome, GestureOutcome::None);
    }

    #[test]
    fn test_tap_is_noop_by_default() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        assert_eq!(c.up().unwrap().outcome, GestureOutcome::None);
    }

    #[test]
    fn test_tap_toggles_under_toggle_policy() {
        let mut c = GestureClassifier::new(&PracticeConfig {
            tap_policy: TapPolicy::ToggleWorkedOn,
            ..PracticeConfig::default()
        });
        assert!(c.down("p_1", 100.0, 200.0, false));
        c.move_to(103.0, 202.0);
        assert_eq!(c.up().unwrap().outcome, GestureOutcome::ToggleWorkedOn);
    }

    #[test]
    fn test_short_horizontal_drag_is_not_a_tap() {
        let mut c = GestureClassifier::new(&PracticeConfig {
            tap_policy: TapPolicy::ToggleWorkedOn,
            ..PracticeConfig::default()
        });
        assert_eq!(swipe(&mut c, 40.0, 0.0), GestureOutcome::None);
    }

    #[test]
    fn test_edge_margin_rejects_interaction() {
        let mut c = classifier();
        assert!(!c.down("p_1", 12.0, 200.0, false));
        assert!(c.in_flight().is_none());
        assert!(c.move_to(200.0, 200.0).is_none());
        assert!(c.up().is_none());
    }

    #[test]
    fn test_removing_item_rejects_interaction() {
        let mut c = classifier();
        assert!(!c.down("p_1", 100.0, 200.0, true));
        assert!(c.up().is_none());
    }

    #[test]
    fn test_second_interaction_rejected_while_in_flight() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        assert!(!c.down("p_2", 100.0, 260.0, false));
        assert_eq!(c.in_flight(), Some("p_1"));
    }

    #[test]
    fn test_cancel_clears_interaction() {
        let mut c = classifier();
        assert!(c.down("p_1", 100.0, 200.0, false));
        c.move_to(300.0, 200.0);
        assert_eq!(c.cancel().as_deref(), Some("p_1"));
        assert!(c.up().is_none());
        assert!(c.down("p_2", 100.0, 200.0, false));
    }
}
