use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// How long an armed delete trigger stays armed before reverting.
pub const CONFIRM_WINDOW: Duration = Duration::from_millis(2000);

/// Outcome of pressing a delete trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// First activation: the trigger is now armed and shows its
    /// confirmation label until the window elapses.
    Armed,
    /// Second activation inside the window: the caller should delete now.
    Confirmed,
}

/// Per-task two-phase delete confirmation.
///
/// A timed two-phase button instead of a modal prompt, since the host
/// environment may suppress blocking dialogs. The clock is passed in by the
/// caller so tests can drive the window deterministically.
#[derive(Debug, Default)]
pub struct DeleteConfirm {
    armed: HashMap<Uuid, Instant>,
}

impl DeleteConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate the trigger for `id`. Within the window of a previous
    /// activation this confirms; otherwise it (re-)arms. The window is
    /// governed by the first arming — confirming never restarts it.
    pub fn press(&mut self, id: Uuid, now: Instant) -> Press {
        match self.armed.get(&id) {
            Some(&armed_at) if now.duration_since(armed_at) < CONFIRM_WINDOW => {
                self.armed.remove(&id);
                Press::Confirmed
            }
            _ => {
                self.armed.insert(id, now);
                Press::Armed
            }
        }
    }

    pub fn is_armed(&self, id: Uuid, now: Instant) -> bool {
        self.armed
            .get(&id)
            .is_some_and(|&armed_at| now.duration_since(armed_at) < CONFIRM_WINDOW)
    }

    /// Revert expired armings. Returns true when anything changed so the
    /// caller knows a label needs repainting.
    pub fn tick(&mut self, now: Instant) -> bool {
        let before = self.armed.len();
        self.armed
            .retain(|_, armed_at| now.duration_since(*armed_at) < CONFIRM_WINDOW);
        self.armed.len() != before
    }

    /// Drop any arming for a removed row so a stale timer never acts on a
    /// trigger that no longer exists.
    pub fn clear(&mut self, id: Uuid) {
        self.armed.remove(&id);
    }

    pub fn any_armed(&self) -> bool {
        !self.armed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_arms() {
        let mut confirm = DeleteConfirm::new();
        let id = Uuid::new_v4();
        let t0 = Instant::now();
        assert_eq!(confirm.press(id, t0), Press::Armed);
        assert!(confirm.is_armed(id, t0));
    }

    #[test]
    fn second_press_within_window_confirms() {
        let mut confirm = DeleteConfirm::new();
        let id = Uuid::new_v4();
        let t0 = Instant::now();
        confirm.press(id, t0);
        let t1 = t0 + Duration::from_millis(1999);
        assert_eq!(confirm.press(id, t1), Press::Confirmed);
        assert!(!confirm.is_armed(id, t1));
    }

    #[test]
    fn press_after_window_rearms() {
        let mut confirm = DeleteConfirm::new();
        let id = Uuid::new_v4();
        let t0 = Instant::now();
        confirm.press(id, t0);
        let t1 = t0 + CONFIRM_WINDOW;
        assert_eq!(confirm.press(id, t1), Press::Armed);
        assert!(confirm.is_armed(id, t1));
    }

    #[test]
    fn tick_reverts_expired_armings() {
        let mut confirm = DeleteConfirm::new();
        let id = Uuid::new_v4();
        let t0 = Instant::now();
        confirm.press(id, t0);
        assert!(!confirm.tick(t0 + Duration::from_millis(500)));
        assert!(confirm.is_armed(id, t0 + Duration::from_millis(500)));
        assert!(confirm.tick(t0 + CONFIRM_WINDOW));
        assert!(!confirm.is_armed(id, t0 + CONFIRM_WINDOW));
    }

    #[test]
    fn triggers_are_independent_per_task() {
        let mut confirm = DeleteConfirm::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let t0 = Instant::now();
        confirm.press(a, t0);
        assert_eq!(confirm.press(b, t0), Press::Armed);
        assert_eq!(confirm.press(a, t0 + Duration::from_millis(100)), Press::Confirmed);
        assert!(confirm.is_armed(b, t0 + Duration::from_millis(100)));
    }

    #[test]
    fn clear_disarms_removed_row() {
        let mut confirm = DeleteConfirm::new();
        let id = Uuid::new_v4();
        let t0 = Instant::now();
        confirm.press(id, t0);
        confirm.clear(id);
        assert!(!confirm.is_armed(id, t0));
        assert_eq!(confirm.press(id, t0 + Duration::from_millis(10)), Press::Armed);
    }
}
