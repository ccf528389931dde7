//=========================================================================
// Debounce Guard
//=========================================================================
//
// Drops repeated handler calls until a cooldown timer on the scene's
// before-render timeline has ended.
//
// Architecture:
//   call → bounced? ──yes──► false (dropped)
//                  └─no──► arm timer (window) → run handler
//   timer end → bounced = false
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::timeline::{Timeline, Timer};

/// Cooldown applied to bounced actions unless configured otherwise.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

//=== Debounce ============================================================

#[derive(Debug, Clone)]
pub struct Debounce {
    bounced: Rc<Cell<bool>>,
    window: Duration,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            bounced: Rc::new(Cell::new(false)),
            window,
        }
    }

    /// Runs `handler` unless a previous call is still cooling down.
    ///
    /// A dropped call returns `false`, the handler's "nothing to carry
    /// forward" value.
    pub fn call(&self, timeline: &Timeline, handler: impl FnOnce() -> bool) -> bool {
        if self.bounced.get() {
            trace!("Debounced call dropped");
            return false;
        }

        self.bounced.set(true);
        let bounced = Rc::clone(&self.bounced);
        timeline.schedule(Timer::new(self.window).on_end(move || bounced.set(false)));

        handler()
    }

    /// Returns `true` while calls are being dropped.
    pub fn is_bounced(&self) -> bool {
        self.bounced.get()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counted(count: &Rc<Cell<u32>>) -> impl FnOnce() -> bool {
        let count = Rc::clone(count);
        move || {
            count.set(count.get() + 1);
            true
        }
    }

    #[test]
    fn calls_inside_window_are_dropped() {
        let timeline = Timeline::new();
        let debounce = Debounce::default();
        let count = Rc::new(Cell::new(0));

        assert!(debounce.call(&timeline, counted(&count)));
        timeline.advance(Duration::from_millis(100));
        assert!(!debounce.call(&timeline, counted(&count)));

        assert_eq!(count.get(), 1);
        assert!(debounce.is_bounced());
    }

    #[test]
    fn call_after_window_goes_through() {
        let timeline = Timeline::new();
        let debounce = Debounce::default();
        let count = Rc::new(Cell::new(0));

        debounce.call(&timeline, counted(&count));
        timeline.advance(Duration::from_millis(100));
        debounce.call(&timeline, counted(&count));
        timeline.advance(Duration::from_millis(200));
        debounce.call(&timeline, counted(&count));

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn timer_only_fires_when_timeline_advances() {
        let timeline = Timeline::new();
        let debounce = Debounce::new(Duration::from_millis(10));

        debounce.call(&timeline, || false);
        std::thread::sleep(Duration::from_millis(20));

        assert!(debounce.is_bounced());
        timeline.advance(Duration::from_millis(10));
        assert!(!debounce.is_bounced());
    }

    #[test]
    fn clones_share_the_cooldown() {
        let timeline = Timeline::new();
        let debounce = Debounce::default();
        let copy = debounce.clone();

        debounce.call(&timeline, || true);
        assert!(!copy.call(&timeline, || true));
    }
}
