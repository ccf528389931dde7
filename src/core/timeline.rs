//=========================================================================
// Timeline
//=========================================================================
//
// Cooperative timers driven by a scene's before-render tick.
//
// Architecture:
//   schedule(Timer) → pending timers
//   advance(delta)  → on_tick(progress) → on_end() when elapsed ≥ timeout
//
// Timers never fire on their own: they only progress when the owning
// scene advances its timeline at a frame boundary. A timer cancelled from
// a callback during `advance` is skipped for the rest of that advance.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Duration;

//=== TimerHandle =========================================================

/// Identifies a scheduled timer for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

//=== TimerProgress =======================================================

/// Snapshot handed to a timer's tick callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerProgress {
    /// Time elapsed since the timer was scheduled.
    pub elapsed: Duration,

    /// Time elapsed since the previous tick.
    pub delta: Duration,

    /// `elapsed / timeout`, clamped to `[0, 1]`.
    pub completion: f32,
}

//=== Timer ===============================================================

/// A one-shot timer definition.
///
/// ```
/// use std::time::Duration;
/// use space_trucker::core::timeline::{Timeline, Timer};
///
/// let timeline = Timeline::new();
/// timeline.schedule(
///     Timer::new(Duration::from_millis(250)).on_end(|| println!("done")),
/// );
/// timeline.advance(Duration::from_millis(300));
/// ```
pub struct Timer {
    timeout: Duration,
    on_tick: Option<Box<dyn FnMut(TimerProgress)>>,
    on_end: Option<Box<dyn FnOnce()>>,
}

impl Timer {
    /// Creates a timer that ends once `timeout` has elapsed on the timeline.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            on_tick: None,
            on_end: None,
        }
    }

    /// Callback invoked on every timeline advance while the timer runs.
    pub fn on_tick(mut self, callback: impl FnMut(TimerProgress) + 'static) -> Self {
        self.on_tick = Some(Box::new(callback));
        self
    }

    /// Callback invoked once when the timer ends.
    pub fn on_end(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }
}

struct Running {
    handle: TimerHandle,
    elapsed: Duration,
    timer: Timer,
}

//=== Timeline ============================================================

/// Per-scene timer queue advanced once per rendered frame.
pub struct Timeline {
    timers: RefCell<Vec<Running>>,
    next_handle: Cell<u64>,
    now: Cell<Duration>,

    /// Timers taken out of `timers` by the current `advance`.
    in_flight: RefCell<Vec<TimerHandle>>,
    cancelled: RefCell<Vec<TimerHandle>>,
}

impl Timeline {
    /// Creates an empty timeline at time zero.
    pub fn new() -> Self {
        Self {
            timers: RefCell::new(Vec::new()),
            next_handle: Cell::new(0),
            now: Cell::new(Duration::ZERO),
            in_flight: RefCell::new(Vec::new()),
            cancelled: RefCell::new(Vec::new()),
        }
    }

    /// Schedules a timer starting at the current timeline position.
    pub fn schedule(&self, timer: Timer) -> TimerHandle {
        let handle = TimerHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.timers.borrow_mut().push(Running {
            handle,
            elapsed: Duration::ZERO,
            timer,
        });
        handle
    }

    /// Cancels a pending timer without running its end callback.
    /// Returns `false` if the timer already ended or was cancelled.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        {
            let mut timers = self.timers.borrow_mut();
            let before = timers.len();
            timers.retain(|t| t.handle != handle);
            if timers.len() != before {
                return true;
            }
        }

        let mut cancelled = self.cancelled.borrow_mut();
        if self.in_flight.borrow().contains(&handle) && !cancelled.contains(&handle) {
            cancelled.push(handle);
            return true;
        }
        false
    }

    fn is_cancelled(&self, handle: TimerHandle) -> bool {
        self.cancelled.borrow().contains(&handle)
    }

    /// Advances every pending timer by `delta`.
    ///
    /// Callbacks run without the timer list borrowed, so they may schedule
    /// or cancel timers; new timers start on the next advance.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);

        let mut active = std::mem::take(&mut *self.timers.borrow_mut());
        *self.in_flight.borrow_mut() = active.iter().map(|t| t.handle).collect();
        let mut survivors = Vec::with_capacity(active.len());

        for mut running in active.drain(..) {
            if self.is_cancelled(running.handle) {
                continue;
            }
            running.elapsed += delta;
            let completion = if running.timer.timeout.is_zero() {
                1.0
            } else {
                (running.elapsed.as_secs_f32() / running.timer.timeout.as_secs_f32()).min(1.0)
            };

            if let Some(on_tick) = running.timer.on_tick.as_mut() {
                on_tick(TimerProgress {
                    elapsed: running.elapsed,
                    delta,
                    completion,
                });
            }

            if self.is_cancelled(running.handle) {
                continue;
            }
            if running.elapsed >= running.timer.timeout {
                self.in_flight.borrow_mut().retain(|h| *h != running.handle);
                if let Some(on_end) = running.timer.on_end.take() {
                    on_end();
                }
            } else {
                survivors.push(running);
            }
        }

        self.in_flight.borrow_mut().clear();
        let cancelled = std::mem::take(&mut *self.cancelled.borrow_mut());
        survivors.retain(|t| !cancelled.contains(&t.handle));

        let mut timers = self.timers.borrow_mut();
        survivors.append(&mut timers);
        *timers = survivors;
    }

    /// Total time this timeline has been advanced.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers still pending.
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
