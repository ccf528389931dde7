//=========================================================================
// Input Buffer
//
// Collects device events between two frame boundaries and hands them to
// the frame callback in one batch.
//
// Responsibilities:
// - Keep discrete events (keys, buttons, connects) in arrival order
// - Drop consecutive duplicate discrete events (OS key repeat)
// - Coalesce continuous events: only the latest pointer move and the
//   latest stick reading per gamepad survive
//
// Notes:
// The buffer is drained on every `RedrawRequested`, so its contents
// never outlive one frame.
//=========================================================================

//=== Internal Modules ====================================================
use crate::core::input::DeviceEvent;

//=== InputBuffer Struct ==================================================

pub(crate) struct InputBuffer {
    discrete: Vec<DeviceEvent>,
    continuous: Vec<DeviceEvent>,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------
    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 64;
        const CONTINUOUS_BASE: usize = 4;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: Vec::with_capacity(CONTINUOUS_BASE),
        }
    }

    //--- push() -----------------------------------------------------------
    //
    // Routes the event to the discrete or continuous store depending on
    // `DeviceEvent::is_continuous`.
    //
    pub(crate) fn push(&mut self, event: DeviceEvent) {
        if event.is_continuous() {
            self.push_continuous(event);
        } else {
            self.push_discrete(event);
        }
    }

    fn push_discrete(&mut self, event: DeviceEvent) {
        if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    fn push_continuous(&mut self, event: DeviceEvent) {
        match self.continuous.iter_mut().find(|e| same_source(e, &event)) {
            Some(slot) => *slot = event,
            None => self.continuous.push(event),
        }
    }

    //--- drain() ----------------------------------------------------------
    //
    // Returns discrete events followed by the coalesced continuous ones
    // and leaves the buffer empty with its capacity intact.
    //
    pub(crate) fn drain(&mut self) -> Vec<DeviceEvent> {
        let mut events = Vec::with_capacity(self.len());
        events.append(&mut self.discrete);
        events.append(&mut self.continuous);
        events
    }

    //--- Utilities --------------------------------------------------------
    pub(crate) fn len(&self) -> usize {
        self.discrete.len() + self.continuous.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

fn same_source(a: &DeviceEvent, b: &DeviceEvent) -> bool {
    match (a, b) {
        (DeviceEvent::Pointer(_), DeviceEvent::Pointer(_)) => true,
        (DeviceEvent::GamepadSticks { gamepad: x, .. }, DeviceEvent::GamepadSticks { gamepad: y, .. }) => x == y,
        _ => false,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
