//=========================================================================
// Input Map
//
// Shared pressed-input mapping written by device adapters and read by
// the Input Manager once per tick.
//
// Responsibilities:
// - Record the most recent raw event per pressed input
// - Forget an input on release (absence = not pressed)
// - Preserve press order so projection into actions is stable
//
// Notes:
// The map is owned by the Input Manager; adapters only receive it by
// mutable reference while being polled.
//
//=========================================================================

//=== Internal Modules ====================================================
use crate::core::input::event::{InputKey, RawInputEvent};

//=== InputMap ============================================================
//
// Insertion-ordered map from `InputKey` to the last `RawInputEvent`.
// Re-pressing a held input refreshes its event in place.
//
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputMap {
    entries: Vec<(InputKey, RawInputEvent)>,
}

impl InputMap {
    //--- Constructor ------------------------------------------------------
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    //--- press() ----------------------------------------------------------
    //
    // Records `event` as the latest event for `key`.
    // Returns `true` if the key was not pressed before.
    //
    pub fn press(&mut self, key: InputKey, event: RawInputEvent) -> bool {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                entry.1 = event;
                false
            }
            None => {
                self.entries.push((key, event));
                true
            }
        }
    }

    //--- release() --------------------------------------------------------
    //
    // Forgets `key`. Returns the event it held, if any.
    //
    pub fn release(&mut self, key: &InputKey) -> Option<RawInputEvent> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, key: &InputKey) -> Option<&RawInputEvent> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn is_pressed(&self, key: &InputKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterates pressed inputs in press order.
    pub fn iter(&self) -> impl Iterator<Item = (&InputKey, &RawInputEvent)> {
        self.entries.iter().map(|(k, e)| (k, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&InputKey, &RawInputEvent) -> bool) {
        self.entries.retain(|(k, e)| keep(k, e));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyCode, KeyboardInfo};

    fn key_event(key: KeyCode) -> RawInputEvent {
        RawInputEvent::Keyboard(KeyboardInfo::down(key))
    }

    #[test]
    fn press_and_release() {
        let mut map = InputMap::new();
        let w = InputKey::Key(KeyCode::KeyW);

        assert!(map.press(w, key_event(KeyCode::KeyW)));
        assert!(map.is_pressed(&w));

        assert!(map.release(&w).is_some());
        assert!(!map.is_pressed(&w));
        assert!(map.release(&w).is_none());
    }

    #[test]
    fn repeated_press_refreshes_without_duplicating() {
        let mut map = InputMap::new();
        let tap = InputKey::PointerTap;

        assert!(map.press(tap, key_event(KeyCode::KeyA)));
        assert!(!map.press(tap, key_event(KeyCode::KeyB)));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&tap), Some(&key_event(KeyCode::KeyB)));
    }

    #[test]
    fn iteration_follows_press_order() {
        let mut map = InputMap::new();
        map.press(InputKey::Key(KeyCode::KeyS), key_event(KeyCode::KeyS));
        map.press(InputKey::Key(KeyCode::KeyW), key_event(KeyCode::KeyW));
        map.press(InputKey::Key(KeyCode::KeyA), key_event(KeyCode::KeyA));
        map.release(&InputKey::Key(KeyCode::KeyW));

        let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![InputKey::Key(KeyCode::KeyS), InputKey::Key(KeyCode::KeyA)]
        );
    }
}
