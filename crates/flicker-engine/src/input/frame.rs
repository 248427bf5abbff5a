use std::collections::HashSet;

use super::types::{InputEvent, Key, Modifiers};

/// One key press, including auto-repeats, in arrival order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    pub repeat: bool,
}

/// Per-frame input deltas.
///
/// `InputState` holds what is currently down; `InputFrame` holds what happened
/// since the last frame. Cleared by the runtime after every `on_frame`.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys that went down this frame (edges only, no repeats).
    pub keys_pressed: HashSet<Key>,

    pub keys_released: HashSet<Key>,

    /// Every press this frame. Holding a key yields one entry per repeat.
    pub presses: Vec<KeyPress>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.presses.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
