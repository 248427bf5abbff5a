use std::collections::HashSet;

use super::frame::{InputFrame, KeyPress};
use super::types::{InputEvent, Key, KeyState, Modifiers};

/// Current keyboard state for the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies one event to the held state and records its deltas into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered while unfocused.
                    self.keys_down.clear();
                    self.modifiers = Modifiers::NONE;
                }
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                repeat,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                        frame.presses.push(KeyPress {
                            key: *key,
                            modifiers: *modifiers,
                            repeat: *repeat,
                        });
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::NONE,
            code: 0,
            repeat,
        }
    }

    #[test]
    fn repeats_are_presses_but_not_edges() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, false));
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, true));
        state.apply_event(&mut frame, key(Key::ArrowUp, KeyState::Pressed, true));

        assert_eq!(frame.keys_pressed.len(), 1);
        assert_eq!(frame.presses.len(), 3);
        assert!(frame.presses[1].repeat);
        assert!(state.key_down(Key::ArrowUp));
    }

    #[test]
    fn release_clears_held_key() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Space, KeyState::Pressed, false));
        state.apply_event(&mut frame, key(Key::Space, KeyState::Released, false));

        assert!(!state.key_down(Key::Space));
        assert!(frame.keys_released.contains(&Key::Space));
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn focus_loss_drops_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::ModifiersChanged(Modifiers::SHIFT));
        state.apply_event(&mut frame, key(Key::X, KeyState::Pressed, false));
        state.apply_event(&mut frame, InputEvent::Focused(false));

        assert!(state.keys_down.is_empty());
        assert_eq!(state.modifiers, Modifiers::NONE);
    }

    #[test]
    fn frame_clear_resets_deltas() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::Z, KeyState::Pressed, false));

        frame.clear();
        assert!(frame.is_empty());
        assert!(frame.presses.is_empty());
        assert!(state.key_down(Key::Z));
    }
}
