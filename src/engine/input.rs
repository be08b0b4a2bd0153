use ahash::HashSet;

/// Keyboard state for the current frame.
#[derive(Default)]
pub struct InputState {
    key_pressed: HashSet<char>,
    key_just_pressed: HashSet<char>,
}

impl InputState {
    pub(crate) fn handle_key_event(&mut self, key: char, pressed: bool) {
        if pressed {
            // Holding a key down does not repeat the press.
            if self.key_pressed.insert(key) {
                self.key_just_pressed.insert(key);
            }
        } else {
            self.key_pressed.remove(&key);
        }
    }

    /// Reset data being tracked per frame.
    pub(crate) fn reset_current_frame(&mut self) {
        self.key_just_pressed.clear();
    }
}

impl InputState {
    pub fn key_just_pressed(&self, key: char) -> bool {
        self.key_just_pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_for_one_frame() {
        let mut input = InputState::default();
        input.handle_key_event('2', true);
        assert!(input.key_just_pressed('2'));
        assert!(input.key_pressed.contains(&'2'));

        input.reset_current_frame();
        assert!(!input.key_just_pressed('2'));
        assert!(input.key_pressed.contains(&'2'));

        // Repeat while held.
        input.handle_key_event('2', true);
        assert!(!input.key_just_pressed('2'));

        input.handle_key_event('2', false);
        assert!(!input.key_pressed.contains(&'2'));
        input.handle_key_event('2', true);
        assert!(input.key_just_pressed('2'));
    }
}
