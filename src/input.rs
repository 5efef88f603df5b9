/// Key codes, numbered like the virtual-key codes of a desktop keyboard.
pub type KeyCode = u8;

pub mod keys {
    use super::KeyCode;

    pub const LBUTTON: KeyCode = 0x01;
    pub const RBUTTON: KeyCode = 0x02;
    pub const MBUTTON: KeyCode = 0x04;
    pub const XBUTTON1: KeyCode = 0x05;
    pub const XBUTTON2: KeyCode = 0x06;

    pub const BACKSPACE: KeyCode = 0x08;
    pub const TAB: KeyCode = 0x09;
    pub const RETURN: KeyCode = 0x0D;
    pub const ESCAPE: KeyCode = 0x1B;
    pub const SPACE: KeyCode = 0x20;
    pub const LEFT: KeyCode = 0x25;
    pub const UP: KeyCode = 0x26;
    pub const RIGHT: KeyCode = 0x27;
    pub const DOWN: KeyCode = 0x28;

    /// Letters and digits use their uppercase ASCII value.
    pub const fn char_key(ch: char) -> Option<KeyCode> {
        let upper = ch.to_ascii_uppercase();
        if upper.is_ascii_uppercase() || upper.is_ascii_digit() {
            Some(upper as KeyCode)
        } else {
            None
        }
    }
}

/// Codes that belong to the pointer rather than the keyboard.
pub const POINTER_BUTTONS: [KeyCode; 5] = [
    keys::LBUTTON,
    keys::RBUTTON,
    keys::MBUTTON,
    keys::XBUTTON1,
    keys::XBUTTON2,
];

const NUM_KEY_STATES: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyState {
    Released,
    JustReleased,
    Pressed,
    JustPressed,
}

impl KeyState {
    pub fn is_up(self) -> bool {
        matches!(self, KeyState::Released | KeyState::JustReleased)
    }

    pub fn is_down(self) -> bool {
        matches!(self, KeyState::Pressed | KeyState::JustPressed)
    }
}

/// Anything that can tell whether a key is physically held right now.
pub trait RawKeySource {
    fn is_key_down(&self, code: KeyCode) -> bool;
}

/// Next logical state of a key given its previous state and the raw sample.
pub fn next_key_state(prev: KeyState, raw_down: bool) -> KeyState {
    if raw_down {
        if prev.is_up() { KeyState::JustPressed } else { KeyState::Pressed }
    } else {
        if prev.is_down() { KeyState::JustReleased } else { KeyState::Released }
    }
}

/// Per-key edge detection over a polled key source.
///
/// `update` must run exactly once per tick, before any query, or the
/// one-shot `JustPressed`/`JustReleased` states lose their meaning.
pub struct InputTracker {
    key_states: [KeyState; NUM_KEY_STATES],
}

impl InputTracker {
    pub fn new() -> Self {
        InputTracker { key_states: [KeyState::Released; NUM_KEY_STATES] }
    }

    pub fn update<S: RawKeySource + ?Sized>(&mut self, source: &S) {
        for (code, state) in self.key_states.iter_mut().enumerate() {
            *state = next_key_state(*state, source.is_key_down(code as KeyCode));
        }
    }

    pub fn state(&self, key: KeyCode) -> KeyState {
        self.key_states[key as usize]
    }

    pub fn key_is_up(&self, key: KeyCode) -> bool {
        self.state(key).is_up()
    }

    pub fn key_is_down(&self, key: KeyCode) -> bool {
        self.state(key).is_down()
    }

    pub fn key_pressed_now(&self, key: KeyCode) -> bool {
        self.state(key) == KeyState::JustPressed
    }

    pub fn key_released_now(&self, key: KeyCode) -> bool {
        self.state(key) == KeyState::JustReleased
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether any key outside `excluded` went down this tick.
pub fn any_key_pressed(tracker: &InputTracker, excluded: &[KeyCode]) -> bool {
    (0..NUM_KEY_STATES)
        .map(|code| code as KeyCode)
        .filter(|code| !excluded.contains(code))
        .any(|code| tracker.key_pressed_now(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeyState::*;

    const ALL_STATES: [KeyState; 4] = [Released, JustReleased, Pressed, JustPressed];

    #[derive(Default)]
    struct FakeKeys {
        down: Vec<KeyCode>,
    }

    impl FakeKeys {
        fn holding(down: &[KeyCode]) -> Self {
            FakeKeys { down: down.to_vec() }
        }
    }

    impl RawKeySource for FakeKeys {
        fn is_key_down(&self, code: KeyCode) -> bool {
            self.down.contains(&code)
        }
    }

    #[test]
    fn transition_table() {
        assert_eq!(next_key_state(Released, true), JustPressed);
        assert_eq!(next_key_state(JustReleased, true), JustPressed);
        assert_eq!(next_key_state(Pressed, true), Pressed);
        assert_eq!(next_key_state(JustPressed, true), Pressed);

        assert_eq!(next_key_state(Released, false), Released);
        assert_eq!(next_key_state(JustReleased, false), Released);
        assert_eq!(next_key_state(Pressed, false), JustReleased);
        assert_eq!(next_key_state(JustPressed, false), JustReleased);
    }

    #[test]
    fn up_and_down_are_complementary() {
        for state in ALL_STATES.iter() {
            assert_ne!(state.is_up(), state.is_down(), "{:?}", state);
        }
    }

    #[test]
    fn starts_all_released() {
        let tracker = InputTracker::new();
        for code in 0..=255u8 {
            assert_eq!(tracker.state(code), Released);
        }
    }

    #[test]
    fn press_hold_release_sequence() {
        let mut tracker = InputTracker::new();
        let k = keys::char_key('k').unwrap();

        tracker.update(&FakeKeys::holding(&[k]));
        assert_eq!(tracker.state(k), JustPressed);
        assert!(tracker.key_pressed_now(k));

        tracker.update(&FakeKeys::holding(&[k]));
        assert_eq!(tracker.state(k), Pressed);
        assert!(tracker.key_is_down(k));
        assert!(!tracker.key_pressed_now(k));

        tracker.update(&FakeKeys::default());
        assert_eq!(tracker.state(k), JustReleased);
        assert!(tracker.key_released_now(k));
        assert!(tracker.key_is_up(k));

        tracker.update(&FakeKeys::default());
        assert_eq!(tracker.state(k), Released);
        assert!(!tracker.key_released_now(k));
    }

    #[test]
    fn press_edge_fires_once_while_held() {
        let mut tracker = InputTracker::new();
        let held = FakeKeys::holding(&[keys::SPACE]);

        let edges = (0..10)
            .filter(|_| {
                tracker.update(&held);
                tracker.key_pressed_now(keys::SPACE)
            })
            .count();

        assert_eq!(edges, 1);
        assert_eq!(tracker.state(keys::SPACE), Pressed);
    }

    #[test]
    fn release_edge_fires_once() {
        let mut tracker = InputTracker::new();
        tracker.update(&FakeKeys::holding(&[keys::UP]));
        tracker.update(&FakeKeys::holding(&[keys::UP]));

        let released = FakeKeys::default();
        let edges = (0..10)
            .filter(|_| {
                tracker.update(&released);
                tracker.key_released_now(keys::UP)
            })
            .count();

        assert_eq!(edges, 1);
        assert_eq!(tracker.state(keys::UP), Released);
    }

    #[test]
    fn other_keys_are_untouched() {
        let mut tracker = InputTracker::new();
        tracker.update(&FakeKeys::holding(&[keys::LEFT]));
        assert!(tracker.key_pressed_now(keys::LEFT));
        assert!(tracker.key_is_up(keys::RIGHT));
        assert!(tracker.key_is_up(keys::ESCAPE));
    }

    #[test]
    fn any_key_ignores_excluded_codes() {
        let mut tracker = InputTracker::new();
        tracker.update(&FakeKeys::holding(&[keys::LBUTTON, keys::XBUTTON2]));
        assert!(any_key_pressed(&tracker, &[]));
        assert!(!any_key_pressed(&tracker, &POINTER_BUTTONS));

        tracker.update(&FakeKeys::holding(&[keys::LBUTTON, keys::XBUTTON2, keys::RETURN]));
        assert!(any_key_pressed(&tracker, &POINTER_BUTTONS));
    }

    #[test]
    fn any_key_only_reports_fresh_presses() {
        let mut tracker = InputTracker::new();
        let held = FakeKeys::holding(&[keys::TAB]);
        tracker.update(&held);
        assert!(any_key_pressed(&tracker, &POINTER_BUTTONS));
        tracker.update(&held);
        assert!(!any_key_pressed(&tracker, &POINTER_BUTTONS));
    }

    #[test]
    fn char_keys_map_to_uppercase_ascii() {
        assert_eq!(keys::char_key('w'), Some(b'W'));
        assert_eq!(keys::char_key('W'), Some(b'W'));
        assert_eq!(keys::char_key('7'), Some(b'7'));
        assert_eq!(keys::char_key('#'), None);
        assert_eq!(keys::char_key('é'), None);
    }
}
