//! Platform abstraction layer
//!
//! Raw device input is mapped onto a fixed action vocabulary here. The engine
//! never sees key codes.
//!
//! - Keyboard bindings (held movement, one-shot actions)
//! - Pointer gestures (swipes and taps)
//! - Wall-clock timestamps for records

use serde::{Deserialize, Serialize};

/// Minimum pointer travel (pixels) for a gesture to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// Discrete player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    ChangeShape,
    ChangeColor,
    Pause,
}

/// Keys polled every step for continuous movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeldKey {
    Left,
    Right,
}

/// What a physical key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBinding {
    /// Movement while held
    Hold(HeldKey),
    /// Fires once on key down
    Action(InputAction),
}

/// Map a `KeyboardEvent.key` value to a binding
pub fn key_binding(key: &str) -> Option<KeyBinding> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(KeyBinding::Hold(HeldKey::Left)),
        "ArrowRight" | "d" | "D" => Some(KeyBinding::Hold(HeldKey::Right)),
        "ArrowUp" | "w" | "W" | " " => Some(KeyBinding::Action(InputAction::ChangeShape)),
        "ArrowDown" | "s" | "S" => Some(KeyBinding::Action(InputAction::ChangeColor)),
        "Escape" | "p" | "P" => Some(KeyBinding::Action(InputAction::Pause)),
        _ => None,
    }
}

/// Map a completed pointer gesture to an action.
///
/// Long horizontal drags step the catcher, long vertical drags cycle
/// (up = shape, down = color) and short gestures are taps that cycle shape.
pub fn gesture_action(dx: f32, dy: f32) -> InputAction {
    if dx.abs() <= SWIPE_THRESHOLD && dy.abs() <= SWIPE_THRESHOLD {
        return InputAction::ChangeShape;
    }
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            InputAction::MoveRight
        } else {
            InputAction::MoveLeft
        }
    } else if dy > 0.0 {
        InputAction::ChangeColor
    } else {
        InputAction::ChangeShape
    }
}

/// Wall-clock time as Unix milliseconds (timestamps only, never simulation)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

/// Held-key snapshot, queried once per simulation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    left: bool,
    right: bool,
}

impl KeyState {
    pub fn set(&mut self, key: HeldKey, held: bool) {
        match key {
            HeldKey::Left => self.left = held,
            HeldKey::Right => self.right = held,
        }
    }

    pub fn is_held(&self, key: HeldKey) -> bool {
        match key {
            HeldKey::Left => self.left,
            HeldKey::Right => self.right,
        }
    }

    /// Drop everything (focus lost)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_binding("ArrowLeft"), Some(KeyBinding::Hold(HeldKey::Left)));
        assert_eq!(key_binding("d"), Some(KeyBinding::Hold(HeldKey::Right)));
        assert_eq!(
            key_binding(" "),
            Some(KeyBinding::Action(InputAction::ChangeShape))
        );
        assert_eq!(
            key_binding("ArrowDown"),
            Some(KeyBinding::Action(InputAction::ChangeColor))
        );
        assert_eq!(key_binding("Escape"), Some(KeyBinding::Action(InputAction::Pause)));
        assert_eq!(key_binding("q"), None);
    }

    #[test]
    fn test_gestures() {
        assert_eq!(gesture_action(5.0, -3.0), InputAction::ChangeShape);
        assert_eq!(gesture_action(80.0, 10.0), InputAction::MoveRight);
        assert_eq!(gesture_action(-80.0, 10.0), InputAction::MoveLeft);
        assert_eq!(gesture_action(10.0, 60.0), InputAction::ChangeColor);
        assert_eq!(gesture_action(10.0, -60.0), InputAction::ChangeShape);
    }

    #[test]
    fn test_key_state() {
        let mut keys = KeyState::default();
        keys.set(HeldKey::Left, true);
        assert!(keys.is_held(HeldKey::Left));
        assert!(!keys.is_held(HeldKey::Right));
        keys.release_all();
        assert!(!keys.is_held(HeldKey::Left));
    }
}
