//! Input mapping from raw events to semantic actions
//!
//! The generator runs on its own; keys only steer it.

use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Actions triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Exit application (Escape)
    Exit,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Shrink out the current gizmo and show gizmo N next (digit keys 1-9)
    JumpToGizmo(usize),
    /// Shrink out now and move on to the next phase (M key)
    SwitchMode,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `None` for releases and unmapped keys
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::KeyM => Some(InputAction::SwitchMode),
            _ => Self::digit(key).map(|n| InputAction::JumpToGizmo(n - 1)),
        }
    }

    fn digit(key: KeyCode) -> Option<usize> {
        let n = match key {
            KeyCode::Digit1 | KeyCode::Numpad1 => 1,
            KeyCode::Digit2 | KeyCode::Numpad2 => 2,
            KeyCode::Digit3 | KeyCode::Numpad3 => 3,
            KeyCode::Digit4 | KeyCode::Numpad4 => 4,
            KeyCode::Digit5 | KeyCode::Numpad5 => 5,
            KeyCode::Digit6 | KeyCode::Numpad6 => 6,
            KeyCode::Digit7 | KeyCode::Numpad7 => 7,
            KeyCode::Digit8 | KeyCode::Numpad8 => 8,
            KeyCode::Digit9 | KeyCode::Numpad9 => 9,
            _ => return None,
        };
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_exits() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert_eq!(action, Some(InputAction::Exit));
    }

    #[test]
    fn test_digits_jump_zero_based() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Digit1, ElementState::Pressed),
            Some(InputAction::JumpToGizmo(0))
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Numpad9, ElementState::Pressed),
            Some(InputAction::JumpToGizmo(8))
        );
        assert_eq!(InputMapper::map_keyboard(KeyCode::Digit0, ElementState::Pressed), None);
    }

    #[test]
    fn test_unmapped_keys() {
        for key in [KeyCode::KeyW, KeyCode::KeyA, KeyCode::Space] {
            let action = InputMapper::map_keyboard(key, ElementState::Pressed);
            assert_eq!(action, None, "Key {:?} should not be mapped", key);
        }
    }

    #[test]
    fn test_key_release_ignored() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Released);
        assert_eq!(action, None);
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::KeyF, ElementState::Pressed),
            Some(InputAction::ToggleFullscreen)
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::KeyM, ElementState::Pressed),
            Some(InputAction::SwitchMode)
        );
    }
}
