//! Binding string syntax for the `[Pad1]` section
//!
//! A binding is `SDL-<device_index>/<Token>`, where the token names a button
//! (`Button3`), a D-Pad direction (`DPadUp`), a trigger (`+LeftTrigger`), the
//! guide button, or a signed stick axis (`-LeftX`). The empty string means
//! unbound. The syntax is owned by the emulator; this module reproduces it
//! exactly and never invents tokens.

use crate::controls::LogicalControl;

/// Device namespace. The emulator's SDL input backend expects this literal.
pub const NAMESPACE: &str = "SDL";

/// A cardinal D-Pad direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Resolve a hat vector to a direction. Only the four cardinal unit
    /// vectors qualify; diagonals and the released state return `None`.
    pub fn from_vector(x: i8, y: i8) -> Option<Self> {
        match (x, y) {
            (0, 1) => Some(Direction::Up),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            _ => None,
        }
    }

    /// Token suffix, e.g. `DPadUp`.
    pub fn dpad_token(self) -> &'static str {
        match self {
            Direction::Up => "DPadUp",
            Direction::Right => "DPadRight",
            Direction::Down => "DPadDown",
            Direction::Left => "DPadLeft",
        }
    }
}

/// Binding prefix for a device, e.g. `SDL-0/`.
pub fn prefix(device_index: usize) -> String {
    format!("{}-{}/", NAMESPACE, device_index)
}

/// Binding for a physical button index, e.g. `SDL-0/Button3`.
pub fn button_binding(device_index: usize, button_index: u32) -> String {
    format!("{}Button{}", prefix(device_index), button_index)
}

/// Binding for a D-Pad direction, e.g. `SDL-0/DPadUp`.
pub fn dpad_binding(device_index: usize, direction: Direction) -> String {
    format!("{}{}", prefix(device_index), direction.dpad_token())
}

/// The nine derived keys written on every save, with their fixed tokens.
/// These are tied to the selected device index, not to user capture.
pub const DERIVED_TOKENS: [(LogicalControl, &str); 9] = [
    (LogicalControl::Analog, "Guide"),
    (LogicalControl::LLeft, "-LeftX"),
    (LogicalControl::LRight, "+LeftX"),
    (LogicalControl::LDown, "+LeftY"),
    (LogicalControl::LUp, "-LeftY"),
    (LogicalControl::RLeft, "-RightX"),
    (LogicalControl::RRight, "+RightX"),
    (LogicalControl::RDown, "+RightY"),
    (LogicalControl::RUp, "-RightY"),
];

/// The sixteen auto-configure template tokens, assuming a standard gamepad
/// layout. This is a fixed guess: the device's actual capability mapping is
/// not probed.
pub const AUTO_TOKENS: [(LogicalControl, &str); 16] = [
    (LogicalControl::Up, "DPadUp"),
    (LogicalControl::Right, "DPadRight"),
    (LogicalControl::Down, "DPadDown"),
    (LogicalControl::Left, "DPadLeft"),
    (LogicalControl::Triangle, "FaceNorth"),
    (LogicalControl::Circle, "FaceEast"),
    (LogicalControl::Cross, "FaceSouth"),
    (LogicalControl::Square, "FaceWest"),
    (LogicalControl::Select, "Back"),
    (LogicalControl::Start, "Start"),
    (LogicalControl::L1, "LeftShoulder"),
    (LogicalControl::R1, "RightShoulder"),
    (LogicalControl::L2, "+LeftTrigger"),
    (LogicalControl::R2, "+RightTrigger"),
    (LogicalControl::L3, "LeftStick"),
    (LogicalControl::R3, "RightStick"),
];

/// Display form of a binding: the part after the slash (`Button3` rather
/// than `SDL-0/Button3`). Unbound values pass through unchanged.
pub fn short_token(binding: &str) -> &str {
    binding.rsplit_once('/').map_or(binding, |(_, token)| token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinal_vectors_resolve() {
        assert_eq!(Direction::from_vector(0, 1), Some(Direction::Up));
        assert_eq!(Direction::from_vector(1, 0), Some(Direction::Right));
        assert_eq!(Direction::from_vector(0, -1), Some(Direction::Down));
        assert_eq!(Direction::from_vector(-1, 0), Some(Direction::Left));
    }

    #[test]
    fn test_non_cardinal_vectors_ignored() {
        assert_eq!(Direction::from_vector(0, 0), None);
        assert_eq!(Direction::from_vector(1, 1), None);
        assert_eq!(Direction::from_vector(-1, 1), None);
        assert_eq!(Direction::from_vector(1, -1), None);
    }

    #[test]
    fn test_binding_format() {
        assert_eq!(button_binding(0, 3), "SDL-0/Button3");
        assert_eq!(button_binding(2, 11), "SDL-2/Button11");
        assert_eq!(dpad_binding(1, Direction::Up), "SDL-1/DPadUp");
    }

    #[test]
    fn test_short_token() {
        assert_eq!(short_token("SDL-0/Button3"), "Button3");
        assert_eq!(short_token("SDL-2/+LeftTrigger"), "+LeftTrigger");
        assert_eq!(short_token(""), "");
        assert_eq!(short_token("Button3"), "Button3");
    }
}
