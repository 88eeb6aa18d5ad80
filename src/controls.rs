//! Logical pad controls and their fixed translation tables
//!
//! The virtual pad layout is closed: sixteen capturable controls (face
//! buttons, D-Pad, shoulders, stick clicks, menu buttons), the guide button,
//! and eight stick-axis pseudo-controls whose bindings are derived rather
//! than captured. Internal state is always keyed by [`LogicalControl`];
//! the case-sensitive `[Pad1]` key strings exist only at the file boundary.

use gilrs::Button;
use tracing::warn;

/// One named element of the virtual pad layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalControl {
    Up,
    Right,
    Down,
    Left,
    Triangle,
    Circle,
    Cross,
    Square,
    Select,
    Start,
    L1,
    L2,
    R1,
    R2,
    L3,
    R3,
    /// Analog/guide toggle. Derived on save, never captured.
    Analog,
    // Stick-axis pseudo-controls, derived from the selected device index.
    LLeft,
    LRight,
    LDown,
    LUp,
    RLeft,
    RRight,
    RDown,
    RUp,
}

/// The sixteen user-capturable controls, in canonical file order.
pub const CAPTURABLE: [LogicalControl; 16] = [
    LogicalControl::Up,
    LogicalControl::Right,
    LogicalControl::Down,
    LogicalControl::Left,
    LogicalControl::Triangle,
    LogicalControl::Circle,
    LogicalControl::Cross,
    LogicalControl::Square,
    LogicalControl::Select,
    LogicalControl::Start,
    LogicalControl::L1,
    LogicalControl::L2,
    LogicalControl::R1,
    LogicalControl::R2,
    LogicalControl::L3,
    LogicalControl::R3,
];

impl LogicalControl {
    /// Exact `[Pad1]` key for this control. Case matters: the emulator's
    /// parser will not recognize a lower-cased key.
    pub fn ini_key(self) -> &'static str {
        match self {
            LogicalControl::Up => "Up",
            LogicalControl::Right => "Right",
            LogicalControl::Down => "Down",
            LogicalControl::Left => "Left",
            LogicalControl::Triangle => "Triangle",
            LogicalControl::Circle => "Circle",
            LogicalControl::Cross => "Cross",
            LogicalControl::Square => "Square",
            LogicalControl::Select => "Select",
            LogicalControl::Start => "Start",
            LogicalControl::L1 => "L1",
            LogicalControl::L2 => "L2",
            LogicalControl::R1 => "R1",
            LogicalControl::R2 => "R2",
            LogicalControl::L3 => "L3",
            LogicalControl::R3 => "R3",
            LogicalControl::Analog => "Analog",
            LogicalControl::LLeft => "LLeft",
            LogicalControl::LRight => "LRight",
            LogicalControl::LDown => "LDown",
            LogicalControl::LUp => "LUp",
            LogicalControl::RLeft => "RLeft",
            LogicalControl::RRight => "RRight",
            LogicalControl::RDown => "RDown",
            LogicalControl::RUp => "RUp",
        }
    }

    /// Reverse lookup from an exact `[Pad1]` key.
    pub fn from_ini_key(key: &str) -> Option<Self> {
        match key {
            "Up" => Some(LogicalControl::Up),
            "Right" => Some(LogicalControl::Right),
            "Down" => Some(LogicalControl::Down),
            "Left" => Some(LogicalControl::Left),
            "Triangle" => Some(LogicalControl::Triangle),
            "Circle" => Some(LogicalControl::Circle),
            "Cross" => Some(LogicalControl::Cross),
            "Square" => Some(LogicalControl::Square),
            "Select" => Some(LogicalControl::Select),
            "Start" => Some(LogicalControl::Start),
            "L1" => Some(LogicalControl::L1),
            "L2" => Some(LogicalControl::L2),
            "R1" => Some(LogicalControl::R1),
            "R2" => Some(LogicalControl::R2),
            "L3" => Some(LogicalControl::L3),
            "R3" => Some(LogicalControl::R3),
            "Analog" => Some(LogicalControl::Analog),
            "LLeft" => Some(LogicalControl::LLeft),
            "LRight" => Some(LogicalControl::LRight),
            "LDown" => Some(LogicalControl::LDown),
            "LUp" => Some(LogicalControl::LUp),
            "RLeft" => Some(LogicalControl::RLeft),
            "RRight" => Some(LogicalControl::RRight),
            "RDown" => Some(LogicalControl::RDown),
            "RUp" => Some(LogicalControl::RUp),
            _ => None,
        }
    }

    /// Case-insensitive lookup for user-typed names (REPL input).
    /// Only capturable controls resolve; derived keys are not armable.
    pub fn from_user(name: &str) -> Option<Self> {
        CAPTURABLE
            .iter()
            .copied()
            .find(|c| c.ini_key().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for LogicalControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ini_key())
    }
}

/// Map a physical button index to the control that should pulse while no
/// capture is armed. This is the standard-pad correlation table; it is
/// independent of the binding syntax and of whatever the user has mapped.
pub fn pulse_target(button_index: u32) -> Option<LogicalControl> {
    match button_index {
        0 => Some(LogicalControl::Triangle),
        1 => Some(LogicalControl::Circle),
        2 => Some(LogicalControl::Cross),
        3 => Some(LogicalControl::Square),
        4 => Some(LogicalControl::L1),
        5 => Some(LogicalControl::R1),
        6 => Some(LogicalControl::L2),
        7 => Some(LogicalControl::R2),
        8 => Some(LogicalControl::Select),
        9 => Some(LogicalControl::Start),
        10 => Some(LogicalControl::L3),
        11 => Some(LogicalControl::R3),
        _ => None,
    }
}

/// Map a gilrs button to its physical button index.
///
/// gilrs reports buttons by position name; the capture layer and the pulse
/// table both work on SDL-style indices, so the ordering here must stay
/// consistent with [`pulse_target`].
///
/// Returns `None` for D-Pad buttons (those become directional events) and
/// for buttons with no index in the standard layout.
pub fn button_index(button: Button) -> Option<u32> {
    match button {
        Button::North => Some(0),
        Button::East => Some(1),
        Button::South => Some(2),
        Button::West => Some(3),
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::LeftTrigger2 => Some(6),
        Button::RightTrigger2 => Some(7),
        Button::Select => Some(8),
        Button::Start => Some(9),
        Button::LeftThumb => Some(10),
        Button::RightThumb => Some(11),
        Button::Mode => Some(12),

        // D-Pad handled as directional events
        Button::DPadUp | Button::DPadDown | Button::DPadLeft | Button::DPadRight => None,

        _ => {
            warn!("Unknown gilrs button: {:?}", button);
            None
        },
    }
}
