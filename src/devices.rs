//! Device registry snapshot
//!
//! gilrs handles are not `Send` and live on the listener thread; the rest of
//! the tool only ever sees this snapshot, published into the session on
//! startup, on hot-plug events, and on an explicit refresh.

use gilrs::Gilrs;

/// One enumerated input device, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.index, self.name)
    }
}

/// Enumerate currently connected devices. An empty result is a valid state,
/// not an error. Ordering is gilrs's enumeration order and is stable within
/// one call.
pub fn scan(gilrs: &Gilrs) -> Vec<DeviceInfo> {
    gilrs
        .gamepads()
        .filter(|(_, gp)| gp.is_connected())
        .enumerate()
        .map(|(index, (_, gp))| DeviceInfo {
            index,
            name: gp.name().to_string(),
        })
        .collect()
}
