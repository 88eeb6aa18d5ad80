//! Controller mapping companion for PCSX2
//!
//! Captures gamepad input into the `[Pad1]` section of the emulator's
//! settings file and provisions the emulator install on first run. The
//! capture core - device registry, mapping store, capture session, and
//! listener loop - is library code; the REPL and the provisioning routine
//! are thin wrappers around it.

pub mod binding;
pub mod cli;
pub mod controls;
pub mod devices;
pub mod ini;
pub mod listener;
pub mod mapping;
pub mod paths;
pub mod provision;
pub mod session;

pub use controls::LogicalControl;
pub use listener::PadListener;
pub use mapping::MappingSet;
pub use session::{PadEvent, PadSession};
