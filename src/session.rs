//! Capture session: the event-correlation state machine
//!
//! One session object owns all state shared between the foreground (REPL
//! commands) and the background listener loop: the mapping, the armed
//! capture target, the selected device, the device snapshot, and the pulse
//! bookkeeping. Everything sits behind a single mutex so every transition is
//! atomic; the listener can never observe a target mid-change.
//!
//! With a target armed the session is "recording": the next qualifying event
//! (cardinal D-Pad vector or button press) resolves into a binding and
//! disarms. With no target armed, events only produce transient display
//! pulses via the fixed standard-pad table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::binding::{self, Direction};
use crate::controls::{self, LogicalControl, CAPTURABLE};
use crate::devices::DeviceInfo;
use crate::mapping::{MappingError, MappingSet};

/// How long a display pulse stays active.
const PULSE_DURATION: Duration = Duration::from_millis(180);

/// A raw input event, already reduced to what the capture layer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadEvent {
    /// Button press, by physical button index.
    Button(u32),
    /// D-Pad / hat state as a vector.
    Direction(i8, i8),
}

#[derive(Debug)]
struct SessionState {
    mapping: MappingSet,
    capture: Option<LogicalControl>,
    device_index: usize,
    devices: Vec<DeviceInfo>,
    pulses: HashMap<LogicalControl, Instant>,
}

struct SessionInner {
    state: Mutex<SessionState>,
    running: AtomicBool,
    refresh_requested: AtomicBool,
}

/// Handle to the running capture session. Cheap to clone; all clones share
/// the same state.
#[derive(Clone)]
pub struct PadSession {
    inner: Arc<SessionInner>,
}

impl PadSession {
    pub fn new(mapping: MappingSet) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState {
                    mapping,
                    capture: None,
                    device_index: 0,
                    devices: Vec::new(),
                    pulses: HashMap::new(),
                }),
                running: AtomicBool::new(true),
                refresh_requested: AtomicBool::new(false),
            }),
        }
    }

    // --- lifecycle ---------------------------------------------------------

    /// Whether the listener loop should keep polling.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Ask the listener loop to exit. It checks the flag every iteration and
    /// dispatches no further events once it observes the store.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }

    /// Ask the listener loop to re-enumerate devices on its next iteration.
    pub fn request_refresh(&self) {
        self.inner.refresh_requested.store(true, Ordering::SeqCst);
    }

    /// Listener side: consume a pending refresh request.
    pub fn take_refresh_request(&self) -> bool {
        self.inner.refresh_requested.swap(false, Ordering::SeqCst)
    }

    // --- device registry view ----------------------------------------------

    /// Publish a fresh device snapshot. The selected index is revalidated:
    /// if it no longer exists it falls back to 0.
    pub fn set_devices(&self, devices: Vec<DeviceInfo>) {
        let mut state = self.inner.state.lock();
        if state.device_index >= devices.len() && state.device_index != 0 {
            warn!(
                "Selected device {} no longer present, falling back to 0",
                state.device_index
            );
            state.device_index = 0;
        }
        state.devices = devices;
    }

    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.inner.state.lock().devices.clone()
    }

    /// Select the active device. An out-of-range selection recovers to 0.
    pub fn set_device(&self, index: usize) -> usize {
        let mut state = self.inner.state.lock();
        let chosen = if index == 0 || index < state.devices.len() {
            index
        } else {
            warn!("Invalid device selection {}, falling back to 0", index);
            0
        };
        state.device_index = chosen;
        info!("Active device: {}-{}", binding::NAMESPACE, chosen);
        chosen
    }

    pub fn device_index(&self) -> usize {
        self.inner.state.lock().device_index
    }

    // --- mapping operations -------------------------------------------------

    /// Arm a control for capture. Last arm wins: a previously armed control
    /// is replaced without being resolved and keeps whatever binding it had.
    pub fn arm(&self, control: LogicalControl) {
        let mut state = self.inner.state.lock();
        if let Some(previous) = state.capture.replace(control) {
            if previous != control {
                debug!("Re-armed: {} replaces {}", control, previous);
            }
        }
        info!("Recording next input for {}", control);
    }

    /// The currently armed control, if any.
    pub fn armed(&self) -> Option<LogicalControl> {
        self.inner.state.lock().capture
    }

    /// Current binding string for a control.
    pub fn binding(&self, control: LogicalControl) -> String {
        self.inner.state.lock().mapping.get(control).to_string()
    }

    /// Snapshot of all capturable bindings, in canonical order.
    pub fn bindings(&self) -> Vec<(LogicalControl, String)> {
        let state = self.inner.state.lock();
        CAPTURABLE
            .iter()
            .map(|&c| (c, state.mapping.get(c).to_string()))
            .collect()
    }

    /// Clear every binding in memory. The file is untouched until confirm.
    pub fn reset(&self) {
        self.inner.state.lock().mapping.reset();
        info!("All bindings cleared");
    }

    /// Apply the fixed standard-layout template for the selected device.
    /// Returns false (and changes nothing) when no devices are connected.
    pub fn auto_configure(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.devices.is_empty() {
            warn!("Auto-configure skipped: no devices connected");
            return false;
        }
        let index = state.device_index;
        state.mapping.auto_configure(index);
        true
    }

    /// Persist the mapping. The in-memory state is unaffected either way;
    /// on failure the caller may simply retry.
    pub fn confirm(&self, path: &Path) -> Result<(), MappingError> {
        let (mapping, device_index) = {
            let state = self.inner.state.lock();
            (state.mapping.clone(), state.device_index)
        };
        mapping.save(path, device_index)
    }

    // --- event correlation ---------------------------------------------------

    /// Dispatch one raw event. Called from the listener loop, in order.
    pub fn handle_event(&self, event: PadEvent) {
        let mut state = self.inner.state.lock();

        if let Some(target) = state.capture {
            let resolved = match event {
                PadEvent::Direction(x, y) => {
                    // Non-cardinal vectors do not qualify; stay recording.
                    Direction::from_vector(x, y)
                        .map(|dir| binding::dpad_binding(state.device_index, dir))
                },
                PadEvent::Button(index) => {
                    Some(binding::button_binding(state.device_index, index))
                },
            };

            if let Some(code) = resolved {
                info!("Captured {} -> {}", target, code);
                state.mapping.set(target, code);
                state.capture = None;
            }
            return;
        }

        // Idle: correlate to a display pulse only. No mapping mutation.
        let pulsed = match event {
            PadEvent::Button(index) => controls::pulse_target(index),
            PadEvent::Direction(x, y) => Direction::from_vector(x, y).map(|dir| match dir {
                Direction::Up => LogicalControl::Up,
                Direction::Right => LogicalControl::Right,
                Direction::Down => LogicalControl::Down,
                Direction::Left => LogicalControl::Left,
            }),
        };

        if let Some(control) = pulsed {
            state.pulses.insert(control, Instant::now() + PULSE_DURATION);
        }
    }

    /// Controls with a currently active display pulse. Expired entries are
    /// pruned on every call, so a settled session reports none.
    pub fn active_pulses(&self) -> Vec<LogicalControl> {
        let mut state = self.inner.state.lock();
        let now = Instant::now();
        state.pulses.retain(|_, deadline| *deadline > now);
        state.pulses.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ini::IniDocument;
    use crate::mapping::PAD_SECTION;

    fn session() -> PadSession {
        PadSession::new(MappingSet::default())
    }

    fn session_with_device() -> PadSession {
        let s = session();
        s.set_devices(vec![DeviceInfo {
            index: 0,
            name: "Test Pad".to_string(),
        }]);
        s
    }

    #[test]
    fn test_button_event_resolves_armed_control() {
        let s = session();
        s.arm(LogicalControl::Cross);
        s.handle_event(PadEvent::Button(5));

        assert_eq!(s.binding(LogicalControl::Cross), "SDL-0/Button5");
        assert_eq!(s.armed(), None);
    }

    #[test]
    fn test_cardinal_direction_resolves_armed_control() {
        let s = session();
        s.arm(LogicalControl::Up);
        s.handle_event(PadEvent::Direction(0, 1));

        assert_eq!(s.binding(LogicalControl::Up), "SDL-0/DPadUp");
        assert_eq!(s.armed(), None);
    }

    #[test]
    fn test_non_cardinal_vector_keeps_recording() {
        let s = session();
        s.arm(LogicalControl::Left);

        s.handle_event(PadEvent::Direction(1, 1));
        assert_eq!(s.armed(), Some(LogicalControl::Left));
        assert_eq!(s.binding(LogicalControl::Left), "");

        s.handle_event(PadEvent::Direction(1, 0));
        assert_eq!(s.armed(), None);
        assert_eq!(s.binding(LogicalControl::Left), "SDL-0/DPadRight");
    }

    #[test]
    fn test_rearm_replaces_target_without_resolving() {
        let s = session();
        s.arm(LogicalControl::Cross);
        s.arm(LogicalControl::Circle);

        assert_eq!(s.armed(), Some(LogicalControl::Circle));

        s.handle_event(PadEvent::Button(3));
        assert_eq!(s.binding(LogicalControl::Cross), "");
        assert_eq!(s.binding(LogicalControl::Circle), "SDL-0/Button3");
    }

    #[test]
    fn test_capture_uses_selected_device_index() {
        let s = session();
        s.set_devices(vec![
            DeviceInfo {
                index: 0,
                name: "Pad A".to_string(),
            },
            DeviceInfo {
                index: 1,
                name: "Pad B".to_string(),
            },
        ]);
        s.set_device(1);

        s.arm(LogicalControl::R1);
        s.handle_event(PadEvent::Button(5));
        assert_eq!(s.binding(LogicalControl::R1), "SDL-1/Button5");
    }

    #[test]
    fn test_invalid_device_selection_recovers_to_zero() {
        let s = session_with_device();
        assert_eq!(s.set_device(7), 0);
        assert_eq!(s.device_index(), 0);
    }

    #[test]
    fn test_device_snapshot_revalidates_selection() {
        let s = session();
        s.set_devices(vec![
            DeviceInfo {
                index: 0,
                name: "Pad A".to_string(),
            },
            DeviceInfo {
                index: 1,
                name: "Pad B".to_string(),
            },
        ]);
        s.set_device(1);

        // Device 1 unplugged; the selection falls back to 0
        s.set_devices(vec![DeviceInfo {
            index: 0,
            name: "Pad A".to_string(),
        }]);
        assert_eq!(s.device_index(), 0);
    }

    #[test]
    fn test_idle_events_pulse_without_mutating_mapping() {
        let s = session();
        s.handle_event(PadEvent::Button(2));
        s.handle_event(PadEvent::Direction(0, 1));

        let pulses = s.active_pulses();
        assert!(pulses.contains(&LogicalControl::Cross));
        assert!(pulses.contains(&LogicalControl::Up));

        for (_, value) in s.bindings() {
            assert_eq!(value, "");
        }
    }

    #[test]
    fn test_pulses_settle_after_duration() {
        let s = session();
        s.handle_event(PadEvent::Button(0));
        assert!(!s.active_pulses().is_empty());

        std::thread::sleep(PULSE_DURATION + Duration::from_millis(40));
        assert!(s.active_pulses().is_empty());
    }

    #[test]
    fn test_auto_configure_requires_a_device() {
        let s = session();
        assert!(!s.auto_configure());
        assert_eq!(s.binding(LogicalControl::Cross), "");

        let s = session_with_device();
        s.set_devices(vec![
            DeviceInfo {
                index: 0,
                name: "Pad A".to_string(),
            },
            DeviceInfo {
                index: 1,
                name: "Pad B".to_string(),
            },
            DeviceInfo {
                index: 2,
                name: "Pad C".to_string(),
            },
        ]);
        s.set_device(2);
        assert!(s.auto_configure());
        assert_eq!(s.binding(LogicalControl::Cross), "SDL-2/FaceSouth");
    }

    #[test]
    fn test_stop_while_recording_leaves_binding_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PCSX2.ini");

        let s = session();
        s.arm(LogicalControl::Square);
        s.stop();
        assert!(!s.is_running());

        // Never confirmed while recording: the saved file shows no Square
        s.confirm(&path).unwrap();
        let doc = IniDocument::load(&path).unwrap();
        assert_eq!(doc.get(PAD_SECTION, "Square"), None);
    }

    #[test]
    fn test_idle_event_storm_is_inert() {
        let s = session();
        let s2 = s.clone();

        let handle = std::thread::spawn(move || {
            for i in 0..1000u32 {
                s2.handle_event(PadEvent::Button(i % 13));
            }
        });

        // Foreground keeps reading display state while events arrive
        for _ in 0..50 {
            let _ = s.bindings();
            let _ = s.active_pulses();
        }
        handle.join().unwrap();

        for (_, value) in s.bindings() {
            assert_eq!(value, "");
        }
        assert_eq!(s.armed(), None);

        // After the run settles no pulse sticks around
        std::thread::sleep(PULSE_DURATION + Duration::from_millis(40));
        assert!(s.active_pulses().is_empty());
    }
}
