//! Event listener loop
//!
//! One background thread owns the gilrs context (it is not `Send`, so it is
//! initialized inside the thread), continuously drains pending events,
//! dispatches each in order to the session, then sleeps briefly before the
//! next poll. The session's running flag is checked every iteration;
//! [`PadListener::close`] clears it and joins, so by the time it returns no
//! further events will be dispatched and the device handles are released.

use std::thread::JoinHandle;
use std::time::Duration;

use gilrs::{Button, Event, EventType, Gilrs};
use tracing::{debug, info, warn};

use crate::controls;
use crate::devices;
use crate::session::{PadEvent, PadSession};

/// Idle wait between polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to the background listener thread. Only one instance should exist
/// per process.
pub struct PadListener {
    session: PadSession,
    handle: Option<JoinHandle<()>>,
}

impl PadListener {
    /// Spawn the listener thread for `session`. The initial device snapshot
    /// is published before the first poll.
    pub fn spawn(session: PadSession) -> Self {
        let thread_session = session.clone();
        let handle = std::thread::spawn(move || run_loop(thread_session));
        Self {
            session,
            handle: Some(handle),
        }
    }

    /// Stop the loop and wait for it to exit. Returns once the thread is
    /// fully gone; the gilrs context is dropped on the way out.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.session.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Listener thread panicked during shutdown");
            }
        }
    }
}

impl Drop for PadListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(session: PadSession) {
    // Initialize gilrs in this thread (not Send-safe)
    let mut gilrs = match Gilrs::new() {
        Ok(g) => g,
        Err(e) => {
            warn!("Failed to initialize gamepad backend: {:?}", e);
            session.set_devices(Vec::new());
            return;
        },
    };

    let initial = devices::scan(&gilrs);
    if initial.is_empty() {
        info!("No gamepads detected");
    } else {
        info!("Found {} connected gamepad(s):", initial.len());
        for device in &initial {
            info!("  - {}", device);
        }
    }
    session.set_devices(initial);

    while session.is_running() {
        let mut devices_dirty = false;

        while let Some(Event { event, .. }) = gilrs.next_event() {
            match event {
                EventType::ButtonPressed(button, _) => {
                    if let Some(pad_event) = translate_button(button) {
                        session.handle_event(pad_event);
                    }
                },
                EventType::Connected | EventType::Disconnected => {
                    devices_dirty = true;
                },
                _ => {},
            }
        }

        if session.take_refresh_request() || devices_dirty {
            let snapshot = devices::scan(&gilrs);
            info!("Device list refreshed: {} connected", snapshot.len());
            session.set_devices(snapshot);
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    debug!("Listener loop exited");
}

/// Reduce a gilrs button press to a capture-layer event. D-Pad buttons
/// become cardinal vectors; everything else maps through the fixed physical
/// index table.
fn translate_button(button: Button) -> Option<PadEvent> {
    if let Some(vector) = dpad_vector(button) {
        return Some(PadEvent::Direction(vector.0, vector.1));
    }
    controls::button_index(button).map(PadEvent::Button)
}

/// Hat vector for a D-Pad button, matching the four cardinal unit vectors.
fn dpad_vector(button: Button) -> Option<(i8, i8)> {
    match button {
        Button::DPadUp => Some((0, 1)),
        Button::DPadRight => Some((1, 0)),
        Button::DPadDown => Some((0, -1)),
        Button::DPadLeft => Some((-1, 0)),
        _ => None,
    }
}
