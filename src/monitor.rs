//! Display-surface liveness watcher.
//!
//! The interactive loop blocks in the key wait and cannot itself observe the
//! surface disappearing in a timely way. The watcher is a detached
//! background thread that polls a [`SurfaceProbe`] at a fixed interval and,
//! on the first dead reading, raises the session's [`StopSignal`] and forces
//! the process down. It is never joined: a closed surface must not leave a
//! hung process behind, so exit is abrupt rather than cooperative.
//!
//! The watcher only observes surface state — it never touches the decode
//! session, so no locking exists between it and the main loop.

use std::time::Duration;

use crate::progress::StopSignal;

/// How often the watcher samples surface liveness.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A cheap, thread-owned view of whether the display surface still exists
/// and is visible.
pub trait SurfaceProbe: Send + 'static {
    /// Sample the surface. `false` means closed or invisible.
    fn is_alive(&self) -> bool;
}

/// Launch the watcher thread for an interactive session.
///
/// The thread polls every [`POLL_INTERVAL`]. When the probe reports a dead
/// surface it raises `signal` and exits the process with status 0 — closing
/// the window is a normal way to end a review session. When the signal is
/// raised elsewhere first (quit command, end of stream followed by process
/// teardown), the thread stops polling and dies quietly.
pub fn spawn_surface_watcher<P: SurfaceProbe>(probe: P, signal: StopSignal) {
    let _detached = std::thread::spawn(move || {
        watch(probe, &signal, POLL_INTERVAL, || {
            std::process::exit(0);
        });
    });
}

/// The watcher's poll loop, separated from thread spawning and process exit
/// so the raise-and-stop decision is observable in tests.
fn watch<P, F>(probe: P, signal: &StopSignal, interval: Duration, on_dead: F)
where
    P: SurfaceProbe,
    F: FnOnce(),
{
    loop {
        if signal.is_raised() {
            return;
        }
        if !probe.is_alive() {
            log::info!("Display surface closed, terminating session");
            signal.raise();
            on_dead();
            return;
        }
        std::thread::sleep(interval);
    }
}
