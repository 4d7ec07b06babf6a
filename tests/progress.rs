//! Stop signal semantics.

use framesift::StopSignal;

#[test]
fn stop_signal_default_not_raised() {
    let signal = StopSignal::new();
    assert!(!signal.is_raised());
}

#[test]
fn stop_signal_raise() {
    let signal = StopSignal::new();
    signal.raise();
    assert!(signal.is_raised());
}

#[test]
fn stop_signal_clone_shares_state() {
    let signal = StopSignal::new();
    let clone = signal.clone();
    assert!(!clone.is_raised());

    signal.raise();
    assert!(clone.is_raised());
}

#[test]
fn stop_signal_raise_is_idempotent() {
    let signal = StopSignal::new();
    signal.raise();
    signal.raise();
    assert!(signal.is_raised());
}

#[test]
fn stop_signal_default_trait() {
    let signal = StopSignal::default();
    assert!(!signal.is_raised());
}

#[test]
fn stop_signal_crosses_threads() {
    let signal = StopSignal::new();
    let clone = signal.clone();

    let handle = std::thread::spawn(move || {
        clone.raise();
    });
    handle.join().unwrap();

    assert!(signal.is_raised());
}
