use crate::domain::value_objects::ConnectivityState;
use tokio::sync::watch;

/// Access to the device's network status.
///
/// `current` is a synchronous snapshot, so two reads inside one operation
/// observe the same state (no tearing). `subscribe` yields a watch channel
/// that holds the state at subscription time and sees every subsequent
/// transition in order; the sensor side never blocks on slow subscribers.
/// An implementation whose sensor failed to initialize reports the
/// offline default.
pub trait ConnectivityMonitor: Send + Sync {
    fn current(&self) -> ConnectivityState;
    fn subscribe(&self) -> watch::Receiver<ConnectivityState>;
}
