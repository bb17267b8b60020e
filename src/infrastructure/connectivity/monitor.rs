use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::domain::value_objects::ConnectivityState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Connectivity monitor fed by the host platform's network-status sensor.
///
/// The host bridges its sensor callbacks into a [`SensorHandle`]; the
/// watch channel fans transitions out to subscribers in order without ever
/// blocking the sensor side. Until the sensor reports anything the monitor
/// stays at the offline default, so a sensor that fails to initialize
/// simply leaves the app in offline mode.
pub struct NetInfoMonitor {
    tx: Arc<watch::Sender<ConnectivityState>>,
    rx: watch::Receiver<ConnectivityState>,
}

impl NetInfoMonitor {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(ConnectivityState::default());
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Handle for the platform sensor bridge to push status updates.
    pub fn sensor_handle(&self) -> SensorHandle {
        SensorHandle {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl Default for NetInfoMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor for NetInfoMonitor {
    fn current(&self) -> ConnectivityState {
        *self.rx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.rx.clone()
    }
}

/// Cloneable entry point for sensor events; delivery never blocks.
#[derive(Clone)]
pub struct SensorHandle {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl SensorHandle {
    pub fn report(&self, state: ConnectivityState) {
        debug!(
            connected = state.connected,
            reachable = state.reachable,
            "connectivity transition"
        );
        self.tx.send_replace(state);
    }
}
