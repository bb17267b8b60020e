use serde::{Deserialize, Serialize};

/// Snapshot of the device's network status as reported by the platform
/// sensor. `connected` means a link exists; `reachable` means the internet
/// is actually reachable over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub connected: bool,
    pub reachable: bool,
}

impl ConnectivityState {
    pub fn new(connected: bool, reachable: bool) -> Self {
        Self {
            connected,
            reachable,
        }
    }

    pub fn online() -> Self {
        Self::new(true, true)
    }

    pub fn offline() -> Self {
        Self::new(false, false)
    }

    /// The boolean the engine acts on: connected AND internet-reachable.
    pub fn is_effective(&self) -> bool {
        self.connected && self.reachable
    }
}

impl Default for ConnectivityState {
    // Fail to offline when nothing has been reported yet.
    fn default() -> Self {
        Self::offline()
    }
}
