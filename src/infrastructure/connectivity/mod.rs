pub mod monitor;

pub use monitor::{NetInfoMonitor, SensorHandle};
