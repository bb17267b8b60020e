pub mod connectivity;
pub mod queue_store;
pub mod remote;

pub use connectivity::ConnectivityMonitor;
pub use queue_store::DurableQueueStore;
pub use remote::RemoteGateway;
