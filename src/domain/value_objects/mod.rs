pub mod connectivity;
pub mod quote_filter;
pub mod quote_status;

pub use connectivity::ConnectivityState;
pub use quote_filter::QuoteFilter;
pub use quote_status::QuoteStatus;
