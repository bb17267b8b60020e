pub mod pending_write;
pub mod product;
pub mod quote;
pub mod quote_page;

pub use pending_write::PendingWrite;
pub use product::Product;
pub use quote::{CustomerInfo, Quote, QuoteDraft, QuoteItem, QuoteSummary};
pub use quote_page::QuotePage;
