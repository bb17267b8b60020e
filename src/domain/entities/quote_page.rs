use crate::domain::entities::quote::QuoteSummary;
use serde::{Deserialize, Serialize};

/// One page of the quote listing. `page_number` is the server-reported
/// (clamped) page, not necessarily the page that was requested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotePage {
    pub items: Vec<QuoteSummary>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub per_page: u32,
}

impl QuotePage {
    /// The single page served while offline: everything in the pending
    /// queue (or the last-known server snapshot), no pagination.
    pub fn offline(items: Vec<QuoteSummary>) -> Self {
        let len = items.len();
        Self {
            items,
            page_number: 1,
            total_pages: 1,
            total_items: len as u64,
            per_page: len as u32,
        }
    }
}
