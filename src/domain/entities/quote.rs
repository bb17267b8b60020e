use crate::domain::value_objects::QuoteStatus;
use serde::{Deserialize, Serialize};

/// Tax applied on top of the subtotal.
pub const TAX_RATE: f64 = 0.15;

/// Round to two decimal places, half away from zero at the cent boundary.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerInfo {
    pub address: String,
    pub city: String,
    pub country: String,
    pub email: String,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteItem {
    pub product_name: String,
    pub price: f64,
    pub quantity: u32,
    pub subtotal: f64,
}

impl QuoteItem {
    pub fn new(product_name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            product_name: product_name.into(),
            price,
            quantity,
            subtotal: round2(price * f64::from(quantity)),
        }
    }
}

/// The quote-creation payload as the form produces it. Totals are part of
/// the payload (the backend stores them verbatim), so they are recomputed
/// here whenever the items change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteDraft {
    pub customer_info: CustomerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: QuoteStatus,
    pub items: Vec<QuoteItem>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    pub valid_until: String,
}

impl QuoteDraft {
    pub fn new(
        customer_info: CustomerInfo,
        status: QuoteStatus,
        items: Vec<QuoteItem>,
        valid_until: impl Into<String>,
    ) -> Self {
        let mut draft = Self {
            customer_info,
            description: None,
            status,
            items,
            subtotal: 0.0,
            total_tax: 0.0,
            total: 0.0,
            valid_until: valid_until.into(),
        };
        draft.recompute_totals();
        draft
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// subtotal = sum of item subtotals, tax = 15% of subtotal, total =
    /// subtotal + tax, each rounded at the cent.
    pub fn recompute_totals(&mut self) {
        let subtotal: f64 = self.items.iter().map(|item| item.subtotal).sum();
        self.subtotal = round2(subtotal);
        self.total_tax = round2(subtotal * TAX_RATE);
        self.total = round2(subtotal + subtotal * TAX_RATE);
    }
}

/// Server-acknowledged quote record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub id: String,
    #[serde(rename = "collectionId", default)]
    pub collection_id: String,
    #[serde(rename = "collectionName", default)]
    pub collection_name: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub updated: String,
    pub customer_info: CustomerInfo,
    #[serde(default)]
    pub description: String,
    pub status: QuoteStatus,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub total_tax: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub valid_until: String,
}

/// Projection served by the paginated list endpoint
/// (`fields=id,status,total,created,customer_info`). `id` is `None` for a
/// pending quote that has not reached the server yet; the UI substitutes a
/// placeholder label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub status: QuoteStatus,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub created: String,
    pub customer_info: CustomerInfo,
}
