use serde::{Deserialize, Serialize};

/// Read-only reference data used for item selection. The catalog stores
/// the list projection (`fields=id,title,price`); richer record fields are
/// tolerated but not kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
        }
    }
}
