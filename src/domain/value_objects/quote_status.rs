use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote lifecycle status. The wire format is the upper-case string the
/// backend stores; unknown strings are carried through untouched so a
/// newer server cannot break deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuoteStatus {
    Accepted,
    Rejected,
    Sent,
    Draft,
    Expired,
    Unknown(String),
}

impl QuoteStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Expired => "EXPIRED",
            QuoteStatus::Unknown(value) => value.as_str(),
        }
    }
}

impl From<String> for QuoteStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACCEPTED" => QuoteStatus::Accepted,
            "REJECTED" => QuoteStatus::Rejected,
            "SENT" => QuoteStatus::Sent,
            "DRAFT" => QuoteStatus::Draft,
            "EXPIRED" => QuoteStatus::Expired,
            _ => QuoteStatus::Unknown(value),
        }
    }
}

impl From<QuoteStatus> for String {
    fn from(value: QuoteStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
