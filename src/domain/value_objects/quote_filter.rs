use crate::domain::entities::quote::QuoteSummary;
use crate::domain::value_objects::QuoteStatus;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Client-side filter applied to whatever page is currently displayed.
/// All criteria are optional and AND-combined; filtering never triggers a
/// fetch, it only narrows the already-cached page's items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFilter {
    /// Case-insensitive substring match on the customer name.
    pub customer_name: Option<String>,
    /// Status-set membership; empty means any status.
    pub statuses: Vec<QuoteStatus>,
    /// Inclusive creation-date bounds.
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl QuoteFilter {
    pub fn is_empty(&self) -> bool {
        self.customer_name.as_deref().map_or(true, str::is_empty)
            && self.statuses.is_empty()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    pub fn matches(&self, summary: &QuoteSummary) -> bool {
        if let Some(needle) = self.customer_name.as_deref() {
            if !needle.is_empty()
                && !summary
                    .customer_info
                    .name
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            {
                return false;
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&summary.status) {
            return false;
        }

        if self.created_after.is_some() || self.created_before.is_some() {
            // A record whose timestamp cannot be parsed never matches a
            // date-bounded filter.
            let Some(created) = parse_created(&summary.created) else {
                return false;
            };
            if let Some(after) = self.created_after {
                if created < after {
                    return false;
                }
            }
            if let Some(before) = self.created_before {
                if created > before {
                    return false;
                }
            }
        }

        true
    }

    pub fn apply(&self, items: &[QuoteSummary]) -> Vec<QuoteSummary> {
        items
            .iter()
            .filter(|item| self.matches(item))
            .cloned()
            .collect()
    }
}

/// The backend emits `2024-01-02 03:04:05.678Z` while locally queued
/// entries carry RFC 3339; accept both.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.fZ")
        .ok()
        .map(|naive| naive.and_utc())
}
