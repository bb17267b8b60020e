use crate::domain::entities::quote::{QuoteDraft, QuoteSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A write accepted locally but not yet acknowledged by the backend.
///
/// The storage format carries an explicit version tag so a future format
/// change can migrate queued entries instead of discarding them on parse
/// failure. FIFO position is implicit in array order; entries are never
/// mutated in place, only appended or replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "version")]
pub enum PendingWrite {
    #[serde(rename = "1")]
    V1(PendingQuoteV1),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingQuoteV1 {
    pub local_id: Uuid,
    pub draft: QuoteDraft,
    pub queued_at: DateTime<Utc>,
    /// Failed drain attempts so far. Absent in entries written before the
    /// retry policy existed, hence the default.
    #[serde(default)]
    pub attempts: u32,
}

impl PendingWrite {
    pub fn new(draft: QuoteDraft) -> Self {
        PendingWrite::V1(PendingQuoteV1 {
            local_id: Uuid::new_v4(),
            draft,
            queued_at: Utc::now(),
            attempts: 0,
        })
    }

    pub fn local_id(&self) -> Uuid {
        match self {
            PendingWrite::V1(inner) => inner.local_id,
        }
    }

    pub fn draft(&self) -> &QuoteDraft {
        match self {
            PendingWrite::V1(inner) => &inner.draft,
        }
    }

    pub fn queued_at(&self) -> DateTime<Utc> {
        match self {
            PendingWrite::V1(inner) => inner.queued_at,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            PendingWrite::V1(inner) => inner.attempts,
        }
    }

    pub fn record_attempt(&mut self) {
        match self {
            PendingWrite::V1(inner) => inner.attempts += 1,
        }
    }

    /// Placeholder listing entry for a quote that has no server identity.
    pub fn to_summary(&self) -> QuoteSummary {
        let draft = self.draft();
        QuoteSummary {
            id: None,
            status: draft.status.clone(),
            total: draft.total,
            created: self.queued_at().to_rfc3339(),
            customer_info: draft.customer_info.clone(),
        }
    }
}
