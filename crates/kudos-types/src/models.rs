use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of kudos categories. The storage layer enforces membership
/// with a CHECK constraint as well, so the list here and the one in the
/// migration must stay in sync.
pub const KUDOS_CATEGORIES: [KudosCategory; 3] = [
    KudosCategory::GreatJob,
    KudosCategory::ThankYou,
    KudosCategory::Teamwork,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KudosCategory {
    #[serde(rename = "Great Job")]
    GreatJob,
    #[serde(rename = "Thank You")]
    ThankYou,
    Teamwork,
}

impl KudosCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            KudosCategory::GreatJob => "Great Job",
            KudosCategory::ThankYou => "Thank You",
            KudosCategory::Teamwork => "Teamwork",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        KUDOS_CATEGORIES.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for KudosCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A creation body that passed validation: UUID parsed, message trimmed,
/// category resolved against the closed set.
#[derive(Debug, Clone, PartialEq)]
pub struct KudosSubmission {
    pub receiver_id: Uuid,
    pub message: String,
    pub category: KudosCategory,
}

impl KudosSubmission {
    /// Attach the header-supplied sender to form the persistence input.
    pub fn with_sender(self, sender_id: Uuid) -> NewKudos {
        NewKudos {
            sender_id,
            receiver_id: self.receiver_id,
            message: self.message,
            category: self.category,
        }
    }
}

/// Everything the persistence layer needs to create a record. The id and
/// creation timestamp are assigned by the store, never by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewKudos {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub category: KudosCategory,
}

/// Validated pagination window for the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: u32,
    pub offset: u32,
}
