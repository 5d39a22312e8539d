use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::KudosCategory;
use crate::validate::ValidationError;

// -- Kudos --

/// Wire representation of a stored kudos record.
///
/// `id` is a string rather than a `Uuid`: every server-minted id is UUID
/// syntax, but the client feed cache also holds provisional records whose
/// ids carry an `optimistic-` prefix until the server confirms them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KudosDto {
    pub id: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub category: KudosCategory,
    pub created_at: DateTime<Utc>,
}

/// Creation body exactly as submitted, before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKudosBody {
    pub receiver_id: String,
    pub message: String,
    pub category: String,
}

// -- Listing --

/// Query parameters as they arrive on the URL: strings until coerced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListKudosQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    /// Number of items on this page, not the total row count.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListKudosResponse {
    pub items: Vec<KudosDto>,
    pub pagination: Pagination,
}

// -- Errors --

/// Body shape for 400 and 500 responses. `errors` is present only for
/// validation failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationError>,
}
