//! Database row types — these map directly to SQLite rows.
//! Distinct from the kudos-types DTOs to keep the DB layer independent.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};

use kudos_types::api::KudosDto;
use kudos_types::models::KudosCategory;

pub struct KudosRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub message: String,
    pub category: String,
    pub created_at: String,
}

impl KudosRow {
    /// Convert a stored row into the transport DTO. A row whose category or
    /// timestamp no longer decodes is a persistence failure, not data the
    /// caller should ever see coerced.
    pub fn into_dto(self) -> Result<KudosDto> {
        let sender_id = self
            .sender_id
            .parse()
            .map_err(|_| anyhow!("Corrupt sender_id '{}' on kudos '{}'", self.sender_id, self.id))?;
        let receiver_id = self.receiver_id.parse().map_err(|_| {
            anyhow!("Corrupt receiver_id '{}' on kudos '{}'", self.receiver_id, self.id)
        })?;
        let category = KudosCategory::parse(&self.category)
            .ok_or_else(|| anyhow!("Corrupt category '{}' on kudos '{}'", self.category, self.id))?;
        let created_at = parse_stored_timestamp(&self.created_at).ok_or_else(|| {
            anyhow!("Corrupt created_at '{}' on kudos '{}'", self.created_at, self.id)
        })?;

        Ok(KudosDto {
            id: self.id,
            sender_id,
            receiver_id,
            message: self.message,
            category,
            created_at,
        })
    }
}

fn parse_stored_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        // Migrations applied from external files may use datetime('now'),
        // which stores "YYYY-MM-DD HH:MM:SS" without a timezone. Parse as
        // naive UTC and convert.
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .map(|ndt| ndt.and_utc())
            .ok()
    })
}
