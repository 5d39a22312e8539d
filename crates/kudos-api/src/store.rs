use anyhow::Result;

use kudos_types::api::KudosDto;
use kudos_types::models::{NewKudos, PageParams};

/// Persistence operations the request handlers depend on. Passed in as a
/// collaborator rather than reached through a global, so tests substitute
/// deterministic fakes without a real store.
pub trait KudosStore: Send + Sync {
    /// Persist a validated kudos and return its transport form. The store
    /// assigns the id and creation timestamp.
    fn create(&self, input: NewKudos) -> Result<KudosDto>;

    /// A newest-first page of the feed. Empty page, never an error, when
    /// nothing matches.
    fn list(&self, page: PageParams) -> Result<Vec<KudosDto>>;
}

impl KudosStore for kudos_db::Database {
    fn create(&self, input: NewKudos) -> Result<KudosDto> {
        self.insert_kudos(&input)?.into_dto()
    }

    fn list(&self, page: PageParams) -> Result<Vec<KudosDto>> {
        self.list_kudos(page.limit, page.offset)?
            .into_iter()
            .map(|row| row.into_dto())
            .collect()
    }
}
