use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use kudos_types::api::{CreateKudosBody, KudosDto, ListKudosResponse, Pagination};
use kudos_types::models::KudosSubmission;

use crate::api::{ClientError, FEED_LIMIT, KudosClient};

/// Client-side copy of the first feed page. All optimistic mutations and
/// refreshes go through this type; it is deliberately independent of any
/// reactive-cache library.
#[derive(Debug, Default)]
pub struct FeedCache {
    data: Option<ListKudosResponse>,
    /// Bumped by `begin_send` so refresh tokens issued earlier go stale.
    epoch: u64,
}

/// Lifecycle of one optimistic submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    /// Provisional record written to the cache, server not yet answered.
    Pending,
    /// Server confirmed; the provisional record stays until a refresh
    /// replaces it with the authoritative one.
    Committed,
    /// Server failed; the cache was restored to the pre-send snapshot.
    RolledBack,
    /// A post-settle refresh replaced the cached page with server data.
    Refreshed,
}

#[derive(Debug)]
pub struct OptimisticSend {
    provisional_id: String,
    snapshot: Option<ListKudosResponse>,
    state: SendState,
}

impl OptimisticSend {
    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn provisional_id(&self) -> &str {
        &self.provisional_id
    }

    pub fn commit(&mut self) {
        if self.state == SendState::Pending {
            self.state = SendState::Committed;
        }
    }

    pub fn mark_refreshed(&mut self) {
        if matches!(self.state, SendState::Committed | SendState::RolledBack) {
            self.state = SendState::Refreshed;
        }
    }
}

/// Handed out before a fetch; a token from before the latest `begin_send`
/// no longer applies, which is how a stale response is kept from
/// overwriting the optimistic entry.
#[derive(Debug, Clone, Copy)]
pub struct RefreshToken(u64);

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&ListKudosResponse> {
        self.data.as_ref()
    }

    pub fn items(&self) -> &[KudosDto] {
        self.data.as_ref().map(|d| d.items.as_slice()).unwrap_or(&[])
    }

    /// Cancel in-flight refreshes, snapshot the current page, synthesize a
    /// provisional record, and write it to the cache before the server
    /// responds. The provisional id is prefixed so it can never collide
    /// with a server-minted one.
    pub fn begin_send(
        &mut self,
        submission: &KudosSubmission,
        sender_id: Uuid,
        now: DateTime<Utc>,
    ) -> OptimisticSend {
        self.epoch += 1;
        let snapshot = self.data.clone();

        let provisional = KudosDto {
            id: format!("optimistic-{}", Uuid::new_v4()),
            sender_id,
            receiver_id: submission.receiver_id,
            message: submission.message.clone(),
            category: submission.category,
            created_at: now,
        };
        let provisional_id = provisional.id.clone();

        let mut items = vec![provisional];
        if let Some(current) = &self.data {
            items.extend(current.items.iter().cloned());
        }
        items.truncate(FEED_LIMIT as usize);

        let count = items.len();
        self.data = Some(ListKudosResponse {
            items,
            pagination: Pagination {
                limit: FEED_LIMIT,
                offset: 0,
                count,
            },
        });

        OptimisticSend {
            provisional_id,
            snapshot,
            state: SendState::Pending,
        }
    }

    /// Full restore of the pre-send snapshot, not a partial merge.
    pub fn roll_back(&mut self, send: &mut OptimisticSend) {
        if send.state != SendState::Pending {
            return;
        }
        self.data = send.snapshot.take();
        send.state = SendState::RolledBack;
    }

    pub fn begin_refresh(&self) -> RefreshToken {
        RefreshToken(self.epoch)
    }

    /// Install a freshly fetched page unless the refresh was cancelled by a
    /// later `begin_send`. Returns whether the data was applied.
    pub fn complete_refresh(&mut self, token: RefreshToken, fresh: ListKudosResponse) -> bool {
        if token.0 != self.epoch {
            return false;
        }
        self.data = Some(fresh);
        true
    }
}

impl KudosClient {
    /// Drive the whole optimistic protocol for one submission:
    /// validate, write the provisional record, post, commit or roll back,
    /// then re-sync the cache from the server so the provisional entry is
    /// replaced by the authoritative record (real id, server timestamp).
    pub async fn send_kudos(
        &self,
        cache: &mut FeedCache,
        body: &CreateKudosBody,
    ) -> Result<KudosDto, ClientError> {
        // Validation failures never touch the cache.
        let submission = body.validate().map_err(ClientError::Invalid)?;

        let mut send = cache.begin_send(&submission, self.sender_id(), Utc::now());

        let result = self.post_kudos(&submission).await;
        match &result {
            Ok(_) => send.commit(),
            Err(_) => cache.roll_back(&mut send),
        }

        // Success or failure, the settled send triggers a refresh.
        let token = cache.begin_refresh();
        match self.fetch_kudos().await {
            Ok(fresh) => {
                if cache.complete_refresh(token, fresh) {
                    send.mark_refreshed();
                }
            }
            Err(e) => warn!("feed refresh after send failed: {}", e),
        }

        result
    }
}
