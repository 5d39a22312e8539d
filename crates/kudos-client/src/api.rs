use reqwest::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use kudos_types::api::{ApiErrorBody, CreateKudosBody, KudosDto, ListKudosResponse};
use kudos_types::models::KudosSubmission;
use kudos_types::validate::ValidationError;

/// Page size of the feed view; list requests always ask for the first page.
pub const FEED_LIMIT: u32 = 20;

/// Stand-in sender identity. The backend trusts the `x-user-id` header
/// without verification, so the client ships a fixed demo UUID.
pub const DEMO_SENDER_ID: Uuid = uuid::uuid!("11111111-1111-4111-8111-111111111111");

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response. The message is best-effort extracted from the
    /// `{message}` body, falling back to the HTTP status line.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Submission rejected by the shared schema before any request was made.
    /// The server runs the same checks and remains authoritative.
    #[error("invalid submission: {0}")]
    Invalid(#[from] ValidationError),

    /// A 2xx response whose body does not match the contract. Surfaced as
    /// an error rather than handing malformed data to the caller.
    #[error("malformed response: {0}")]
    Shape(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub struct KudosClient {
    http: reqwest::Client,
    base_url: String,
    sender_id: Uuid,
}

impl KudosClient {
    pub fn new(base_url: impl Into<String>, sender_id: Uuid) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sender_id,
        }
    }

    pub fn sender_id(&self) -> Uuid {
        self.sender_id
    }

    /// Fetch the first feed page with the client's fixed page size.
    pub async fn fetch_kudos(&self) -> Result<ListKudosResponse, ClientError> {
        let response = self
            .http
            .get(format!("{}/kudos?limit={}&offset=0", self.base_url, FEED_LIMIT))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        let list: ListKudosResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Shape(e.to_string()))?;
        validate_list_response(&list)?;
        Ok(list)
    }

    /// Validate the draft against the shared schema, then post it with the
    /// statically configured sender header.
    pub async fn create_kudos(&self, body: &CreateKudosBody) -> Result<KudosDto, ClientError> {
        let submission = body.validate()?;
        self.post_kudos(&submission).await
    }

    /// Post an already-validated submission.
    pub(crate) async fn post_kudos(
        &self,
        submission: &KudosSubmission,
    ) -> Result<KudosDto, ClientError> {
        let payload = CreateKudosBody {
            receiver_id: submission.receiver_id.to_string(),
            message: submission.message.clone(),
            category: submission.category.as_str().to_string(),
        };

        let response = self
            .http
            .post(format!("{}/kudos", self.base_url))
            .header("x-user-id", self.sender_id.to_string())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body = response.text().await?;
        let dto: KudosDto =
            serde_json::from_str(&body).map_err(|e| ClientError::Shape(e.to_string()))?;
        validate_dto(&dto)?;
        Ok(dto)
    }
}

async fn api_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ClientError::Api {
        status,
        message: extract_error_message(status, &body),
    }
}

/// Best-effort extraction of the `{message}` field from an error body,
/// falling back to the status line when the body is not the expected shape.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed.")
                .to_string()
        })
}

/// Server-minted ids must be UUID syntax. Typed deserialization already
/// covers the rest of the contract shape.
fn validate_dto(dto: &KudosDto) -> Result<(), ClientError> {
    if Uuid::parse_str(&dto.id).is_err() {
        return Err(ClientError::Shape(format!(
            "kudos id '{}' is not a UUID",
            dto.id
        )));
    }
    Ok(())
}

fn validate_list_response(list: &ListKudosResponse) -> Result<(), ClientError> {
    for item in &list.items {
        validate_dto(item)?;
    }
    Ok(())
}
