use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use kudos_types::api::{
    ApiErrorBody, CreateKudosBody, KudosDto, ListKudosQuery, ListKudosResponse, Pagination,
};
use kudos_types::validate::{SenderIdHeader, ValidationError};

use crate::store::KudosStore;

/// Raw inputs of the create operation, before any validation: the
/// `x-user-id` header as received (possibly absent) and the request body as
/// parsed JSON.
#[derive(Debug)]
pub struct CreateKudosRequest {
    pub sender_id_header: Option<String>,
    pub body: Value,
}

/// Transport-independent handler outcome: the status to respond with and
/// the body to serialize. The axum layer only converts this to a response.
#[derive(Debug)]
pub struct HandlerReply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Kudos(Box<KudosDto>),
    List(ListKudosResponse),
    Error(ApiErrorBody),
}

impl IntoResponse for HandlerReply {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Create: validate header, validate body, persist. Validation failures
/// never reach the store; store failures surface as a generic 500 with the
/// detail kept in the log.
pub fn handle_create_kudos<S: KudosStore + ?Sized>(
    store: &S,
    request: CreateKudosRequest,
) -> HandlerReply {
    let sender_id = match SenderIdHeader::parse(request.sender_id_header.as_deref()) {
        Ok(id) => id,
        Err(errors) => return invalid("Invalid x-user-id header.", errors),
    };

    let submission = match CreateKudosBody::from_value(&request.body)
        .and_then(|body| body.validate())
    {
        Ok(submission) => submission,
        Err(errors) => return invalid("Invalid request body.", errors),
    };

    match store.create(submission.with_sender(sender_id)) {
        Ok(dto) => HandlerReply {
            status: StatusCode::CREATED,
            body: ReplyBody::Kudos(Box::new(dto)),
        },
        Err(e) => {
            error!("create kudos failed: {:#}", e);
            failed("Failed to create kudos.")
        }
    }
}

/// List: validate query, fetch the page, shape the pagination echo.
/// `count` is the size of this page, not the total row count.
pub fn handle_list_kudos<S: KudosStore + ?Sized>(
    store: &S,
    query: ListKudosQuery,
) -> HandlerReply {
    let page = match query.validate() {
        Ok(page) => page,
        Err(errors) => return invalid("Invalid query params.", errors),
    };

    match store.list(page) {
        Ok(items) => {
            let count = items.len();
            HandlerReply {
                status: StatusCode::OK,
                body: ReplyBody::List(ListKudosResponse {
                    items,
                    pagination: Pagination {
                        limit: page.limit,
                        offset: page.offset,
                        count,
                    },
                }),
            }
        }
        Err(e) => {
            error!("list kudos failed: {:#}", e);
            failed("Failed to fetch kudos.")
        }
    }
}

fn invalid(message: &str, errors: ValidationError) -> HandlerReply {
    HandlerReply {
        status: StatusCode::BAD_REQUEST,
        body: ReplyBody::Error(ApiErrorBody {
            message: message.to_string(),
            errors: Some(errors),
        }),
    }
}

fn failed(message: &str) -> HandlerReply {
    HandlerReply {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ReplyBody::Error(ApiErrorBody {
            message: message.to_string(),
            errors: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{Result, bail};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use kudos_types::api::{KudosDto, ListKudosQuery};
    use kudos_types::models::{NewKudos, PageParams};

    use super::{CreateKudosRequest, HandlerReply, handle_create_kudos, handle_list_kudos};
    use crate::store::KudosStore;

    const SENDER_ID: &str = "11111111-1111-4111-8111-111111111111";
    const RECEIVER_ID: &str = "22222222-2222-4222-8222-222222222222";
    const CREATED_ID: &str = "aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa";

    #[derive(Default)]
    struct FakeStore {
        fail: bool,
        list_items: Vec<KudosDto>,
        create_calls: Mutex<Vec<NewKudos>>,
        list_calls: Mutex<Vec<PageParams>>,
    }

    impl KudosStore for FakeStore {
        fn create(&self, input: NewKudos) -> Result<KudosDto> {
            self.create_calls.lock().unwrap().push(input.clone());
            if self.fail {
                bail!("db failure");
            }
            Ok(KudosDto {
                id: CREATED_ID.to_string(),
                sender_id: input.sender_id,
                receiver_id: input.receiver_id,
                message: input.message,
                category: input.category,
                created_at: "2024-06-01T12:00:00Z".parse().unwrap(),
            })
        }

        fn list(&self, page: PageParams) -> Result<Vec<KudosDto>> {
            self.list_calls.lock().unwrap().push(page);
            if self.fail {
                bail!("db failure");
            }
            Ok(self.list_items.clone())
        }
    }

    fn body_json(reply: &HandlerReply) -> Value {
        serde_json::to_value(&reply.body).unwrap()
    }

    fn valid_body() -> Value {
        json!({
            "receiverId": RECEIVER_ID,
            "message": "Thanks!",
            "category": "Thank You",
        })
    }

    fn create(store: &FakeStore, header: Option<&str>, body: Value) -> HandlerReply {
        handle_create_kudos(
            store,
            CreateKudosRequest {
                sender_id_header: header.map(str::to_string),
                body,
            },
        )
    }

    fn list(store: &FakeStore, limit: Option<&str>, offset: Option<&str>) -> HandlerReply {
        handle_list_kudos(
            store,
            ListKudosQuery {
                limit: limit.map(str::to_string),
                offset: offset.map(str::to_string),
            },
        )
    }

    #[test]
    fn create_rejects_missing_header_without_touching_store() {
        let store = FakeStore::default();
        let reply = create(&store, None, valid_body());

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&reply)["message"], "Invalid x-user-id header.");
        assert!(store.create_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_malformed_header() {
        let store = FakeStore::default();
        let reply = create(&store, Some("not-a-uuid"), valid_body());

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&reply)["message"], "Invalid x-user-id header.");
        assert!(store.create_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_invalid_body() {
        let store = FakeStore::default();
        let reply = create(
            &store,
            Some(SENDER_ID),
            json!({ "receiverId": RECEIVER_ID, "message": "", "category": "Thank You" }),
        );

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        let body = body_json(&reply);
        assert_eq!(body["message"], "Invalid request body.");
        assert!(body["errors"]["message"].is_array());
        assert!(store.create_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn create_rejects_overlong_message_and_unknown_category() {
        let store = FakeStore::default();

        let too_long = create(
            &store,
            Some(SENDER_ID),
            json!({ "receiverId": RECEIVER_ID, "message": "a".repeat(501), "category": "Thank You" }),
        );
        let bad_category = create(
            &store,
            Some(SENDER_ID),
            json!({ "receiverId": RECEIVER_ID, "message": "Thanks!", "category": "Invalid Category" }),
        );

        assert_eq!(too_long.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&too_long)["message"], "Invalid request body.");
        assert_eq!(bad_category.status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&bad_category)["message"], "Invalid request body.");
        assert!(store.create_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn create_passes_validated_input_to_store_and_echoes_result() {
        let store = FakeStore::default();
        let reply = create(
            &store,
            Some(SENDER_ID),
            json!({
                "receiverId": RECEIVER_ID,
                "message": "  Great support on the release!  ",
                "category": "Teamwork",
            }),
        );

        assert_eq!(reply.status, StatusCode::CREATED);

        let calls = store.create_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].sender_id, SENDER_ID.parse::<Uuid>().unwrap());
        assert_eq!(calls[0].receiver_id, RECEIVER_ID.parse::<Uuid>().unwrap());
        // Trimming happens before the store sees the message.
        assert_eq!(calls[0].message, "Great support on the release!");

        let body = body_json(&reply);
        assert_eq!(body["id"], CREATED_ID);
        assert_eq!(body["senderId"], SENDER_ID);
        assert_eq!(body["receiverId"], RECEIVER_ID);
        assert_eq!(body["message"], "Great support on the release!");
        assert_eq!(body["category"], "Teamwork");
        assert!(body["createdAt"].is_string());
    }

    #[test]
    fn create_maps_store_failure_to_generic_500() {
        let store = FakeStore {
            fail: true,
            ..FakeStore::default()
        };
        let reply = create(&store, Some(SENDER_ID), valid_body());

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&reply), json!({ "message": "Failed to create kudos." }));
    }

    #[test]
    fn list_rejects_out_of_range_pagination_without_touching_store() {
        let store = FakeStore::default();
        for (limit, offset) in [(Some("0"), Some("2")), (Some("101"), Some("0")), (Some("10"), Some("-1"))] {
            let reply = list(&store, limit, offset);
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
            assert_eq!(body_json(&reply)["message"], "Invalid query params.");
        }
        assert!(store.list_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn list_applies_defaults_when_query_is_empty() {
        let store = FakeStore::default();
        let reply = list(&store, None, None);

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            store.list_calls.lock().unwrap()[0],
            PageParams { limit: 20, offset: 0 }
        );
        assert_eq!(
            body_json(&reply),
            json!({
                "items": [],
                "pagination": { "limit": 20, "offset": 0, "count": 0 },
            })
        );
    }

    #[test]
    fn list_echoes_query_pagination_and_counts_returned_items() {
        let store = FakeStore {
            list_items: vec![KudosDto {
                id: "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb".to_string(),
                sender_id: SENDER_ID.parse().unwrap(),
                receiver_id: RECEIVER_ID.parse().unwrap(),
                message: "A".to_string(),
                category: kudos_types::models::KudosCategory::GreatJob,
                created_at: "2024-06-01T12:00:00Z".parse().unwrap(),
            }],
            ..FakeStore::default()
        };
        let reply = list(&store, Some("1"), Some("2"));

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(
            store.list_calls.lock().unwrap()[0],
            PageParams { limit: 1, offset: 2 }
        );
        let body = body_json(&reply);
        assert_eq!(body["pagination"], json!({ "limit": 1, "offset": 2, "count": 1 }));
        assert_eq!(body["items"][0]["id"], "bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb");
    }

    #[test]
    fn list_maps_store_failure_to_generic_500() {
        let store = FakeStore {
            fail: true,
            ..FakeStore::default()
        };
        let reply = list(&store, Some("1"), Some("2"));

        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&reply), json!({ "message": "Failed to fetch kudos." }));
    }
}
