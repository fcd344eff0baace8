use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::filter::Pagination;

/// Success envelope builder. Object payloads are spread into the envelope
/// alongside `success` (and `message` when set); non-object payloads land
/// under a `data` key.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    message: Option<String>,
    payload: Value,
}

impl ApiResponse {
    fn build<T: Serialize>(status: StatusCode, payload: T) -> Self {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: None,
                    payload: json!({ "error": "Failed to serialize response data" }),
                };
            }
        };
        Self {
            status,
            message: None,
            payload,
        }
    }

    /// 200 OK success envelope
    pub fn success<T: Serialize>(payload: T) -> Self {
        Self::build(StatusCode::OK, payload)
    }

    /// 201 Created
    pub fn created<T: Serialize>(payload: T) -> Self {
        Self::build(StatusCode::CREATED, payload)
    }

    /// 200 OK for updates
    pub fn updated<T: Serialize>(payload: T) -> Self {
        Self::build(StatusCode::OK, payload)
    }

    /// 200 OK with a message and no payload, for deletions
    pub fn deleted(message: impl Into<String>) -> Self {
        Self::build(StatusCode::OK, Value::Null).with_message(message)
    }

    /// 200 OK page envelope with totalCount / currentPage / totalPages /
    /// hasNextPage / hasPrevPage
    pub fn paginated<T: Serialize>(rows: &[T], total_count: i64, pagination: &Pagination) -> Self {
        let total_pages = pagination.total_pages(total_count);
        Self::build(
            StatusCode::OK,
            json!({
                "data": rows,
                "totalCount": total_count,
                "currentPage": pagination.page,
                "totalPages": total_pages,
                "hasNextPage": pagination.page < total_pages,
                "hasPrevPage": pagination.page > 1,
            }),
        )
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn envelope(&self) -> Value {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        if let Some(message) = &self.message {
            body.insert("message".to_string(), Value::String(message.clone()));
        }

        match &self.payload {
            Value::Null => {}
            Value::Object(map) => {
                for (k, v) in map {
                    body.insert(k.clone(), v.clone());
                }
            }
            other => {
                body.insert("data".to_string(), other.clone());
            }
        }

        Value::Object(body)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        if self.status == StatusCode::INTERNAL_SERVER_ERROR {
            return (
                self.status,
                Json(json!({
                    "success": false,
                    "error": "Failed to serialize response data"
                })),
            )
                .into_response();
        }

        let envelope = self.envelope();
        (self.status, Json(envelope)).into_response()
    }
}

/// Handler return type: success envelope or classified error.
pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn pagination(page: i64, limit: i64) -> Pagination {
        let mut params = HashMap::new();
        params.insert("page".to_string(), page.to_string());
        params.insert("limit".to_string(), limit.to_string());
        Pagination::from_query(&params)
    }

    #[test]
    fn object_payload_is_spread_into_envelope() {
        let resp = ApiResponse::success(json!({ "policy": { "id": "p1" } }));
        let body = resp.envelope();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["policy"]["id"], json!("p1"));
        assert!(body.get("data").is_none());
    }

    #[test]
    fn scalar_payload_lands_under_data() {
        let resp = ApiResponse::success(json!([1, 2, 3]));
        let body = resp.envelope();
        assert_eq!(body["data"], json!([1, 2, 3]));
    }

    #[test]
    fn deleted_is_message_only() {
        let resp = ApiResponse::deleted("Policy deleted");
        let body = resp.envelope();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Policy deleted"));
        assert!(body.get("data").is_none());
    }

    #[test]
    fn paginated_math_uses_ceiling_division() {
        let rows: Vec<Value> = vec![];
        let resp = ApiResponse::paginated(&rows, 95, &pagination(3, 20));
        let body = resp.envelope();
        assert_eq!(body["totalCount"], json!(95));
        assert_eq!(body["currentPage"], json!(3));
        assert_eq!(body["totalPages"], json!(5));
        assert_eq!(body["hasNextPage"], json!(true));
        assert_eq!(body["hasPrevPage"], json!(true));
    }

    #[test]
    fn first_and_last_pages_toggle_neighbor_flags() {
        let rows: Vec<Value> = vec![];

        let first = ApiResponse::paginated(&rows, 95, &pagination(1, 20)).envelope();
        assert_eq!(first["hasPrevPage"], json!(false));
        assert_eq!(first["hasNextPage"], json!(true));

        let last = ApiResponse::paginated(&rows, 95, &pagination(5, 20)).envelope();
        assert_eq!(last["hasPrevPage"], json!(true));
        assert_eq!(last["hasNextPage"], json!(false));
    }

    #[test]
    fn empty_result_set_has_no_pages() {
        let rows: Vec<Value> = vec![];
        let body = ApiResponse::paginated(&rows, 0, &pagination(1, 20)).envelope();
        assert_eq!(body["totalPages"], json!(0));
        assert_eq!(body["hasNextPage"], json!(false));
        assert_eq!(body["hasPrevPage"], json!(false));
    }
}
