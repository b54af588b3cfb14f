use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A JSON body with an explicit status code
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self { status: StatusCode::OK, body }
    }

    pub fn created(body: T) -> Self {
        Self { status: StatusCode::CREATED, body }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 200 response carrying an `X-Total-Count` header alongside the body
pub fn with_total_count<T: Serialize>(body: T, count: usize) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("X-Total-Count", HeaderValue::from(count));

    (StatusCode::OK, headers, Json(body)).into_response()
}
