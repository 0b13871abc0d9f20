/*
 * Responsibility
 * - Uniform success envelope for handlers that create something: 201 + {"data": ...}
 * - Errors are not wrapped here; AppError renders itself
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `201 Created` with the payload under `data`.
#[derive(Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(DataEnvelope { data: self.0 })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn wraps_payload_under_data() {
        let res = Created(json!({ "id": "u1" })).into_response();
        assert_eq!(res.status(), StatusCode::CREATED);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "data": { "id": "u1" } }));
    }
}
