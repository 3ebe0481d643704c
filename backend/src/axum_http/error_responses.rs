use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    /// Stable machine-readable error code.
    pub error: &'static str,
    pub message: String,
}

/// Usecase errors that know how they surface over HTTP.
pub trait ApiError: std::error::Error {
    fn status_code(&self) -> StatusCode;

    fn error_code(&self) -> &'static str;
}

/// Renders an error, replacing server-side detail with a generic message.
pub fn error_response<E: ApiError>(err: &E) -> Response {
    let status = err.status_code();
    let message = if status.is_server_error() {
        "Internal server error".to_string()
    } else {
        err.to_string()
    };

    let body = Json(ErrorResponse {
        code: status.as_u16(),
        error: err.error_code(),
        message,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use thiserror::Error;

    #[derive(Debug, Error)]
    enum LookupError {
        #[error("Bad request: {0}")]
        BadRequest(String),

        #[error("Internal server error")]
        Internal(#[from] anyhow::Error),
    }

    impl ApiError for LookupError {
        fn status_code(&self) -> StatusCode {
            match self {
                LookupError::BadRequest(_) => StatusCode::BAD_REQUEST,
                LookupError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn error_code(&self) -> &'static str {
            match self {
                LookupError::BadRequest(_) => "BAD_REQUEST",
                LookupError::Internal(_) => "INTERNAL_ERROR",
            }
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn client_errors_keep_their_message() {
        let response = error_response(&LookupError::BadRequest("limit must be a number".to_string()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(body["message"], "Bad request: limit must be a number");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_detail() {
        let response = error_response(&LookupError::Internal(anyhow::anyhow!(
            "connection refused at 10.0.0.3:5432"
        )));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "Internal server error");
    }
}
