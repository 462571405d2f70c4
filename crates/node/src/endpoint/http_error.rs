use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (code, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (code, msg).into_response()
    }
}

impl From<chordal_core::error::Error> for HttpError {
    fn from(e: chordal_core::error::Error) -> Self {
        if e.is_argument_error() {
            HttpError::BadRequest(e.to_string())
        } else {
            HttpError::Internal(e.to_string())
        }
    }
}

impl From<crate::error::Error> for HttpError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::CoreError(e) => e.into(),
            e => HttpError::Internal(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(e: serde_json::Error) -> Self {
        HttpError::BadRequest(format!("invalid request body: {e}"))
    }
}
