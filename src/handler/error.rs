//! Handler error type
//!
//! Every handler returns `Result<HttpResponse, HandlerError>`; the dispatcher
//! turns the error side into a response in one place.

use hyper::StatusCode;
use thiserror::Error;

use crate::http::{self, HttpResponse};
use crate::logger;
use crate::spreadsheet::SpreadsheetError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("unsupported file type")]
    UnsupportedMediaType,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("internal error: {0}")]
    Internal(String),
}

pub type HandlerResult = Result<HttpResponse, HandlerError>;

impl HandlerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error. Internal details reach the client only in debug mode.
    pub fn into_response(self, debug: bool) -> HttpResponse {
        let status = self.status();
        match self {
            Self::UnsupportedMediaType => http::build_text_response(status, "Unsupported file type"),
            Self::BadRequest(message) => {
                http::build_text_response(status, format!("400 Bad Request: {message}"))
            }
            Self::NotFound => http::build_404_response(),
            Self::Internal(detail) => {
                logger::log_error(&format!("Request failed: {detail}"));
                let body = if debug {
                    format!("500 Internal Server Error\n\n{detail}")
                } else {
                    "500 Internal Server Error".to_string()
                };
                http::build_text_response(status, body)
            }
        }
    }
}

impl From<StorageError> for HandlerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidName(_) | StorageError::NotFound(_) => Self::NotFound,
            StorageError::Io(e) => Self::Internal(format!("storage: {e}")),
        }
    }
}

impl From<SpreadsheetError> for HandlerError {
    fn from(e: SpreadsheetError) -> Self {
        match e {
            SpreadsheetError::Workbook(_) | SpreadsheetError::NoWorksheet => {
                Self::BadRequest(format!("could not read spreadsheet ({e})"))
            }
            SpreadsheetError::Csv(e) => Self::Internal(format!("csv: {e}")),
        }
    }
}

impl From<multer::Error> for HandlerError {
    fn from(e: multer::Error) -> Self {
        Self::BadRequest(format!("malformed upload ({e})"))
    }
}

impl From<minijinja::Error> for HandlerError {
    fn from(e: minijinja::Error) -> Self {
        Self::Internal(format!("template: {e}"))
    }
}

impl From<tokio::task::JoinError> for HandlerError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("worker task: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let r = HandlerError::UnsupportedMediaType.into_response(false);
        assert_eq!(r.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body_text(r).await, "Unsupported file type");

        let r = HandlerError::bad_request("missing field `name`").into_response(false);
        assert_eq!(r.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(r).await, "400 Bad Request: missing field `name`");

        let r = HandlerError::NotFound.into_response(false);
        assert_eq!(body_text(r).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_internal_detail_only_in_debug() {
        let r = HandlerError::Internal("disk on fire".into()).into_response(false);
        assert_eq!(r.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(r).await.contains("disk on fire"));

        let r = HandlerError::Internal("disk on fire".into()).into_response(true);
        assert!(body_text(r).await.contains("disk on fire"));
    }

    #[test]
    fn test_storage_errors_map_to_not_found() {
        let e: HandlerError = StorageError::InvalidName("../x".into()).into();
        assert!(matches!(e, HandlerError::NotFound));
        let e: HandlerError = StorageError::NotFound("x".into()).into();
        assert!(matches!(e, HandlerError::NotFound));
    }
}
