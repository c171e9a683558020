use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Photo file is empty")]
    EmptyPhoto,

    #[error("Photo file size {size} exceeds maximum allowed size of {max} bytes")]
    PhotoTooLarge { size: u64, max: u64 },

    #[error("File must be an image (got {})", .0.as_deref().unwrap_or("no content type"))]
    InvalidContentType(Option<String>),

    #[error("Unsupported or corrupt image data: {0}")]
    UnsupportedImageFormat(String),

    #[error("I/O error while decoding photo: {0}")]
    DecodeIo(String),

    #[error("Failed to encode photo: {0}")]
    EncodingFailure(String),
}

impl PhotoError {
    /// Caller-correctable failures. Everything else is a server fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PhotoError::EmptyPhoto
                | PhotoError::PhotoTooLarge { .. }
                | PhotoError::InvalidContentType(_)
                | PhotoError::UnsupportedImageFormat(_)
        )
    }
}

impl ResponseError for PhotoError {
    fn status_code(&self) -> StatusCode {
        if self.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_input_error() {
            format!("Error: {}", self)
        } else {
            format!("Error processing photo: {}", self)
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_map_to_bad_request() {
        let errors = [
            PhotoError::EmptyPhoto,
            PhotoError::PhotoTooLarge { size: 2, max: 1 },
            PhotoError::InvalidContentType(Some("text/plain".into())),
            PhotoError::UnsupportedImageFormat("bad magic".into()),
        ];

        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "{err}");
        }
    }

    #[test]
    fn internal_errors_map_to_server_error() {
        assert_eq!(
            PhotoError::EncodingFailure("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PhotoError::DecodeIo("eof".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_content_type_is_described() {
        let msg = PhotoError::InvalidContentType(None).to_string();
        assert!(msg.contains("no content type"));
    }
}
