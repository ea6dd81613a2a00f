use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;
use thiserror::Error;

use crate::classifier::model::InferenceError;
use crate::classifier::preprocess::PreprocessError;
use crate::classifier::registry::RegistryError;

/// Everything a single predict request can fail with. Failures are terminal
/// for the request; the client retries manually.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image file in upload")]
    MissingImage,
    #[error("Uploaded image exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("Invalid '{0}' field in upload")]
    InvalidField(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Predicted class index {0} is outside the class list")]
    ClassOutOfRange(usize),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::InvalidField(_) | ApiError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            // A leaf photo the image crate cannot decode is the client's problem.
            ApiError::Inference(InferenceError::Preprocessing(PreprocessError::Format(_)))
            | ApiError::Inference(InferenceError::Preprocessing(PreprocessError::Decode(_))) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Registry(RegistryError::UnknownModel(_)) => StatusCode::BAD_REQUEST,
            ApiError::Registry(RegistryError::Load { .. })
            | ApiError::Inference(_)
            | ApiError::ClassOutOfRange(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_side_failures_are_bad_requests() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Registry(RegistryError::UnknownModel("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn oversized_upload_is_413() {
        assert_eq!(
            ApiError::PayloadTooLarge(1024).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn runtime_failures_are_server_errors() {
        assert_eq!(
            ApiError::Inference(InferenceError::EmptyOutput).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::ClassOutOfRange(40).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_body_carries_the_message() {
        let resp = ApiError::MissingImage.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
