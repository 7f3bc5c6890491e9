use reqwest::StatusCode;
use shared::domain::AnnotationId;
use thiserror::Error;

/// Transport and server-side failures from the REST contract. A non-2xx
/// response carries the body text as the message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("server responded {status}: {body}")]
    Server { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Failures of the category mutation surface. The validation variants are
/// detected locally, before any network call is issued.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Category \"{0}\" not found")]
    CategoryNotFound(String),
    #[error("Annotation already in category \"{label}\"")]
    DuplicateAssignment {
        label: String,
        transcript_file: String,
        annotation_id: AnnotationId,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}
