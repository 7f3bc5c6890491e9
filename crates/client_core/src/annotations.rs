use anyhow::{ensure, Result};
use reqwest::Client;
use shared::{
    domain::{Annotation, AnnotationFile, AnnotationId, TranscriptMessage, TranscriptSegment},
    protocol::{
        AnnotationDeleteReceipt, AnnotationSaveReceipt, AnnotationUpdateReceipt, HealthReport,
        TranscriptContent, TranscriptSummary,
    },
};
use url::Url;

use crate::error::ApiError;
use crate::transport::{endpoint, read_json};

/// Typed client for the transcript and annotation-document endpoints.
///
/// Unlike [`CategoryStore`](crate::CategoryStore) this keeps no local cache:
/// annotation documents are owned per transcript by their viewer, so every
/// call goes straight to the server and errors propagate to the caller.
pub struct AnnotatorClient {
    http: Client,
    base_url: Url,
}

impl AnnotatorClient {
    pub fn new(base_url: Url) -> Result<Self> {
        ensure!(
            matches!(base_url.scheme(), "http" | "https"),
            "server address must be an http:// or https:// url"
        );
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub async fn list_transcripts(&self) -> Result<Vec<TranscriptSummary>, ApiError> {
        read_json(self.http.get(endpoint(&self.base_url, &["transcripts"]))).await
    }

    pub async fn transcript_content(&self, filename: &str) -> Result<TranscriptContent, ApiError> {
        read_json(
            self.http
                .get(endpoint(&self.base_url, &["transcripts", filename])),
        )
        .await
    }

    pub async fn parsed_transcript(
        &self,
        filename: &str,
    ) -> Result<Vec<TranscriptMessage>, ApiError> {
        read_json(
            self.http
                .get(endpoint(&self.base_url, &["transcripts", filename, "parsed"])),
        )
        .await
    }

    pub async fn segmented_transcript(
        &self,
        transcript: &str,
    ) -> Result<Vec<TranscriptSegment>, ApiError> {
        read_json(self.http.get(endpoint(
            &self.base_url,
            &["transcripts", transcript, "segmented"],
        )))
        .await
    }

    /// The server answers with an empty document (null lastModified) when
    /// the transcript has no annotation file yet.
    pub async fn annotations(&self, transcript: &str) -> Result<AnnotationFile, ApiError> {
        read_json(self.http.get(endpoint(
            &self.base_url,
            &["annotations", "get", transcript],
        )))
        .await
    }

    pub async fn save_annotations(
        &self,
        transcript: &str,
        file: &AnnotationFile,
    ) -> Result<AnnotationSaveReceipt, ApiError> {
        read_json(
            self.http
                .post(endpoint(
                    &self.base_url,
                    &["annotations", "save", transcript],
                ))
                .json(file),
        )
        .await
    }

    /// Full replacement of one annotation; the server preserves the id.
    pub async fn update_annotation(
        &self,
        transcript: &str,
        annotation_id: AnnotationId,
        annotation: &Annotation,
    ) -> Result<AnnotationUpdateReceipt, ApiError> {
        let id = annotation_id.0.to_string();
        read_json(
            self.http
                .put(endpoint(
                    &self.base_url,
                    &["annotations", transcript, id.as_str()],
                ))
                .json(annotation),
        )
        .await
    }

    pub async fn delete_annotation(
        &self,
        transcript: &str,
        annotation_id: AnnotationId,
    ) -> Result<AnnotationDeleteReceipt, ApiError> {
        let id = annotation_id.0.to_string();
        read_json(self.http.delete(endpoint(
            &self.base_url,
            &["annotations", transcript, id.as_str()],
        )))
        .await
    }

    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        read_json(self.http.get(endpoint(&self.base_url, &["health"]))).await
    }
}

#[cfg(test)]
#[path = "tests/annotations_tests.rs"]
mod tests;
