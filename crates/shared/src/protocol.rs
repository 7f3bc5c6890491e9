use serde::{Deserialize, Serialize};

use crate::domain::{Annotation, AnnotationId, Category, CategoryAssignment};

/// Flat category body, used by `POST /categories` and by the rename/unassign
/// `PUT /categories/{label}` full replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpsertRequest {
    pub label: String,
    pub annotations: Vec<CategoryAssignment>,
}

/// Embedded body for the assign-annotation overload of `PUT /categories`.
/// A distinct server operation from the path-addressed PUT, not a variant
/// of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAssignRequest {
    pub label: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSummary {
    pub filename: String,
    pub size: u64,
    pub modified: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptContent {
    pub filename: String,
    pub content: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSaveReceipt {
    pub message: String,
    pub filename: String,
    #[serde(rename = "annotationCount")]
    pub annotation_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationUpdateReceipt {
    pub message: String,
    #[serde(rename = "updatedId")]
    pub updated_id: AnnotationId,
    pub annotation: Annotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDeleteReceipt {
    pub message: String,
    #[serde(rename = "deletedId")]
    pub deleted_id: AnnotationId,
    #[serde(rename = "remainingCount")]
    pub remaining_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub transcripts_dir_exists: bool,
    pub annotations_dir_exists: bool,
    pub transcript_files: u64,
    pub annotation_files: u64,
}
