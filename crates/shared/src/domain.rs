use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(AnnotationId);

/// A named grouping of annotation references. The label is the category's
/// identity; renaming goes through the server, never a local key swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub annotations: Vec<CategoryAssignment>,
}

/// Membership of one annotation in a category. A reference, not ownership:
/// the annotation itself lives in the transcript's annotation document.
/// Within one category the (transcriptFile, annotationId) pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAssignment {
    pub transcript_file: String,
    pub annotation_id: AnnotationId,
}

impl CategoryAssignment {
    /// Composite key used by the derived annotation → labels index.
    pub fn index_key(&self) -> String {
        format!("{}-{}", self.transcript_file, self.annotation_id.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub speaker: String,
    pub timestamp: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_index: i64,
    pub end_index: i64,
    pub title: String,
    pub messages: Vec<TranscriptMessage>,
}

/// An annotation as stored in a transcript's annotation document. Field
/// names follow the server's JSON, which mixes camelCase and snake_case.
/// Timestamps stay strings: the server emits them verbatim and the client
/// never does date arithmetic on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "messageIndices")]
    pub message_indices: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_messages: Option<Vec<TranscriptMessage>>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Per-transcript annotation document as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationFile {
    pub transcript_file: String,
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub last_modified: Option<String>,
}
