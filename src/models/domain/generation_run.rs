use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One invocation of quiz generation: the extracted document text and the
/// model reply it produced. Never updated after insert.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationRun {
    pub id: i64,
    pub source_text: String,
    pub raw_output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GenerationRun {
    pub fn new(id: i64, source_text: &str, raw_output: &str) -> Self {
        GenerationRun {
            id,
            source_text: source_text.to_string(),
            raw_output: raw_output.to_string(),
            created_at: Some(Utc::now()),
        }
    }
}
