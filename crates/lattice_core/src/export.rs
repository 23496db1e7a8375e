use serde::Serialize;
use serde_json::Value;

use crate::format::ExportFormat;
use crate::structure::{SourceStructure, StructureSummary};

/// JSON body of an export call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cif: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Value>,
}

impl ExportRequest {
    /// Builds the body from whatever the current source provides.
    ///
    /// `raw_text` is the re-read upload, if that read succeeded. Raw text wins
    /// over the summary; the scene rides along either way.
    pub fn build(
        format: ExportFormat,
        raw_text: Option<String>,
        source: Option<&SourceStructure>,
    ) -> Self {
        let cif = raw_text.filter(|text| !text.is_empty());
        let structure = match (&cif, source) {
            (None, Some(source)) => Some(source.summary.clone()),
            _ => None,
        };
        Self {
            format,
            cif,
            structure,
            scene: source.and_then(|source| source.scene.clone()),
        }
    }
}

/// Downloaded artifact returned by the export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}
