use std::path::Path;

use lattice_core::{ExportFormat, ExportRequest, ExportResult, SourceStructure};
use lattice_logging::{lattice_info, lattice_warn};
use thiserror::Error;

use crate::client::StructureService;
use crate::download::DownloadError;
use crate::ApiError;

/// Why an export produced no file. Both variants carry the text shown to the
/// user.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Could not save export: {0}")]
    Download(#[from] DownloadError),
}

/// Resolves the current source into one export call.
///
/// The uploaded file is re-read first; if that fails the summary is sent
/// instead and nothing is reported to the user.
pub async fn dispatch_export(
    service: &dyn StructureService,
    format: ExportFormat,
    source: Option<&SourceStructure>,
) -> Result<ExportResult, ApiError> {
    let raw_text = match source.and_then(|source| source.file.as_ref()) {
        Some(file) => read_raw_text(&file.path).await,
        None => None,
    };
    let request = ExportRequest::build(format, raw_text, source);
    let result = service.export(&request).await?;
    lattice_info!(
        "Export {} ready as {} ({} bytes, {})",
        format.code(),
        result.filename,
        result.content.len(),
        result.mime_type
    );
    Ok(result)
}

/// Text of a previously uploaded file, or `None` if it can no longer be read.
pub async fn read_raw_text(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(err) => {
            lattice_warn!(
                "Could not re-read {:?} for export, sending summary instead: {}",
                path,
                err
            );
            None
        }
    }
}
