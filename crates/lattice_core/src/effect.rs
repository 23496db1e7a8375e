use crate::{DownloadDescriptor, ExportFormat, SelectedFile, SourceStructure};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    UploadStructure { file: SelectedFile },
    GenerateStructure { prompt: String },
    /// `source` is the structure current when the export was requested.
    Export {
        format: ExportFormat,
        source: Option<SourceStructure>,
    },
    Download(DownloadDescriptor),
}
