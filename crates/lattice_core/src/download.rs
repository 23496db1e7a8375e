/// Filename base for viewer screenshots.
pub const SCREENSHOT_FILENAME: &str = "crystal";
pub const SCREENSHOT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadContent {
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` as produced by the viewer.
    DataUrl(String),
}

/// One-shot request to save a file on the user's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub filename: String,
    pub content: DownloadContent,
    pub mime_type: String,
}

impl DownloadDescriptor {
    pub fn screenshot(image_data: impl Into<String>) -> Self {
        Self {
            filename: SCREENSHOT_FILENAME.to_string(),
            content: DownloadContent::DataUrl(image_data.into()),
            mime_type: SCREENSHOT_MIME_TYPE.to_string(),
        }
    }

    pub fn is_data_url(&self) -> bool {
        matches!(self.content, DownloadContent::DataUrl(_))
    }
}

impl From<crate::ExportResult> for DownloadDescriptor {
    fn from(result: crate::ExportResult) -> Self {
        Self {
            filename: result.filename,
            content: DownloadContent::Bytes(result.content),
            mime_type: result.mime_type,
        }
    }
}
