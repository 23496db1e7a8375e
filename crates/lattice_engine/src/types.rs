use std::fmt;
use std::path::PathBuf;

use lattice_core::{ExportFormat, SceneResponse, SelectedFile};

use crate::download::DownloadError;
use crate::export::ExportError;

#[derive(Debug)]
pub enum EngineEvent {
    SceneCompleted {
        /// The upload the request was made for; `None` for prompts.
        file: Option<SelectedFile>,
        result: Result<SceneResponse, ApiError>,
    },
    ExportCompleted {
        format: ExportFormat,
        result: Result<PathBuf, ExportError>,
    },
    DownloadCompleted {
        filename: String,
        result: Result<PathBuf, DownloadError>,
    },
}

/// A failed backend call, with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    /// The backend does not offer this endpoint (404/501 on prompts).
    Unavailable,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedResponse,
    LocalFile,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Unavailable => write!(f, "feature unavailable"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::LocalFile => write!(f, "local file unreadable"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
