//! Lattice Lab engine: backend calls, export dispatch and downloads.
mod client;
mod disposition;
mod download;
mod engine;
mod export;
mod types;

pub use client::{message_from_body, ApiSettings, ReqwestService, StructureService, DEFAULT_API_URL};
pub use disposition::{filename_from_disposition, sanitize_filename};
pub use download::{
    decode_data_url, download_filename, ensure_output_dir, AtomicFileWriter, DirectoryDownloads,
    DownloadError, DownloadSink, PersistError,
};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use export::{dispatch_export, read_raw_text, ExportError};
pub use types::{ApiError, EngineEvent, FailureKind};
