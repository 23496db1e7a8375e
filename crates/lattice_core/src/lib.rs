//! Lattice Lab core: pure state machine, scene legend and export protocol.
mod download;
mod effect;
mod export;
mod format;
mod legend;
mod msg;
mod scene;
mod signal;
mod state;
mod structure;
mod update;
mod validate;
mod view_model;

pub use download::{DownloadContent, DownloadDescriptor, SCREENSHOT_FILENAME, SCREENSHOT_MIME_TYPE};
pub use effect::Effect;
pub use export::{ExportRequest, ExportResult};
pub use format::{ExportFormat, EXPORT_FORMAT_LABELS};
pub use legend::{extract_legend, legend_label, ColorLegend, LegendEntry};
pub use msg::Msg;
pub use scene::{is_renderable, Primitive, SceneNode, SceneVisitor, COLORED_PRIMITIVES};
pub use signal::{bridge_screenshot, resolve_export, Timestamp, TimestampGuard, ViewerSignal};
pub use state::{AppState, InputMode, Layer, LayerVisibility};
pub use structure::{
    Lattice, LegendPayload, SceneResponse, SelectedFile, SourceStructure, StructureOrigin,
    StructureSummary,
};
pub use update::update;
pub use validate::{
    format_bytes, validate_prompt, validate_upload, InputError, ACCEPTED_EXTENSION,
    MAX_UPLOAD_BYTES,
};
pub use view_model::{AppViewModel, MetadataView, SelectedFileView, LEGEND_SWATCH_LIMIT};
