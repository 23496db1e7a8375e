//! Property updates pushed by the external scene viewer.
//!
//! The viewer reports screenshots and export-menu picks by bumping a
//! timestamp next to the payload. It may re-send the same values at any time,
//! so every reaction is gated on its own timestamp changing.

use crate::download::DownloadDescriptor;
use crate::format::ExportFormat;

pub type Timestamp = String;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerSignal {
    pub image_data: Option<String>,
    pub image_data_timestamp: Option<Timestamp>,
    pub file_type: Option<String>,
    pub file_timestamp: Option<Timestamp>,
}

impl ViewerSignal {
    pub fn screenshot(image_data: impl Into<String>, timestamp: impl Into<Timestamp>) -> Self {
        Self {
            image_data: Some(image_data.into()),
            image_data_timestamp: Some(timestamp.into()),
            ..Self::default()
        }
    }

    pub fn export(file_type: impl Into<String>, timestamp: impl Into<Timestamp>) -> Self {
        Self {
            file_type: Some(file_type.into()),
            file_timestamp: Some(timestamp.into()),
            ..Self::default()
        }
    }

    /// Applies a partial update: fields present in `update` replace ours.
    pub fn merge(&mut self, update: ViewerSignal) {
        if update.image_data.is_some() {
            self.image_data = update.image_data;
        }
        if update.image_data_timestamp.is_some() {
            self.image_data_timestamp = update.image_data_timestamp;
        }
        if update.file_type.is_some() {
            self.file_type = update.file_type;
        }
        if update.file_timestamp.is_some() {
            self.file_timestamp = update.file_timestamp;
        }
    }
}

/// Last value seen on one timestamp channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimestampGuard {
    last: Option<Timestamp>,
}

impl TimestampGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `timestamp` and reports whether it differs from the previous
    /// one. Empty timestamps are ignored and never fire.
    pub fn observe(&mut self, timestamp: Option<&str>) -> bool {
        let Some(timestamp) = timestamp.filter(|ts| !ts.is_empty()) else {
            return false;
        };
        if self.last.as_deref() == Some(timestamp) {
            return false;
        }
        self.last = Some(timestamp.to_string());
        true
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

/// Export format requested by a fresh export-menu pick, if any.
///
/// A new timestamp is consumed even when the label is unknown, so a later
/// re-delivery of the same pick stays silent.
pub fn resolve_export(signal: &ViewerSignal, guard: &mut TimestampGuard) -> Option<ExportFormat> {
    let label = signal.file_type.as_deref().filter(|label| !label.is_empty())?;
    if !guard.observe(signal.file_timestamp.as_deref()) {
        return None;
    }
    ExportFormat::from_label(label)
}

/// Download for a freshly captured screenshot, if any.
pub fn bridge_screenshot(
    signal: &ViewerSignal,
    guard: &mut TimestampGuard,
) -> Option<DownloadDescriptor> {
    if !guard.observe(signal.image_data_timestamp.as_deref()) {
        return None;
    }
    let image_data = signal.image_data.as_deref().filter(|data| !data.is_empty())?;
    Some(DownloadDescriptor::screenshot(image_data))
}
