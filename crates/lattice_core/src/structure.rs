use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::legend::ColorLegend;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureOrigin {
    Upload,
    Prompt,
}

impl StructureOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureOrigin::Upload => "upload",
            StructureOrigin::Prompt => "prompt",
        }
    }
}

/// Optional legend block some backends attach to a scene response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LegendPayload {
    /// Absent (or `null`) means the legend is derived from the scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Map<String, Value>>,
}

/// Body returned by both scene endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneResponse {
    #[serde(default)]
    pub scene: Value,
    pub formula: String,
    pub lattice: Lattice,
    pub n_sites: u64,
    pub source: StructureOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendPayload>,
}

impl SceneResponse {
    pub fn summary(&self) -> StructureSummary {
        StructureSummary {
            lattice: self.lattice,
            formula: self.formula.clone(),
            n_sites: self.n_sites,
        }
    }

    /// The backend's color map, if it sent one.
    pub fn explicit_colors(&self) -> Option<ColorLegend> {
        let colors = self.legend.as_ref()?.colors.as_ref()?;
        Some(
            colors
                .iter()
                .map(|(color, label)| {
                    let label = match label {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    };
                    (color.clone(), label)
                })
                .collect(),
        )
    }
}

/// Derived description of a generated structure, sent when no raw file is
/// available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSummary {
    pub lattice: Lattice,
    pub formula: String,
    pub n_sites: u64,
}

/// A local structure file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

/// The structure export requests are built from.
///
/// Replaced wholesale whenever an upload or generation succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStructure {
    /// Original upload; its text is re-read at export time.
    pub file: Option<SelectedFile>,
    pub summary: StructureSummary,
    pub scene: Option<Value>,
}

impl SourceStructure {
    pub fn from_response(response: &SceneResponse, file: Option<SelectedFile>) -> Self {
        let scene = match &response.scene {
            Value::Null => None,
            scene => Some(scene.clone()),
        };
        Self {
            file,
            summary: response.summary(),
            scene,
        }
    }
}
