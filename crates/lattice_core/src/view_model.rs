use serde_json::Value;

use crate::{InputMode, LayerVisibility, LegendEntry, SceneResponse};

/// Legend entries drawn as swatches over the viewer.
pub const LEGEND_SWATCH_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub mode: InputMode,
    pub prompt: String,
    pub busy: bool,
    pub error: Option<String>,
    pub selected_file: Option<SelectedFileView>,
    /// Scene handed to the viewer; `None` when missing or not renderable.
    pub scene: Option<Value>,
    pub legend: Vec<LegendEntry>,
    pub swatches: Vec<LegendEntry>,
    pub metadata: Option<MetadataView>,
    pub visibility: LayerVisibility,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFileView {
    pub name: String,
    pub size_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataView {
    pub formula: String,
    pub n_sites: u64,
    pub source: &'static str,
    /// `(name, value)` rows for a, b, c, alpha, beta, gamma and volume.
    pub lattice: Vec<(&'static str, f64)>,
}

impl MetadataView {
    pub fn from_response(response: &SceneResponse) -> Self {
        let lattice = &response.lattice;
        Self {
            formula: response.formula.clone(),
            n_sites: response.n_sites,
            source: response.source.as_str(),
            lattice: vec![
                ("a", lattice.a),
                ("b", lattice.b),
                ("c", lattice.c),
                ("alpha", lattice.alpha),
                ("beta", lattice.beta),
                ("gamma", lattice.gamma),
                ("volume", lattice.volume),
            ],
        }
    }
}
