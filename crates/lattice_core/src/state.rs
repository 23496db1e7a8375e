use serde_json::Value;

use crate::legend::extract_legend;
use crate::scene::{is_renderable, SceneNode};
use crate::signal::{TimestampGuard, ViewerSignal};
use crate::structure::{SceneResponse, SelectedFile, SourceStructure};
use crate::validate::format_bytes;
use crate::view_model::{AppViewModel, MetadataView, SelectedFileView, LEGEND_SWATCH_LIMIT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    Prompt,
    #[default]
    Upload,
}

/// Viewer layers the user can hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Atoms,
    Bonds,
    UnitCell,
    Polyhedra,
    Axes,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Atoms,
        Layer::Bonds,
        Layer::UnitCell,
        Layer::Polyhedra,
        Layer::Axes,
    ];

    /// Key used by the viewer's visibility map.
    pub fn key(self) -> &'static str {
        match self {
            Layer::Atoms => "atoms",
            Layer::Bonds => "bonds",
            Layer::UnitCell => "unit_cell",
            Layer::Polyhedra => "polyhedra",
            Layer::Axes => "axes",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub atoms: bool,
    pub bonds: bool,
    pub unit_cell: bool,
    pub polyhedra: bool,
    pub axes: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            atoms: true,
            bonds: true,
            unit_cell: true,
            polyhedra: true,
            axes: true,
        }
    }
}

impl LayerVisibility {
    pub fn get(&self, layer: Layer) -> bool {
        match layer {
            Layer::Atoms => self.atoms,
            Layer::Bonds => self.bonds,
            Layer::UnitCell => self.unit_cell,
            Layer::Polyhedra => self.polyhedra,
            Layer::Axes => self.axes,
        }
    }

    pub fn set(&mut self, layer: Layer, visible: bool) {
        let slot = match layer {
            Layer::Atoms => &mut self.atoms,
            Layer::Bonds => &mut self.bonds,
            Layer::UnitCell => &mut self.unit_cell,
            Layer::Polyhedra => &mut self.polyhedra,
            Layer::Axes => &mut self.axes,
        };
        *slot = visible;
    }

    /// The `{ layer: 0 | 1 }` map the viewer expects.
    pub fn toggle_map(&self) -> Vec<(&'static str, u8)> {
        Layer::ALL
            .into_iter()
            .map(|layer| (layer.key(), u8::from(self.get(layer))))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    mode: InputMode,
    prompt: String,
    file: Option<SelectedFile>,
    scene_loads_in_flight: usize,
    exports_in_flight: usize,
    error: Option<String>,
    result: Option<SceneResponse>,
    source: Option<SourceStructure>,
    viewer: ViewerSignal,
    export_guard: TimestampGuard,
    screenshot_guard: TimestampGuard,
    visibility: LayerVisibility,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let scene = self
            .result
            .as_ref()
            .map(|result| &result.scene)
            .filter(|scene| is_renderable(scene))
            .cloned();
        let legend = self.legend(scene.as_ref());
        let swatches = legend.iter().take(LEGEND_SWATCH_LIMIT).cloned().collect();

        AppViewModel {
            mode: self.mode,
            prompt: self.prompt.clone(),
            busy: self.scene_loads_in_flight > 0 || self.exports_in_flight > 0,
            error: self.error.clone(),
            selected_file: self.file.as_ref().map(|file| SelectedFileView {
                name: file.name.clone(),
                size_label: format_bytes(file.size),
            }),
            scene,
            legend,
            swatches,
            metadata: self.result.as_ref().map(MetadataView::from_response),
            visibility: self.visibility,
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn source(&self) -> Option<&SourceStructure> {
        self.source.as_ref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    fn legend(&self, scene: Option<&Value>) -> Vec<crate::LegendEntry> {
        let explicit = self.result.as_ref().and_then(SceneResponse::explicit_colors);
        let root = scene.map(SceneNode::from_value);
        extract_legend(root.as_ref(), explicit.as_ref())
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_loading_scene(&self) -> bool {
        self.scene_loads_in_flight > 0
    }

    pub(crate) fn prompt(&self) -> &str {
        &self.prompt
    }

    pub(crate) fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
        self.mark_dirty();
    }

    pub(crate) fn set_file(&mut self, file: Option<SelectedFile>) {
        self.file = file;
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.mark_dirty();
    }

    pub(crate) fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn begin_scene_load(&mut self) {
        self.scene_loads_in_flight += 1;
        self.error = None;
        self.mark_dirty();
    }

    pub(crate) fn finish_scene_load(&mut self) {
        self.scene_loads_in_flight = self.scene_loads_in_flight.saturating_sub(1);
        self.mark_dirty();
    }

    pub(crate) fn apply_scene(&mut self, file: Option<SelectedFile>, response: SceneResponse) {
        self.source = Some(SourceStructure::from_response(&response, file));
        self.result = Some(response);
        self.mark_dirty();
    }

    /// Hides the displayed result; the export source is left in place.
    pub(crate) fn clear_result(&mut self) {
        self.result = None;
        self.mark_dirty();
    }

    pub(crate) fn begin_export(&mut self) {
        self.exports_in_flight += 1;
        self.mark_dirty();
    }

    pub(crate) fn finish_export(&mut self) {
        self.exports_in_flight = self.exports_in_flight.saturating_sub(1);
        self.mark_dirty();
    }

    pub(crate) fn viewer_mut(&mut self) -> (&ViewerSignal, &mut TimestampGuard, &mut TimestampGuard) {
        (&self.viewer, &mut self.export_guard, &mut self.screenshot_guard)
    }

    pub(crate) fn merge_viewer(&mut self, update: ViewerSignal) {
        self.viewer.merge(update);
    }

    pub(crate) fn set_layer(&mut self, layer: Layer, visible: bool) {
        if self.visibility.get(layer) != visible {
            self.visibility.set(layer, visible);
            self.mark_dirty();
        }
    }
}
