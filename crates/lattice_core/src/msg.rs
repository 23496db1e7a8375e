use crate::{ExportFormat, InputMode, Layer, SceneResponse, SelectedFile, ViewerSignal};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User switched between prompt and upload input.
    ModeSelected(InputMode),
    /// User edited the prompt text.
    PromptChanged(String),
    /// User picked (or dropped) a local structure file.
    FileSelected(SelectedFile),
    /// User asked to upload the selected file.
    UploadClicked,
    /// User asked the backend to generate a structure from the prompt.
    GenerateClicked,
    /// A scene request succeeded. `file` is the upload it was built from.
    SceneLoaded {
        file: Option<SelectedFile>,
        response: SceneResponse,
    },
    /// A scene request failed.
    SceneFailed { message: String },
    /// Partial property update pushed by the scene viewer.
    ViewerPropsChanged(ViewerSignal),
    /// Export artifact was fetched and saved.
    ExportFinished {
        format: ExportFormat,
        filename: String,
    },
    /// Export call or saving its artifact failed.
    ExportFailed {
        format: ExportFormat,
        message: String,
    },
    /// A screenshot could not be saved.
    DownloadFailed { message: String },
    /// User toggled a layer of the viewer.
    LayerToggled { layer: Layer, visible: bool },
    /// User closed the error notice.
    ErrorDismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}
