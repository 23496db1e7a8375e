use crate::signal::{bridge_screenshot, resolve_export};
use crate::validate::{validate_prompt, validate_upload, InputError};
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ModeSelected(mode) => {
            state.set_mode(mode);
            Vec::new()
        }
        Msg::PromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::FileSelected(file) => {
            match validate_upload(&file.name, file.size) {
                Ok(()) => {
                    state.clear_error();
                    state.set_file(Some(file));
                }
                Err(err) => {
                    state.set_error(err.to_string());
                    state.set_file(None);
                }
            }
            Vec::new()
        }
        Msg::UploadClicked => {
            if state.is_loading_scene() {
                return (state, Vec::new());
            }
            match state.selected_file().cloned() {
                Some(file) => {
                    state.begin_scene_load();
                    vec![Effect::UploadStructure { file }]
                }
                None => {
                    state.set_error(InputError::NoFileSelected.to_string());
                    Vec::new()
                }
            }
        }
        Msg::GenerateClicked => {
            if state.is_loading_scene() {
                return (state, Vec::new());
            }
            match validate_prompt(state.prompt()) {
                Ok(prompt) => {
                    let prompt = prompt.to_string();
                    state.begin_scene_load();
                    vec![Effect::GenerateStructure { prompt }]
                }
                Err(err) => {
                    state.set_error(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::SceneLoaded { file, response } => {
            state.finish_scene_load();
            state.apply_scene(file, response);
            Vec::new()
        }
        Msg::SceneFailed { message } => {
            state.finish_scene_load();
            state.clear_result();
            state.set_error(message);
            Vec::new()
        }
        Msg::ViewerPropsChanged(update) => {
            state.merge_viewer(update);
            let (signal, export_guard, screenshot_guard) = state.viewer_mut();
            let screenshot = bridge_screenshot(signal, screenshot_guard);
            let export = resolve_export(signal, export_guard);

            let mut effects = Vec::new();
            if let Some(descriptor) = screenshot {
                effects.push(Effect::Download(descriptor));
            }
            if let Some(format) = export {
                let source = state.source().cloned();
                state.begin_export();
                effects.push(Effect::Export { format, source });
            }
            effects
        }
        Msg::ExportFinished { .. } => {
            state.finish_export();
            Vec::new()
        }
        Msg::ExportFailed { message, .. } => {
            state.finish_export();
            state.set_error(message);
            Vec::new()
        }
        Msg::DownloadFailed { message } => {
            state.set_error(message);
            Vec::new()
        }
        Msg::LayerToggled { layer, visible } => {
            state.set_layer(layer, visible);
            Vec::new()
        }
        Msg::ErrorDismissed => {
            state.clear_error();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
