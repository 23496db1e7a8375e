//! Line commands typed into the terminal host.
//!
//! Viewer interactions (export menu, screenshots) are simulated by commands
//! that build the same partial property updates the viewer would push.

use std::fs;
use std::path::Path;

use base64::Engine as _;
use chrono::Utc;
use lattice_core::{InputMode, Layer, Msg, SelectedFile, ViewerSignal};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Msg(Msg),
    Status,
    Help,
    Quit,
}

/// Raw viewer props as the viewer names them, e.g.
/// `{"fileType": "CIF", "fileTimestamp": "1700000000000"}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewerProps {
    image_data: Option<String>,
    image_data_timestamp: Option<serde_json::Value>,
    file_type: Option<String>,
    file_timestamp: Option<serde_json::Value>,
}

impl From<ViewerProps> for ViewerSignal {
    fn from(props: ViewerProps) -> Self {
        ViewerSignal {
            image_data: props.image_data,
            image_data_timestamp: props.image_data_timestamp.and_then(timestamp_text),
            file_type: props.file_type,
            file_timestamp: props.file_timestamp.and_then(timestamp_text),
        }
    }
}

pub const HELP: &str = "\
commands:
  mode prompt|upload        switch input mode
  prompt <text>             set the generation prompt
  generate                  generate a structure from the prompt
  select <path>             pick a .cif file
  upload                    upload the picked file
  export <format label>     export, e.g. `export CIF (Symmetrized)`
  screenshot <png|data-url> save a viewer screenshot
  signal <json>             raw viewer props, e.g. {\"fileType\":\"CIF\",\"fileTimestamp\":\"1\"}
  show|hide <layer>         atoms, bonds, unit_cell, polyhedra, axes
  dismiss                   close the error notice
  status                    print the current view
  quit";

/// Parses one input line. Blank lines parse to `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "mode" => match rest {
            "prompt" => Command::Msg(Msg::ModeSelected(InputMode::Prompt)),
            "upload" => Command::Msg(Msg::ModeSelected(InputMode::Upload)),
            other => return Err(format!("unknown mode {other:?}")),
        },
        "prompt" => Command::Msg(Msg::PromptChanged(rest.to_string())),
        "generate" => Command::Msg(Msg::GenerateClicked),
        "select" => Command::Msg(Msg::FileSelected(select_file(rest)?)),
        "upload" => Command::Msg(Msg::UploadClicked),
        "export" => Command::Msg(Msg::ViewerPropsChanged(ViewerSignal::export(
            rest,
            now_timestamp(),
        ))),
        "screenshot" => Command::Msg(Msg::ViewerPropsChanged(ViewerSignal::screenshot(
            image_data_url(rest)?,
            now_timestamp(),
        ))),
        "signal" => {
            let props: ViewerProps =
                serde_json::from_str(rest).map_err(|err| format!("invalid viewer props: {err}"))?;
            Command::Msg(Msg::ViewerPropsChanged(props.into()))
        }
        "show" | "hide" => {
            let layer = Layer::from_key(rest).ok_or_else(|| format!("unknown layer {rest:?}"))?;
            Command::Msg(Msg::LayerToggled {
                layer,
                visible: word == "show",
            })
        }
        "dismiss" => Command::Msg(Msg::ErrorDismissed),
        "status" | "legend" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(Some(command))
}

fn select_file(raw: &str) -> Result<SelectedFile, String> {
    if raw.is_empty() {
        return Err("select needs a file path".to_string());
    }
    let path = Path::new(raw);
    let metadata = fs::metadata(path).map_err(|err| format!("cannot open {raw}: {err}"))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string());
    Ok(SelectedFile {
        name,
        size: metadata.len(),
        path: path.to_path_buf(),
    })
}

/// Accepts a data URL as-is or reads a PNG file into one.
fn image_data_url(raw: &str) -> Result<String, String> {
    if raw.starts_with("data:") {
        return Ok(raw.to_string());
    }
    let bytes = fs::read(raw).map_err(|err| format!("cannot read image {raw}: {err}"))?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:image/png;base64,{encoded}"))
}

fn now_timestamp() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn timestamp_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
