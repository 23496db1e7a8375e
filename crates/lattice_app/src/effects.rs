use std::path::Path;
use std::sync::{mpsc, Arc};

use lattice_core::{Effect, Msg};
use lattice_engine::{
    ApiSettings, DirectoryDownloads, EngineEvent, EngineHandle, EventSink, ReqwestService,
};
use lattice_logging::{lattice_info, lattice_warn};

use crate::app::Input;

/// Executes effects produced by `update` on the engine.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: ApiSettings,
        download_dir: &Path,
        input_tx: mpsc::Sender<Input>,
    ) -> anyhow::Result<Self> {
        let service = ReqwestService::new(settings)?;
        let downloads = DirectoryDownloads::new(download_dir.to_path_buf());
        let engine = EngineHandle::new(
            Arc::new(service),
            Arc::new(downloads),
            Arc::new(MsgSink { input_tx }),
        )?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::UploadStructure { file } => {
                    lattice_info!("UploadStructure name={} size={}", file.name, file.size);
                    self.engine.upload(file);
                }
                Effect::GenerateStructure { prompt } => {
                    lattice_info!("GenerateStructure prompt_len={}", prompt.len());
                    self.engine.generate(prompt);
                }
                Effect::Export { format, source } => {
                    lattice_info!(
                        "Export format={} source_loaded={}",
                        format.code(),
                        source.is_some()
                    );
                    self.engine.export(format, source);
                }
                Effect::Download(descriptor) => {
                    lattice_info!(
                        "Download filename={} data_url={}",
                        descriptor.filename,
                        descriptor.is_data_url()
                    );
                    self.engine.download(descriptor);
                }
            }
        }
    }
}

/// Feeds engine completions back into the update loop.
struct MsgSink {
    input_tx: mpsc::Sender<Input>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.input_tx.send(Input::Msg(map_event(event)));
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SceneCompleted { file, result } => match result {
            Ok(response) => Msg::SceneLoaded { file, response },
            Err(err) => {
                lattice_warn!("Scene request failed: {} ({})", err, err.kind);
                Msg::SceneFailed {
                    message: err.message,
                }
            }
        },
        EngineEvent::ExportCompleted { format, result } => match result {
            Ok(path) => Msg::ExportFinished {
                format,
                filename: file_name(&path),
            },
            Err(err) => Msg::ExportFailed {
                format,
                message: err.to_string(),
            },
        },
        EngineEvent::DownloadCompleted { filename, result } => match result {
            Ok(path) => {
                lattice_info!("Saved {} as {:?}", filename, path);
                Msg::NoOp
            }
            Err(err) => Msg::DownloadFailed {
                message: format!("Could not save {filename}: {err}"),
            },
        },
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
