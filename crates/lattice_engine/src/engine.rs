use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use lattice_core::{DownloadDescriptor, ExportFormat, SelectedFile, SourceStructure};
use lattice_logging::{lattice_info, lattice_warn};

use crate::client::StructureService;
use crate::download::DownloadSink;
use crate::export::{dispatch_export, ExportError};
use crate::EngineEvent;

/// Receives engine events on whatever thread finished the work.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Upload { file: SelectedFile },
    Generate { prompt: String },
    Export {
        format: ExportFormat,
        source: Option<SourceStructure>,
    },
    Download { descriptor: DownloadDescriptor },
}

/// Runs backend calls and downloads on a background runtime.
///
/// Every command is spawned independently and reports exactly one event.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

struct Workers {
    service: Arc<dyn StructureService>,
    downloads: Arc<dyn DownloadSink>,
    events: Arc<dyn EventSink>,
}

impl EngineHandle {
    pub fn new(
        service: Arc<dyn StructureService>,
        downloads: Arc<dyn DownloadSink>,
        events: Arc<dyn EventSink>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let workers = Arc::new(Workers {
            service,
            downloads,
            events,
        });

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                runtime.spawn(async move {
                    handle_command(&workers, command).await;
                });
            }
        });

        Ok(Self { cmd_tx })
    }

    pub fn upload(&self, file: SelectedFile) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { file });
    }

    pub fn generate(&self, prompt: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Generate {
            prompt: prompt.into(),
        });
    }

    pub fn export(&self, format: ExportFormat, source: Option<SourceStructure>) {
        let _ = self.cmd_tx.send(EngineCommand::Export { format, source });
    }

    pub fn download(&self, descriptor: DownloadDescriptor) {
        let _ = self.cmd_tx.send(EngineCommand::Download { descriptor });
    }
}

async fn handle_command(workers: &Workers, command: EngineCommand) {
    let event = match command {
        EngineCommand::Upload { file } => {
            let result = workers.service.upload_cif(&file).await;
            EngineEvent::SceneCompleted {
                file: Some(file),
                result,
            }
        }
        EngineCommand::Generate { prompt } => {
            let result = workers.service.generate_from_prompt(&prompt).await;
            EngineEvent::SceneCompleted { file: None, result }
        }
        EngineCommand::Export { format, source } => {
            let result = export_and_save(workers, format, source.as_ref()).await;
            if let Err(err) = &result {
                lattice_warn!("Export {} failed: {}", format.code(), err);
            }
            EngineEvent::ExportCompleted { format, result }
        }
        EngineCommand::Download { descriptor } => {
            let result = workers.downloads.save(&descriptor);
            if let Err(err) = &result {
                lattice_warn!("Saving {} failed: {}", descriptor.filename, err);
            }
            EngineEvent::DownloadCompleted {
                filename: descriptor.filename,
                result,
            }
        }
    };
    workers.events.emit(event);
}

async fn export_and_save(
    workers: &Workers,
    format: ExportFormat,
    source: Option<&SourceStructure>,
) -> Result<PathBuf, ExportError> {
    let result = dispatch_export(workers.service.as_ref(), format, source).await?;
    let path = workers.downloads.save(&DownloadDescriptor::from(result))?;
    lattice_info!("Export {} saved to {:?}", format.code(), path);
    Ok(path)
}
