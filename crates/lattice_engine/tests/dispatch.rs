use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use lattice_core::{
    update, AppState, DownloadDescriptor, Effect, ExportFormat, Lattice, Msg, SceneResponse,
    SelectedFile, SourceStructure, StructureOrigin, ViewerSignal,
};
use lattice_engine::{
    dispatch_export, ApiSettings, ChannelEventSink, DirectoryDownloads, EngineEvent, EngineHandle,
    ExportError, ReqwestService,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestService {
    ReqwestService::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .unwrap()
}

fn response() -> SceneResponse {
    SceneResponse {
        scene: json!({ "name": "SiO2", "contents": [{ "type": "spheres", "color": "#ff0d0d" }] }),
        formula: "SiO2".to_string(),
        lattice: Lattice {
            a: 4.91,
            b: 4.91,
            c: 5.4,
            alpha: 90.0,
            beta: 90.0,
            gamma: 120.0,
            volume: 112.9,
        },
        n_sites: 9,
        source: StructureOrigin::Upload,
        legend: None,
    }
}

fn uploaded_source(dir: &TempDir) -> SourceStructure {
    let path = dir.path().join("quartz.cif");
    std::fs::write(&path, "data_quartz\n").unwrap();
    let file = SelectedFile {
        name: "quartz.cif".to_string(),
        size: 12,
        path,
    };
    SourceStructure::from_response(&response(), Some(file))
}

async fn mount_export(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"quartz.cif\"")
                .set_body_raw("data_quartz_out\n", "chemical/x-cif"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn export_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/api/export")
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn raw_text_and_scene_are_sent() {
    let server = MockServer::start().await;
    mount_export(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let source = uploaded_source(&dir);

    let result = dispatch_export(&service_for(&server), ExportFormat::Cif, Some(&source))
        .await
        .unwrap();
    assert_eq!(result.filename, "quartz.cif");

    let bodies = export_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["format"], json!("cif"));
    assert_eq!(bodies[0]["cif"], json!("data_quartz\n"));
    assert!(bodies[0].get("structure").is_none());
    assert_eq!(bodies[0]["scene"]["name"], json!("SiO2"));
}

#[tokio::test]
async fn unreadable_upload_falls_back_to_summary() {
    let server = MockServer::start().await;
    mount_export(&server, 1).await;
    let dir = TempDir::new().unwrap();
    let source = uploaded_source(&dir);
    std::fs::remove_file(&source.file.as_ref().unwrap().path).unwrap();

    dispatch_export(&service_for(&server), ExportFormat::Poscar, Some(&source))
        .await
        .expect("export still succeeds");

    let bodies = export_bodies(&server).await;
    assert!(bodies[0].get("cif").is_none());
    assert_eq!(bodies[0]["structure"]["formula"], json!("SiO2"));
    assert_eq!(bodies[0]["structure"]["n_sites"], json!(9));
    assert_eq!(bodies[0]["scene"]["name"], json!("SiO2"));
}

#[tokio::test]
async fn generated_source_sends_summary() {
    let server = MockServer::start().await;
    mount_export(&server, 1).await;
    let mut generated = response();
    generated.source = StructureOrigin::Prompt;
    let source = SourceStructure::from_response(&generated, None);

    dispatch_export(&service_for(&server), ExportFormat::Json, Some(&source))
        .await
        .unwrap();

    let bodies = export_bodies(&server).await;
    assert_eq!(bodies[0]["format"], json!("json"));
    assert_eq!(bodies[0]["structure"]["lattice"]["gamma"], json!(120.0));
}

struct Harness {
    engine: EngineHandle,
    events: mpsc::Receiver<EngineEvent>,
    downloads: TempDir,
}

impl Harness {
    fn new(server: &MockServer) -> Self {
        let downloads = TempDir::new().unwrap();
        let (tx, events) = mpsc::channel();
        let engine = EngineHandle::new(
            Arc::new(service_for(server)),
            Arc::new(DirectoryDownloads::new(downloads.path().to_path_buf())),
            Arc::new(ChannelEventSink::new(tx)),
        )
        .unwrap();
        Self {
            engine,
            events,
            downloads,
        }
    }

    fn run(&self, effects: Vec<Effect>) -> usize {
        let mut issued = 0;
        for effect in effects {
            match effect {
                Effect::Export { format, source } => self.engine.export(format, source),
                Effect::Download(descriptor) => self.engine.download(descriptor),
                Effect::UploadStructure { file } => self.engine.upload(file),
                Effect::GenerateStructure { prompt } => self.engine.generate(prompt),
            }
            issued += 1;
        }
        issued
    }

    async fn next_event(&self) -> Option<EngineEvent> {
        tokio::task::block_in_place(|| self.events.recv_timeout(Duration::from_secs(5)).ok())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duplicate_export_signal_calls_backend_once() {
    let server = MockServer::start().await;
    mount_export(&server, 1).await;
    let harness = Harness::new(&server);
    let dir = TempDir::new().unwrap();
    let source = uploaded_source(&dir);

    let (state, _) = update(
        AppState::new(),
        Msg::SceneLoaded {
            file: source.file.clone(),
            response: response(),
        },
    );
    let (state, first) = update(state, Msg::ViewerPropsChanged(ViewerSignal::export("CIF", "1")));
    let (_state, second) =
        update(state, Msg::ViewerPropsChanged(ViewerSignal::export("CIF", "1")));

    assert_eq!(harness.run(first), 1);
    assert_eq!(harness.run(second), 0);

    match harness.next_event().await {
        Some(EngineEvent::ExportCompleted { format, result }) => {
            assert_eq!(format, ExportFormat::Cif);
            let saved = result.expect("export saved");
            assert_eq!(saved, harness.downloads.path().join("quartz.cif"));
            assert_eq!(std::fs::read(&saved).unwrap(), b"data_quartz_out\n");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(export_bodies(&server).await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_export_saves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/export"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let harness = Harness::new(&server);

    harness.engine.export(ExportFormat::Cif, None);
    match harness.next_event().await {
        Some(EngineEvent::ExportCompleted {
            result: Err(ExportError::Api(err)),
            ..
        }) => assert_eq!(err.message, "Export failed (500)"),
        other => panic!("unexpected event {other:?}"),
    }
    let leftovers: Vec<PathBuf> = std::fs::read_dir(harness.downloads.path())
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn screenshot_is_saved_as_png() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    harness
        .engine
        .download(DownloadDescriptor::screenshot("data:image/png;base64,iVBORw0KGgo="));
    match harness.next_event().await {
        Some(EngineEvent::DownloadCompleted { filename, result }) => {
            assert_eq!(filename, "crystal");
            let saved = result.expect("screenshot saved");
            assert_eq!(saved, harness.downloads.path().join("crystal.png"));
            assert_eq!(&std::fs::read(&saved).unwrap()[..4], b"\x89PNG");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_filename_without_extension_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"POSCAR\"")
                .set_body_raw("Si2 O4\n1.0\n", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let harness = Harness::new(&server);
    let dir = TempDir::new().unwrap();

    harness
        .engine
        .export(ExportFormat::Poscar, Some(uploaded_source(&dir)));
    match harness.next_event().await {
        Some(EngineEvent::ExportCompleted { result, .. }) => {
            let saved = result.expect("export saved");
            assert_eq!(saved, harness.downloads.path().join("POSCAR"));
            assert_eq!(std::fs::read_to_string(&saved).unwrap(), "Si2 O4\n1.0\n");
        }
        other => panic!("unexpected event {other:?}"),
    }
}
