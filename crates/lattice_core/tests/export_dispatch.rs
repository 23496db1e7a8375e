use std::path::PathBuf;

use lattice_core::{
    update, AppState, DownloadContent, DownloadDescriptor, Effect, ExportFormat, ExportRequest,
    Lattice, Msg, SceneResponse, SelectedFile, SourceStructure, StructureOrigin, ViewerSignal,
    EXPORT_FORMAT_LABELS,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn lattice() -> Lattice {
    Lattice {
        a: 5.64,
        b: 5.64,
        c: 5.64,
        alpha: 90.0,
        beta: 90.0,
        gamma: 90.0,
        volume: 179.4,
    }
}

fn response() -> SceneResponse {
    SceneResponse {
        scene: json!({ "name": "NaCl", "contents": [] }),
        formula: "NaCl".to_string(),
        lattice: lattice(),
        n_sites: 8,
        source: StructureOrigin::Upload,
        legend: None,
    }
}

fn uploaded() -> SelectedFile {
    SelectedFile {
        name: "nacl.cif".to_string(),
        size: 120,
        path: PathBuf::from("/tmp/nacl.cif"),
    }
}

fn loaded_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::SceneLoaded {
            file: Some(uploaded()),
            response: response(),
        },
    );
    state
}

fn pick(state: AppState, label: &str, timestamp: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ViewerPropsChanged(ViewerSignal::export(label, timestamp)),
    )
}

#[test]
fn export_pick_captures_current_source() {
    let state = loaded_state();
    let expected_source = state.source().cloned();
    let (state, effects) = pick(state, "POSCAR", "1700000000001");

    assert_eq!(
        effects,
        vec![Effect::Export {
            format: ExportFormat::Poscar,
            source: expected_source,
        }]
    );
    assert!(state.view().busy);
}

#[test]
fn same_timestamp_dispatches_once() {
    let (state, first) = pick(loaded_state(), "CIF", "42");
    let (state, second) = pick(state, "CIF", "42");
    let (_state, third) = pick(state, "CIF", "43");

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(third.len(), 1);
}

#[test]
fn unrelated_update_does_not_refire_export() {
    let (state, _) = pick(loaded_state(), "JSON", "7");
    let (_state, effects) = update(
        state,
        Msg::ViewerPropsChanged(ViewerSignal::screenshot("data:image/png;base64,iVBO", "8")),
    );

    assert_eq!(
        effects,
        vec![Effect::Download(DownloadDescriptor {
            filename: "crystal".to_string(),
            content: DownloadContent::DataUrl("data:image/png;base64,iVBO".to_string()),
            mime_type: "image/png".to_string(),
        })]
    );
}

#[test]
fn unknown_label_is_silent() {
    let (state, effects) = pick(loaded_state(), "XYZ", "1");
    assert!(effects.is_empty());
    assert_eq!(state.view().error, None);
    assert!(!state.view().busy);
}

#[test]
fn every_menu_label_dispatches() {
    let mut state = loaded_state();
    for (idx, label) in EXPORT_FORMAT_LABELS.iter().enumerate() {
        let (next, effects) = pick(state, label, &idx.to_string());
        assert_eq!(effects.len(), 1, "label {label}");
        state = next;
    }
    let (_state, effects) = pick(state, "VASP Input Set (MPRelaxSet)", "99");
    match &effects[..] {
        [Effect::Export { format, .. }] => assert_eq!(format.code(), "mpr"),
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn screenshot_fires_once_per_timestamp() {
    let signal = ViewerSignal::screenshot("data:image/png;base64,AAAA", "5");
    let (state, first) = update(AppState::new(), Msg::ViewerPropsChanged(signal.clone()));
    let (_state, second) = update(state, Msg::ViewerPropsChanged(signal));
    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[test]
fn export_failure_keeps_scene() {
    let (state, _) = pick(loaded_state(), "CIF", "1");
    let (state, effects) = update(
        state,
        Msg::ExportFailed {
            format: ExportFormat::Cif,
            message: "Export failed (500)".to_string(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.scene.is_some());
    assert!(view.metadata.is_some());
    assert!(!view.busy);
    assert_eq!(view.error.as_deref(), Some("Export failed (500)"));

    // A failed export does not block the next one.
    let (_state, effects) = pick(state, "CIF", "2");
    assert_eq!(effects.len(), 1);
}

#[test]
fn request_prefers_raw_text_and_always_carries_scene() {
    let source = SourceStructure::from_response(&response(), Some(uploaded()));
    let request = ExportRequest::build(
        ExportFormat::Cif,
        Some("data_NaCl\n".to_string()),
        Some(&source),
    );
    assert_eq!(request.cif.as_deref(), Some("data_NaCl\n"));
    assert!(request.structure.is_none());
    assert_eq!(request.scene, Some(json!({ "name": "NaCl", "contents": [] })));

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["format"], json!("cif"));
    assert!(body.get("structure").is_none());
}

#[test]
fn request_falls_back_to_summary() {
    let source = SourceStructure::from_response(&response(), Some(uploaded()));
    let request = ExportRequest::build(ExportFormat::CifSymm, None, Some(&source));
    let body = serde_json::to_value(&request).unwrap();

    assert_eq!(body["format"], json!("cif_symm"));
    assert!(body.get("cif").is_none());
    assert_eq!(body["structure"]["formula"], json!("NaCl"));
    assert_eq!(body["structure"]["n_sites"], json!(8));
    assert_eq!(body["structure"]["lattice"]["a"], json!(5.64));
    assert!(body.get("scene").is_some());
}

#[test]
fn request_without_source_has_only_format() {
    let request = ExportRequest::build(ExportFormat::Json, None, None);
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "format": "json" }));
}
