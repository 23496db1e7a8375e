use std::fmt::Write as _;

use lattice_core::{AppViewModel, InputMode, Layer};

/// Renders the view model as the text block printed after each change.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    let mode = match view.mode {
        InputMode::Prompt => "prompt",
        InputMode::Upload => "upload",
    };
    let _ = writeln!(out, "-- lattice lab [{mode}]{}", if view.busy { " (working...)" } else { "" });

    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}  (type `dismiss` to close)");
    }

    match view.mode {
        InputMode::Prompt => {
            if !view.prompt.is_empty() {
                let _ = writeln!(out, "prompt: {}", view.prompt);
            }
        }
        InputMode::Upload => {
            if let Some(file) = &view.selected_file {
                let _ = writeln!(out, "selected: {} ({})", file.name, file.size_label);
            }
        }
    }

    if let Some(meta) = &view.metadata {
        let _ = writeln!(
            out,
            "structure: {} | {} sites | {}",
            meta.formula, meta.n_sites, meta.source
        );
        let rows: Vec<String> = meta
            .lattice
            .iter()
            .map(|(name, value)| format!("{name}={value:.3}"))
            .collect();
        let _ = writeln!(out, "lattice: {}", rows.join(" "));
    }

    if view.scene.is_some() {
        if !view.swatches.is_empty() {
            let swatches: Vec<String> = view
                .swatches
                .iter()
                .map(|entry| format!("[{}] {}", entry.color, entry.label))
                .collect();
            let _ = writeln!(out, "legend: {}", swatches.join("  "));
        }
        if view.legend.len() > view.swatches.len() {
            let _ = writeln!(out, "  ({} more in `legend`)", view.legend.len() - view.swatches.len());
        }
        let hidden: Vec<&str> = Layer::ALL
            .into_iter()
            .filter(|layer| !view.visibility.get(*layer))
            .map(Layer::key)
            .collect();
        if !hidden.is_empty() {
            let _ = writeln!(out, "hidden layers: {}", hidden.join(", "));
        }
    } else if view.metadata.is_some() {
        let _ = writeln!(out, "scene: not renderable");
    }
    out
}

/// Full legend listing for the `legend` command.
pub fn render_legend(view: &AppViewModel) -> String {
    let mut out = String::new();
    for entry in &view.legend {
        let _ = writeln!(out, "  {} {}", entry.color, entry.label);
    }
    out
}

#[cfg(test)]
mod tests {
    use lattice_core::{LegendEntry, SelectedFileView};

    use super::*;

    fn entry(label: &str, color: &str) -> LegendEntry {
        LegendEntry {
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn idle_upload_view_shows_selection() {
        let view = AppViewModel {
            selected_file: Some(SelectedFileView {
                name: "quartz.cif".to_string(),
                size_label: "500.00 B".to_string(),
            }),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.starts_with("-- lattice lab [upload]\n"));
        assert!(text.contains("selected: quartz.cif (500.00 B)"));
    }

    #[test]
    fn busy_and_error_are_visible() {
        let view = AppViewModel {
            busy: true,
            error: Some("File exceeds 10MB limit".to_string()),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("(working...)"));
        assert!(text.contains("error: File exceeds 10MB limit"));
    }

    #[test]
    fn swatches_and_overflow_count() {
        let view = AppViewModel {
            scene: Some(serde_json::json!({"name": "s", "contents": []})),
            legend: vec![entry("Si", "#f0c8a0"), entry("O", "#ff0d0d"), entry("Na", "#ab5cf2")],
            swatches: vec![entry("Si", "#f0c8a0"), entry("O", "#ff0d0d")],
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("legend: [#f0c8a0] Si  [#ff0d0d] O"));
        assert!(text.contains("(1 more in `legend`)"));
        assert_eq!(render_legend(&view).lines().count(), 3);
    }
}
