use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scene::{Primitive, SceneNode, SceneVisitor};

/// Backend-supplied color → label pairs, in backend order.
pub type ColorLegend = Vec<(String, String)>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Builds the on-screen legend for a scene.
///
/// An explicit color map is authoritative and emitted as-is. Otherwise the
/// root's `contents` are walked and every colored primitive contributes one
/// entry per distinct color (case-insensitive, first occurrence wins).
pub fn extract_legend(scene: Option<&SceneNode>, explicit: Option<&ColorLegend>) -> Vec<LegendEntry> {
    if let Some(colors) = explicit {
        return colors
            .iter()
            .map(|(color, label)| LegendEntry {
                label: label.clone(),
                color: color.clone(),
            })
            .collect();
    }

    // Only an object root has `contents`; bare arrays and scalars do not.
    let Some(SceneNode::Composite { contents, .. }) = scene else {
        return Vec::new();
    };

    let mut collector = LegendCollector::default();
    for child in contents {
        child.walk(&mut collector);
    }
    collector.entries
}

/// Label shown for a primitive: the tooltip up to its first `(`, trimmed,
/// or the raw color when that leaves nothing.
pub fn legend_label(tooltip: Option<&str>, color: &str) -> String {
    let label = tooltip.map(strip_coordinates).unwrap_or_default();
    if label.is_empty() {
        color.to_string()
    } else {
        label.to_string()
    }
}

// A leading `(` is kept; only a suffix such as "(0.1,0.2,0.3)" is dropped.
fn strip_coordinates(tooltip: &str) -> &str {
    let head = match tooltip.find('(') {
        Some(idx) if idx > 0 => &tooltip[..idx],
        _ => tooltip,
    };
    head.trim()
}

#[derive(Default)]
struct LegendCollector {
    seen: HashSet<String>,
    entries: Vec<LegendEntry>,
}

impl SceneVisitor for LegendCollector {
    fn visit_primitive(&mut self, primitive: &Primitive) {
        let Some(color) = primitive.legend_color() else {
            return;
        };
        if self.seen.insert(color.to_lowercase()) {
            self.entries.push(LegendEntry {
                label: legend_label(primitive.tooltip.as_deref(), color),
                color: color.to_string(),
            });
        }
    }
}
