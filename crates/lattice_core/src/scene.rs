//! Tolerant model of the backend's scene description.
//!
//! The backend emits a generic, deeply nested render graph. Nothing beyond
//! "renderable by the viewer" is guaranteed about its shape, so the conversion
//! from JSON never fails: anything that is not an object or an array becomes
//! [`SceneNode::Opaque`].

use serde_json::Value;

/// Discriminators of primitives that carry a legend-worthy color.
pub const COLORED_PRIMITIVES: &[&str] = &["spheres"];

/// Render attributes of a single scene object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Primitive {
    pub kind: Option<String>,
    pub color: Option<String>,
    pub tooltip: Option<String>,
}

impl Primitive {
    /// Color of this primitive if it should appear in the legend.
    pub fn legend_color(&self) -> Option<&str> {
        let kind = self.kind.as_deref()?;
        if !COLORED_PRIMITIVES.contains(&kind) {
            return None;
        }
        self.color.as_deref().filter(|color| !color.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneNode {
    /// Object with no (or empty) `contents`.
    Leaf(Primitive),
    /// Object with children.
    Composite {
        node: Primitive,
        contents: Vec<SceneNode>,
    },
    /// Bare array, traversed element-wise.
    Sequence(Vec<SceneNode>),
    /// Scalars, nulls and anything else the walker skips.
    Opaque,
}

/// Pre-order visitor over a scene tree.
pub trait SceneVisitor {
    fn visit_primitive(&mut self, primitive: &Primitive);
}

impl SceneNode {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => SceneNode::Sequence(items.iter().map(Self::from_value).collect()),
            Value::Object(map) => {
                let node = Primitive {
                    kind: map.get("type").and_then(scalar_text),
                    color: map.get("color").and_then(scalar_text),
                    tooltip: map.get("tooltip").and_then(tooltip_text),
                };
                let contents = match map.get("contents") {
                    Some(Value::Array(items)) => items.iter().map(Self::from_value).collect(),
                    Some(other @ Value::Object(_)) => vec![Self::from_value(other)],
                    _ => Vec::new(),
                };
                if contents.is_empty() {
                    SceneNode::Leaf(node)
                } else {
                    SceneNode::Composite { node, contents }
                }
            }
            _ => SceneNode::Opaque,
        }
    }

    /// Depth-first pre-order walk: a node is visited before its children,
    /// siblings in order.
    pub fn walk<V: SceneVisitor>(&self, visitor: &mut V) {
        match self {
            SceneNode::Leaf(node) => visitor.visit_primitive(node),
            SceneNode::Composite { node, contents } => {
                visitor.visit_primitive(node);
                for child in contents {
                    child.walk(visitor);
                }
            }
            SceneNode::Sequence(items) => {
                for item in items {
                    item.walk(visitor);
                }
            }
            SceneNode::Opaque => {}
        }
    }
}

/// True when the value has the `{ name, contents }` shape the viewer accepts.
pub fn is_renderable(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key("name") && map.contains_key("contents"))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

// Sequence tooltips keep only their first element.
fn tooltip_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(scalar_text),
        other => scalar_text(other),
    }
}
