//! Render snapshots — what the browser needs to draw and wire the page.
//!
//! The layout snapshot mirrors the tree with *current* registry values, so a
//! client that connects late sees the same page as one that watched every
//! patch. Unset (`null`) properties are omitted. Drawing the snapshot
//! (charts, markdown, inputs) is the client's job.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::graph::CallbackGraph;
use crate::registry::{Binding, Registry};
use crate::tree::{Node, Tree};

/// One declared callback, as advertised to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub output: String,
    pub inputs: Vec<String>,
    pub state: Vec<String>,
}

/// Tree snapshot with current property values.
#[must_use]
pub fn layout(tree: &Tree, registry: &Registry) -> Value {
    render_node(tree.root(), registry)
}

fn render_node(node: &Node, registry: &Registry) -> Value {
    let mut props = Map::new();
    for prop in node.kind.props() {
        let Ok(value) = registry.get(&Binding::new(node.id.clone(), *prop)) else {
            continue;
        };
        if !value.is_null() {
            props.insert(prop.as_str().to_string(), value.clone());
        }
    }

    let children: Vec<Value> = node
        .children
        .iter()
        .map(|child| render_node(child, registry))
        .collect();

    json!({
        "id": node.id,
        "kind": node.kind,
        "props": props,
        "children": children,
    })
}

/// Declared callbacks in registration order.
#[must_use]
pub fn dependencies(graph: &CallbackGraph) -> Vec<Dependency> {
    graph
        .entries()
        .map(|entry| Dependency {
            output: entry.output.to_string(),
            inputs: entry.inputs.iter().map(ToString::to_string).collect(),
            state: entry.state.iter().map(ToString::to_string).collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
