//! Component tree — the declarative UI as data.
//!
//! DESIGN
//! ======
//! Every node is the same struct: a `NodeKind` tag, a property map keyed by
//! the closed `Prop` enum, and ordered children. Widgets are not types; the
//! render layer dispatches on `kind`. Each kind accepts a fixed set of
//! properties, so a binding to a property the kind does not declare fails
//! at build or registration time instead of reading an absent value.
//!
//! `build` validates the whole spec before returning anything: a tree is
//! either fully valid or not built at all.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix reserved for ids generated for nodes declared without one.
pub const GENERATED_ID_PREFIX: &str = "_node-";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("invalid node kind: {0}")]
    InvalidNodeKind(String),
    #[error("duplicate node id: {0}")]
    DuplicateId(String),
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("property '{property}' is not declared by {kind} nodes")]
    UnknownProperty { kind: NodeKind, property: String },
    #[error("node id '{0}' uses the reserved prefix '{GENERATED_ID_PREFIX}'")]
    ReservedId(String),
    #[error("{kind} node '{id}' cannot have child nodes")]
    UnexpectedChildren { id: String, kind: NodeKind },
}

impl crate::frame::ErrorCode for TreeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidNodeKind(_) => "E_INVALID_NODE_KIND",
            Self::DuplicateId(_) => "E_DUPLICATE_ID",
            Self::NodeNotFound(_) => "E_NODE_NOT_FOUND",
            Self::UnknownProperty { .. } => "E_UNKNOWN_PROPERTY",
            Self::ReservedId(_) => "E_RESERVED_ID",
            Self::UnexpectedChildren { .. } => "E_UNEXPECTED_CHILDREN",
        }
    }
}

// =============================================================================
// NODE KIND
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Container,
    Text,
    Graph,
    InputControl,
    Button,
    Markdown,
}

impl NodeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Text => "text",
            Self::Graph => "graph",
            Self::InputControl => "input-control",
            Self::Button => "button",
            Self::Markdown => "markdown",
        }
    }

    /// Properties a node of this kind declares, in a stable order.
    #[must_use]
    pub fn props(self) -> &'static [Prop] {
        match self {
            Self::Container => &[Prop::Children, Prop::Style],
            Self::Text => &[Prop::Children, Prop::Style, Prop::Tag],
            Self::Graph => &[Prop::Figure, Prop::Style],
            Self::InputControl => &[
                Prop::Value,
                Prop::Options,
                Prop::Multi,
                Prop::Placeholder,
                Prop::Type,
                Prop::Control,
                Prop::Style,
            ],
            Self::Button => &[Prop::Children, Prop::NClicks, Prop::Style],
            Self::Markdown => &[Prop::Children, Prop::Style],
        }
    }

    #[must_use]
    pub fn accepts(self, prop: Prop) -> bool {
        self.props().contains(&prop)
    }
}

impl FromStr for NodeKind {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(Self::Container),
            "text" => Ok(Self::Text),
            "graph" => Ok(Self::Graph),
            "input-control" => Ok(Self::InputControl),
            "button" => Ok(Self::Button),
            "markdown" => Ok(Self::Markdown),
            other => Err(TreeError::InvalidNodeKind(other.to_string())),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROPERTY NAMES
// =============================================================================

/// Closed set of recognised property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prop {
    Children,
    Style,
    Tag,
    Figure,
    Value,
    Options,
    Multi,
    Placeholder,
    Type,
    Control,
    NClicks,
}

impl Prop {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Children => "children",
            Self::Style => "style",
            Self::Tag => "tag",
            Self::Figure => "figure",
            Self::Value => "value",
            Self::Options => "options",
            Self::Multi => "multi",
            Self::Placeholder => "placeholder",
            Self::Type => "type",
            Self::Control => "control",
            Self::NClicks => "n_clicks",
        }
    }

    /// Value a declared property holds before anything sets it.
    #[must_use]
    pub fn default_value(self) -> Value {
        match self {
            Self::NClicks => Value::from(0),
            _ => Value::Null,
        }
    }

    /// Parse a textual property name. `None` for names outside the set.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let prop = match s {
            "children" => Self::Children,
            "style" => Self::Style,
            "tag" => Self::Tag,
            "figure" => Self::Figure,
            "value" => Self::Value,
            "options" => Self::Options,
            "multi" => Self::Multi,
            "placeholder" => Self::Placeholder,
            "type" => Self::Type,
            "control" => Self::Control,
            "n_clicks" => Self::NClicks,
            _ => return None,
        };
        Some(prop)
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TREE SPEC
// =============================================================================

/// Unvalidated node declaration, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub props: BTreeMap<String, Value>,
    #[serde(default)]
    pub children: Vec<TreeSpec>,
}

impl TreeSpec {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), ..Self::default() }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: TreeSpec) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = TreeSpec>) -> Self {
        self.children.extend(children);
        self
    }
}

// =============================================================================
// NODE / TREE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Initial property values. Only properties `kind` declares appear here.
    pub props: BTreeMap<Prop, Value>,
    pub children: Vec<Node>,
}

/// A validated component tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Look a node up by id.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if no node carries `id`.
    pub fn find(&self, id: &str) -> Result<&Node, TreeError> {
        self.nodes()
            .find(|node| node.id == id)
            .ok_or_else(|| TreeError::NodeNotFound(id.to_string()))
    }

    /// Depth-first pre-order walk over every node.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Never zero: a tree always has its root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}

// =============================================================================
// BUILD
// =============================================================================

/// Validate a spec and build the tree.
///
/// # Errors
///
/// Fails with `InvalidNodeKind`, `ReservedId`, `DuplicateId`,
/// `UnknownProperty` or `UnexpectedChildren` on the first violation found
/// in pre-order.
pub fn build(spec: &TreeSpec) -> Result<Tree, TreeError> {
    let mut seen = HashSet::new();
    let mut generated = 0usize;
    let root = build_node(spec, &mut seen, &mut generated)?;
    Ok(Tree { root })
}

fn build_node(spec: &TreeSpec, seen: &mut HashSet<String>, generated: &mut usize) -> Result<Node, TreeError> {
    let kind: NodeKind = spec.kind.parse()?;

    let id = match &spec.id {
        Some(id) if id.starts_with(GENERATED_ID_PREFIX) => return Err(TreeError::ReservedId(id.clone())),
        Some(id) => id.clone(),
        None => {
            let id = format!("{GENERATED_ID_PREFIX}{generated}");
            *generated += 1;
            id
        }
    };
    if !seen.insert(id.clone()) {
        return Err(TreeError::DuplicateId(id));
    }

    let mut props = BTreeMap::new();
    for (name, value) in &spec.props {
        let prop = Prop::parse(name)
            .filter(|p| kind.accepts(*p))
            .ok_or_else(|| TreeError::UnknownProperty { kind, property: name.clone() })?;
        props.insert(prop, value.clone());
    }

    if kind != NodeKind::Container && !spec.children.is_empty() {
        return Err(TreeError::UnexpectedChildren { id, kind });
    }

    let children = spec
        .children
        .iter()
        .map(|child| build_node(child, seen, generated))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node { id, kind, props, children })
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tests;
