//! Registry of bindable properties.
//!
//! DESIGN
//! ======
//! The registry is the only mutable state in a running dashboard. It is
//! seeded once from the tree: every property a node's kind declares becomes
//! a binding, holding the node's initial value or the property default.
//! Bindings are never added or removed afterwards.
//!
//! `set` is last-write-wins with no history. It hands the change notice back
//! to the caller as a `Patch`; the dispatch engine is the only caller and
//! uses the notice to drive chained dispatch and to push the write to
//! clients.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tree::{Prop, Tree};

// =============================================================================
// BINDING
// =============================================================================

/// One observable/settable slot: a (node id, property) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Binding {
    pub id: String,
    pub property: Prop,
}

impl Binding {
    #[must_use]
    pub fn new(id: impl Into<String>, property: Prop) -> Self {
        Self { id: id.into(), property }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.property)
    }
}

/// Parses the `"<node id>.<property>"` form. The split is on the last `.`
/// so node ids may themselves contain dots.
impl FromStr for Binding {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((id, prop)) = s.rsplit_once('.') else {
            return Err(RegistryError::MalformedBinding(s.to_string()));
        };
        let Some(property) = Prop::parse(prop) else {
            return Err(RegistryError::UnknownProperty { id: id.to_string(), property: prop.to_string() });
        };
        Ok(Self::new(id, property))
    }
}

// =============================================================================
// PATCH
// =============================================================================

/// Change notice for one registry write. Also the wire shape pushed to
/// clients: `{"id", "property", "value"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(flatten)]
    pub binding: Binding,
    pub value: Value,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown binding: {0}")]
    UnknownBinding(Binding),
    /// A property name outside the recognised set. Reported as an unknown
    /// binding to clients.
    #[error("unknown binding: {id}.{property}")]
    UnknownProperty { id: String, property: String },
    #[error("malformed binding '{0}' (expected '<id>.<property>')")]
    MalformedBinding(String),
    #[error("invalid value for {binding}: {reason}")]
    InvalidValue { binding: Binding, reason: &'static str },
}

impl crate::frame::ErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownBinding(_) | Self::UnknownProperty { .. } => "E_UNKNOWN_BINDING",
            Self::MalformedBinding(_) => "E_MALFORMED_BINDING",
            Self::InvalidValue { .. } => "E_INVALID_VALUE",
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Registry {
    values: BTreeMap<Binding, Value>,
}

impl Registry {
    /// Declare every (node, property) pair of `tree`.
    #[must_use]
    pub fn from_tree(tree: &Tree) -> Self {
        let mut values = BTreeMap::new();
        for node in tree.nodes() {
            for prop in node.kind.props() {
                let value = node
                    .props
                    .get(prop)
                    .cloned()
                    .unwrap_or_else(|| prop.default_value());
                values.insert(Binding::new(node.id.clone(), *prop), value);
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn contains(&self, binding: &Binding) -> bool {
        self.values.contains_key(binding)
    }

    /// Current value of a binding.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` if the binding was never declared.
    pub fn get(&self, binding: &Binding) -> Result<&Value, RegistryError> {
        self.values
            .get(binding)
            .ok_or_else(|| RegistryError::UnknownBinding(binding.clone()))
    }

    /// Overwrite a binding and return the change notice.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` if the binding was never declared and
    /// `InvalidValue` for an `n_clicks` value that is not a `u64`. The
    /// registry is unchanged in both cases.
    pub fn set(&mut self, binding: &Binding, value: Value) -> Result<Patch, RegistryError> {
        let Some(slot) = self.values.get_mut(binding) else {
            return Err(RegistryError::UnknownBinding(binding.clone()));
        };
        check_value(binding, &value)?;
        slot.clone_from(&value);
        Ok(Patch { binding: binding.clone(), value })
    }

    /// All declared bindings with their current values, ordered by binding.
    pub fn bindings(&self) -> impl Iterator<Item = (&Binding, &Value)> {
        self.values.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Click counters only ever hold a `u64`; `Engine::click` relies on it.
fn check_value(binding: &Binding, value: &Value) -> Result<(), RegistryError> {
    if binding.property == Prop::NClicks && !value.is_u64() {
        return Err(RegistryError::InvalidValue {
            binding: binding.clone(),
            reason: "n_clicks must be a non-negative integer",
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
