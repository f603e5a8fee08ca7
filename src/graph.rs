//! Callback graph — which function owns which output, and what triggers it.
//!
//! DESIGN
//! ======
//! Each entry declares one output binding, ordered input bindings (a change
//! to any of them triggers the entry) and ordered state bindings (read at
//! invocation time, never triggering). Entries are kept in registration
//! order, which is also the order independent callbacks run in.
//!
//! INVARIANTS
//! ==========
//! - Every binding an entry names is declared in the registry.
//! - At most one entry owns a given output binding.
//! - The dependency graph (reads → output) is acyclic. Both inputs and state
//!   count as reads. Cycles are rejected at registration since dispatch has
//!   no fixpoint semantics; acyclicity is what bounds chained dispatch.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::registry::{Binding, Registry};

// =============================================================================
// TYPES
// =============================================================================

/// Failure raised by a user callback. Recovered by the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Pure function from (input values, state values) to the new output value.
pub type CallbackFn = Arc<dyn Fn(&[Value], &[Value]) -> Result<Value, CallbackError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unknown binding: {0}")]
    UnknownBinding(Binding),
    #[error("output {0} is already owned by another callback")]
    DuplicateOutput(Binding),
    #[error("callback for {output} would read {via}, which depends on its own output")]
    CyclicDependency { output: Binding, via: Binding },
    #[error("callback for {0} declares no inputs")]
    EmptyInputs(Binding),
}

impl crate::frame::ErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownBinding(_) => "E_UNKNOWN_BINDING",
            Self::DuplicateOutput(_) => "E_DUPLICATE_OUTPUT",
            Self::CyclicDependency { .. } => "E_CYCLIC_DEPENDENCY",
            Self::EmptyInputs(_) => "E_EMPTY_INPUTS",
        }
    }
}

// =============================================================================
// CALLBACK ENTRY
// =============================================================================

#[derive(Clone)]
pub struct CallbackEntry {
    pub output: Binding,
    pub inputs: Vec<Binding>,
    pub state: Vec<Binding>,
    func: CallbackFn,
}

impl CallbackEntry {
    /// Run the callback on already-gathered values.
    ///
    /// # Errors
    ///
    /// Propagates whatever the user function returns.
    pub fn invoke(&self, inputs: &[Value], state: &[Value]) -> Result<Value, CallbackError> {
        (self.func)(inputs, state)
    }

    /// Every binding this entry reads, inputs first.
    pub fn reads(&self) -> impl Iterator<Item = &Binding> {
        self.inputs.iter().chain(self.state.iter())
    }
}

impl fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEntry")
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// GRAPH
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct CallbackGraph {
    entries: Vec<CallbackEntry>,
    /// Output binding → index into `entries`.
    owners: HashMap<Binding, usize>,
}

impl CallbackGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    ///
    /// # Errors
    ///
    /// - `UnknownBinding` if any named binding is not declared in `registry`.
    /// - `EmptyInputs` if `inputs` is empty.
    /// - `DuplicateOutput` if another entry already owns `output`.
    /// - `CyclicDependency` if the entry would read its own output, directly
    ///   or through other callbacks.
    pub fn register<F>(
        &mut self,
        registry: &Registry,
        output: Binding,
        inputs: Vec<Binding>,
        state: Vec<Binding>,
        func: F,
    ) -> Result<(), GraphError>
    where
        F: Fn(&[Value], &[Value]) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        if let Some(unknown) = std::iter::once(&output)
            .chain(inputs.iter())
            .chain(state.iter())
            .find(|b| !registry.contains(b))
        {
            return Err(GraphError::UnknownBinding(unknown.clone()));
        }
        if inputs.is_empty() {
            return Err(GraphError::EmptyInputs(output));
        }
        if self.owner_of(&output).is_some() {
            return Err(GraphError::DuplicateOutput(output));
        }

        let downstream = self.downstream_of(&output);
        if let Some(via) = inputs
            .iter()
            .chain(state.iter())
            .find(|b| **b == output || downstream.contains(*b))
        {
            return Err(GraphError::CyclicDependency { output: output.clone(), via: via.clone() });
        }

        self.owners.insert(output.clone(), self.entries.len());
        self.entries.push(CallbackEntry { output, inputs, state, func: Arc::new(func) });
        Ok(())
    }

    /// Entries that list `binding` as an input, in registration order.
    /// State membership does not trigger.
    #[must_use]
    pub fn callbacks_triggered_by(&self, binding: &Binding) -> Vec<&CallbackEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.inputs.contains(binding))
            .collect()
    }

    /// The entry owning `output`, if any.
    #[must_use]
    pub fn owner_of(&self, output: &Binding) -> Option<&CallbackEntry> {
        self.owners.get(output).map(|i| &self.entries[*i])
    }

    pub fn entries(&self) -> impl Iterator<Item = &CallbackEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every output transitively computed from `start`.
    fn downstream_of(&self, start: &Binding) -> HashSet<Binding> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.clone()]);
        while let Some(current) = queue.pop_front() {
            for entry in &self.entries {
                if entry.reads().any(|b| *b == current) && seen.insert(entry.output.clone()) {
                    queue.push_back(entry.output.clone());
                }
            }
        }
        seen
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
