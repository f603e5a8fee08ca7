//! Dispatch engine — turns one property change into callback runs.
//!
//! LIFECYCLE
//! =========
//! `Idle → Collecting → Invoking → Applying → Idle`, per triggered callback:
//! 1. The event's value is written to the registry (it is the client's new
//!    value), then every callback listing that binding as an input is
//!    collected in registration order.
//! 2. For each, current input and state values are gathered in declared
//!    order and the function is invoked synchronously.
//! 3. A successful result is written to the output binding. That write is
//!    itself a change, so callbacks depending on the output run next,
//!    depth-first, before the following sibling.
//!
//! There is no topological batching. In a diamond (A feeds B and C, both
//! feed D) D runs once per path: first after B, reading C's previous value,
//! then again after C with both fresh. The last write wins.
//!
//! ERROR HANDLING
//! ==============
//! A callback that errors or panics leaves its output untouched and is
//! reported as a `CallbackExecutionError`. Nothing is latched: the next event
//! runs the callback again. Siblings of the failed callback still run; only
//! the chain below the failed output is skipped.
//!
//! The engine owns the registry and graph. Callbacks only ever see value
//! slices, so the apply step is the single writer.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::graph::{CallbackEntry, CallbackError, CallbackGraph, GraphError};
use crate::registry::{Binding, Patch, Registry, RegistryError};
use crate::tree::Prop;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Invoking,
    Applying,
}

/// A callback failure recovered during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("callback for {output} failed: {message}")]
pub struct CallbackExecutionError {
    pub output: Binding,
    pub message: String,
}

impl crate::frame::ErrorCode for CallbackExecutionError {
    fn error_code(&self) -> &'static str {
        "E_CALLBACK_EXECUTION"
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Everything one event caused.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    /// Every registry write in order, the triggering write first.
    pub patches: Vec<Patch>,
    /// Callbacks that failed; their outputs kept the previous value.
    pub errors: Vec<CallbackExecutionError>,
    /// Number of callback invocations, failed ones included.
    pub invoked: usize,
}

// =============================================================================
// ENGINE
// =============================================================================

#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    graph: CallbackGraph,
    phase: Phase,
}

impl Engine {
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { registry, graph: CallbackGraph::new(), phase: Phase::Idle }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn graph(&self) -> &CallbackGraph {
        &self.graph
    }

    /// Always `Idle` between events.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Register a callback against this engine's registry.
    ///
    /// # Errors
    ///
    /// See [`CallbackGraph::register`].
    pub fn register<F>(
        &mut self,
        output: Binding,
        inputs: Vec<Binding>,
        state: Vec<Binding>,
        func: F,
    ) -> Result<(), GraphError>
    where
        F: Fn(&[Value], &[Value]) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.graph.register(&self.registry, output, inputs, state, func)
    }

    /// External event: a client changed `property` of node `id`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding`/`UnknownProperty` if the pair was never
    /// declared; nothing is written in that case.
    pub fn on_property_changed(
        &mut self,
        id: &str,
        property: &str,
        value: Value,
    ) -> Result<DispatchReport, RegistryError> {
        let Some(prop) = Prop::parse(property) else {
            return Err(RegistryError::UnknownProperty { id: id.to_string(), property: property.to_string() });
        };
        self.dispatch(Binding::new(id, prop), value)
    }

    /// External event: button `id` was clicked once.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` if `id` has no `n_clicks` property and
    /// `InvalidValue` if the counter is not a `u64` or is already at
    /// `u64::MAX`. Nothing is written in either case.
    pub fn click(&mut self, id: &str) -> Result<DispatchReport, RegistryError> {
        let binding = Binding::new(id, Prop::NClicks);
        let next = self
            .registry
            .get(&binding)?
            .as_u64()
            .and_then(|clicks| clicks.checked_add(1));
        let Some(next) = next else {
            return Err(RegistryError::InvalidValue { binding, reason: "n_clicks cannot be incremented" });
        };
        self.dispatch(binding, Value::from(next))
    }

    /// Write `value` to `binding` and run everything it triggers.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` if `binding` was never declared.
    pub fn dispatch(&mut self, binding: Binding, value: Value) -> Result<DispatchReport, RegistryError> {
        let patch = self.registry.set(&binding, value)?;
        debug!(binding = %binding, "dispatch: event");

        let mut report = DispatchReport { patches: vec![patch], ..DispatchReport::default() };
        self.propagate(&binding, &mut report);
        self.phase = Phase::Idle;
        Ok(report)
    }

    fn propagate(&mut self, changed: &Binding, report: &mut DispatchReport) {
        self.phase = Phase::Collecting;
        let triggered: Vec<CallbackEntry> = self
            .graph
            .callbacks_triggered_by(changed)
            .into_iter()
            .cloned()
            .collect();

        for entry in triggered {
            if let Some(patch) = self.run(&entry, report) {
                report.patches.push(patch);
                self.propagate(&entry.output, report);
            }
        }
    }

    /// Collect, invoke and apply one entry. `None` if it failed.
    fn run(&mut self, entry: &CallbackEntry, report: &mut DispatchReport) -> Option<Patch> {
        self.phase = Phase::Collecting;
        let gathered = self
            .gather(&entry.inputs)
            .and_then(|inputs| self.gather(&entry.state).map(|state| (inputs, state)));
        let (inputs, state) = match gathered {
            Ok(values) => values,
            Err(e) => {
                fail(entry, e.to_string(), report);
                return None;
            }
        };

        self.phase = Phase::Invoking;
        report.invoked += 1;
        let value = match invoke_guarded(entry, &inputs, &state) {
            Ok(value) => value,
            Err(e) => {
                fail(entry, e.0, report);
                return None;
            }
        };

        self.phase = Phase::Applying;
        match self.registry.set(&entry.output, value) {
            Ok(patch) => {
                debug!(output = %entry.output, "dispatch: callback applied");
                Some(patch)
            }
            Err(e) => {
                fail(entry, e.to_string(), report);
                None
            }
        }
    }

    fn gather(&self, bindings: &[Binding]) -> Result<Vec<Value>, RegistryError> {
        bindings
            .iter()
            .map(|b| self.registry.get(b).cloned())
            .collect()
    }
}

fn fail(entry: &CallbackEntry, message: String, report: &mut DispatchReport) {
    warn!(output = %entry.output, error = %message, "dispatch: callback failed");
    report
        .errors
        .push(CallbackExecutionError { output: entry.output.clone(), message });
}

/// Invoke a callback, turning a panic into a `CallbackError`.
fn invoke_guarded(entry: &CallbackEntry, inputs: &[Value], state: &[Value]) -> Result<Value, CallbackError> {
    catch_unwind(AssertUnwindSafe(|| entry.invoke(inputs, state))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "callback panicked".to_string());
        Err(CallbackError(message))
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
