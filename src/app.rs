//! Application context.
//!
//! DESIGN
//! ======
//! `App` replaces a process-wide app singleton. It is built from a tree spec,
//! callbacks are registered on it, and it is then moved into `server::start`.
//! Once moved, nothing can register further callbacks: the tree and graph are
//! fixed for the life of the process and only registry values change.

use serde_json::Value;

use crate::engine::{DispatchReport, Engine};
use crate::frame::ErrorCode;
use crate::graph::{CallbackError, GraphError};
use crate::registry::{Binding, Registry, RegistryError};
use crate::tree::{self, Tree, TreeError, TreeSpec};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ErrorCode for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Tree(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Registry(e) => e.error_code(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    tree: Tree,
    engine: Engine,
}

impl App {
    /// Build and validate the tree, then declare its bindings.
    ///
    /// # Errors
    ///
    /// Returns any `TreeError` raised by validation.
    pub fn new(spec: &TreeSpec) -> Result<Self, AppError> {
        let tree = tree::build(spec)?;
        let engine = Engine::new(Registry::from_tree(&tree));
        Ok(Self { tree, engine })
    }

    /// Register a callback using textual bindings (`"<id>.<property>"`).
    ///
    /// # Errors
    ///
    /// Returns a `RegistryError` for malformed binding text, otherwise any
    /// `GraphError` from registration.
    pub fn callback<F>(&mut self, output: &str, inputs: &[&str], state: &[&str], func: F) -> Result<&mut Self, AppError>
    where
        F: Fn(&[Value], &[Value]) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        let output: Binding = output.parse()?;
        let inputs = parse_all(inputs)?;
        let state = parse_all(state)?;
        self.engine.register(output, inputs, state, func)?;
        Ok(self)
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// See [`Engine::on_property_changed`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` for undeclared pairs.
    pub fn on_property_changed(&mut self, id: &str, property: &str, value: Value) -> Result<DispatchReport, RegistryError> {
        self.engine.on_property_changed(id, property, value)
    }

    /// See [`Engine::click`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownBinding` if `id` is not a button.
    pub fn click(&mut self, id: &str) -> Result<DispatchReport, RegistryError> {
        self.engine.click(id)
    }
}

fn parse_all(raw: &[&str]) -> Result<Vec<Binding>, RegistryError> {
    raw.iter().map(|s| s.parse()).collect()
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
