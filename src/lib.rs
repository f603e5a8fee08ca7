//! Reactive dashboards: a validated component tree, a property registry and
//! a callback graph, served to browsers over HTTP and a websocket.
//!
//! ARCHITECTURE
//! ============
//! - `tree` validates the declared layout and assigns ids.
//! - `registry` holds the current value of every `(id, property)` binding.
//! - `graph` records which callbacks read and write which bindings.
//! - `engine` runs the collect → invoke → apply cycle for one event,
//!   following chains depth-first.
//! - `app` bundles the above; `server::start` takes it by value and serves
//!   `routes` over a shared `state::AppState`.
//! - `demo` is the bundled example dashboard.

pub mod app;
pub mod config;
pub mod demo;
pub mod engine;
pub mod frame;
pub mod graph;
pub mod registry;
pub mod render;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod tree;
