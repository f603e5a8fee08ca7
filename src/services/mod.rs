//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own dispatch and client bookkeeping so route handlers can
//! stay focused on protocol translation.

pub mod dispatch;
pub mod session;
