//! Dashboard wire protocol: one JSON frame per websocket text message.
//!
//! PROTOCOL
//! ========
//! ```text
//! server → client   session:connected  {client_id}
//! client → server   layout:get         {}
//! client → server   prop:set           {id, property, value}
//! client → server   prop:click         {id}
//! server → client   done               {layout, dependencies} | {patches, errors, invoked}
//! server → client   error              {code, message, retryable}
//! server → peers    prop:patch         {patches}
//! server → client   gateway:error      {code, message, retryable}   (unparsable input)
//! ```
//!
//! Replies carry the request's `syscall` and point back at it through
//! `parent_id`. `prop:patch` and `gateway:error` answer nothing and have no
//! parent.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::registry::Patch;

pub const FRAME_MESSAGE: &str = "message";
pub const FRAME_CODE: &str = "code";
pub const FRAME_RETRYABLE: &str = "retryable";

pub const SESSION_CONNECTED: &str = "session:connected";
pub const PROP_PATCH: &str = "prop:patch";
pub const GATEWAY_ERROR: &str = "gateway:error";

pub type Data = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Request,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Milliseconds since the Unix epoch; `0` when a client omits it.
    #[serde(default)]
    pub ts: i64,
    /// Originating client, stamped by the server on inbound frames.
    #[serde(default)]
    pub from: Option<String>,
    pub syscall: String,
    pub status: Status,
    #[serde(default)]
    pub data: Data,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Grepable error code and retryable flag for structured error frames.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// A frame the server cannot act on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("unknown syscall: {0}")]
    UnknownSyscall(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl ErrorCode for ProtocolError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFrame(_) => "E_INVALID_FRAME",
            Self::UnknownSyscall(_) => "E_UNKNOWN_SYSCALL",
            Self::MissingField(_) => "E_MISSING_FIELD",
        }
    }
}

fn error_data(err: &(impl ErrorCode + ?Sized)) -> Data {
    let mut data = Data::new();
    data.insert(FRAME_CODE.into(), Value::String(err.error_code().to_string()));
    data.insert(FRAME_MESSAGE.into(), Value::String(err.to_string()));
    data.insert(FRAME_RETRYABLE.into(), Value::Bool(err.retryable()));
    data
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    pub fn request(syscall: impl Into<String>, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            ts: now_ms(),
            from: None,
            syscall: syscall.into(),
            status: Status::Request,
            data,
        }
    }

    /// Welcome frame sent once per connection.
    #[must_use]
    pub fn connected(client_id: Uuid) -> Self {
        let mut data = Data::new();
        data.insert("client_id".into(), Value::String(client_id.to_string()));
        Self::request(SESSION_CONNECTED, data)
    }

    /// Registry writes of one dispatch cycle, pushed to clients that did not
    /// cause them. `origin` is `None` for events that arrived over HTTP.
    #[must_use]
    pub fn patches(patches: &[Patch], origin: Option<Uuid>) -> Self {
        let mut data = Data::new();
        data.insert("patches".into(), json!(patches));
        let mut frame = Self::request(PROP_PATCH, data);
        frame.from = origin.map(|id| id.to_string());
        frame
    }

    /// Error for input that could not be read as a frame at all.
    #[must_use]
    pub fn rejected(err: &(impl ErrorCode + ?Sized)) -> Self {
        let mut frame = Self::request(GATEWAY_ERROR, error_data(err));
        frame.status = Status::Error;
        frame
    }

    #[must_use]
    pub fn done_with(&self, data: Data) -> Self {
        self.reply(Status::Done, data)
    }

    #[must_use]
    pub fn error_from(&self, err: &(impl ErrorCode + ?Sized)) -> Self {
        self.reply(Status::Error, error_data(err))
    }

    fn reply(&self, status: Status, data: Data) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: Some(self.id),
            ts: now_ms(),
            from: None,
            syscall: self.syscall.clone(),
            status,
            data,
        }
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Frame {
    /// `"prop"` for `"prop:set"`; the whole syscall if there is no `:`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.syscall.split_once(':').map_or(self.syscall.as_str(), |(prefix, _)| prefix)
    }

    /// `"set"` for `"prop:set"`; empty if there is no `:`.
    #[must_use]
    pub fn op(&self) -> &str {
        self.syscall.split_once(':').map_or("", |(_, op)| op)
    }

    /// A required string field of `data`.
    ///
    /// # Errors
    ///
    /// `MissingField` if `key` is absent or not a string.
    pub fn field(&self, key: &'static str) -> Result<&str, ProtocolError> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingField(key))
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
