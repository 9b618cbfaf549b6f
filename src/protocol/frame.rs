//! Frame catalogue with typed constructors and accessors.
//!
//! A [`Frame`] is one protocol message. On the wire it is a JSON object
//! whose `type` field selects the variant:
//!
//! | type       | direction      | required fields                        |
//! |------------|----------------|----------------------------------------|
//! | `hello`    | adapter → host | `capabilities`                         |
//! | `call`     | host → adapter | `request_id`, `phase`                  |
//! | `result`   | adapter → host | `request_id`, `status = "OK"`, `data`  |
//! | `error`    | adapter → host | `message` (`request_id` when known)    |
//! | `shutdown` | either         | —                                      |
//!
//! # Example
//!
//! ```
//! use procvision_adapter::protocol::Frame;
//! use serde_json::json;
//!
//! let frame = Frame::result("r1", json!({"phase": "setup"}));
//! let json = serde_json::to_value(&frame).unwrap();
//! assert_eq!(json["type"], "result");
//! assert_eq!(json["status"], "OK");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::phase::CapabilitySet;
use crate::session::SessionView;

/// Status value for successful results.
pub const STATUS_OK: &str = "OK";

/// A phase invocation request carried by a `call` frame.
///
/// `request_id` is caller-assigned and opaque: it is echoed verbatim in the
/// response so the host can correlate. `params` and `context` are opaque to
/// the core; only `request_id` and `phase` are validated strictly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Caller-assigned correlation id, echoed verbatim in the response.
    pub request_id: String,
    /// Wire name of the phase to invoke.
    pub phase: String,
    /// Zero-based step index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<u32>,
    /// Session snapshot, when the call is session-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
    /// User parameters, opaque to the core.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    /// Host context (step result for `on_step_finish`), opaque to the core.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

impl CallRequest {
    /// Create a bare call with only the required fields.
    pub fn new(request_id: impl Into<String>, phase: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            phase: phase.into(),
            step_index: None,
            session: None,
            params: Map::new(),
            context: Map::new(),
        }
    }

    /// Set the step index (builder style).
    pub fn step_index(mut self, index: u32) -> Self {
        self.step_index = Some(index);
        self
    }

    /// Attach a session snapshot (builder style).
    pub fn session(mut self, view: SessionView) -> Self {
        self.session = Some(view);
        self
    }
}

/// One protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Startup handshake: the adapter's declared lifecycle capabilities.
    Hello {
        /// Wire names of the implemented lifecycle phases.
        capabilities: Vec<String>,
    },
    /// Phase invocation request.
    Call(CallRequest),
    /// Successful response; `data` is the phase's return value verbatim.
    Result {
        /// Correlation id echoed from the request.
        request_id: String,
        /// Always `"OK"`.
        status: String,
        /// Phase return value.
        data: Value,
    },
    /// Failure response.
    Error {
        /// Correlation id, when the failure is attributable to a request.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        /// Human-readable failure description.
        message: String,
    },
    /// Shutdown request (host → adapter) or acknowledgement (adapter → host).
    Shutdown,
}

impl Frame {
    /// Build the `hello` frame from a capability set.
    pub fn hello(capabilities: &CapabilitySet) -> Self {
        Frame::Hello {
            capabilities: capabilities.names(),
        }
    }

    /// Build a successful `result` frame.
    pub fn result(request_id: impl Into<String>, data: Value) -> Self {
        Frame::Result {
            request_id: request_id.into(),
            status: STATUS_OK.to_string(),
            data,
        }
    }

    /// Build an `error` frame correlated to a request.
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Frame::Error {
            request_id: Some(request_id.into()),
            message: message.into(),
        }
    }

    /// Build an uncorrelated protocol-level `error` frame.
    pub fn protocol_error(message: impl Into<String>) -> Self {
        Frame::Error {
            request_id: None,
            message: message.into(),
        }
    }

    /// Wire name of this frame's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Frame::Hello { .. } => "hello",
            Frame::Call(_) => "call",
            Frame::Result { .. } => "result",
            Frame::Error { .. } => "error",
            Frame::Shutdown => "shutdown",
        }
    }

    /// Correlation id carried by this frame, when any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Frame::Call(call) => Some(&call.request_id),
            Frame::Result { request_id, .. } => Some(request_id),
            Frame::Error { request_id, .. } => request_id.as_deref(),
            Frame::Hello { .. } | Frame::Shutdown => None,
        }
    }
}

/// Salvage a `request_id` from a payload that failed strict decoding.
///
/// Lets the run loop answer malformed-but-correlatable frames with an
/// `error` frame instead of only logging out-of-band.
pub fn salvage_request_id(payload: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(payload).ok()?;
    value
        .get("request_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
