//! The algorithm contract hosted by the adapter.
//!
//! Third-party inspection code implements [`Algorithm`]. The three work
//! phases (`get_info`, `pre_execute`, `execute`) are required methods; a
//! type that lacks them does not compile, which is this crate's version of
//! "absence of a mandatory phase is a construction-time failure".
//!
//! The five lifecycle phases default to no-ops returning `Value::Null`. An
//! implementation that overrides one must also declare it in
//! [`Algorithm::capabilities`] — the explicit capability descriptor the
//! adapter advertises in its `hello` frame. A lifecycle phase left out of
//! the declared set is never invoked, even if a body exists.
//!
//! # Example
//!
//! ```
//! use procvision_adapter::algorithm::{Algorithm, PhaseArgs, PhaseOutcome};
//! use procvision_adapter::phase::{CapabilitySet, LifecyclePhase};
//! use serde_json::{json, Value};
//!
//! struct Thresholding;
//!
//! impl Algorithm for Thresholding {
//!     fn get_info(&mut self) -> PhaseOutcome {
//!         Ok(json!({"name": "thresholding", "version": "1.0"}))
//!     }
//!
//!     fn pre_execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
//!         Ok(json!({"status": "OK"}))
//!     }
//!
//!     fn execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
//!         Ok(json!({"result_status": "OK", "step_index": args.step_index}))
//!     }
//!
//!     fn reset(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
//!         if let Some(session) = args.session {
//!             session.clear();
//!         }
//!         Ok(Value::Null)
//!     }
//!
//!     fn capabilities(&self) -> CapabilitySet {
//!         CapabilitySet::new().with(LifecyclePhase::Reset)
//!     }
//! }
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::phase::CapabilitySet;
use crate::session::Session;

/// A recoverable fault raised by a phase implementation.
///
/// Converted by the dispatcher into an `error` frame; it never terminates
/// the adapter process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseError {
    message: String,
}

impl PhaseError {
    /// Create an error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable message surfaced to the host.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PhaseError {}

impl From<String> for PhaseError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for PhaseError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Outcome of one phase invocation.
///
/// The `Ok` value passes through verbatim as the `data` payload of the
/// `result` frame.
pub type PhaseOutcome = std::result::Result<Value, PhaseError>;

/// Arguments handed to a phase invocation.
///
/// The request's phase-specific payload stays opaque to the adapter core:
/// `params` and `context` are forwarded as loose maps, `session` is the
/// live session materialized from the request's snapshot (when one was
/// carried).
pub struct PhaseArgs<'a> {
    /// Zero-based step index, when the request carried one.
    pub step_index: Option<u32>,
    /// Live session for the request's session id, when one was carried.
    pub session: Option<&'a mut Session>,
    /// User parameters, opaque to the core.
    pub params: &'a Map<String, Value>,
    /// Host context (for `on_step_finish` this is the step result).
    pub context: &'a Map<String, Value>,
}

impl fmt::Debug for PhaseArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseArgs")
            .field("step_index", &self.step_index)
            .field("session", &self.session.as_ref().map(|s| s.id()))
            .field("params", &self.params)
            .field("context", &self.context)
            .finish()
    }
}

/// Lifecycle contract for a hosted vision-inspection algorithm.
///
/// The adapter run loop exclusively owns the instance: it is constructed
/// once before the `hello` frame and lives for the process's entire run.
pub trait Algorithm: Send {
    /// Describe the algorithm: name, version, supported products, steps.
    fn get_info(&mut self) -> PhaseOutcome;

    /// Validate inputs ahead of an execution step.
    fn pre_execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome;

    /// Run one inspection step.
    fn execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome;

    /// Declared lifecycle capabilities. Defaults to none.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new()
    }

    /// One-time initialization. Only invoked when declared.
    fn setup(&mut self) -> PhaseOutcome {
        Ok(Value::Null)
    }

    /// Best-effort cleanup before process exit. Only invoked when declared.
    fn teardown(&mut self) -> PhaseOutcome {
        Ok(Value::Null)
    }

    /// Notification before a step runs. Only invoked when declared.
    fn on_step_start(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
        Ok(Value::Null)
    }

    /// Notification after a step finished. Only invoked when declared.
    fn on_step_finish(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
        Ok(Value::Null)
    }

    /// Reset per-session state. Only invoked when declared.
    fn reset(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Minimal;

    impl Algorithm for Minimal {
        fn get_info(&mut self) -> PhaseOutcome {
            Ok(json!({"name": "minimal"}))
        }

        fn pre_execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
            Ok(json!({"status": "OK"}))
        }

        fn execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
            Err(PhaseError::new("image buffer empty"))
        }
    }

    fn empty_args<'a>(params: &'a Map<String, Value>, context: &'a Map<String, Value>) -> PhaseArgs<'a> {
        PhaseArgs {
            step_index: None,
            session: None,
            params,
            context,
        }
    }

    #[test]
    fn test_default_capabilities_empty() {
        let algo = Minimal;
        assert!(algo.capabilities().is_empty());
    }

    #[test]
    fn test_default_lifecycle_phases_are_noops() {
        let mut algo = Minimal;
        let params = Map::new();
        let context = Map::new();

        assert_eq!(algo.setup().unwrap(), Value::Null);
        assert_eq!(algo.teardown().unwrap(), Value::Null);
        assert_eq!(algo.reset(empty_args(&params, &context)).unwrap(), Value::Null);
        assert_eq!(
            algo.on_step_start(empty_args(&params, &context)).unwrap(),
            Value::Null
        );
        assert_eq!(
            algo.on_step_finish(empty_args(&params, &context)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_phase_error_message() {
        let mut algo = Minimal;
        let params = Map::new();
        let context = Map::new();

        let err = algo.execute(empty_args(&params, &context)).unwrap_err();
        assert_eq!(err.message(), "image buffer empty");
        assert_eq!(err.to_string(), "image buffer empty");
    }

    #[test]
    fn test_phase_error_from_str() {
        let err: PhaseError = "boom".into();
        assert_eq!(err, PhaseError::new("boom"));
    }
}
