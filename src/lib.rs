//! # procvision-adapter
//!
//! Process-isolated adapter protocol for hosting vision-inspection
//! algorithms.
//!
//! A host orchestrator runs in one process; the algorithm it drives runs in
//! a child process. This crate is the child side: it owns the algorithm
//! instance and speaks a framed message protocol over a byte stream
//! (normally the process's stdin/stdout).
//!
//! ## Wire contract
//!
//! - **Framing**: 4-byte big-endian length prefix, then exactly that many
//!   bytes of UTF-8 JSON.
//! - **Handshake**: the adapter emits a `hello` frame advertising which
//!   optional lifecycle phases the algorithm implements.
//! - **Dispatch**: each `call` frame names a phase and is answered with
//!   exactly one `result` or `error` frame carrying the same `request_id`,
//!   in order, one at a time.
//! - **Shutdown**: a `shutdown` frame is acknowledged and ends the loop;
//!   a closed input stream ends it silently.
//!
//! Faults inside a single call never crash the adapter or break framing:
//! they surface as structured `error` frames. Logs go to stderr, never to
//! the frame stream.
//!
//! ## Example
//!
//! ```no_run
//! use procvision_adapter::{run_stdio, Algorithm, PhaseArgs, PhaseOutcome};
//! use procvision_adapter::phase::{CapabilitySet, LifecyclePhase};
//! use serde_json::json;
//!
//! struct EdgeInspector;
//!
//! impl Algorithm for EdgeInspector {
//!     fn get_info(&mut self) -> PhaseOutcome {
//!         Ok(json!({"name": "edge-inspector", "version": "1.0"}))
//!     }
//!
//!     fn pre_execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
//!         Ok(json!({"status": "OK"}))
//!     }
//!
//!     fn execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
//!         Ok(json!({"result_status": "OK", "defect_rects": []}))
//!     }
//!
//!     fn capabilities(&self) -> CapabilitySet {
//!         CapabilitySet::new().with(LifecyclePhase::Setup)
//!     }
//!
//!     fn setup(&mut self) -> PhaseOutcome {
//!         Ok(json!(null))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     if let Err(err) = run_stdio(Box::new(EdgeInspector)).await {
//!         eprintln!("adapter failed: {err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod algorithm;
pub mod phase;
pub mod protocol;
pub mod session;

mod adapter;
mod dispatch;
mod error;

pub use adapter::{run_stdio, Adapter};
pub use algorithm::{Algorithm, PhaseArgs, PhaseError, PhaseOutcome};
pub use dispatch::Dispatcher;
pub use error::{AdapterError, Result};
pub use phase::{CapabilitySet, LifecyclePhase, Phase, WorkPhase};
pub use protocol::{CallRequest, Frame};
pub use session::{Session, SessionStore, SessionView};
