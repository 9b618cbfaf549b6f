//! Phase dispatcher - maps a `call` frame to one algorithm invocation.
//!
//! The [`Dispatcher`] owns the algorithm instance, the capability set
//! (introspected exactly once at construction, before the `hello` frame is
//! emitted), and the session store. Every invocation runs inside a
//! failure-isolating boundary: a returned [`PhaseError`] and a panic both
//! become `error` frames, never a crashed process or broken framing.
//!
//! Dispatch is strictly sequential - the run loop fully resolves one call
//! (invoke, build response) before reading the next frame.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;

use crate::algorithm::{Algorithm, PhaseArgs, PhaseError};
use crate::phase::{CapabilitySet, LifecyclePhase, Phase, WorkPhase};
use crate::protocol::{CallRequest, Frame};
use crate::session::SessionStore;

/// Owns the algorithm instance and routes phases onto it.
pub struct Dispatcher {
    algorithm: Box<dyn Algorithm>,
    capabilities: CapabilitySet,
    sessions: SessionStore,
}

impl Dispatcher {
    /// Wrap an algorithm instance, introspecting its capabilities once.
    ///
    /// The returned capability set is immutable for the process lifetime.
    pub fn new(algorithm: Box<dyn Algorithm>) -> Self {
        let capabilities = algorithm.capabilities();
        Self {
            algorithm,
            capabilities,
            sessions: SessionStore::new(),
        }
    }

    /// The capability set advertised in the `hello` frame.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Resolve one `call` frame into exactly one response frame.
    ///
    /// Never panics and never returns anything but a `result` or `error`
    /// frame tagged with the request's `request_id`.
    pub fn dispatch(&mut self, call: &CallRequest) -> Frame {
        let phase = match call.phase.parse::<Phase>() {
            Ok(phase) => phase,
            Err(err) => return Frame::error(&call.request_id, err.to_string()),
        };

        // Work phases are invoked unconditionally; lifecycle phases only
        // when declared. A gap is recoverable, not protocol-fatal.
        if let Phase::Lifecycle(lifecycle) = phase {
            if !self.capabilities.contains(lifecycle) {
                return Frame::error(
                    &call.request_id,
                    format!("algorithm does not implement {lifecycle}"),
                );
            }
        }

        match self.invoke_isolated(phase, call) {
            Ok(data) => Frame::result(&call.request_id, data),
            Err(message) => Frame::error(&call.request_id, message),
        }
    }

    /// Invoke `teardown` if declared, swallowing any fault.
    ///
    /// Called by the run loop after it stops reading frames. A failing
    /// teardown is logged and must not prevent process exit.
    pub fn teardown_best_effort(&mut self) {
        if !self.capabilities.contains(LifecyclePhase::Teardown) {
            return;
        }
        let algorithm = &mut self.algorithm;
        match catch_unwind(AssertUnwindSafe(|| algorithm.teardown())) {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "teardown failed"),
            Err(payload) => {
                tracing::warn!(panic = %panic_message(&*payload), "teardown panicked")
            }
        }
    }

    /// Failure-isolating boundary around one phase invocation.
    fn invoke_isolated(&mut self, phase: Phase, call: &CallRequest) -> Result<Value, String> {
        let algorithm = &mut self.algorithm;
        let sessions = &mut self.sessions;

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            invoke(algorithm.as_mut(), sessions, phase, call)
        }));

        match outcome {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(err)) => Err(err.message().to_string()),
            Err(payload) => Err(format!("{phase} panicked: {}", panic_message(&*payload))),
        }
    }
}

/// Route the parsed phase to the matching trait method.
fn invoke(
    algorithm: &mut dyn Algorithm,
    sessions: &mut SessionStore,
    phase: Phase,
    call: &CallRequest,
) -> Result<Value, PhaseError> {
    let session = call.session.as_ref().map(|view| sessions.materialize(view));
    let args = PhaseArgs {
        step_index: call.step_index,
        session,
        params: &call.params,
        context: &call.context,
    };

    match phase {
        Phase::Work(WorkPhase::GetInfo) => algorithm.get_info(),
        Phase::Work(WorkPhase::PreExecute) => algorithm.pre_execute(args),
        Phase::Work(WorkPhase::Execute) => algorithm.execute(args),
        Phase::Lifecycle(LifecyclePhase::Setup) => algorithm.setup(),
        Phase::Lifecycle(LifecyclePhase::Teardown) => algorithm.teardown(),
        Phase::Lifecycle(LifecyclePhase::OnStepStart) => algorithm.on_step_start(args),
        Phase::Lifecycle(LifecyclePhase::OnStepFinish) => algorithm.on_step_finish(args),
        Phase::Lifecycle(LifecyclePhase::Reset) => algorithm.reset(args),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
