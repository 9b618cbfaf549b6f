//! Inspection demo - a full-lifecycle algorithm served over stdio.
//!
//! This example demonstrates:
//! - Implementing all three work phases plus every lifecycle phase
//! - Declaring lifecycle capabilities explicitly
//! - Keeping per-session state across calls
//!
//! # Driving it by hand
//!
//! Each frame is a 4-byte big-endian length prefix followed by JSON, e.g.
//! from Python:
//!
//! ```python
//! import json, struct, subprocess
//!
//! p = subprocess.Popen(["target/debug/examples/inspection"],
//!                      stdin=subprocess.PIPE, stdout=subprocess.PIPE)
//!
//! def send(obj):
//!     data = json.dumps(obj).encode()
//!     p.stdin.write(struct.pack(">I", len(data)) + data)
//!     p.stdin.flush()
//!
//! def recv():
//!     (n,) = struct.unpack(">I", p.stdout.read(4))
//!     return json.loads(p.stdout.read(n))
//!
//! print(recv())  # {'type': 'hello', 'capabilities': [...]}
//! send({"type": "call", "request_id": "r1", "phase": "get_info"})
//! print(recv())
//! send({"type": "shutdown"})
//! ```

use procvision_adapter::phase::CapabilitySet;
use procvision_adapter::{run_stdio, Algorithm, PhaseArgs, PhaseOutcome};
use serde_json::json;

/// Demo inspector for products p001/p002.
struct InspectionDemo {
    supported_pids: Vec<&'static str>,
}

impl InspectionDemo {
    fn new() -> Self {
        Self {
            supported_pids: vec!["p001", "p002"],
        }
    }
}

impl Algorithm for InspectionDemo {
    fn get_info(&mut self) -> PhaseOutcome {
        Ok(json!({
            "name": "inspection-demo",
            "version": "1.0",
            "description": "demo algorithm for p001/p002",
            "supported_pids": self.supported_pids,
            "steps": [{
                "index": 0,
                "name": "demo step",
                "params": [
                    {"key": "threshold", "type": "float", "default": 0.5, "min": 0.0, "max": 1.0}
                ]
            }]
        }))
    }

    fn pre_execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        if let Some(pid) = args.context.get("product_code").and_then(|v| v.as_str()) {
            if !self.supported_pids.contains(&pid) {
                return Err(format!("unsupported product: {pid}").into());
            }
        }
        Ok(json!({"status": "OK", "message": "ready"}))
    }

    fn execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        let threshold = args
            .params
            .get("threshold")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.5);

        // Count executions per session to show state persistence.
        let run = match args.session {
            Some(session) => {
                let n = session.get("runs").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
                session.set("runs", json!(n));
                n
            }
            None => 0,
        };

        Ok(json!({
            "result_status": "OK",
            "defect_rects": [],
            "debug": {
                "step_index": args.step_index,
                "threshold": threshold,
                "session_runs": run
            }
        }))
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::all()
    }

    fn setup(&mut self) -> PhaseOutcome {
        tracing::info!("model warm-up done");
        Ok(json!(null))
    }

    fn teardown(&mut self) -> PhaseOutcome {
        tracing::info!("released resources");
        Ok(json!(null))
    }

    fn on_step_start(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        tracing::debug!(step_index = ?args.step_index, "step starting");
        Ok(json!(null))
    }

    fn on_step_finish(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        tracing::debug!(step_index = ?args.step_index, "step finished");
        Ok(json!(null))
    }

    fn reset(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        if let Some(session) = args.session {
            session.clear();
        }
        Ok(json!(null))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Frames own stdout; logs must go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_stdio(Box::new(InspectionDemo::new())).await {
        eprintln!("adapter failed: {err}");
        std::process::exit(1);
    }
}
