//! Minimal demo - only the mandatory work phases.
//!
//! Advertises an empty capability list; any lifecycle `call` is answered
//! with a "does not implement" error frame while the process keeps serving.

use procvision_adapter::{run_stdio, Algorithm, PhaseArgs, PhaseOutcome};
use serde_json::json;

struct Minimal;

impl Algorithm for Minimal {
    fn get_info(&mut self) -> PhaseOutcome {
        Ok(json!({"name": "minimal", "version": "1.0", "steps": []}))
    }

    fn pre_execute(&mut self, _args: PhaseArgs<'_>) -> PhaseOutcome {
        Ok(json!({"status": "OK", "message": "ready"}))
    }

    fn execute(&mut self, args: PhaseArgs<'_>) -> PhaseOutcome {
        Ok(json!({
            "result_status": "OK",
            "defect_rects": [],
            "debug": {"step_index": args.step_index}
        }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_stdio(Box::new(Minimal)).await {
        eprintln!("adapter failed: {err}");
        std::process::exit(1);
    }
}
