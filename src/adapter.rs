//! Adapter run loop - the process entry point for a hosted algorithm.
//!
//! The [`Adapter`] exclusively owns the algorithm instance (through its
//! [`Dispatcher`]) and the two stream halves for the process's entire life.
//! Its lifecycle:
//!
//! 1. Capability introspection happens when the dispatcher is built.
//! 2. A `hello` frame advertising the capability list is emitted.
//! 3. Frames are read one at a time; each `call` is fully resolved and its
//!    response written before the next read. `shutdown` is acknowledged and
//!    ends the loop; end of stream ends it silently.
//! 4. `teardown` runs best-effort, then the loop returns.
//!
//! No frame is read while a dispatch is outstanding, and no fault inside a
//! single call closes the stream. Only framing-level breakage (an oversized
//! length prefix, a stream closed mid-frame) or stream I/O failure makes
//! `run` return an error.
//!
//! # Example
//!
//! ```no_run
//! use procvision_adapter::{run_stdio, Algorithm, PhaseArgs, PhaseOutcome};
//! use serde_json::json;
//!
//! struct Inspect;
//!
//! impl Algorithm for Inspect {
//!     fn get_info(&mut self) -> PhaseOutcome { Ok(json!({"name": "inspect"})) }
//!     fn pre_execute(&mut self, _: PhaseArgs<'_>) -> PhaseOutcome { Ok(json!({"status": "OK"})) }
//!     fn execute(&mut self, _: PhaseArgs<'_>) -> PhaseOutcome { Ok(json!({"result_status": "OK"})) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     if let Err(err) = run_stdio(Box::new(Inspect)).await {
//!         eprintln!("adapter failed: {err}");
//!         std::process::exit(1);
//!     }
//! }
//! ```

use tokio::io::{AsyncRead, AsyncWrite};

use crate::algorithm::Algorithm;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::protocol::{decode_frame, read_frame_bytes, salvage_request_id, write_frame, Frame};

/// The adapter run loop over a pair of stream halves.
pub struct Adapter<R, W> {
    reader: R,
    writer: W,
    dispatcher: Dispatcher,
}

impl<R, W> Adapter<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Take ownership of the algorithm and the stream halves.
    pub fn new(algorithm: Box<dyn Algorithm>, reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            dispatcher: Dispatcher::new(algorithm),
        }
    }

    /// Drive the protocol until shutdown or end of stream.
    ///
    /// Exactly one response frame is written per `call` frame read, in
    /// order. The loop never exits while a response is still owed.
    pub async fn run(mut self) -> Result<()> {
        let hello = Frame::hello(self.dispatcher.capabilities());
        write_frame(&mut self.writer, &hello).await?;

        loop {
            let payload = match read_frame_bytes(&mut self.reader).await? {
                Some(payload) => payload,
                // Input closed between frames: implicit shutdown, no ack.
                None => break,
            };

            match decode_frame(&payload) {
                Ok(Frame::Call(call)) => {
                    let response = self.dispatcher.dispatch(&call);
                    write_frame(&mut self.writer, &response).await?;
                }
                Ok(Frame::Shutdown) => {
                    write_frame(&mut self.writer, &Frame::Shutdown).await?;
                    break;
                }
                Ok(unexpected) => {
                    // hello/result/error are adapter-to-host frames; seeing
                    // one inbound is a per-frame protocol error.
                    let message =
                        format!("unexpected frame type: {}", unexpected.type_name());
                    match unexpected.request_id() {
                        Some(request_id) => {
                            let frame = Frame::error(request_id, message);
                            write_frame(&mut self.writer, &frame).await?;
                        }
                        None => tracing::warn!(reason = %message, "dropping frame"),
                    }
                }
                Err(err) => match salvage_request_id(&payload) {
                    Some(request_id) => {
                        let frame =
                            Frame::error(request_id, format!("malformed frame: {err}"));
                        write_frame(&mut self.writer, &frame).await?;
                    }
                    None => tracing::warn!(error = %err, "dropping undecodable frame"),
                },
            }
        }

        self.dispatcher.teardown_best_effort();
        Ok(())
    }
}

/// Run an algorithm over the process's stdin/stdout.
///
/// This is the adapter process entry point: frames own stdout, so all
/// logging must go to stderr. Constructing the algorithm (and failing fast
/// when that is impossible) is the caller's job and happens before any
/// `hello` frame is emitted.
pub async fn run_stdio(algorithm: Box<dyn Algorithm>) -> Result<()> {
    let adapter = Adapter::new(algorithm, tokio::io::stdin(), tokio::io::stdout());
    adapter.run().await
}
