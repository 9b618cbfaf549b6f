//! Protocol module - frame catalogue and length-prefixed codec.
//!
//! This module implements the wire contract between host and adapter:
//! - 4-byte big-endian length prefix framing
//! - UTF-8 JSON payloads, one frame per message
//! - Typed [`Frame`] variants with strict required-field validation

mod codec;
mod frame;

pub use codec::{
    decode_frame, encode_frame, read_frame, read_frame_bytes, write_frame,
    DEFAULT_MAX_PAYLOAD_SIZE, LENGTH_PREFIX_SIZE,
};
pub use frame::{salvage_request_id, CallRequest, Frame, STATUS_OK};
