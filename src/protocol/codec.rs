//! Length-prefixed frame codec.
//!
//! Wire layout in both directions:
//!
//! ```text
//! ┌────────────────┬──────────────────────────────┐
//! │ Length         │ Payload                      │
//! │ 4 bytes, u32 BE│ UTF-8 JSON, exactly `length` │
//! └────────────────┴──────────────────────────────┘
//! ```
//!
//! Frames are self-delimiting: the reader always consumes exactly one
//! complete frame before the next. The codec knows nothing about message
//! semantics — payload interpretation lives in [`Frame`].
//!
//! A length prefix above [`DEFAULT_MAX_PAYLOAD_SIZE`] is rejected before
//! any allocation. A stream that closes before the first prefix byte is a
//! clean end of stream (`Ok(None)`); closing anywhere inside a frame is a
//! framing error.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::frame::Frame;
use crate::error::{AdapterError, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Maximum accepted payload size (64 MiB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

/// Encode a frame as length prefix plus canonical JSON payload.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(frame)?;
    let length = u32::try_from(payload.len()).map_err(|_| AdapterError::FrameTooLarge {
        length: u32::MAX,
        max: DEFAULT_MAX_PAYLOAD_SIZE,
    })?;
    if length > DEFAULT_MAX_PAYLOAD_SIZE {
        return Err(AdapterError::FrameTooLarge {
            length,
            max: DEFAULT_MAX_PAYLOAD_SIZE,
        });
    }

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Strictly decode one frame payload.
///
/// Unknown `type` values and missing required fields are errors.
pub fn decode_frame(payload: &[u8]) -> Result<Frame> {
    Ok(serde_json::from_slice(payload)?)
}

/// Fill `buf` completely from the reader.
///
/// Returns `Ok(false)` when the stream closed before the first byte,
/// `Err(Truncated)` when it closed partway through.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(AdapterError::Truncated);
        }
        filled += n;
    }
    Ok(true)
}

/// Read one framed payload from the stream.
///
/// Blocks until a complete frame arrives. `Ok(None)` means the stream
/// closed cleanly between frames (end of stream).
pub async fn read_frame_bytes<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Bytes>> {
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    if !read_full(reader, &mut prefix).await? {
        return Ok(None);
    }

    let length = u32::from_be_bytes(prefix);
    if length > DEFAULT_MAX_PAYLOAD_SIZE {
        return Err(AdapterError::FrameTooLarge {
            length,
            max: DEFAULT_MAX_PAYLOAD_SIZE,
        });
    }

    let mut payload = vec![0u8; length as usize];
    if !payload.is_empty() && !read_full(reader, &mut payload).await? {
        return Err(AdapterError::Truncated);
    }
    Ok(Some(Bytes::from(payload)))
}

/// Read and strictly decode one frame.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Frame>> {
    match read_frame_bytes(reader).await? {
        Some(payload) => Ok(Some(decode_frame(&payload)?)),
        None => Ok(None),
    }
}

/// Write one frame and flush.
///
/// The protocol is strictly synchronous: the host blocks on the matching
/// response, so the bytes must reach the receiver before this returns.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = encode_frame(frame)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{CapabilitySet, LifecyclePhase};
    use crate::protocol::CallRequest;
    use serde_json::json;

    #[test]
    fn test_encode_length_prefix_big_endian() {
        let bytes = encode_frame(&Frame::Shutdown).unwrap();
        let payload = &bytes[LENGTH_PREFIX_SIZE..];

        assert_eq!(
            u32::from_be_bytes(bytes[..4].try_into().unwrap()) as usize,
            payload.len()
        );
        assert_eq!(payload, br#"{"type":"shutdown"}"#);
    }

    #[test]
    fn test_decode_encode_roundtrip() {
        let frames = [
            Frame::hello(&CapabilitySet::new().with(LifecyclePhase::Reset)),
            Frame::Call(
                CallRequest::new("r1", "execute")
                    .step_index(3)
                    .session(crate::session::SessionView::new("s1")),
            ),
            Frame::result("r1", json!({"result_status": "OK", "defect_rects": []})),
            Frame::error("r2", "algorithm does not implement reset"),
            Frame::protocol_error("unsupported frame type: hello"),
            Frame::Shutdown,
        ];

        for frame in frames {
            let encoded = encode_frame(&frame).unwrap();
            let decoded = decode_frame(&encoded[LENGTH_PREFIX_SIZE..]).unwrap();
            assert_eq!(decoded, frame);

            // Re-encoding the decoded frame is byte-identical.
            assert_eq!(encode_frame(&decoded).unwrap(), encoded);
        }
    }

    #[tokio::test]
    async fn test_read_frame_roundtrip() {
        let frame = Frame::result("r1", json!({"phase": "setup"}));
        let bytes = encode_frame(&frame).unwrap();

        let mut reader = bytes.as_slice();
        let decoded = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[tokio::test]
    async fn test_read_multiple_frames_in_sequence() {
        let mut bytes = Vec::new();
        for i in 1..=3 {
            let frame = Frame::result(format!("r{i}"), json!(i));
            bytes.extend(encode_frame(&frame).unwrap());
        }

        let mut reader = bytes.as_slice();
        for i in 1..=3 {
            let frame = read_frame(&mut reader).await.unwrap().unwrap();
            assert_eq!(frame.request_id(), Some(format!("r{i}").as_str()));
        }
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_before_prefix_is_end_of_stream() {
        let mut reader: &[u8] = &[];
        assert!(read_frame_bytes(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_mid_prefix_is_framing_error() {
        let mut reader: &[u8] = &[0, 0];
        let err = read_frame_bytes(&mut reader).await.unwrap_err();
        assert!(matches!(err, AdapterError::Truncated));
    }

    #[tokio::test]
    async fn test_closed_mid_payload_is_framing_error() {
        let bytes = encode_frame(&Frame::Shutdown).unwrap();
        let mut reader = &bytes[..bytes.len() - 1];
        let err = read_frame_bytes(&mut reader).await.unwrap_err();
        assert!(matches!(err, AdapterError::Truncated));
    }

    #[tokio::test]
    async fn test_oversized_prefix_rejected_without_allocation() {
        let length = DEFAULT_MAX_PAYLOAD_SIZE + 1;
        let mut reader: &[u8] = &length.to_be_bytes();

        let err = read_frame_bytes(&mut reader).await.unwrap_err();
        match err {
            AdapterError::FrameTooLarge { length: l, max } => {
                assert_eq!(l, length);
                assert_eq!(max, DEFAULT_MAX_PAYLOAD_SIZE);
            }
            other => panic!("expected FrameTooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_payload_is_decode_error_not_framing_error() {
        let mut reader: &[u8] = &0u32.to_be_bytes();
        let payload = read_frame_bytes(&mut reader).await.unwrap().unwrap();
        assert!(payload.is_empty());
        assert!(decode_frame(&payload).is_err());
    }

    #[tokio::test]
    async fn test_write_frame_flushes_complete_frame() {
        let frame = Frame::error("r1", "boom");
        let mut out = Vec::new();
        write_frame(&mut out, &frame).await.unwrap();
        assert_eq!(out, encode_frame(&frame).unwrap());
    }

    #[tokio::test]
    async fn test_write_then_read_over_duplex() {
        let (mut host, mut adapter) = tokio::io::duplex(4096);

        let frame = Frame::Call(CallRequest::new("r1", "get_info"));
        write_frame(&mut host, &frame).await.unwrap();

        let read = read_frame(&mut adapter).await.unwrap().unwrap();
        assert_eq!(read, frame);
    }
}
