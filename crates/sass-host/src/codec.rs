//! Length-prefixed protobuf framing.
//!
//! Each frame is a fixed four-byte little-endian length header followed
//! by exactly that many bytes of encoded message. This is NOT the stock
//! varint-delimited protobuf stream format; the Embedded Sass protocol
//! mandates the fixed header.

use crate::Error;
use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt};

// Sanity cap against corrupt length headers. Far above any payload the
// protocol produces.
const MAX_FRAME_LENGTH: u32 = 1 << 30;

/// Encode a message into a returned buffer, prefixed with its
/// four-byte little endian length header.
pub(crate) fn encode_message<M: Message>(message: &M) -> Vec<u8> {
    let length = message.encoded_len();
    let mut buf = Vec::with_capacity(4 + length);
    buf.extend_from_slice(&(length as u32).to_le_bytes());
    message
        .encode(&mut buf)
        .expect("buf has pre-allocated capacity");
    buf
}

/// Decode a single message from the reader.
///
/// A clean EOF before any header byte maps to `Ok(None)`. EOF part-way
/// through a header or payload, an oversized length, or a payload that
/// fails protobuf decoding are all errors.
pub(crate) async fn decode_message<M, R>(reader: &mut R) -> Result<Option<M>, Error>
where
    M: Message + Default,
    R: AsyncRead + Unpin,
{
    // Read the header byte-wise so a clean EOF (no bytes at all) can
    // be told apart from a stream truncated mid-header.
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match reader.read(&mut header[filled..]).await {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(Error::Io(
                    "stream ended part-way through a frame header".to_string(),
                ))
            }
            Ok(n) => filled += n,
            Err(error) => return Err(Error::io("reading frame header", error)),
        }
    }

    let length = u32::from_le_bytes(header);
    if length > MAX_FRAME_LENGTH {
        return Err(Error::protocol(format!(
            "frame length {length} exceeds the {MAX_FRAME_LENGTH} byte maximum"
        )));
    }

    let mut buf = vec![0; length as usize];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|error| Error::io("reading frame payload", error))?;

    M::decode(buf.as_slice())
        .map(Some)
        .map_err(|error| Error::protocol(format!("decoding frame payload: {error}")))
}
