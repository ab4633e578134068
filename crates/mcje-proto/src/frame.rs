//! Packet framing: modern length-prefixed frames plus the two pre-Netty
//! legacy status dialects, discriminated from the first byte a peer sends.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarInt;

/// Default cap on a frame's declared length.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1 << 21;

/// First byte of every legacy status ping.
pub const LEGACY_PING_BYTE: u8 = 0xFE;

/// Limits and modes applied while decoding the stream.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Frames longer than this are malformed.
    pub max_frame_len: usize,
    /// Bound on decoded strings, in UTF-16 code units.
    pub max_string_utf16: usize,
    /// Compressed framing is recognized but not implemented; with this set
    /// every inbound frame decodes to an error.
    pub compression_enabled: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            max_string_utf16: crate::codec::MAX_STRING_UTF16,
            compression_enabled: false,
        }
    }
}

/// Which legacy dialect a leading `0xFE` turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyDialect {
    /// Bare `0xFE` (beta era).
    VeryLegacy,
    /// `0xFE 0x01`, optionally followed by a `0xFA` plugin-message payload
    /// (1.4 through 1.6).
    PreNetty,
}

/// Read a VarInt from the stream, one byte at a time.
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32, ProtoError> {
    let first = reader.read_u8().await?;
    resume_varint(first, reader).await
}

/// Finish reading a VarInt whose first byte was already consumed.
pub async fn resume_varint<R: AsyncRead + Unpin>(
    first: u8,
    reader: &mut R,
) -> Result<i32, ProtoError> {
    let mut result = (first & 0x7F) as u32;
    if first & 0x80 == 0 {
        return Ok(result as i32);
    }
    for i in 1..VarInt::MAX_BYTES {
        let byte = reader.read_u8().await?;
        result |= ((byte & 0x7F) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(ProtoError::VarIntTooLong {
        max_bytes: VarInt::MAX_BYTES,
    })
}

/// Read one length-prefixed frame and return its length-scoped bytes
/// (packet id plus body).
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    config: &ProtocolConfig,
) -> Result<Bytes, ProtoError> {
    let len = read_varint(reader).await?;
    read_frame_body(reader, len, config).await
}

/// Read the remainder of a frame whose length VarInt is already decoded.
pub async fn read_frame_body<R: AsyncRead + Unpin>(
    reader: &mut R,
    len: i32,
    config: &ProtocolConfig,
) -> Result<Bytes, ProtoError> {
    if len < 0 || len as usize > config.max_frame_len {
        return Err(ProtoError::FrameTooLarge {
            len: len.max(0) as usize,
            max: config.max_frame_len,
        });
    }
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    let mut scoped = Bytes::from(body);
    if config.compression_enabled {
        // The inner data length marks a compressed region; inflating it is
        // not implemented, and 0 (uncompressed passthrough) only occurs
        // after a negotiation this core never performs.
        VarInt::proto_decode(&mut scoped)?;
        return Err(ProtoError::CompressionUnsupported);
    }
    Ok(scoped)
}

/// Decide which legacy dialect follows a leading `0xFE`.
///
/// The very-legacy ping is a single byte, so the classifier waits one probe
/// window for more data; silence means the bare form. A `0x01` means the
/// pre-Netty form, whose optional `0xFA` plugin-message payload is consumed
/// and discarded.
pub async fn classify_legacy<R: AsyncRead + Unpin>(
    reader: &mut R,
    probe: Duration,
) -> Result<LegacyDialect, ProtoError> {
    match probe_byte(reader, probe).await? {
        None => Ok(LegacyDialect::VeryLegacy),
        Some(0x01) => {
            match probe_byte(reader, probe).await? {
                None => {}
                Some(0xFA) => discard_plugin_message(reader).await?,
                Some(other) => {
                    return Err(ProtoError::InvalidData(format!(
                        "unexpected byte 0x{other:02X} after legacy ping"
                    )))
                }
            }
            Ok(LegacyDialect::PreNetty)
        }
        Some(other) => Err(ProtoError::InvalidData(format!(
            "unexpected byte 0x{other:02X} after 0xFE"
        ))),
    }
}

/// Read one byte unless the stream stays silent for the probe window or
/// ends first.
async fn probe_byte<R: AsyncRead + Unpin>(
    reader: &mut R,
    probe: Duration,
) -> Result<Option<u8>, ProtoError> {
    match tokio::time::timeout(probe, reader.read_u8()).await {
        Err(_) => Ok(None),
        Ok(Ok(byte)) => Ok(Some(byte)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Ok(Err(e)) => Err(e.into()),
    }
}

/// Skip the 1.6 `MC|PingHost` payload: a UTF-16 channel name and a
/// length-prefixed data blob, both of which this core ignores.
async fn discard_plugin_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<(), ProtoError> {
    let name_units = reader.read_u16().await? as usize;
    let mut skip = vec![0u8; name_units * 2];
    reader.read_exact(&mut skip).await?;
    let data_len = reader.read_u16().await? as usize;
    let mut skip = vec![0u8; data_len];
    reader.read_exact(&mut skip).await?;
    Ok(())
}

/// Frame a packet id and body for the wire:
/// `VarInt(len(id) + len(body)) ‖ id ‖ body`, returned as one buffer so the
/// caller can emit it atomically.
pub fn write_frame(id: i32, body: &[u8]) -> BytesMut {
    let mut id_buf = BytesMut::with_capacity(VarInt::MAX_BYTES);
    VarInt(id).proto_encode(&mut id_buf);
    let mut out = BytesMut::with_capacity(VarInt::MAX_BYTES + id_buf.len() + body.len());
    VarInt((id_buf.len() + body.len()) as i32).proto_encode(&mut out);
    out.extend_from_slice(&id_buf);
    out.extend_from_slice(body);
    out
}
