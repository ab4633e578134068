//! Handshake (0x00) — Client → Server, Handshaking state.
//!
//! The first modern-framing packet on every connection: announces the
//! client's protocol version and which state it wants next.

use bytes::Buf;

use crate::codec::{read_string_bounded, require, ProtoDecode};
use crate::error::ProtoError;
use crate::types::VarInt;
use crate::ProtocolState;

/// Handshake packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    /// Post-Netty protocol version.
    pub protocol: i32,
    /// Hostname the client used to connect (unverified).
    pub server_addr: String,
    pub server_port: u16,
    /// 1 = Status, 2 = Login; anything else is malformed.
    pub next_state: ProtocolState,
}

impl Handshake {
    pub fn decode(buf: &mut impl Buf, max_string_utf16: usize) -> Result<Self, ProtoError> {
        let protocol = VarInt::proto_decode(buf)?.0;
        let server_addr = read_string_bounded(buf, max_string_utf16)?;
        require(buf, 2)?;
        let server_port = buf.get_u16();
        let next_state = match VarInt::proto_decode(buf)?.0 {
            1 => ProtocolState::Status,
            2 => ProtocolState::Login,
            other => {
                return Err(ProtoError::InvalidData(format!(
                    "handshake next_state {other} is not status or login"
                )))
            }
        };
        Ok(Self {
            protocol,
            server_addr,
            server_port,
            next_state,
        })
    }
}

/// Synthetic packet produced by the frame codec once it has classified a
/// legacy dialect from the first bytes; never appears on the wire itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolDetermined {
    pub next_state: ProtocolState,
}
