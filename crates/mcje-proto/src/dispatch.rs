//! Stateful packet dispatch: map (state, protocol version, packet id) to a
//! typed variant on the way in, and (variant, version) to a framed buffer
//! on the way out.

use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::frame::{
    classify_legacy, read_frame, read_frame_body, resume_varint, write_frame, LegacyDialect,
    ProtocolConfig, LEGACY_PING_BYTE,
};
use crate::packets::*;
use crate::registry::{
    clientbound_packet_id, serverbound_packet_kind, ServerboundId, PROTOCOL_PRE_NETTY,
    PROTOCOL_VERY_LEGACY,
};
use crate::types::VarInt;
use crate::{ClientContext, ProtocolState};

/// Parse one serverbound packet from the stream.
///
/// In the Handshaking state the first byte discriminates the framing
/// dialect: `0xFE` enters the legacy path and yields a synthetic
/// [`ProtocolDetermined`]; the classified legacy request itself is
/// delivered on the next call, once the caller has advanced the state.
pub async fn parse_serverbound<R: AsyncRead + Unpin>(
    reader: &mut R,
    ctx: &mut ClientContext,
    config: &ProtocolConfig,
    legacy_probe: Duration,
) -> Result<ServerboundPacket, ProtoError> {
    if ctx.state == ProtocolState::Status {
        match ctx.protocol {
            PROTOCOL_VERY_LEGACY => {
                return Ok(ServerboundPacket::VeryLegacyStatusRequest(
                    VeryLegacyStatusRequest,
                ))
            }
            PROTOCOL_PRE_NETTY => {
                return Ok(ServerboundPacket::LegacyStatusRequest(LegacyStatusRequest))
            }
            _ => {}
        }
    }

    let scoped = if ctx.state == ProtocolState::Handshaking {
        let first = reader.read_u8().await?;
        if first == LEGACY_PING_BYTE {
            ctx.protocol = match classify_legacy(reader, legacy_probe).await? {
                LegacyDialect::VeryLegacy => PROTOCOL_VERY_LEGACY,
                LegacyDialect::PreNetty => PROTOCOL_PRE_NETTY,
            };
            return Ok(ServerboundPacket::ProtocolDetermined(ProtocolDetermined {
                next_state: ProtocolState::Status,
            }));
        }
        let len = resume_varint(first, reader).await?;
        read_frame_body(reader, len, config).await?
    } else {
        read_frame(reader, config).await?
    };

    decode_frame(scoped, ctx, config)
}

/// Decode a length-scoped frame (id plus body) against the context.
pub fn decode_frame(
    mut scoped: Bytes,
    ctx: &ClientContext,
    config: &ProtocolConfig,
) -> Result<ServerboundPacket, ProtoError> {
    let id = VarInt::proto_decode(&mut scoped)?.0;
    let kind = serverbound_packet_kind(ctx.state, ctx.protocol, id).ok_or(
        ProtoError::UnknownPacketId {
            state: ctx.state,
            id,
            protocol: ctx.protocol,
        },
    )?;

    let buf = &mut scoped;
    let max_string = config.max_string_utf16;
    let packet = match kind {
        ServerboundId::Handshake => {
            ServerboundPacket::Handshake(Handshake::decode(buf, max_string)?)
        }
        ServerboundId::StatusRequest => ServerboundPacket::StatusRequest(StatusRequest),
        ServerboundId::Ping => ServerboundPacket::Ping(Ping::proto_decode(buf)?),
        ServerboundId::LoginStart => {
            ServerboundPacket::LoginStart(LoginStart::decode(buf, max_string)?)
        }
        ServerboundId::PlayerPos => ServerboundPacket::PlayerPos(PlayerPosSb::proto_decode(buf)?),
        ServerboundId::PlayerPosAndLook => {
            ServerboundPacket::PlayerPosAndLook(PlayerPosAndLookSb::proto_decode(buf)?)
        }
        ServerboundId::PlayerLook => {
            ServerboundPacket::PlayerLook(PlayerLookSb::proto_decode(buf)?)
        }
    };

    if scoped.has_remaining() {
        return Err(ProtoError::TrailingBytes {
            count: scoped.remaining(),
        });
    }
    Ok(packet)
}

/// Serialise and frame a clientbound packet for the context's state and
/// version. Emitting a packet in the wrong state is a programmer error:
/// it panics in debug builds and surfaces as an internal error otherwise.
pub fn emit_clientbound(
    packet: &ClientboundPacket,
    ctx: &ClientContext,
) -> Result<BytesMut, ProtoError> {
    if packet.state() != ctx.state {
        debug_assert!(
            false,
            "emitting {:?} while the connection is in {:?}",
            packet.kind(),
            ctx.state
        );
        return Err(ProtoError::WrongState { state: ctx.state });
    }

    // The legacy kick responses are raw, unframed bytes.
    match packet {
        ClientboundPacket::VeryLegacyStatusResponse(p) => return Ok(p.encode_raw()),
        ClientboundPacket::LegacyStatusResponse(p) => return Ok(p.encode_raw()),
        _ => {}
    }

    let id = clientbound_packet_id(packet.kind(), ctx.protocol).ok_or(
        ProtoError::NoIdForVersion {
            protocol: ctx.protocol,
        },
    )?;
    let mut body = BytesMut::new();
    packet.write_body(ctx.protocol, &mut body)?;
    Ok(write_frame(id, &body))
}

/// Convenience used by tests and the connection layer: the context a
/// modern client reaches after a Handshake.
pub fn context_at(state: ProtocolState, protocol: i32) -> ClientContext {
    ClientContext {
        state,
        protocol,
        closed: false,
    }
}
