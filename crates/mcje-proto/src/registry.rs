//! Packet-id tables: a pure mapping between wire ids and typed variants,
//! keyed by connection state, direction and protocol era.

use crate::ProtocolState;

/// Context protocol value before any Handshake has been seen.
pub const PROTOCOL_UNKNOWN: i32 = -1;

/// Sentinel for a stream classified as the pre-Netty (1.4–1.6) dialect.
pub const PROTOCOL_PRE_NETTY: i32 = -2;

/// Sentinel for a stream classified as the very first (beta era) dialect.
pub const PROTOCOL_VERY_LEGACY: i32 = -3;

/// A closed-below, optionally open-above protocol version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub min: i32,
    pub max: Option<i32>,
}

impl VersionRange {
    pub const fn closed(min: i32, max: i32) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn from(min: i32) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, version: i32) -> bool {
        version >= self.min && self.max.is_none_or(|max| version <= max)
    }
}

/// 1.14 through 1.14.4.
pub const ERA_V1_14: VersionRange = VersionRange::closed(477, 498);

/// 1.15 and later.
pub const ERA_V1_15: VersionRange = VersionRange::from(550);

/// The packet-id numbering eras this core can speak in the Play state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    V1_14,
    V1_15,
}

/// Map a post-Netty protocol version to its id-numbering era.
pub fn era(version: i32) -> Option<Era> {
    if ERA_V1_14.contains(version) {
        Some(Era::V1_14)
    } else if ERA_V1_15.contains(version) {
        Some(Era::V1_15)
    } else {
        None
    }
}

/// Selector for each serverbound variant the dispatcher can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerboundId {
    Handshake,
    StatusRequest,
    Ping,
    LoginStart,
    PlayerPos,
    PlayerPosAndLook,
    PlayerLook,
}

/// Selector for each clientbound variant the dispatcher can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientboundId {
    StatusResponse,
    Pong,
    LoginSuccess,
    JoinGame,
    CompassPosition,
    PlayerPositionAndLook,
    ChunkData,
    KeepAlive,
    SpawnPlayer,
    PlayerInfoAdd,
    EntityTranslate,
    EntityVelocity,
    VeryLegacyStatusResponse,
    LegacyStatusResponse,
}

/// The state a clientbound variant belongs to.
pub fn clientbound_state(kind: ClientboundId) -> ProtocolState {
    use ClientboundId::*;
    match kind {
        StatusResponse | Pong | VeryLegacyStatusResponse | LegacyStatusResponse => {
            ProtocolState::Status
        }
        LoginSuccess => ProtocolState::Login,
        JoinGame | CompassPosition | PlayerPositionAndLook | ChunkData | KeepAlive
        | SpawnPlayer | PlayerInfoAdd | EntityTranslate | EntityVelocity => ProtocolState::Play,
    }
}

/// Wire id for a clientbound variant under the given protocol version, or
/// `None` when the version's table has no row for it. Legacy responses
/// bypass modern framing and have no id here.
pub fn clientbound_packet_id(kind: ClientboundId, version: i32) -> Option<i32> {
    use ClientboundId::*;
    match kind {
        StatusResponse => Some(0x00),
        Pong => Some(0x01),
        LoginSuccess => Some(0x02),
        VeryLegacyStatusResponse | LegacyStatusResponse => None,
        _ => {
            let era = era(version)?;
            Some(match (kind, era) {
                (SpawnPlayer, _) => 0x05,
                (KeepAlive, Era::V1_14) => 0x20,
                (KeepAlive, Era::V1_15) => 0x21,
                (ChunkData, Era::V1_14) => 0x21,
                (ChunkData, Era::V1_15) => 0x22,
                (JoinGame, Era::V1_14) => 0x25,
                (JoinGame, Era::V1_15) => 0x26,
                (EntityTranslate, Era::V1_14) => 0x29,
                (EntityTranslate, Era::V1_15) => 0x2A,
                (PlayerInfoAdd, Era::V1_14) => 0x33,
                (PlayerInfoAdd, Era::V1_15) => 0x34,
                (PlayerPositionAndLook, Era::V1_14) => 0x35,
                (PlayerPositionAndLook, Era::V1_15) => 0x36,
                (EntityVelocity, Era::V1_14) => 0x45,
                (EntityVelocity, Era::V1_15) => 0x46,
                (CompassPosition, Era::V1_14) => 0x4D,
                (CompassPosition, Era::V1_15) => 0x4E,
                _ => unreachable!("status and login ids are version-independent"),
            })
        }
    }
}

/// Serverbound variant for (state, version, wire id), or `None` when the
/// table has no row; the caller treats that as an unsupported payload.
pub fn serverbound_packet_kind(
    state: ProtocolState,
    version: i32,
    id: i32,
) -> Option<ServerboundId> {
    use ServerboundId::*;
    match (state, id) {
        (ProtocolState::Handshaking, 0x00) => Some(Handshake),
        (ProtocolState::Status, 0x00) => Some(StatusRequest),
        (ProtocolState::Status, 0x01) => Some(Ping),
        (ProtocolState::Login, 0x00) => Some(LoginStart),
        (ProtocolState::Play, 0x11) if era(version).is_some() => Some(PlayerPos),
        (ProtocolState::Play, 0x12) if era(version).is_some() => Some(PlayerPosAndLook),
        (ProtocolState::Play, 0x13) if era(version).is_some() => Some(PlayerLook),
        _ => None,
    }
}
