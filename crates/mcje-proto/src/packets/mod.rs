//! Packet definitions for the Java Edition protocol core.
//!
//! The core is asymmetric: serverbound packets implement body decoding,
//! clientbound packets implement body encoding.

pub mod chunk_data;
pub mod entity_motion;
pub mod handshake;
pub mod join_game;
pub mod keep_alive;
pub mod legacy;
pub mod login;
pub mod player_info;
pub mod player_move;
pub mod position;
pub mod spawn_player;
pub mod status;

pub use chunk_data::ChunkData;
pub use entity_motion::{EntityTranslate, EntityVelocity};
pub use handshake::{Handshake, ProtocolDetermined};
pub use join_game::{Dimension, Gamemode, JoinGame};
pub use keep_alive::KeepAlive;
pub use legacy::{
    LegacyStatusRequest, LegacyStatusResponse, VeryLegacyStatusRequest, VeryLegacyStatusResponse,
};
pub use login::{LoginStart, LoginSuccess};
pub use player_info::{PlayerInfo, PlayerInfoAdd};
pub use player_move::{PlayerLookSb, PlayerPosAndLookSb, PlayerPosSb};
pub use position::{CompassPosition, PlayerPositionAndLook};
pub use spawn_player::SpawnPlayer;
pub use status::{Ping, Pong, StatusRequest, StatusResponse, StatusResponsePlayer};

use bytes::BytesMut;

use crate::error::ProtoError;
use crate::registry::{clientbound_state, ClientboundId};
use crate::ProtocolState;

/// Every packet the dispatcher can hand to a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerboundPacket {
    /// Synthetic: the frame codec classified a legacy dialect.
    ProtocolDetermined(ProtocolDetermined),
    Handshake(Handshake),
    StatusRequest(StatusRequest),
    Ping(Ping),
    LoginStart(LoginStart),
    PlayerPos(PlayerPosSb),
    PlayerPosAndLook(PlayerPosAndLookSb),
    PlayerLook(PlayerLookSb),
    LegacyStatusRequest(LegacyStatusRequest),
    VeryLegacyStatusRequest(VeryLegacyStatusRequest),
}

/// Every packet the dispatcher can emit. The variant alone determines the
/// state it belongs to and, with the protocol version, its wire id.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientboundPacket {
    StatusResponse(StatusResponse),
    Pong(Pong),
    LoginSuccess(LoginSuccess),
    JoinGame(JoinGame),
    CompassPosition(CompassPosition),
    PlayerPositionAndLook(PlayerPositionAndLook),
    ChunkData(ChunkData),
    KeepAlive(KeepAlive),
    SpawnPlayer(SpawnPlayer),
    PlayerInfoAdd(PlayerInfoAdd),
    EntityTranslate(EntityTranslate),
    EntityVelocity(EntityVelocity),
    VeryLegacyStatusResponse(VeryLegacyStatusResponse),
    LegacyStatusResponse(LegacyStatusResponse),
}

impl ClientboundPacket {
    pub fn kind(&self) -> ClientboundId {
        match self {
            Self::StatusResponse(_) => ClientboundId::StatusResponse,
            Self::Pong(_) => ClientboundId::Pong,
            Self::LoginSuccess(_) => ClientboundId::LoginSuccess,
            Self::JoinGame(_) => ClientboundId::JoinGame,
            Self::CompassPosition(_) => ClientboundId::CompassPosition,
            Self::PlayerPositionAndLook(_) => ClientboundId::PlayerPositionAndLook,
            Self::ChunkData(_) => ClientboundId::ChunkData,
            Self::KeepAlive(_) => ClientboundId::KeepAlive,
            Self::SpawnPlayer(_) => ClientboundId::SpawnPlayer,
            Self::PlayerInfoAdd(_) => ClientboundId::PlayerInfoAdd,
            Self::EntityTranslate(_) => ClientboundId::EntityTranslate,
            Self::EntityVelocity(_) => ClientboundId::EntityVelocity,
            Self::VeryLegacyStatusResponse(_) => ClientboundId::VeryLegacyStatusResponse,
            Self::LegacyStatusResponse(_) => ClientboundId::LegacyStatusResponse,
        }
    }

    /// The state this packet may be emitted in.
    pub fn state(&self) -> ProtocolState {
        clientbound_state(self.kind())
    }

    /// Encode the body (without id or framing) for the given version.
    pub fn write_body(&self, version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        match self {
            Self::StatusResponse(p) => p.write_body(version, buf),
            Self::Pong(p) => p.write_body(version, buf),
            Self::LoginSuccess(p) => p.write_body(version, buf),
            Self::JoinGame(p) => p.write_body(version, buf),
            Self::CompassPosition(p) => p.write_body(version, buf),
            Self::PlayerPositionAndLook(p) => p.write_body(version, buf),
            Self::ChunkData(p) => p.write_body(version, buf),
            Self::KeepAlive(p) => p.write_body(version, buf),
            Self::SpawnPlayer(p) => p.write_body(version, buf),
            Self::PlayerInfoAdd(p) => p.write_body(version, buf),
            Self::EntityTranslate(p) => p.write_body(version, buf),
            Self::EntityVelocity(p) => p.write_body(version, buf),
            Self::VeryLegacyStatusResponse(_) | Self::LegacyStatusResponse(_) => {
                // Legacy responses bypass modern framing entirely.
                debug_assert!(false, "legacy responses have no framed body");
                Err(ProtoError::WrongState {
                    state: ProtocolState::Status,
                })
            }
        }
    }
}
