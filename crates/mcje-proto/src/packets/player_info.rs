//! PlayerInfo — Server → Client, Play state.
//!
//! Only the Add Player action is modelled; the tab list never shrinks in
//! this core.

use bytes::{BufMut, BytesMut};

use crate::codec::{write_string, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{Uuid, VarInt};

/// One tab-list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub uuid: Uuid,
    pub username: String,
    /// Latency in milliseconds, as shown by the connection bars.
    pub ping: i32,
}

/// PlayerInfo packet with the Add Player action.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfoAdd {
    pub players: Vec<PlayerInfo>,
}

impl PlayerInfoAdd {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        VarInt(0).proto_encode(buf); // action: add player
        VarInt(self.players.len() as i32).proto_encode(buf);
        for player in &self.players {
            player.uuid.proto_encode(buf);
            write_string(buf, &player.username);
            VarInt(0).proto_encode(buf); // no profile properties
            VarInt(0).proto_encode(buf); // gamemode, not tracked here
            VarInt(player.ping).proto_encode(buf);
            buf.put_u8(0); // no display name
        }
        Ok(())
    }
}
