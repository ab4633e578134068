//! JoinGame — Server → Client, Play state.
//!
//! First Play-state packet after LoginSuccess. The 1.15 era inserted the
//! hashed world seed and the respawn-screen toggle into the 1.14 layout.

use bytes::{BufMut, BytesMut};

use crate::codec::{write_string, ProtoEncode};
use crate::error::ProtoError;
use crate::registry::{era, Era};
use crate::types::VarInt;

/// Player gamemode, as sent in JoinGame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Gamemode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

/// World dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Dimension {
    Nether = -1,
    Overworld = 0,
    End = 1,
}

/// JoinGame packet.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinGame {
    pub entity_id: i32,
    pub gamemode: Gamemode,
    pub hardcore: bool,
    pub dimension: Dimension,
    pub view_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
}

impl JoinGame {
    pub fn write_body(&self, version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        let era = era(version).ok_or(ProtoError::NoIdForVersion { protocol: version })?;
        buf.put_i32(self.entity_id);
        let mut gamemode = self.gamemode as u8;
        if self.hardcore {
            gamemode |= 0x8;
        }
        buf.put_u8(gamemode);
        buf.put_i32(self.dimension as i32);
        if era == Era::V1_15 {
            buf.put_i64(0); // hashed seed, unused without world generation
        }
        buf.put_u8(0); // max players, ignored by modern clients
        write_string(buf, "default");
        VarInt(self.view_distance).proto_encode(buf);
        buf.put_u8(self.reduced_debug_info as u8);
        if era == Era::V1_15 {
            buf.put_u8(self.enable_respawn_screen as u8);
        }
        Ok(())
    }
}
