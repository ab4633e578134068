//! SpawnPlayer (0x05) — Server → Client, Play state.
//!
//! Announces another player entity. The 1.14 era carried inline entity
//! metadata; 1.15 moved it to a separate packet, so at 1.14 an empty
//! metadata list (just its terminator) is appended.

use bytes::{BufMut, BytesMut};

use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::registry::{era, Era};
use crate::types::{Uuid, VarInt};

/// SpawnPlayer packet. Yaw and pitch are wire angles
/// (`round(deg/360·255)` wrapped to a byte).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlayer {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: u8,
    pub pitch: u8,
}

impl SpawnPlayer {
    pub fn write_body(&self, version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        let era = era(version).ok_or(ProtoError::NoIdForVersion { protocol: version })?;
        VarInt(self.entity_id).proto_encode(buf);
        self.uuid.proto_encode(buf);
        buf.put_f64(self.x);
        buf.put_f64(self.y);
        buf.put_f64(self.z);
        buf.put_u8(self.yaw);
        buf.put_u8(self.pitch);
        if era == Era::V1_14 {
            buf.put_u8(0xFF); // empty metadata list terminator
        }
        Ok(())
    }
}
