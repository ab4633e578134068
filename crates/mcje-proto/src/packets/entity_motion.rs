//! Entity movement packets: EntityTranslate (Entity Position And Rotation
//! on the wire) and EntityVelocity — Server → Client, Play state.
//!
//! Both carry fixed-point i16 fields; the conversions from block units
//! live with the connection layer's output operations.

use bytes::{BufMut, BytesMut};

use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::types::VarInt;

/// EntityTranslate packet: a relative move of up to ±8 blocks, deltas in
/// 1/4096 block steps, angles in 1/256 turn steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityTranslate {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl EntityTranslate {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i16(self.delta_x);
        buf.put_i16(self.delta_y);
        buf.put_i16(self.delta_z);
        buf.put_u8(self.yaw);
        buf.put_u8(self.pitch);
        buf.put_u8(self.on_ground as u8);
        Ok(())
    }
}

/// EntityVelocity packet: velocity in 1/400 block-per-tick steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityVelocity {
    pub entity_id: i32,
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl EntityVelocity {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        VarInt(self.entity_id).proto_encode(buf);
        buf.put_i16(self.x);
        buf.put_i16(self.y);
        buf.put_i16(self.z);
        Ok(())
    }
}
