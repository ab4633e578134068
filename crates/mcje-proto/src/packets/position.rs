//! Clientbound position packets: CompassPosition (the world spawn the
//! client's compass points at) and PlayerPositionAndLook.

use bytes::{BufMut, BytesMut};

use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::types::{BlockPosition, VarInt};

/// CompassPosition packet (Spawn Position on the wire).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassPosition {
    pub location: BlockPosition,
}

impl CompassPosition {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        self.location.encode(buf)
    }
}

/// PlayerPositionAndLook packet. Always emitted as an absolute teleport;
/// the trailing relative-flags byte and teleport id stay zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPositionAndLook {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerPositionAndLook {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        buf.put_f64(self.x);
        buf.put_f64(self.y);
        buf.put_f64(self.z);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        buf.put_u8(0);
        VarInt(0).proto_encode(buf);
        Ok(())
    }
}
