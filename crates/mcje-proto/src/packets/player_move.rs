//! Serverbound movement packets (Play state, 0x11–0x13).
//!
//! Three wire variants cover the position/look combinations; the
//! connection layer folds them into one normalised move event.

use bytes::Buf;

use crate::codec::{require, ProtoDecode};
use crate::error::ProtoError;

/// Player Position (0x11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPosSb {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

impl ProtoDecode for PlayerPosSb {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 25)?;
        Ok(Self {
            x: buf.get_f64(),
            y: buf.get_f64(),
            z: buf.get_f64(),
            on_ground: buf.get_u8() != 0,
        })
    }
}

/// Player Position And Rotation (0x12).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPosAndLookSb {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoDecode for PlayerPosAndLookSb {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 33)?;
        Ok(Self {
            x: buf.get_f64(),
            y: buf.get_f64(),
            z: buf.get_f64(),
            yaw: buf.get_f32(),
            pitch: buf.get_f32(),
            on_ground: buf.get_u8() != 0,
        })
    }
}

/// Player Rotation (0x13).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerLookSb {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoDecode for PlayerLookSb {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 9)?;
        Ok(Self {
            yaw: buf.get_f32(),
            pitch: buf.get_f32(),
            on_ground: buf.get_u8() != 0,
        })
    }
}
