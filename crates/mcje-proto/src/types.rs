//! Base wire types used throughout the Java Edition protocol.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::codec::{require, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// VarInt (i32 — group-of-7 LEB128, two's complement, no ZigZag)
// ---------------------------------------------------------------------------

/// Variable-length i32. The raw bit pattern is encoded 7 bits at a time,
/// least-significant group first, so negative values always occupy the
/// full 5 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarInt(pub i32);

impl VarInt {
    /// Maximum bytes a VarInt can occupy.
    pub const MAX_BYTES: usize = 5;

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut value = self.0 as u32;
        let mut len = 1;
        while value & !0x7F != 0 {
            value >>= 7;
            len += 1;
        }
        len
    }
}

impl ProtoEncode for VarInt {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let mut value = self.0 as u32;
        loop {
            if value & !0x7F == 0 {
                buf.put_u8(value as u8);
                return;
            }
            buf.put_u8((value & 0x7F | 0x80) as u8);
            value >>= 7;
        }
    }
}

impl ProtoDecode for VarInt {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut result: u32 = 0;
        for i in 0..Self::MAX_BYTES {
            if !buf.has_remaining() {
                return Err(ProtoError::BufferTooShort {
                    needed: 1,
                    remaining: 0,
                });
            }
            let byte = buf.get_u8();
            result |= ((byte & 0x7F) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(VarInt(result as i32));
            }
        }
        Err(ProtoError::VarIntTooLong {
            max_bytes: Self::MAX_BYTES,
        })
    }
}

impl From<i32> for VarInt {
    fn from(v: i32) -> Self {
        VarInt(v)
    }
}

impl From<VarInt> for i32 {
    fn from(v: VarInt) -> Self {
        v.0
    }
}

impl fmt::Debug for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarInt({})", self.0)
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// VarLong (i64 — same scheme, 10-byte cap)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarLong(pub i64);

impl VarLong {
    /// Maximum bytes a VarLong can occupy.
    pub const MAX_BYTES: usize = 10;
}

impl ProtoEncode for VarLong {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        let mut value = self.0 as u64;
        loop {
            if value & !0x7F == 0 {
                buf.put_u8(value as u8);
                return;
            }
            buf.put_u8((value & 0x7F | 0x80) as u8);
            value >>= 7;
        }
    }
}

impl ProtoDecode for VarLong {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut result: u64 = 0;
        for i in 0..Self::MAX_BYTES {
            if !buf.has_remaining() {
                return Err(ProtoError::BufferTooShort {
                    needed: 1,
                    remaining: 0,
                });
            }
            let byte = buf.get_u8();
            result |= ((byte & 0x7F) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(VarLong(result as i64));
            }
        }
        Err(ProtoError::VarIntTooLong {
            max_bytes: Self::MAX_BYTES,
        })
    }
}

impl From<i64> for VarLong {
    fn from(v: i64) -> Self {
        VarLong(v)
    }
}

impl From<VarLong> for i64 {
    fn from(v: VarLong) -> Self {
        v.0
    }
}

impl fmt::Debug for VarLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarLong({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Uuid (two big-endian u64, most significant first)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl Uuid {
    pub const ZERO: Self = Self {
        most_significant: 0,
        least_significant: 0,
    };

    pub fn new(most: u64, least: u64) -> Self {
        Self {
            most_significant: most,
            least_significant: least,
        }
    }
}

impl ProtoEncode for Uuid {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.most_significant);
        buf.put_u64(self.least_significant);
    }
}

impl ProtoDecode for Uuid {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 16)?;
        Ok(Self {
            most_significant: buf.get_u64(),
            least_significant: buf.get_u64(),
        })
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.most_significant;
        let l = self.least_significant;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            m >> 32,
            (m >> 16) & 0xFFFF,
            m & 0xFFFF,
            l >> 48,
            l & 0xFFFF_FFFF_FFFF,
        )
    }
}

// ---------------------------------------------------------------------------
// BlockPosition (26/26/12-bit packed u64)
// ---------------------------------------------------------------------------

/// A block coordinate packed into one u64: X in bits 63..38, Z in bits
/// 37..12, Y in bits 11..0, each two's complement within its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

const XZ_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const XZ_MASK: u64 = (1 << XZ_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Pack into the wire u64. Components outside their bit widths are an
    /// encoding error.
    pub fn pack(&self) -> Result<u64, ProtoError> {
        check_width(self.x, XZ_BITS, 'x')?;
        check_width(self.z, XZ_BITS, 'z')?;
        check_width(self.y, Y_BITS, 'y')?;
        Ok(((self.x as u64 & XZ_MASK) << 38) | ((self.z as u64 & XZ_MASK) << 12)
            | (self.y as u64 & Y_MASK))
    }

    /// Unpack from the wire u64, sign-extending each field.
    pub fn unpack(raw: u64) -> Self {
        Self {
            x: sign_extend(raw >> 38, XZ_BITS),
            z: sign_extend((raw >> 12) & XZ_MASK, XZ_BITS),
            y: sign_extend(raw & Y_MASK, Y_BITS),
        }
    }

    /// Encode onto a buffer; fails on out-of-range components.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<(), ProtoError> {
        buf.put_u64(self.pack()?);
        Ok(())
    }
}

impl ProtoDecode for BlockPosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 8)?;
        Ok(Self::unpack(buf.get_u64()))
    }
}

fn check_width(value: i32, bits: u32, axis: char) -> Result<(), ProtoError> {
    let min = -(1i32 << (bits - 1));
    let max = (1i32 << (bits - 1)) - 1;
    if value < min || value > max {
        return Err(ProtoError::PositionOutOfRange { axis, value });
    }
    Ok(())
}

fn sign_extend(raw: u64, bits: u32) -> i32 {
    let shift = 64 - bits;
    (((raw << shift) as i64) >> shift) as i32
}

// ===========================================================================
// Tests
// ===========================================================================
