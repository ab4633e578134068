//! ChunkData — Server → Client, Play state.
//!
//! A full chunk column: up to 16 vertical sections, present sections
//! flagged in the primary bit mask. The 1.15 era moved biomes out of the
//! data region into a fixed 1024-entry block after the heightmaps.

use bytes::{BufMut, BytesMut};

use crate::chunk::{Section, SECTIONS_PER_COLUMN};
use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::registry::{era, Era};
use crate::types::VarInt;

/// Plains, the only biome this core ever reports.
const BIOME_PLAINS: i32 = 1;

/// TAG_Compound with an empty name and no entries; nothing in scope reads
/// heightmaps.
const EMPTY_NBT_COMPOUND: [u8; 4] = [0x0A, 0x00, 0x00, 0x00];

/// ChunkData packet.
#[derive(Clone, PartialEq)]
pub struct ChunkData {
    pub x: i32,
    pub z: i32,
    /// True for a full (new) chunk; biomes are only present then.
    pub is_new: bool,
    pub sections: [Option<Section>; SECTIONS_PER_COLUMN],
}

impl std::fmt::Debug for ChunkData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkData")
            .field("x", &self.x)
            .field("z", &self.z)
            .field("is_new", &self.is_new)
            .field(
                "sections",
                &self
                    .sections
                    .iter()
                    .map(|s| s.is_some())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ChunkData {
    /// Bit mask of present sections, lowest section in bit 0.
    pub fn primary_bit_mask(&self) -> i32 {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    pub fn write_body(&self, version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        let era = era(version).ok_or(ProtoError::NoIdForVersion { protocol: version })?;

        buf.put_i32(self.x);
        buf.put_i32(self.z);
        buf.put_u8(self.is_new as u8);
        VarInt(self.primary_bit_mask()).proto_encode(buf);
        buf.put_slice(&EMPTY_NBT_COMPOUND);

        if era == Era::V1_15 && self.is_new {
            for _ in 0..1024 {
                buf.put_i32(BIOME_PLAINS);
            }
        }

        let mut data = BytesMut::new();
        for section in self.sections.iter().flatten() {
            section.serialize(&mut data);
        }
        if era == Era::V1_14 && self.is_new {
            for _ in 0..256 {
                data.put_i32(BIOME_PLAINS);
            }
        }

        VarInt(data.len() as i32).proto_encode(buf);
        buf.put_slice(&data);
        VarInt(0).proto_encode(buf); // block entities
        Ok(())
    }
}
