//! The login-completion sequence: everything between an accepted
//! LoginStart and a client standing in the world.

use super::*;

use mcje_proto::chunk::{Section, SECTIONS_PER_COLUMN, SECTION_VOLUME};
use mcje_proto::packets::{
    ChunkData, CompassPosition, Dimension, Gamemode, JoinGame, LoginStart, LoginSuccess,
    PlayerPositionAndLook,
};
use mcje_proto::types::BlockPosition;

use crate::handlers::PlayerJoinRequest;

impl<R: AsyncRead + Unpin + Send> Driver<R> {
    pub(super) async fn process_login_start(&mut self, data: LoginStart) -> Result<(), ProtoError> {
        let Some(handler) = &self.handlers.on_player_join_request else {
            return Ok(());
        };

        let username = data.clientside_username;
        let reply = guard(|| {
            handler(PlayerJoinRequest {
                clientside_username: username.clone(),
            })
        })?;
        if reply.prevent_response {
            return Ok(());
        }

        self.send(ClientboundPacket::LoginSuccess(LoginSuccess {
            uuid: reply.uuid,
            username,
        }))
        .await?;

        self.ctx.state = ProtocolState::Play;
        self.publish_ctx();

        self.send(ClientboundPacket::JoinGame(JoinGame {
            entity_id: 0,
            gamemode: Gamemode::Creative,
            hardcore: false,
            dimension: Dimension::Overworld,
            view_distance: 1,
            reduced_debug_info: false,
            enable_respawn_screen: false,
        }))
        .await?;

        self.send(ClientboundPacket::CompassPosition(CompassPosition {
            location: BlockPosition::new(0, 64, 0),
        }))
        .await?;

        self.send(ClientboundPacket::PlayerPositionAndLook(
            PlayerPositionAndLook {
                x: 0.0,
                y: 64.0,
                z: 0.0,
                yaw: 0.0,
                pitch: 0.0,
            },
        ))
        .await?;

        let sections = spawn_sections();
        for x in -3..=3 {
            for z in -3..=3 {
                self.send(ClientboundPacket::ChunkData(ChunkData {
                    x,
                    z,
                    is_new: true,
                    sections: sections.clone(),
                }))
                .await?;
            }
        }

        if let Some(on_join) = &self.handlers.on_player_join {
            guard(on_join)?;
        }
        Ok(())
    }
}

/// The synthetic spawn terrain sent to every joining player: section 0
/// empty, a bedrock-floored stone band, solid stone, then dirt capped
/// with a grass layer.
fn spawn_sections() -> [Option<Section>; SECTIONS_PER_COLUMN] {
    let mut sections: [Option<Section>; SECTIONS_PER_COLUMN] = Default::default();
    sections[1] = Some(Section::from_fn(|i| if i < 256 { 33 } else { 1 }));
    sections[2] = Some(Section::filled(1));
    sections[3] = Some(Section::from_fn(|i| {
        if i >= SECTION_VOLUME - 256 {
            9
        } else {
            10
        }
    }));
    sections
}
