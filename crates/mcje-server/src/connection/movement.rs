//! Folds the three serverbound movement variants into one normalised
//! event for the application.

use super::*;

use mcje_proto::packets::{PlayerLookSb, PlayerPosAndLookSb, PlayerPosSb};

use crate::handlers::PlayerMove;

impl<R: AsyncRead + Unpin + Send> Driver<R> {
    pub(super) fn process_move_pos(&mut self, data: PlayerPosSb) -> Result<(), ProtoError> {
        eprintln!("DEBUG process_move_pos called");
        self.deliver_move(PlayerMove {
            has_pos: true,
            x: data.x,
            y: data.y,
            z: data.z,
            on_ground: data.on_ground,
            ..Default::default()
        })
    }

    pub(super) fn process_move_look(&mut self, data: PlayerLookSb) -> Result<(), ProtoError> {
        self.deliver_move(PlayerMove {
            has_look: true,
            yaw: data.yaw,
            pitch: data.pitch,
            on_ground: data.on_ground,
            ..Default::default()
        })
    }

    pub(super) fn process_move_all(&mut self, data: PlayerPosAndLookSb) -> Result<(), ProtoError> {
        self.deliver_move(PlayerMove {
            has_pos: true,
            has_look: true,
            x: data.x,
            y: data.y,
            z: data.z,
            yaw: data.yaw,
            pitch: data.pitch,
            on_ground: data.on_ground,
        })
    }

    fn deliver_move(&mut self, event: PlayerMove) -> Result<(), ProtoError> {
        let Some(handler) = &self.handlers.on_player_move else {
            return Ok(());
        };
        guard(|| handler(event))
    }
}
