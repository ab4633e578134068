//! Status handling across the three dialect generations.

use super::*;

use mcje_proto::packets::{
    LegacyStatusResponse, Ping, Pong, StatusResponse, StatusResponsePlayer,
    VeryLegacyStatusResponse,
};

use crate::handlers::StatusResponseV3;

/// Placeholder identity for hover-sample lines; they are display text, not
/// real profiles.
pub(super) const SAMPLE_PLAYER_UUID: &str = "65bd239f-89f2-4cc7-ae8b-bb625525904e";

/// Build the wire response from an application status reply. `protocol` is
/// what the version stanza echoes: the client's own version when it is
/// supported, 0 otherwise.
pub(super) fn build_status_response(reply: StatusResponseV3, protocol: i32) -> StatusResponse {
    StatusResponse {
        description: reply.description,
        favicon_png: reply.favicon_png,
        version_text: reply.version,
        version_protocol: protocol,
        max_players: reply.max_players,
        online_players: reply.online_players,
        player_sample: reply
            .player_sample
            .into_iter()
            .map(|name| StatusResponsePlayer {
                name,
                uuid: SAMPLE_PLAYER_UUID.into(),
            })
            .collect(),
    }
}

impl<R: AsyncRead + Unpin + Send> Driver<R> {
    pub(super) async fn process_status_request(&mut self) -> Result<(), ProtoError> {
        let Some(handler) = &self.handlers.on_status_request_v3 else {
            return Ok(());
        };
        let reply = guard(handler)?;
        if reply.prevent_response {
            return Ok(());
        }
        let protocol = if reply.is_client_supported {
            self.ctx.protocol.max(0)
        } else {
            0
        };
        let packet = build_status_response(reply, protocol);
        self.send(ClientboundPacket::StatusResponse(packet)).await
    }

    pub(super) async fn process_ping(&mut self, ping: Ping) -> Result<(), ProtoError> {
        self.send(ClientboundPacket::Pong(Pong {
            payload: ping.payload,
        }))
        .await
    }

    /// Pre-Netty ping. Terminal: reply (unless prevented), then close.
    pub(super) async fn process_legacy_status(&mut self) -> Result<(), ProtoError> {
        if let Some(handler) = &self.handlers.on_status_request_v2 {
            let reply = guard(handler)?;
            if !reply.prevent_response {
                // The classifier discards the legacy ping payload, so the
                // client's protocol number is unknown here.
                let protocol = if reply.is_client_supported {
                    self.ctx.protocol.max(0)
                } else {
                    0
                };
                self.send(ClientboundPacket::LegacyStatusResponse(
                    LegacyStatusResponse {
                        protocol,
                        version: reply.version,
                        description: reply.description,
                        max_players: reply.max_players,
                        online_players: reply.online_players,
                    },
                ))
                .await?;
            }
        }
        self.ctx.closed = true;
        Ok(())
    }

    /// Very-legacy ping. Terminal like the pre-Netty form; any bytes the
    /// client sends afterwards are ignored by closing.
    pub(super) async fn process_very_legacy_status(&mut self) -> Result<(), ProtoError> {
        if let Some(handler) = &self.handlers.on_status_request_v1 {
            let reply = guard(handler)?;
            if !reply.prevent_response {
                self.send(ClientboundPacket::VeryLegacyStatusResponse(
                    VeryLegacyStatusResponse {
                        description: reply.description,
                        max_players: reply.max_players,
                        online_players: reply.online_players,
                    },
                ))
                .await?;
            }
        }
        self.ctx.closed = true;
        Ok(())
    }
}
