//! Application-facing event callbacks.
//!
//! Every callback is optional; a missing one suppresses the response the
//! same way an explicit `prevent_response` does.

use mcje_proto::types::Uuid;

/// Reply for the very-legacy (beta era) ping.
///
/// Plain text only: a `§` in the description would corrupt the legacy
/// field separators.
#[derive(Debug, Clone, Default)]
pub struct StatusResponseV1 {
    pub prevent_response: bool,
    pub description: String,
    pub max_players: i32,
    pub online_players: i32,
}

/// Reply for the pre-Netty (1.4–1.6) ping.
#[derive(Debug, Clone, Default)]
pub struct StatusResponseV2 {
    pub prevent_response: bool,
    pub is_client_supported: bool,
    pub version: String,
    pub description: String,
    pub max_players: i32,
    pub online_players: i32,
}

/// Reply for the modern server-list ping.
#[derive(Debug, Clone, Default)]
pub struct StatusResponseV3 {
    pub prevent_response: bool,
    pub is_client_supported: bool,
    pub version: String,
    pub description: String,
    /// Raw PNG bytes for the favicon, if any.
    pub favicon_png: Option<Vec<u8>>,
    pub max_players: i32,
    pub online_players: i32,
    /// Hover-text lines for the player sample.
    pub player_sample: Vec<String>,
}

/// A client asking to join, before any world state exists for it.
#[derive(Debug, Clone)]
pub struct PlayerJoinRequest {
    /// Whatever username the client claimed; unauthenticated.
    pub clientside_username: String,
}

/// Application verdict on a join request.
#[derive(Debug, Clone, Default)]
pub struct PlayerJoinResponse {
    pub prevent_response: bool,
    pub uuid: Uuid,
}

/// One normalised movement event; wire variants without position or look
/// leave those fields zeroed with the matching flag clear.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerMove {
    pub has_pos: bool,
    pub has_look: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

type StatusV1Fn = dyn Fn() -> StatusResponseV1 + Send + Sync;
type StatusV2Fn = dyn Fn() -> StatusResponseV2 + Send + Sync;
type StatusV3Fn = dyn Fn() -> StatusResponseV3 + Send + Sync;
type JoinRequestFn = dyn Fn(PlayerJoinRequest) -> PlayerJoinResponse + Send + Sync;
type JoinFn = dyn Fn() + Send + Sync;
type MoveFn = dyn Fn(PlayerMove) + Send + Sync;

/// The record of callbacks a connection upcalls into.
#[derive(Default)]
pub struct EventHandlers {
    pub on_status_request_v1: Option<Box<StatusV1Fn>>,
    pub on_status_request_v2: Option<Box<StatusV2Fn>>,
    pub on_status_request_v3: Option<Box<StatusV3Fn>>,
    pub on_player_join_request: Option<Box<JoinRequestFn>>,
    pub on_player_join: Option<Box<JoinFn>>,
    pub on_player_move: Option<Box<MoveFn>>,
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_status_request_v1", &self.on_status_request_v1.is_some())
            .field("on_status_request_v2", &self.on_status_request_v2.is_some())
            .field("on_status_request_v3", &self.on_status_request_v3.is_some())
            .field(
                "on_player_join_request",
                &self.on_player_join_request.is_some(),
            )
            .field("on_player_join", &self.on_player_join.is_some())
            .field("on_player_move", &self.on_player_move.is_some())
            .finish()
    }
}
