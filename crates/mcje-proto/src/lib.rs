//! Minecraft Java Edition protocol types and packet definitions.

pub mod chunk;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod packets;
pub mod registry;
pub mod types;

/// Connection-scoped phase controlling which packet-id table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    Handshaking,
    Status,
    Login,
    Play,
}

/// Direction of a packet on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Serverbound,
    Clientbound,
}

/// Per-connection mutable record shared by the frame codec and dispatcher.
///
/// Created in Handshaking with an unknown protocol; `state` advances only
/// via protocol events (Handshake next-state, login completion) along
/// Handshaking → Status or Handshaking → Login → Play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientContext {
    pub state: ProtocolState,
    /// Post-Netty protocol number from the Handshake, or one of the
    /// sentinels in [`registry`] before/instead of one.
    pub protocol: i32,
    pub closed: bool,
}

impl ClientContext {
    pub const INITIAL: Self = Self {
        state: ProtocolState::Handshaking,
        protocol: registry::PROTOCOL_UNKNOWN,
        closed: false,
    };
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::INITIAL
    }
}
