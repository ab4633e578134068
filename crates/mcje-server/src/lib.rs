//! Server-side connection layer for the Java Edition protocol core.
//!
//! The library consumes a bidirectional byte stream plus a close callback;
//! accepting TCP connections and everything above the per-connection
//! events (player registries, world state) belongs to the application.

pub mod config;
pub mod connection;
pub mod handlers;

pub use config::ConnectionConfig;
pub use connection::{
    Connection, EntityTranslation, EntityVelocityUpdate, PlayerInfoToAdd, PlayerToSpawn,
};
pub use handlers::{
    EventHandlers, PlayerJoinRequest, PlayerJoinResponse, PlayerMove, StatusResponseV1,
    StatusResponseV2, StatusResponseV3,
};
