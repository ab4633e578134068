//! KeepAlive — Server → Client, Play state.
//!
//! Heartbeat the client must echo; this core only sends it and does not
//! track liveness from the echo.

use bytes::{BufMut, BytesMut};

use crate::error::ProtoError;

/// KeepAlive packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub payload: i64,
}

impl KeepAlive {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        buf.put_i64(self.payload);
        Ok(())
    }
}
