//! Pre-Netty status packets.
//!
//! Both legacy dialects answer with a `0xFF` kick packet carrying a
//! UTF-16BE string; neither uses modern framing. The request side is
//! classified by the frame codec, so the request types here are markers.

use bytes::{BufMut, BytesMut};

/// Bare `0xFE` ping from a beta-era client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VeryLegacyStatusRequest;

/// `0xFE 0x01` ping from a 1.4–1.6 client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyStatusRequest;

/// Reply to the beta-era ping: description, online and max joined by `§`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VeryLegacyStatusResponse {
    /// Plain text only; a `§` here would corrupt the field separators.
    pub description: String,
    pub max_players: i32,
    pub online_players: i32,
}

impl VeryLegacyStatusResponse {
    pub fn encode_raw(&self) -> BytesMut {
        let text = format!(
            "{}§{}§{}",
            self.description, self.online_players, self.max_players
        );
        encode_kick(&text)
    }
}

/// Reply to the 1.4–1.6 ping: `§1`-prefixed, NUL-separated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyStatusResponse {
    pub protocol: i32,
    pub version: String,
    pub description: String,
    pub max_players: i32,
    pub online_players: i32,
}

impl LegacyStatusResponse {
    pub fn encode_raw(&self) -> BytesMut {
        let text = format!(
            "§1\0{}\0{}\0{}\0{}\0{}",
            self.protocol, self.version, self.description, self.online_players, self.max_players
        );
        encode_kick(&text)
    }
}

/// `0xFF` ‖ u16 length in UTF-16 units ‖ UTF-16BE text.
fn encode_kick(text: &str) -> BytesMut {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut buf = BytesMut::with_capacity(3 + units.len() * 2);
    buf.put_u8(0xFF);
    buf.put_u16(units.len() as u16);
    for unit in units {
        buf.put_u16(unit);
    }
    buf
}
