//! Status state packets: StatusRequest/StatusResponse (0x00) and
//! Ping/Pong (0x01).
//!
//! The response body is the canonical server-list-ping JSON document.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::codec::{require, write_string, ProtoDecode};
use crate::error::ProtoError;

/// StatusRequest packet (empty body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequest;

/// Ping packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub payload: i64,
}

impl ProtoDecode for Ping {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        require(buf, 8)?;
        Ok(Self {
            payload: buf.get_i64(),
        })
    }
}

/// Pong packet, echoing the Ping payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub payload: i64,
}

impl Pong {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        buf.put_i64(self.payload);
        Ok(())
    }
}

/// An entry in the status response's hover sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponsePlayer {
    pub name: String,
    pub uuid: String,
}

/// StatusResponse packet.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub description: String,
    /// Raw PNG bytes; emitted as a `data:image/png;base64,…` URI.
    pub favicon_png: Option<Vec<u8>>,
    pub version_text: String,
    pub version_protocol: i32,
    pub max_players: i32,
    pub online_players: i32,
    pub player_sample: Vec<StatusResponsePlayer>,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    version: VersionJson<'a>,
    players: PlayersJson<'a>,
    description: DescriptionJson<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    favicon: Option<String>,
}

#[derive(Serialize)]
struct VersionJson<'a> {
    name: &'a str,
    protocol: i32,
}

#[derive(Serialize)]
struct PlayersJson<'a> {
    max: i32,
    online: i32,
    sample: Vec<SampleJson<'a>>,
}

#[derive(Serialize)]
struct SampleJson<'a> {
    name: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
struct DescriptionJson<'a> {
    text: &'a str,
}

impl StatusResponse {
    /// Render the server-list-ping JSON document.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        let document = StatusJson {
            version: VersionJson {
                name: &self.version_text,
                protocol: self.version_protocol,
            },
            players: PlayersJson {
                max: self.max_players,
                online: self.online_players,
                sample: self
                    .player_sample
                    .iter()
                    .map(|p| SampleJson {
                        name: &p.name,
                        id: &p.uuid,
                    })
                    .collect(),
            },
            description: DescriptionJson {
                text: &self.description,
            },
            favicon: self
                .favicon_png
                .as_ref()
                .map(|png| format!("data:image/png;base64,{}", BASE64.encode(png))),
        };
        serde_json::to_string(&document).map_err(|e| ProtoError::Json(e.to_string()))
    }

    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        write_string(buf, &self.to_json()?);
        Ok(())
    }
}
