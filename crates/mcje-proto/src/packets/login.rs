//! Login state packets: LoginStart (0x00, serverbound) and
//! LoginSuccess (0x02, clientbound).

use bytes::{Buf, BytesMut};

use crate::codec::{read_string_bounded, write_string};
use crate::error::ProtoError;
use crate::types::Uuid;

/// LoginStart packet. The username is whatever the client claims; session
/// authentication is outside this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub clientside_username: String,
}

impl LoginStart {
    pub fn decode(buf: &mut impl Buf, max_string_utf16: usize) -> Result<Self, ProtoError> {
        Ok(Self {
            clientside_username: read_string_bounded(buf, max_string_utf16)?,
        })
    }
}

/// LoginSuccess packet. In the 1.14/1.15 era the UUID travels as its
/// hyphenated string form; binary UUIDs only appear from 1.16 on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}

impl LoginSuccess {
    pub fn write_body(&self, _version: i32, buf: &mut BytesMut) -> Result<(), ProtoError> {
        write_string(buf, &self.uuid.to_string());
        write_string(buf, &self.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{read_string, MAX_STRING_UTF16};

    #[test]
    fn login_start_decode() {
        let mut buf = BytesMut::new();
        write_string(&mut buf, "alice");
        let packet = LoginStart::decode(&mut buf.freeze(), MAX_STRING_UTF16).unwrap();
        assert_eq!(packet.clientside_username, "alice");
    }

    #[test]
    fn login_success_body() {
        let packet = LoginSuccess {
            uuid: Uuid::new(0x65bd239f89f24cc7, 0xae8bbb625525904e),
            username: "alice".into(),
        };
        let mut buf = BytesMut::new();
        packet.write_body(578, &mut buf).unwrap();
        let mut body = buf.freeze();
        assert_eq!(
            read_string(&mut body).unwrap(),
            "65bd239f-89f2-4cc7-ae8b-bb625525904e"
        );
        assert_eq!(read_string(&mut body).unwrap(), "alice");
        assert!(!body.has_remaining());
    }
}
