//! Protocol encoding/decoding traits and string helpers.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::types::VarInt;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Default string bound, in UTF-16 code units.
pub const MAX_STRING_UTF16: usize = 32_767;

/// Fail unless at least `needed` bytes remain.
pub fn require(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a Java protocol string (VarInt byte length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarInt(s.len() as i32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a Java protocol string under the default bound.
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    read_string_bounded(buf, MAX_STRING_UTF16)
}

/// Read a Java protocol string bounded by `max_utf16` UTF-16 code units.
///
/// The byte length may not exceed 3× the bound (the widest UTF-8 expansion
/// of a UTF-16 unit) and the decoded text is re-measured against it.
pub fn read_string_bounded(buf: &mut impl Buf, max_utf16: usize) -> Result<String, ProtoError> {
    let len = VarInt::proto_decode(buf)?.0;
    if len < 0 {
        return Err(ProtoError::NegativeLength(len));
    }
    let len = len as usize;
    if len > max_utf16.saturating_mul(3) {
        return Err(ProtoError::StringTooLong { len, max_utf16 });
    }
    require(buf, len)?;
    let data = buf.copy_to_bytes(len);
    let text = String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)?;
    if text.encode_utf16().count() > max_utf16 {
        return Err(ProtoError::StringTooLong { len, max_utf16 });
    }
    Ok(text)
}
