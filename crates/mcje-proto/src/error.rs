//! Protocol-level errors and their dispositions.

use thiserror::Error;

use crate::ProtocolState;

/// How the connection loop must treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Framing or a primitive invariant broke: log and close the connection.
    Malformed,
    /// No packet variant for (state, id) under the current version: log,
    /// discard the frame, keep the stream alive.
    Unsupported,
    /// Programmer error: abort in debug builds, close with a log otherwise.
    Internal,
}

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt is too long (more than {max_bytes} bytes)")]
    VarIntTooLong { max_bytes: usize },

    #[error("negative length prefix {0}")]
    NegativeLength(i32),

    #[error("string of {len} bytes exceeds the {max_utf16} UTF-16 unit bound")]
    StringTooLong { len: usize, max_utf16: usize },

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("frame length {len} exceeds maximum {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("frame decoder left {count} bytes unread")]
    TrailingBytes { count: usize },

    #[error("received a compressed frame but compression was never negotiated")]
    CompressionUnsupported,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown packet id 0x{id:02X} in {state:?} for protocol {protocol}")]
    UnknownPacketId {
        state: ProtocolState,
        id: i32,
        protocol: i32,
    },

    #[error("no wire id for this packet under protocol {protocol}")]
    NoIdForVersion { protocol: i32 },

    #[error("packet cannot be emitted in {state:?}")]
    WrongState { state: ProtocolState },

    #[error("block position component {axis} = {value} does not fit its bit width")]
    PositionOutOfRange { axis: char, value: i32 },

    #[error("entity delta {value} is outside the ±8 block packet range")]
    DeltaOutOfRange { value: f64 },

    #[error("status JSON serialization failed: {0}")]
    Json(String),

    #[error("event handler panicked")]
    HandlerPanic,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProtoError {
    /// Classify this error into its connection-loop disposition.
    pub fn kind(&self) -> ErrorKind {
        use ProtoError::*;
        match self {
            BufferTooShort { .. }
            | VarIntTooLong { .. }
            | NegativeLength(_)
            | StringTooLong { .. }
            | InvalidUtf8
            | FrameTooLarge { .. }
            | TrailingBytes { .. }
            | CompressionUnsupported
            | InvalidData(_)
            | Io(_) => ErrorKind::Malformed,
            UnknownPacketId { .. } => ErrorKind::Unsupported,
            NoIdForVersion { .. }
            | WrongState { .. }
            | PositionOutOfRange { .. }
            | DeltaOutOfRange { .. }
            | Json(_)
            | HandlerPanic => ErrorKind::Internal,
        }
    }

    /// True when the underlying stream simply ended between frames.
    pub fn is_eof(&self) -> bool {
        matches!(self, ProtoError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispositions() {
        assert_eq!(
            ProtoError::BufferTooShort {
                needed: 4,
                remaining: 1
            }
            .kind(),
            ErrorKind::Malformed
        );
        assert_eq!(
            ProtoError::UnknownPacketId {
                state: ProtocolState::Play,
                id: 0x7F,
                protocol: 578
            }
            .kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(
            ProtoError::WrongState {
                state: ProtocolState::Login
            }
            .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            ProtoError::CompressionUnsupported.kind(),
            ErrorKind::Malformed
        );
    }

    #[test]
    fn eof_detection() {
        let eof: ProtoError =
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed").into();
        assert!(eof.is_eof());
        assert_eq!(eof.kind(), ErrorKind::Malformed);

        let other: ProtoError =
            std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset").into();
        assert!(!other.is_eof());
    }
}
