//! Error types for checked UMP and bytestream construction.
//!
//! Conversion itself never fails; these errors only come from constructors
//! and deserialization that validate caller-supplied data.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("message type {message_type:#x} needs {expected} words, got {actual}")]
    WordCountMismatch {
        message_type: u8,
        expected: usize,
        actual: usize,
    },

    #[error("packet stream ends with {0} words of an incomplete packet")]
    TruncatedStream(usize),

    #[error("empty MIDI message")]
    EmptyMessage,

    #[error("invalid status byte {0:#04x}")]
    InvalidStatus(u8),

    #[error("status {status:#04x} needs {expected} bytes, got {actual}")]
    MessageLength {
        status: u8,
        expected: usize,
        actual: usize,
    },

    #[error("data byte {0:#04x} has the high bit set")]
    InvalidDataByte(u8),

    #[error("SysEx message is not terminated by 0xf7")]
    UnterminatedSysEx,

    #[error("group {0} out of range (0-15)")]
    InvalidGroup(u8),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),
}

impl From<midi_msg::ParseError> for Error {
    fn from(e: midi_msg::ParseError) -> Self {
        Error::MidiParse(format!("{e:?}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
