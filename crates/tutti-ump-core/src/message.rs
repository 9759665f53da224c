//! MIDI 1.0 bytestream messages.

use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Length of a short message from its status byte, per the MIDI 1.0 table.
///
/// Only meaningful for status bytes other than 0xF0 and 0xF7, which delimit
/// SysEx and have no fixed length.
#[inline]
pub const fn message_length_from_first_byte(status: u8) -> usize {
    match status {
        0x80..=0xBF => 3,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF1 | 0xF3 => 2,
        0xF2 => 3,
        _ => 1,
    }
}

/// Borrowed bytes of one message, tagged with the UMP group it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BytesOnGroup<'a> {
    pub group: u8,
    pub bytes: &'a [u8],
}

impl<'a> BytesOnGroup<'a> {
    #[inline]
    pub fn new(group: u8, bytes: &'a [u8]) -> Self {
        Self { group, bytes }
    }
}

/// A complete MIDI 1.0 message: a status byte with its data bytes, or a
/// SysEx block framed by 0xF0 ... 0xF7.
#[derive(Clone, Debug, PartialEq)]
pub struct BytestreamMessage {
    bytes: SmallVec<[u8; 3]>,
    timestamp: f64,
    group: u8,
}

impl BytestreamMessage {
    /// Validate and copy a message.
    pub fn new(bytes: &[u8]) -> Result<Self> {
        validate(bytes)?;
        Ok(Self::from_validated(bytes))
    }

    /// Wrap a SysEx payload (without 0xF0/0xF7) into a framed message.
    pub fn sysex(payload: &[u8]) -> Result<Self> {
        if let Some(&byte) = payload.iter().find(|&&b| b >= 0x80) {
            return Err(Error::InvalidDataByte(byte));
        }
        let mut bytes = SmallVec::with_capacity(payload.len() + 2);
        bytes.push(0xF0);
        bytes.extend_from_slice(payload);
        bytes.push(0xF7);
        Ok(Self {
            bytes,
            timestamp: 0.0,
            group: 0,
        })
    }

    /// Bytes the caller already knows to be well formed.
    pub(crate) fn from_validated(bytes: &[u8]) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
            timestamp: 0.0,
            group: 0,
        }
    }

    #[inline]
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Groups above 15 are masked to four bits.
    #[inline]
    pub fn with_group(mut self, group: u8) -> Self {
        self.group = group & 0x0F;
        self
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    #[inline]
    pub fn group(&self) -> u8 {
        self.group
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// Channel (0-15) for channel voice messages.
    #[inline]
    pub fn channel(&self) -> Option<u8> {
        (self.status() < 0xF0).then_some(self.status() & 0x0F)
    }

    #[inline]
    pub fn is_sysex(&self) -> bool {
        self.status() == 0xF0
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.status() >= 0xF8
    }

    /// SysEx payload between 0xF0 and 0xF7.
    pub fn sysex_data(&self) -> Option<&[u8]> {
        if self.is_sysex() {
            Some(&self.bytes[1..self.bytes.len() - 1])
        } else {
            None
        }
    }

    /// Borrow as input for the UMP converters.
    #[inline]
    pub fn as_bytes_on_group(&self) -> BytesOnGroup<'_> {
        BytesOnGroup::new(self.group, &self.bytes)
    }
}

impl AsRef<[u8]> for BytestreamMessage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<&[u8]> for BytestreamMessage {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::new(bytes)
    }
}

fn validate(bytes: &[u8]) -> Result<()> {
    let (&status, data) = bytes.split_first().ok_or(Error::EmptyMessage)?;

    if status < 0x80 || status == 0xF7 {
        return Err(Error::InvalidStatus(status));
    }

    if status == 0xF0 {
        let (&last, payload) = data.split_last().ok_or(Error::UnterminatedSysEx)?;
        if last != 0xF7 {
            return Err(Error::UnterminatedSysEx);
        }
        return match payload.iter().find(|&&b| b >= 0x80) {
            Some(&byte) => Err(Error::InvalidDataByte(byte)),
            None => Ok(()),
        };
    }

    let expected = message_length_from_first_byte(status);
    if bytes.len() != expected {
        return Err(Error::MessageLength {
            status,
            expected,
            actual: bytes.len(),
        });
    }

    match data.iter().find(|&&b| b >= 0x80) {
        Some(&byte) => Err(Error::InvalidDataByte(byte)),
        None => Ok(()),
    }
}
