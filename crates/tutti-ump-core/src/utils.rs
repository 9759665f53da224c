//! Bit packing and UMP header helpers.

/// Pack four bytes into a big-endian UMP word.
#[inline]
pub const fn bytes_to_word(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    (b0 as u32) << 24 | (b1 as u32) << 16 | (b2 as u32) << 8 | b3 as u32
}

/// Byte `index` (0 = most significant) of a UMP word.
#[inline]
pub const fn byte_of(word: u32, index: usize) -> u8 {
    (word >> (24 - 8 * index)) as u8
}

/// Message type nibble (bits 31..28).
#[inline]
pub const fn message_type(word: u32) -> u8 {
    (word >> 28) as u8
}

/// Group nibble (bits 27..24).
#[inline]
pub const fn group(word: u32) -> u8 {
    ((word >> 24) & 0x0F) as u8
}

/// Status nibble (bits 23..20).
#[inline]
pub const fn status(word: u32) -> u8 {
    ((word >> 20) & 0x0F) as u8
}

/// Channel nibble (bits 19..16). For SysEx7 packets this holds the byte count.
#[inline]
pub const fn channel(word: u32) -> u8 {
    ((word >> 16) & 0x0F) as u8
}

/// Number of 32-bit words in a packet, from the message type of its first word.
#[inline]
pub const fn num_words_for_message_type(word: u32) -> usize {
    const SIZES: [u8; 16] = [1, 1, 1, 2, 2, 4, 1, 1, 2, 2, 2, 3, 3, 4, 4, 4];
    SIZES[message_type(word) as usize] as usize
}

/// `true` for a System packet carrying a realtime status (0xF8..=0xFF).
#[inline]
pub const fn is_system_realtime(word: u32) -> bool {
    message_type(word) == 0x1 && byte_of(word, 1) >= 0xF8
}

/// UMP message kinds, from the message type nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Utility,
    CommonRealtime,
    ChannelVoice1,
    SysEx7,
    ChannelVoice2,
    Data128,
    /// Types 0x6..=0xF, reserved by the UMP specification.
    Reserved(u8),
}

impl MessageKind {
    #[inline]
    pub const fn from_word(word: u32) -> Self {
        Self::from_nibble(message_type(word))
    }

    #[inline]
    pub const fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0x0 => Self::Utility,
            0x1 => Self::CommonRealtime,
            0x2 => Self::ChannelVoice1,
            0x3 => Self::SysEx7,
            0x4 => Self::ChannelVoice2,
            0x5 => Self::Data128,
            other => Self::Reserved(other),
        }
    }

    #[inline]
    pub const fn nibble(self) -> u8 {
        match self {
            Self::Utility => 0x0,
            Self::CommonRealtime => 0x1,
            Self::ChannelVoice1 => 0x2,
            Self::SysEx7 => 0x3,
            Self::ChannelVoice2 => 0x4,
            Self::Data128 => 0x5,
            Self::Reserved(n) => n,
        }
    }
}

/// Status of a SysEx7 data packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SysExStatus {
    /// Whole message in one packet.
    Complete = 0x0,
    Start = 0x1,
    Continue = 0x2,
    End = 0x3,
}

impl SysExStatus {
    #[inline]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x0 => Some(Self::Complete),
            0x1 => Some(Self::Start),
            0x2 => Some(Self::Continue),
            0x3 => Some(Self::End),
            _ => None,
        }
    }

    /// Starts a new message, discarding anything pending.
    #[inline]
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start | Self::Complete)
    }

    /// Finishes the pending message.
    #[inline]
    pub const fn is_end(self) -> bool {
        matches!(self, Self::End | Self::Complete)
    }
}
