//! Single Universal MIDI Packets: a borrowed [`View`] and an owned [`Packet`].

use std::ops::Index;

use crate::error::{Error, Result};
use crate::utils::{self, MessageKind};

/// Zero-copy view over the words of exactly one UMP.
///
/// The number of words always matches the message type of the first word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct View<'a> {
    words: &'a [u32],
}

impl<'a> View<'a> {
    /// Wrap `words`, which must hold exactly one packet.
    ///
    /// Passing a slice whose length disagrees with its message type is a
    /// contract violation; use [`View::try_new`] for untrusted input.
    #[inline]
    pub fn new(words: &'a [u32]) -> Self {
        debug_assert!(
            !words.is_empty() && words.len() == utils::num_words_for_message_type(words[0]),
            "UMP view word count does not match its message type"
        );
        Self { words }
    }

    pub fn try_new(words: &'a [u32]) -> Result<Self> {
        let first = *words.first().ok_or(Error::TruncatedStream(0))?;
        let expected = utils::num_words_for_message_type(first);
        if words.len() != expected {
            return Err(Error::WordCountMismatch {
                message_type: utils::message_type(first),
                expected,
                actual: words.len(),
            });
        }
        Ok(Self { words })
    }

    #[inline]
    pub fn data(&self) -> &'a [u32] {
        self.words
    }

    #[inline]
    pub fn first(&self) -> u32 {
        self.words[0]
    }

    /// Word count (1-4).
    #[inline]
    pub fn size(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_word(self.first())
    }

    #[inline]
    pub fn group(&self) -> u8 {
        utils::group(self.first())
    }

    #[inline]
    pub fn to_packet(&self) -> Packet {
        Packet::from_view(*self)
    }
}

impl Index<usize> for View<'_> {
    type Output = u32;

    #[inline]
    fn index(&self, index: usize) -> &u32 {
        &self.words[index]
    }
}

impl<'a> TryFrom<&'a [u32]> for View<'a> {
    type Error = Error;

    fn try_from(words: &'a [u32]) -> Result<Self> {
        Self::try_new(words)
    }
}

/// Owned UMP, tagged by message kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Packet {
    Utility([u32; 1]),
    System([u32; 1]),
    Midi1ChannelVoice([u32; 1]),
    Data64([u32; 2]),
    Midi2ChannelVoice([u32; 2]),
    Data128([u32; 4]),
    /// Reserved message types; `len` valid words in `words`.
    Reserved { words: [u32; 4], len: u8 },
}

impl Packet {
    /// Build a packet from words, checking the count against the message type.
    pub fn from_words(words: &[u32]) -> Result<Self> {
        View::try_new(words).map(Self::from_view)
    }

    fn from_view(view: View<'_>) -> Self {
        let w = view.data();
        match view.kind() {
            MessageKind::Utility => Self::Utility([w[0]]),
            MessageKind::CommonRealtime => Self::System([w[0]]),
            MessageKind::ChannelVoice1 => Self::Midi1ChannelVoice([w[0]]),
            MessageKind::SysEx7 => Self::Data64([w[0], w[1]]),
            MessageKind::ChannelVoice2 => Self::Midi2ChannelVoice([w[0], w[1]]),
            MessageKind::Data128 => Self::Data128([w[0], w[1], w[2], w[3]]),
            MessageKind::Reserved(_) => {
                let mut words = [0; 4];
                words[..w.len()].copy_from_slice(w);
                Self::Reserved {
                    words,
                    len: w.len() as u8,
                }
            }
        }
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        match self {
            Self::Utility(w) | Self::System(w) | Self::Midi1ChannelVoice(w) => w.as_slice(),
            Self::Data64(w) | Self::Midi2ChannelVoice(w) => w.as_slice(),
            Self::Data128(w) => w.as_slice(),
            Self::Reserved { words, len } => &words[..*len as usize],
        }
    }

    #[inline]
    pub fn view(&self) -> View<'_> {
        View { words: self.words() }
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        MessageKind::from_word(self.words()[0])
    }

    #[inline]
    pub fn group(&self) -> u8 {
        utils::group(self.words()[0])
    }
}

impl From<View<'_>> for Packet {
    fn from(view: View<'_>) -> Self {
        Self::from_view(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_accepts_matching_word_count() {
        let words = [0x4090_4000, 0x8000_0000];
        let view = View::try_new(&words).unwrap();
        assert_eq!(view.size(), 2);
        assert_eq!(view.kind(), MessageKind::ChannelVoice2);
        assert_eq!(view[1], 0x8000_0000);
    }

    #[test]
    fn test_view_rejects_wrong_word_count() {
        let words = [0x4090_4000];
        assert_eq!(
            View::try_new(&words),
            Err(Error::WordCountMismatch {
                message_type: 0x4,
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(View::try_new(&[]), Err(Error::TruncatedStream(0)));
    }

    #[test]
    fn test_packet_variants() {
        assert!(matches!(
            Packet::from_words(&[0x0010_1234]).unwrap(),
            Packet::Utility(_)
        ));
        assert!(matches!(
            Packet::from_words(&[0x10F8_0000]).unwrap(),
            Packet::System(_)
        ));
        assert!(matches!(
            Packet::from_words(&[0x3016_0102, 0x0304_0506]).unwrap(),
            Packet::Data64(_)
        ));
        assert!(matches!(
            Packet::from_words(&[0x5000_0000, 1, 2, 3]).unwrap(),
            Packet::Data128(_)
        ));
        assert!(Packet::from_words(&[0x5000_0000, 1]).is_err());
    }

    #[test]
    fn test_reserved_packet_keeps_its_words() {
        let packet = Packet::from_words(&[0xB300_0000, 7, 9]).unwrap();
        assert_eq!(packet.kind(), MessageKind::Reserved(0xB));
        assert_eq!(packet.words(), &[0xB300_0000, 7, 9]);
        assert_eq!(packet.group(), 3);
    }

    #[test]
    fn test_packet_view_roundtrip() {
        let packet = Packet::from_words(&[0x4390_4000, 0xFFFF_0000]).unwrap();
        let view = packet.view();
        assert_eq!(view.group(), 3);
        assert_eq!(Packet::from(view), packet);
    }
}
