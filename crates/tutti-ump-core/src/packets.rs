//! Owning packet buffer and iteration over raw UMP word streams.

use tracing::debug;

use crate::error::{Error, Result};
use crate::packet::{Packet, View};
use crate::utils;

/// Growable buffer of whole Universal MIDI Packets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Packets {
    words: Vec<u32>,
}

impl Packets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(words: usize) -> Self {
        Self {
            words: Vec::with_capacity(words),
        }
    }

    /// Copy a buffer of words, rejecting a trailing partial packet.
    pub fn try_from_words(words: &[u32]) -> Result<Self> {
        let mut offset = 0;
        while offset < words.len() {
            let needed = utils::num_words_for_message_type(words[offset]);
            if offset + needed > words.len() {
                return Err(Error::TruncatedStream(words.len() - offset));
            }
            offset += needed;
        }
        Ok(Self {
            words: words.to_vec(),
        })
    }

    #[inline]
    pub fn add(&mut self, view: View<'_>) {
        self.words.extend_from_slice(view.data());
    }

    #[inline]
    pub fn add_packet(&mut self, packet: &Packet) {
        self.words.extend_from_slice(packet.words());
    }

    #[inline]
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// All words, packets back to back.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.words
    }

    /// Number of words (not packets).
    #[inline]
    pub fn size(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.words)
    }

    pub fn num_packets(&self) -> usize {
        self.iter().count()
    }
}

impl<'a> IntoIterator for &'a Packets {
    type Item = View<'a>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a> Extend<View<'a>> for Packets {
    fn extend<I: IntoIterator<Item = View<'a>>>(&mut self, iter: I) {
        for view in iter {
            self.add(view);
        }
    }
}

impl<'a> FromIterator<View<'a>> for Packets {
    fn from_iter<I: IntoIterator<Item = View<'a>>>(iter: I) -> Self {
        let mut packets = Packets::new();
        packets.extend(iter);
        packets
    }
}

/// Splits a word slice into packet views.
///
/// An incomplete packet at the end of the slice ends iteration.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    remaining: &'a [u32],
}

impl<'a> Iter<'a> {
    #[inline]
    pub fn new(words: &'a [u32]) -> Self {
        Self { remaining: words }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = View<'a>;

    fn next(&mut self) -> Option<View<'a>> {
        let first = *self.remaining.first()?;
        let needed = utils::num_words_for_message_type(first);

        if needed > self.remaining.len() {
            debug!(
                "Dropping truncated UMP: type {:#x} needs {} words, {} left",
                utils::message_type(first),
                needed,
                self.remaining.len()
            );
            self.remaining = &[];
            return None;
        }

        let (packet, rest) = self.remaining.split_at(needed);
        self.remaining = rest;
        Some(View::new(packet))
    }
}

impl std::iter::FusedIterator for Iter<'_> {}

/// Iterate over the packets in an arbitrary word slice.
#[inline]
pub fn split_words(words: &[u32]) -> Iter<'_> {
    Iter::new(words)
}
