//! Stream-level entry points: raw UMP word streams to byte-stream messages,
//! and raw MIDI 1.0 byte streams to UMP.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::conversion::midi2_to_midi1_default_translation;
use crate::converters::{GenericUmpConverter, Protocol};
use crate::message::{message_length_from_first_byte, BytesOnGroup, BytestreamMessage};
use crate::midi1_to_bytestream::SingleGroupMidi1ToBytestreamTranslator;
use crate::packet::View;
use crate::packets::{split_words, Packets};
use crate::utils::MessageKind;

/// What [`ToBytestreamDispatcher`] does with MIDI 2.0 channel voice packets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Midi2Handling {
    /// Translate to MIDI 1.0 before conversion to bytes.
    #[default]
    Downconvert,
    /// Drop them without touching any group state.
    Ignore,
}

/// Splits UMP word streams into packets and converts them to byte-stream
/// messages, with one translator per group created on first use.
#[derive(Clone, Debug)]
pub struct ToBytestreamDispatcher {
    translators: [Option<SingleGroupMidi1ToBytestreamTranslator>; 16],
    midi2_handling: Midi2Handling,
    max_sysex_len: usize,
}

impl Default for ToBytestreamDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ToBytestreamDispatcher {
    pub fn new() -> Self {
        Self {
            translators: Default::default(),
            midi2_handling: Midi2Handling::default(),
            max_sysex_len: DEFAULT_MAX_SYSEX_LEN,
        }
    }

    pub fn with_midi2_handling(mut self, handling: Midi2Handling) -> Self {
        self.midi2_handling = handling;
        self
    }

    /// Longest SysEx payload reassembled per group. Applies to groups that
    /// have not seen traffic yet, so set it before dispatching.
    pub fn with_max_sysex_len(mut self, len: usize) -> Self {
        self.max_sysex_len = len;
        self
    }

    #[inline]
    pub fn midi2_handling(&self) -> Midi2Handling {
        self.midi2_handling
    }

    #[inline]
    pub fn max_sysex_len(&self) -> usize {
        self.max_sysex_len
    }

    /// Number of groups that have seen traffic since the last reset.
    pub fn active_groups(&self) -> usize {
        self.translators.iter().flatten().count()
    }

    /// Drop all group translators and any partial SysEx they hold.
    pub fn reset(&mut self) {
        self.translators = Default::default();
    }

    /// Convert every whole packet in `words`. A trailing partial packet is
    /// dropped.
    pub fn dispatch(
        &mut self,
        words: &[u32],
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        for view in split_words(words) {
            self.dispatch_view(view, timestamp, &mut callback);
        }
    }

    pub fn dispatch_packets(
        &mut self,
        packets: &Packets,
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        for view in packets {
            self.dispatch_view(view, timestamp, &mut callback);
        }
    }

    pub fn dispatch_view(
        &mut self,
        view: View<'_>,
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        let max_sysex_len = self.max_sysex_len;
        let translator = &mut self.translators[view.group() as usize];
        let create =
            move || SingleGroupMidi1ToBytestreamTranslator::new().with_max_sysex_len(max_sysex_len);

        if view.kind() != MessageKind::ChannelVoice2 {
            translator
                .get_or_insert_with(create)
                .dispatch(view, timestamp, callback);
            return;
        }

        match self.midi2_handling {
            Midi2Handling::Ignore => {
                trace!("Ignoring MIDI 2.0 packet {:#010x}", view.first());
            }
            Midi2Handling::Downconvert => {
                let translator = translator.get_or_insert_with(create);
                midi2_to_midi1_default_translation(view, |midi1| {
                    translator.dispatch(midi1, timestamp, &mut callback)
                });
            }
        }
    }
}

/// Default upper bound on a buffered SysEx message, in bytes.
pub const DEFAULT_MAX_SYSEX_LEN: usize = 64 * 1024;

/// Parses a raw MIDI 1.0 byte stream and converts each complete message to
/// UMP on a fixed group.
///
/// State persists across calls, so a message may be split over several
/// buffers. Running status applies to channel voice messages. Realtime bytes
/// are emitted as soon as they are seen, even in the middle of another
/// message or a SysEx.
#[derive(Clone, Debug)]
pub struct BytestreamToUmpDispatcher {
    converter: GenericUmpConverter,
    group: u8,
    max_sysex_len: usize,

    /// Status and data bytes of the message in progress.
    message: [u8; 3],
    message_len: usize,
    expected_len: usize,

    in_sysex: bool,
    sysex_overflow: bool,
    sysex: Vec<u8>,
    sysex_timestamp: f64,
}

impl BytestreamToUmpDispatcher {
    pub fn new(protocol: Protocol, group: u8) -> Self {
        Self {
            converter: GenericUmpConverter::new(protocol),
            group: group & 0x0F,
            max_sysex_len: DEFAULT_MAX_SYSEX_LEN,
            message: [0; 3],
            message_len: 0,
            expected_len: 0,
            in_sysex: false,
            sysex_overflow: false,
            sysex: Vec::new(),
            sysex_timestamp: 0.0,
        }
    }

    /// Limit on SysEx payload bytes; longer messages are dropped.
    pub fn with_max_sysex_len(mut self, max_sysex_len: usize) -> Self {
        self.max_sysex_len = max_sysex_len;
        self
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.converter.protocol()
    }

    #[inline]
    pub fn group(&self) -> u8 {
        self.group
    }

    #[inline]
    pub fn max_sysex_len(&self) -> usize {
        self.max_sysex_len
    }

    /// Forget running status, partial messages and converter state.
    pub fn reset(&mut self) {
        self.message_len = 0;
        self.expected_len = 0;
        self.in_sysex = false;
        self.sysex_overflow = false;
        self.sysex.clear();
        self.converter.reset();
    }

    /// Feed bytes. `callback` receives each packet with the timestamp of
    /// the call that completed it, or of the call that started a SysEx.
    pub fn dispatch(
        &mut self,
        bytes: &[u8],
        timestamp: f64,
        mut callback: impl FnMut(View<'_>, f64),
    ) {
        for &byte in bytes {
            self.feed(byte, timestamp, &mut callback);
        }
    }

    fn feed(&mut self, byte: u8, timestamp: f64, callback: &mut impl FnMut(View<'_>, f64)) {
        match byte {
            0xF8..=0xFF => {
                self.convert(&[byte], timestamp, callback);
            }
            0xF0 => {
                self.abandon_sysex();
                self.message_len = 0;
                self.in_sysex = true;
                self.sysex_overflow = false;
                self.sysex.clear();
                self.sysex.push(0xF0);
                self.sysex_timestamp = timestamp;
            }
            0xF7 => {
                if !self.in_sysex {
                    trace!("Dropping stray end of SysEx");
                    return;
                }
                self.in_sysex = false;
                if self.sysex_overflow {
                    return;
                }
                self.sysex.push(0xF7);
                Self::emit(
                    &mut self.converter,
                    self.group,
                    &self.sysex,
                    self.sysex_timestamp,
                    callback,
                );
                self.sysex.clear();
            }
            0x80..=0xF6 => {
                self.abandon_sysex();
                self.message[0] = byte;
                self.message_len = 1;
                self.expected_len = message_length_from_first_byte(byte);

                if self.expected_len == 1 {
                    self.message_len = 0;
                    match byte {
                        0xF6 => self.convert(&[byte], timestamp, callback),
                        _ => trace!("Dropping undefined status {:#04x}", byte),
                    }
                }
            }
            _ if self.in_sysex => {
                if self.sysex_overflow {
                    return;
                }
                // Payload length excludes the leading 0xF0
                if self.sysex.len() > self.max_sysex_len {
                    warn!(
                        "SysEx longer than {} bytes, dropping message",
                        self.max_sysex_len
                    );
                    self.sysex_overflow = true;
                    self.sysex.clear();
                    return;
                }
                self.sysex.push(byte);
            }
            _ => {
                if self.message_len == 0 {
                    trace!("Dropping data byte {:#04x} without status", byte);
                    return;
                }
                self.message[self.message_len] = byte;
                self.message_len += 1;

                if self.message_len == self.expected_len {
                    let len = self.message_len;
                    Self::emit(
                        &mut self.converter,
                        self.group,
                        &self.message[..len],
                        timestamp,
                        callback,
                    );
                    // Running status only for channel voice messages
                    self.message_len = if self.message[0] < 0xF0 { 1 } else { 0 };
                }
            }
        }
    }

    fn abandon_sysex(&mut self) {
        if self.in_sysex {
            debug!(
                "Abandoning unterminated SysEx of {} bytes",
                self.sysex.len().saturating_sub(1)
            );
            self.in_sysex = false;
            self.sysex_overflow = false;
            self.sysex.clear();
        }
    }

    fn convert(&mut self, bytes: &[u8], timestamp: f64, callback: &mut impl FnMut(View<'_>, f64)) {
        Self::emit(&mut self.converter, self.group, bytes, timestamp, callback);
    }

    fn emit(
        converter: &mut GenericUmpConverter,
        group: u8,
        bytes: &[u8],
        timestamp: f64,
        callback: &mut impl FnMut(View<'_>, f64),
    ) {
        converter.convert(BytesOnGroup::new(group, bytes), |view| callback(view, timestamp));
    }
}

impl Default for BytestreamToUmpDispatcher {
    fn default() -> Self {
        Self::new(Protocol::default(), 0)
    }
}
