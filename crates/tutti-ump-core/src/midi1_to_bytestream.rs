//! MIDI 1.0 UMP back to byte-stream messages, reassembling SysEx7.

use tracing::{trace, warn};

use crate::dispatcher::DEFAULT_MAX_SYSEX_LEN;
use crate::message::{message_length_from_first_byte, BytestreamMessage};
use crate::packet::View;
use crate::utils::{self, MessageKind, SysExStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    AccumulatingSysEx,
}

/// Converts the MIDI 1.0 packets of one group into byte-stream messages.
///
/// SysEx7 fragments are collected until the End packet arrives. Utility
/// packets and System Realtime messages may be interleaved with the
/// fragments; anything else abandons the pending SysEx. A SysEx whose
/// payload grows past `max_sysex_len` is dropped whole.
#[derive(Clone, Debug)]
pub struct SingleGroupMidi1ToBytestreamTranslator {
    state: State,
    /// Framed SysEx under construction, starting with 0xF0.
    pending: Vec<u8>,
    pending_timestamp: f64,
    max_sysex_len: usize,
}

impl Default for SingleGroupMidi1ToBytestreamTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl SingleGroupMidi1ToBytestreamTranslator {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            pending: Vec::new(),
            pending_timestamp: 0.0,
            max_sysex_len: DEFAULT_MAX_SYSEX_LEN,
        }
    }

    /// Longest SysEx payload to reassemble. Default: 64 KiB
    pub fn with_max_sysex_len(mut self, len: usize) -> Self {
        self.max_sysex_len = len;
        self
    }

    #[inline]
    pub fn max_sysex_len(&self) -> usize {
        self.max_sysex_len
    }

    /// Discard any partial SysEx.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.pending.clear();
    }

    /// `true` while SysEx fragments are being collected.
    #[inline]
    pub fn is_accumulating(&self) -> bool {
        self.state == State::AccumulatingSysEx
    }

    pub fn dispatch(
        &mut self,
        view: View<'_>,
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        if self.is_accumulating() && !continues_sysex(view) {
            trace!(
                "Abandoning {} pending SysEx bytes on packet {:#010x}",
                self.pending.len().saturating_sub(1),
                view.first()
            );
            self.reset();
        }

        match view.kind() {
            kind @ (MessageKind::CommonRealtime | MessageKind::ChannelVoice1) => {
                let word = view.first();
                let status = utils::byte_of(word, 1);
                let valid = match kind {
                    MessageKind::ChannelVoice1 => (0x80..=0xEF).contains(&status),
                    _ => status > 0xF0 && status != 0xF7,
                };
                if !valid {
                    trace!("Dropping packet {:#010x} with status {:#04x}", word, status);
                    return;
                }
                let bytes = [status, utils::byte_of(word, 2), utils::byte_of(word, 3)];
                let len = message_length_from_first_byte(status);
                callback(
                    BytestreamMessage::from_validated(&bytes[..len])
                        .with_group(view.group())
                        .with_timestamp(timestamp),
                );
            }
            MessageKind::SysEx7 => self.handle_sysex(view, timestamp, callback),
            // Utility, MIDI 2.0 and 128-bit data have no byte-stream form here
            _ => {}
        }
    }

    fn handle_sysex(
        &mut self,
        view: View<'_>,
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        let word = view.first();
        let Some(status) = SysExStatus::from_nibble(utils::status(word)) else {
            trace!("Dropping SysEx7 packet with reserved status {:#010x}", word);
            return;
        };

        if status.is_start() {
            self.pending.clear();
            self.pending.push(0xF0);
            self.pending_timestamp = timestamp;
            self.state = State::AccumulatingSysEx;
        } else if !self.is_accumulating() {
            trace!("Ignoring SysEx7 {:?} without a start", status);
            return;
        }

        let count = (utils::channel(word) as usize).min(6);
        let data = [
            utils::byte_of(word, 2),
            utils::byte_of(word, 3),
            utils::byte_of(view[1], 0),
            utils::byte_of(view[1], 1),
            utils::byte_of(view[1], 2),
            utils::byte_of(view[1], 3),
        ];
        self.pending.extend_from_slice(&data[..count]);

        // Leading 0xF0 is not payload
        if self.pending.len() - 1 > self.max_sysex_len {
            warn!(
                "Dropping SysEx on group {}: payload exceeds {} bytes",
                view.group(),
                self.max_sysex_len
            );
            self.reset();
            return;
        }

        if status.is_end() {
            self.pending.push(0xF7);
            callback(
                BytestreamMessage::from_validated(&self.pending)
                    .with_group(view.group())
                    .with_timestamp(self.pending_timestamp),
            );
            self.reset();
        }
    }
}

/// Packets that may arrive between SysEx7 fragments without ending them.
fn continues_sysex(view: View<'_>) -> bool {
    let word = view.first();
    match view.kind() {
        MessageKind::Utility => true,
        MessageKind::CommonRealtime => utils::is_system_realtime(word),
        MessageKind::SysEx7 => matches!(
            SysExStatus::from_nibble(utils::status(word)),
            Some(SysExStatus::Continue | SysExStatus::End)
        ),
        _ => false,
    }
}

/// Routes MIDI 1.0 packets to one [`SingleGroupMidi1ToBytestreamTranslator`]
/// per group, so SysEx on different groups may interleave.
#[derive(Clone, Debug, Default)]
pub struct Midi1ToBytestreamTranslator {
    groups: [SingleGroupMidi1ToBytestreamTranslator; 16],
}

impl Midi1ToBytestreamTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sysex_len(mut self, len: usize) -> Self {
        for group in &mut self.groups {
            group.max_sysex_len = len;
        }
        self
    }

    pub fn reset(&mut self) {
        self.groups.iter_mut().for_each(|g| g.reset());
    }

    pub fn dispatch(
        &mut self,
        view: View<'_>,
        timestamp: f64,
        callback: impl FnMut(BytestreamMessage),
    ) {
        self.groups[view.group() as usize].dispatch(view, timestamp, callback);
    }
}
