//! MIDI 1.0 channel voice UMP to MIDI 2.0 channel voice UMP.
//!
//! Most messages map one to one with their values rescaled. RPN/NRPN
//! controller sequences and bank select are stateful: they are collected per
//! group and channel and folded into single MIDI 2.0 packets.

use tracing::trace;

use crate::conversion::to_midi1;
use crate::message::BytesOnGroup;
use crate::midi2::Midi2Event;
use crate::packet::View;
use crate::scale::{scale_14_to_32, scale_7_to_16, scale_7_to_32};
use crate::utils::{self, MessageKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ParameterKind {
    #[default]
    Registered,
    Assignable,
}

/// Collects the four controllers of one RPN or NRPN write:
/// 101/99 (number MSB), 100/98 (number LSB), 6 (data MSB), 38 (data LSB).
#[derive(Clone, Copy, Debug, Default)]
struct ParameterNumberAccumulator {
    bytes: [u8; 4],
    index: usize,
    kind: ParameterKind,
}

impl ParameterNumberAccumulator {
    /// Feed one controller. Returns the collected bytes when the sequence
    /// completes; any out-of-order controller restarts it.
    fn add(&mut self, controller: u8, value: u8) -> Option<(ParameterKind, [u8; 4])> {
        let is_start = controller == 99 || controller == 101;
        if is_start {
            self.kind = if controller == 99 {
                ParameterKind::Assignable
            } else {
                ParameterKind::Registered
            };
            self.index = 0;
        }

        self.bytes[self.index] = value;

        let in_sequence = match self.index {
            0 => is_start,
            1 => match self.kind {
                ParameterKind::Assignable => controller == 98,
                ParameterKind::Registered => controller == 100,
            },
            2 => controller == 6,
            3 => controller == 38,
            _ => false,
        };

        self.index = if in_sequence { self.index + 1 } else { 0 };
        if self.index < self.bytes.len() {
            return None;
        }

        self.index = 0;
        Some((self.kind, self.bytes))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct BankSelect {
    msb: Option<u8>,
    lsb: Option<u8>,
}

impl BankSelect {
    /// Both halves, if set; clears the pending selection either way.
    fn take(&mut self) -> Option<(u8, u8)> {
        let bank = self.msb.zip(self.lsb);
        *self = Self::default();
        bank
    }
}

/// Translates MIDI 1.0 channel voice packets into MIDI 2.0 packets.
///
/// Packets of any other message type are forwarded unchanged.
#[derive(Clone, Debug, Default)]
pub struct Midi1ToMidi2DefaultTranslator {
    parameter_numbers: [[ParameterNumberAccumulator; 16]; 16],
    banks: [[BankSelect; 16]; 16],
}

impl Midi1ToMidi2DefaultTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget partial RPN/NRPN sequences and pending bank selects.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Convert a byte-stream message, fragmenting SysEx as needed.
    pub fn dispatch_message(
        &mut self,
        message: BytesOnGroup<'_>,
        mut callback: impl FnMut(View<'_>),
    ) {
        to_midi1(message, |view| self.dispatch(view, &mut callback));
    }

    pub fn dispatch(&mut self, view: View<'_>, mut callback: impl FnMut(View<'_>)) {
        if view.kind() != MessageKind::ChannelVoice1 {
            callback(view);
            return;
        }

        let word = view.first();
        let group = utils::group(word);
        let channel = utils::channel(word);
        let data1 = utils::byte_of(word, 2) & 0x7F;
        let data2 = utils::byte_of(word, 3) & 0x7F;

        let event = match utils::status(word) {
            0x8 => Midi2Event::note_off(group, channel, data1, scale_7_to_16(data2)),
            0x9 if data2 == 0 => Midi2Event::note_off(group, channel, data1, scale_7_to_16(0)),
            0x9 => Midi2Event::note_on(group, channel, data1, scale_7_to_16(data2)),
            0xA => Midi2Event::key_pressure(group, channel, data1, scale_7_to_32(data2)),
            0xB => match self.control_change(group, channel, data1, data2) {
                Some(event) => event,
                None => return,
            },
            0xC => {
                let bank = self.banks[group as usize][channel as usize].take();
                Midi2Event::program_change(group, channel, data1, bank)
            }
            0xD => Midi2Event::channel_pressure(group, channel, scale_7_to_32(data1)),
            0xE => {
                let bend = (data2 as u16) << 7 | data1 as u16;
                Midi2Event::channel_pitch_bend(group, channel, scale_14_to_32(bend))
            }
            status => {
                trace!("Dropping MIDI 1.0 packet with status {:#x}", status);
                return;
            }
        };

        callback(event.view());
    }

    fn control_change(
        &mut self,
        group: u8,
        channel: u8,
        controller: u8,
        value: u8,
    ) -> Option<Midi2Event> {
        let (g, c) = (group as usize, channel as usize);
        match controller {
            6 | 38 | 98 | 99 | 100 | 101 => {
                let (kind, [bank, index, msb, lsb]) =
                    self.parameter_numbers[g][c].add(controller, value)?;
                let value = scale_14_to_32((msb as u16) << 7 | lsb as u16);
                Some(match kind {
                    ParameterKind::Registered => {
                        Midi2Event::registered_controller(group, channel, bank, index, value)
                    }
                    ParameterKind::Assignable => {
                        Midi2Event::assignable_controller(group, channel, bank, index, value)
                    }
                })
            }
            0 => {
                self.banks[g][c].msb = Some(value);
                None
            }
            32 => {
                self.banks[g][c].lsb = Some(value);
                None
            }
            _ => Some(Midi2Event::control_change(
                group,
                channel,
                controller,
                scale_7_to_32(value),
            )),
        }
    }
}
