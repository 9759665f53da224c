//! MIDI 2.0 channel voice packets.

use midi2::prelude::*;

use crate::packet::View;
use crate::utils::{self, bytes_to_word, MessageKind};

const TYPE_CHANNEL_VOICE2: u8 = 0x40;

#[inline]
fn data_to_array(data: &[u32]) -> [u32; 2] {
    [data[0], data[1]]
}

/// One MIDI 2.0 channel voice UMP (message type 0x4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Midi2Event {
    pub data: [u32; 2],
}

impl Midi2Event {
    // ==================== Constructors ====================

    #[inline]
    fn header(group: u8, opcode: u8, channel: u8, byte2: u8, byte3: u8) -> u32 {
        bytes_to_word(
            TYPE_CHANNEL_VOICE2 | (group & 0x0F),
            (opcode << 4) | (channel & 0x0F),
            byte2,
            byte3,
        )
    }

    #[inline]
    pub fn note_on(group: u8, channel: u8, note: u8, velocity: u16) -> Self {
        let mut msg = midi2::channel_voice2::NoteOn::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_note_number(u7::new(note & 0x7F));
        msg.set_velocity(velocity);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Note On carrying a raw `(type, data)` attribute.
    #[inline]
    pub fn note_on_with_attribute(
        group: u8,
        channel: u8,
        note: u8,
        velocity: u16,
        attribute_type: u8,
        attribute: u16,
    ) -> Self {
        Self {
            data: [
                Self::header(group, 0x9, channel, note & 0x7F, attribute_type),
                (velocity as u32) << 16 | attribute as u32,
            ],
        }
    }

    #[inline]
    pub fn note_off(group: u8, channel: u8, note: u8, velocity: u16) -> Self {
        let mut msg = midi2::channel_voice2::NoteOff::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_note_number(u7::new(note & 0x7F));
        msg.set_velocity(velocity);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Polyphonic (per-note) pressure.
    #[inline]
    pub fn key_pressure(group: u8, channel: u8, note: u8, pressure: u32) -> Self {
        let mut msg = midi2::channel_voice2::KeyPressure::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_note_number(u7::new(note & 0x7F));
        msg.set_key_pressure_data(pressure);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    #[inline]
    pub fn control_change(group: u8, channel: u8, controller: u8, value: u32) -> Self {
        let mut msg = midi2::channel_voice2::ControlChange::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_control(u7::new(controller & 0x7F));
        msg.set_control_change_data(value);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Registered controller (RPN) addressed by `bank` (MSB) and `index` (LSB).
    #[inline]
    pub fn registered_controller(group: u8, channel: u8, bank: u8, index: u8, value: u32) -> Self {
        let mut msg = midi2::channel_voice2::RegisteredController::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_bank(u7::new(bank & 0x7F));
        msg.set_index(u7::new(index & 0x7F));
        msg.set_controller_data(value);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Assignable controller (NRPN) addressed by `bank` (MSB) and `index` (LSB).
    #[inline]
    pub fn assignable_controller(group: u8, channel: u8, bank: u8, index: u8, value: u32) -> Self {
        let mut msg = midi2::channel_voice2::AssignableController::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_bank(u7::new(bank & 0x7F));
        msg.set_index(u7::new(index & 0x7F));
        msg.set_controller_data(value);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Program change, with an optional `(msb, lsb)` bank select.
    ///
    /// Packed by hand: `channel_voice2::ProgramChange::set_bank` stores the
    /// bank LSB in word 1 byte 2, while bank MSB belongs there.
    #[inline]
    pub fn program_change(group: u8, channel: u8, program: u8, bank: Option<(u8, u8)>) -> Self {
        let (flags, msb, lsb) = match bank {
            Some((msb, lsb)) => (0x01, msb & 0x7F, lsb & 0x7F),
            None => (0x00, 0, 0),
        };
        Self {
            data: [
                Self::header(group, 0xC, channel, 0, flags),
                bytes_to_word(program & 0x7F, 0, msb, lsb),
            ],
        }
    }

    #[inline]
    pub fn channel_pressure(group: u8, channel: u8, pressure: u32) -> Self {
        let mut msg = midi2::channel_voice2::ChannelPressure::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_channel_pressure_data(pressure);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    /// Channel pitch bend, centered at 0x8000_0000.
    #[inline]
    pub fn channel_pitch_bend(group: u8, channel: u8, bend: u32) -> Self {
        let mut msg = midi2::channel_voice2::ChannelPitchBend::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_pitch_bend_data(bend);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    #[inline]
    pub fn per_note_pitch_bend(group: u8, channel: u8, note: u8, bend: u32) -> Self {
        let mut msg = midi2::channel_voice2::PerNotePitchBend::<[u32; 2]>::new();
        msg.set_group(u4::new(group & 0x0F));
        msg.set_channel(u4::new(channel & 0x0F));
        msg.set_note_number(u7::new(note & 0x7F));
        msg.set_pitch_bend_data(bend);
        Self {
            data: data_to_array(msg.data()),
        }
    }

    // ==================== Parsing ====================

    /// `None` unless `view` is a MIDI 2.0 channel voice packet.
    #[inline]
    pub fn try_from_view(view: View<'_>) -> Option<Self> {
        if view.kind() != MessageKind::ChannelVoice2 {
            return None;
        }
        Some(Self {
            data: [view[0], view[1]],
        })
    }

    #[inline]
    pub fn view(&self) -> View<'_> {
        View::new(&self.data)
    }

    // ==================== Accessors ====================

    #[inline]
    pub fn group(&self) -> u8 {
        utils::group(self.data[0])
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        utils::channel(self.data[0])
    }

    #[inline]
    fn opcode(&self) -> u8 {
        utils::status(self.data[0])
    }

    #[inline]
    fn byte2(&self) -> u8 {
        utils::byte_of(self.data[0], 2)
    }

    #[inline]
    fn byte3(&self) -> u8 {
        utils::byte_of(self.data[0], 3)
    }

    /// Decode the opcode and its fields.
    pub fn message_type(&self) -> Midi2MessageType {
        let note = self.byte2() & 0x7F;
        let value = self.data[1];

        match self.opcode() {
            0x0 => Midi2MessageType::RegisteredPerNoteController {
                note,
                index: self.byte3(),
                value,
            },
            0x1 => Midi2MessageType::AssignablePerNoteController {
                note,
                index: self.byte3(),
                value,
            },
            0x2 => Midi2MessageType::RegisteredController {
                bank: self.byte2() & 0x7F,
                index: self.byte3() & 0x7F,
                value,
            },
            0x3 => Midi2MessageType::AssignableController {
                bank: self.byte2() & 0x7F,
                index: self.byte3() & 0x7F,
                value,
            },
            0x4 => Midi2MessageType::RelativeRegisteredController {
                bank: self.byte2() & 0x7F,
                index: self.byte3() & 0x7F,
                delta: value as i32,
            },
            0x5 => Midi2MessageType::RelativeAssignableController {
                bank: self.byte2() & 0x7F,
                index: self.byte3() & 0x7F,
                delta: value as i32,
            },
            0x6 => Midi2MessageType::PerNotePitchBend { note, bend: value },
            0x8 => Midi2MessageType::NoteOff {
                note,
                velocity: (value >> 16) as u16,
                attribute: self.attribute(),
            },
            0x9 => Midi2MessageType::NoteOn {
                note,
                velocity: (value >> 16) as u16,
                attribute: self.attribute(),
            },
            0xA => Midi2MessageType::KeyPressure {
                note,
                pressure: value,
            },
            0xB => Midi2MessageType::ControlChange {
                controller: note,
                value,
            },
            0xC => {
                // Bank valid flag is bit 0 of the option flags byte
                let bank = (self.byte3() & 0x01 != 0).then(|| {
                    let msb = utils::byte_of(value, 2) & 0x7F;
                    let lsb = utils::byte_of(value, 3) & 0x7F;
                    ((msb as u16) << 7) | lsb as u16
                });
                Midi2MessageType::ProgramChange {
                    program: utils::byte_of(value, 0) & 0x7F,
                    bank,
                }
            }
            0xD => Midi2MessageType::ChannelPressure { pressure: value },
            0xE => Midi2MessageType::ChannelPitchBend { bend: value },
            0xF => Midi2MessageType::PerNoteManagement {
                note,
                detach: self.byte3() & 0x02 != 0,
                reset: self.byte3() & 0x01 != 0,
            },
            opcode => Midi2MessageType::Unknown { opcode },
        }
    }

    #[inline]
    fn attribute(&self) -> Option<(u8, u16)> {
        match self.byte3() {
            0 => None,
            kind => Some((kind, self.data[1] as u16)),
        }
    }

    /// Note number for note-related messages.
    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.message_type() {
            Midi2MessageType::NoteOn { note, .. }
            | Midi2MessageType::NoteOff { note, .. }
            | Midi2MessageType::KeyPressure { note, .. }
            | Midi2MessageType::PerNotePitchBend { note, .. }
            | Midi2MessageType::RegisteredPerNoteController { note, .. }
            | Midi2MessageType::AssignablePerNoteController { note, .. }
            | Midi2MessageType::PerNoteManagement { note, .. } => Some(note),
            _ => None,
        }
    }

    /// 16-bit velocity for note on/off.
    #[inline]
    pub fn velocity_16bit(&self) -> Option<u16> {
        match self.message_type() {
            Midi2MessageType::NoteOn { velocity, .. }
            | Midi2MessageType::NoteOff { velocity, .. } => Some(velocity),
            _ => None,
        }
    }
}

/// Parsed MIDI 2.0 channel voice message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Midi2MessageType {
    /// Note On with 16-bit velocity and optional `(type, data)` attribute
    NoteOn {
        note: u8,
        velocity: u16,
        attribute: Option<(u8, u16)>,
    },
    NoteOff {
        note: u8,
        velocity: u16,
        attribute: Option<(u8, u16)>,
    },
    /// Per-note pressure (32-bit)
    KeyPressure { note: u8, pressure: u32 },
    /// Per-note pitch bend (32-bit, center at 0x80000000)
    PerNotePitchBend { note: u8, bend: u32 },
    ControlChange { controller: u8, value: u32 },
    /// Channel-wide pitch bend (32-bit, center at 0x80000000)
    ChannelPitchBend { bend: u32 },
    ChannelPressure { pressure: u32 },
    ProgramChange {
        program: u8,
        /// Bank as 14-bit value (MSB << 7 | LSB)
        bank: Option<u16>,
    },
    RegisteredPerNoteController { note: u8, index: u8, value: u32 },
    AssignablePerNoteController { note: u8, index: u8, value: u32 },
    /// RPN
    RegisteredController { bank: u8, index: u8, value: u32 },
    /// NRPN
    AssignableController { bank: u8, index: u8, value: u32 },
    RelativeRegisteredController { bank: u8, index: u8, delta: i32 },
    RelativeAssignableController { bank: u8, index: u8, delta: i32 },
    PerNoteManagement { note: u8, detach: bool, reset: bool },
    Unknown { opcode: u8 },
}
