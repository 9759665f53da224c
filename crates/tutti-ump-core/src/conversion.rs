//! Stateless conversions: byte-stream MIDI 1.0 to MIDI 1.0 UMP, and MIDI 2.0
//! channel voice UMP down to MIDI 1.0 UMP.

use tracing::trace;

use crate::message::{message_length_from_first_byte, BytesOnGroup};
use crate::midi2::{Midi2Event, Midi2MessageType};
use crate::packet::View;
use crate::scale::{scale_16_to_7, scale_32_to_14, scale_32_to_7};
use crate::utils::{bytes_to_word, SysExStatus};

/// Payload bytes carried by one SysEx7 packet.
pub const SYSEX7_BYTES_PER_PACKET: usize = 6;

/// Convert one byte-stream message into MIDI 1.0 UMP.
///
/// Short messages become a single System (0x1) or MIDI 1.0 channel voice
/// (0x2) packet. SysEx (leading 0xF0, trailing 0xF7 optional) is split into
/// SysEx7 packets of up to six payload bytes. Bytes that do not start with a
/// status byte produce nothing.
pub fn to_midi1(message: BytesOnGroup<'_>, mut callback: impl FnMut(View<'_>)) {
    let group = message.group & 0x0F;
    let bytes = message.bytes;

    let Some(&first) = bytes.first() else {
        return;
    };

    if first == 0xF0 {
        let payload = &bytes[1..];
        let payload = payload.strip_suffix(&[0xF7u8]).unwrap_or(payload);
        split_sysex7(group, payload, callback);
        return;
    }

    if first < 0x80 || first == 0xF7 {
        trace!("Ignoring byte-stream message starting with {:#04x}", first);
        return;
    }

    let message_type = if first & 0xF0 == 0xF0 { 0x10 } else { 0x20 };
    let len = message_length_from_first_byte(first).min(bytes.len());
    let byte_at = |i: usize| if i < len { bytes[i] } else { 0 };

    let word = bytes_to_word(message_type | group, first, byte_at(1), byte_at(2));
    callback(View::new(&[word]));
}

fn sysex7_packet(group: u8, status: SysExStatus, chunk: &[u8]) -> [u32; 2] {
    let mut data = [0u8; SYSEX7_BYTES_PER_PACKET];
    data[..chunk.len()].copy_from_slice(chunk);
    [
        bytes_to_word(
            0x30 | group,
            ((status as u8) << 4) | chunk.len() as u8,
            data[0],
            data[1],
        ),
        bytes_to_word(data[2], data[3], data[4], data[5]),
    ]
}

fn split_sysex7(group: u8, payload: &[u8], mut callback: impl FnMut(View<'_>)) {
    if payload.len() <= SYSEX7_BYTES_PER_PACKET {
        callback(View::new(&sysex7_packet(
            group,
            SysExStatus::Complete,
            payload,
        )));
        return;
    }

    let last = (payload.len() - 1) / SYSEX7_BYTES_PER_PACKET;
    for (i, chunk) in payload.chunks(SYSEX7_BYTES_PER_PACKET).enumerate() {
        let status = match i {
            0 => SysExStatus::Start,
            i if i == last => SysExStatus::End,
            _ => SysExStatus::Continue,
        };
        callback(View::new(&sysex7_packet(group, status, chunk)));
    }
}

#[inline]
fn midi1_word(group: u8, status: u8, channel: u8, data1: u8, data2: u8) -> u32 {
    bytes_to_word(0x20 | group, status | channel, data1, data2)
}

/// Controllers that carry RPN/NRPN and bank select state in MIDI 1.0.
/// A MIDI 2.0 control change on one of these has no safe MIDI 1.0 form.
#[inline]
fn is_reserved_controller(controller: u8) -> bool {
    matches!(controller, 0 | 6 | 32 | 38 | 98 | 99 | 100 | 101)
}

/// Translate a MIDI 2.0 channel voice packet into MIDI 1.0 channel voice
/// packets. Every other message type is passed through unchanged.
///
/// Emits zero to four packets. Opcodes without a MIDI 1.0 equivalent
/// (per-note controllers, relative controllers, per-note pitch bend and
/// per-note management) produce nothing.
pub fn midi2_to_midi1_default_translation(view: View<'_>, mut callback: impl FnMut(View<'_>)) {
    let Some(event) = Midi2Event::try_from_view(view) else {
        callback(view);
        return;
    };

    let group = event.group();
    let channel = event.channel();
    let mut emit = |status: u8, data1: u8, data2: u8| {
        callback(View::new(&[midi1_word(group, status, channel, data1, data2)]));
    };

    match event.message_type() {
        Midi2MessageType::NoteOn { note, velocity, .. } => {
            // Velocity 0 would read as note-off in MIDI 1.0
            emit(0x90, note, scale_16_to_7(velocity).max(1));
        }
        Midi2MessageType::NoteOff { note, velocity, .. } => {
            emit(0x80, note, scale_16_to_7(velocity));
        }
        Midi2MessageType::KeyPressure { note, pressure } => {
            emit(0xA0, note, scale_32_to_7(pressure));
        }
        Midi2MessageType::ControlChange { controller, value } => {
            if is_reserved_controller(controller) {
                trace!("Dropping MIDI 2.0 control change {}", controller);
            } else {
                emit(0xB0, controller, scale_32_to_7(value));
            }
        }
        Midi2MessageType::ChannelPressure { pressure } => {
            emit(0xD0, scale_32_to_7(pressure), 0);
        }
        Midi2MessageType::RegisteredController { bank, index, value } => {
            emit(0xB0, 101, bank);
            emit(0xB0, 100, index);
            emit(0xB0, 6, (value >> 25) as u8);
            emit(0xB0, 38, ((value >> 18) & 0x7F) as u8);
        }
        Midi2MessageType::AssignableController { bank, index, value } => {
            emit(0xB0, 99, bank);
            emit(0xB0, 98, index);
            emit(0xB0, 6, (value >> 25) as u8);
            emit(0xB0, 38, ((value >> 18) & 0x7F) as u8);
        }
        Midi2MessageType::ProgramChange { program, bank } => {
            if let Some(bank) = bank {
                emit(0xB0, 0, (bank >> 7) as u8);
                emit(0xB0, 32, (bank & 0x7F) as u8);
            }
            emit(0xC0, program, 0);
        }
        Midi2MessageType::ChannelPitchBend { bend } => {
            let value = scale_32_to_14(bend);
            emit(0xE0, (value & 0x7F) as u8, (value >> 7) as u8);
        }
        other => {
            trace!("No MIDI 1.0 equivalent for {:?}", other);
        }
    }
}
