//! Integration tests for tutti-ump-core.
//!
//! These tests push whole message streams through the converters and
//! dispatchers in both directions.

use midi2::prelude::*;
use tutti_ump_core::scale::{scale_7_to_16, scale_7_to_32};
use tutti_ump_core::{
    message_length_from_first_byte, to_midi1, BytesOnGroup, BytestreamMessage,
    BytestreamToUmpDispatcher, Midi1ToMidi2DefaultTranslator, Midi2Handling, Packets, Protocol,
    ToBytestreamDispatcher, View,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn below(&mut self, bound: usize) -> usize {
        self.next() as usize % bound
    }

    fn payload(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| (self.next() & 0x7F) as u8).collect()
    }
}

fn framed_sysex(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 2);
    bytes.push(0xF0);
    bytes.extend_from_slice(payload);
    bytes.push(0xF7);
    bytes
}

/// UMP packets of one byte-stream message, one `Vec` per packet.
fn packets_of(bytes: &[u8], group: u8) -> Vec<Vec<u32>> {
    let mut packets = Vec::new();
    to_midi1(BytesOnGroup::new(group, bytes), |view| {
        packets.push(view.data().to_vec())
    });
    packets
}

fn dump(words: &[u32]) -> String {
    tutti_ump_core::split_words(words)
        .map(|view| {
            view.data()
                .iter()
                .map(|w| format!("{w:08x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// 1. SysEx7 fragmentation and reassembly
// ---------------------------------------------------------------------------

/// Every payload length survives bytes -> UMP -> bytes on every group.
#[test]
fn test_sysex_roundtrip_all_lengths() {
    init_tracing();
    let mut rng = Lcg(1);
    let mut dispatcher = ToBytestreamDispatcher::new();

    for len in 0..64 {
        let group = rng.below(16) as u8;
        let bytes = framed_sysex(&rng.payload(len));

        let words: Vec<u32> = packets_of(&bytes, group).concat();
        assert_eq!(words.len(), 2 * len.div_ceil(6).max(1));

        let mut out = Vec::new();
        dispatcher.dispatch(&words, len as f64, |msg| out.push(msg));

        assert_eq!(out.len(), 1, "length {len}");
        assert_eq!(out[0].bytes(), bytes.as_slice());
        assert_eq!(out[0].group(), group);
        assert_eq!(out[0].timestamp(), len as f64);
    }
}

#[test]
fn test_sysex_fragment_snapshot() {
    let payload: Vec<u8> = (1..=13).collect();
    let words = packets_of(&framed_sysex(&payload), 5).concat();
    insta::assert_snapshot!(dump(&words), @r"
    35160102 03040506
    35260708 090a0b0c
    35310d00 00000000
    ");
}

/// Realtime packets slipped between fragments come out first; the SysEx
/// still arrives whole.
#[test]
fn test_sysex_interrupted_by_realtime() {
    init_tracing();
    let mut rng = Lcg(7);

    for _ in 0..100 {
        let group = rng.below(16) as u8;
        let len = rng.below(80);
        let bytes = framed_sysex(&rng.payload(len));
        let realtime = 0x10F8_0000 | (group as u32) << 24;

        let mut words = Vec::new();
        let mut inserted = 0;
        for packet in packets_of(&bytes, group) {
            words.extend(packet);
            for _ in 0..rng.below(3) {
                words.push(realtime);
                inserted += 1;
            }
        }

        let mut dispatcher = ToBytestreamDispatcher::new();
        let mut out = Vec::new();
        dispatcher.dispatch(&words, 0.0, |msg| out.push(msg.bytes().to_vec()));

        // Realtime after the final fragment follows the SysEx
        let sysex_at = out.iter().position(|m| m[0] == 0xF0).unwrap();
        assert_eq!(out[sysex_at], bytes);
        assert_eq!(out.len(), inserted + 1);
        assert!(out
            .iter()
            .enumerate()
            .all(|(i, m)| i == sysex_at || m == &[0xF8]));
    }
}

/// A channel voice packet between fragments abandons the SysEx.
#[test]
fn test_sysex_interrupted_by_channel_voice() {
    init_tracing();
    let mut rng = Lcg(42);

    for _ in 0..100 {
        let group = rng.below(16) as u8;
        let len = 7 + rng.below(80);
        let bytes = framed_sysex(&rng.payload(len));
        let packets = packets_of(&bytes, group);
        assert!(packets.len() >= 2);

        let note_on = 0x2090_3C40 | (group as u32) << 24;
        let split = 1 + rng.below(packets.len() - 1);

        let mut words: Vec<u32> = packets[..split].concat();
        words.push(note_on);
        words.extend(packets[split..].concat());

        let mut dispatcher = ToBytestreamDispatcher::new();
        let mut out = Vec::new();
        dispatcher.dispatch(&words, 0.0, |msg| out.push(msg.bytes().to_vec()));
        assert_eq!(out, vec![vec![0x90, 0x3C, 0x40]]);
    }
}

/// SysEx on different groups may interleave packet by packet.
#[test]
fn test_interleaved_groups() {
    let first = framed_sysex(&[1; 20]);
    let second = framed_sysex(&[2; 14]);
    let a = packets_of(&first, 0);
    let b = packets_of(&second, 9);

    let mut words = Vec::new();
    for i in 0..a.len().max(b.len()) {
        if let Some(p) = a.get(i) {
            words.extend_from_slice(p);
        }
        if let Some(p) = b.get(i) {
            words.extend_from_slice(p);
        }
    }

    let mut dispatcher = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    dispatcher.dispatch(&words, 0.0, |msg| out.push((msg.group(), msg.bytes().to_vec())));
    assert_eq!(out, vec![(9, second), (0, first)]);
}

/// JR Clock (status 1) or JR Timestamp (status 2) utility packet.
fn jitter_reduction(rng: &mut Lcg, group: u8) -> u32 {
    let status = 1 + rng.below(2) as u32;
    let data = 1 + rng.below(0xFFFF) as u32;
    (group as u32) << 24 | status << 20 | data
}

/// The tail of an abandoned SysEx is ignored and the next SysEx through the
/// same dispatcher arrives intact, even with utility packets in between.
#[test]
fn test_sysex_after_abandoned_sysex() {
    init_tracing();
    let mut rng = Lcg(11);
    let mut dispatcher = ToBytestreamDispatcher::new();

    for round in 0..20 {
        let group = rng.below(16) as u8;
        let abandoned = packets_of(&framed_sysex(&rng.payload(100)), group);
        let complete = framed_sysex(&rng.payload(50));
        let note_on = 0x2090_3C40 | (group as u32) << 24;
        let split = 1 + rng.below(abandoned.len() - 1);

        let mut words: Vec<u32> = abandoned[..split].concat();
        words.push(note_on);
        words.extend(abandoned[split..].concat());
        for packet in packets_of(&complete, group) {
            words.extend(packet);
            for _ in 0..rng.below(3) {
                words.push(jitter_reduction(&mut rng, group));
            }
        }

        let mut out = Vec::new();
        dispatcher.dispatch(&words, 0.0, |msg| out.push(msg.bytes().to_vec()));
        assert_eq!(out, vec![vec![0x90, 0x3C, 0x40], complete], "round {round}");
    }
}

/// Jitter reduction packets never end up in the byte stream.
#[test]
fn test_utility_packets_between_fragments() {
    let mut rng = Lcg(5);
    let bytes = framed_sysex(&rng.payload(40));

    let mut words = Vec::new();
    for packet in packets_of(&bytes, 3) {
        words.push(jitter_reduction(&mut rng, 3));
        words.extend(packet);
    }
    words.push(jitter_reduction(&mut rng, 3));

    let mut dispatcher = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    dispatcher.dispatch(&words, 0.0, |msg| out.push(msg.bytes().to_vec()));
    assert_eq!(out, vec![bytes]);
}

/// Long SysEx survives raw bytes -> UMP -> bytes in both protocols.
#[test]
fn test_long_sysex_roundtrip() {
    init_tracing();
    let mut rng = Lcg(9);

    for protocol in [Protocol::Midi1, Protocol::Midi2] {
        for len in [100, 1000, 4096] {
            let bytes = framed_sysex(&rng.payload(len));

            let mut to_ump = BytestreamToUmpDispatcher::new(protocol, 6);
            let mut packets = Packets::new();
            for chunk in bytes.chunks(1 + rng.below(64)) {
                to_ump.dispatch(chunk, 1.5, |view, _| packets.add(view));
            }
            assert_eq!(packets.num_packets(), len.div_ceil(6));

            let mut to_bytes = ToBytestreamDispatcher::new();
            let mut out = Vec::new();
            to_bytes.dispatch_packets(&packets, 1.5, |msg| out.push(msg));
            assert_eq!(out.len(), 1, "{protocol:?} length {len}");
            assert_eq!(out[0].bytes(), bytes.as_slice());
            assert_eq!(out[0].group(), 6);
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Byte stream <-> UMP round trips
// ---------------------------------------------------------------------------

fn sample_messages() -> Vec<Vec<u8>> {
    vec![
        vec![0x90, 60, 100],
        vec![0x80, 60, 64],
        vec![0xA1, 61, 20],
        vec![0xB2, 7, 127],
        vec![0xC3, 42],
        vec![0xD4, 90],
        vec![0xE5, 0x00, 0x40],
        vec![0xF2, 0x10, 0x20],
        vec![0xF3, 0x05],
        vec![0xF6],
        vec![0xFE],
        framed_sysex(&[0x7E, 0x7F, 0x06, 0x01]),
        framed_sysex(&(0..30).collect::<Vec<u8>>()),
    ]
}

/// Raw bytes in arbitrary chunks -> MIDI 1.0 UMP -> bytes.
#[test]
fn test_bytestream_roundtrip_midi1() {
    init_tracing();
    let messages = sample_messages();
    let stream = messages.concat();
    let mut rng = Lcg(3);

    let mut to_ump = BytestreamToUmpDispatcher::new(Protocol::Midi1, 2);
    let mut packets = Packets::new();
    let mut offset = 0;
    while offset < stream.len() {
        let end = (offset + 1 + rng.below(5)).min(stream.len());
        to_ump.dispatch(&stream[offset..end], 0.0, |view, _| packets.add(view));
        offset = end;
    }

    let mut to_bytes = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    to_bytes.dispatch_packets(&packets, 0.0, |msg| {
        assert_eq!(msg.group(), 2);
        out.push(msg.bytes().to_vec())
    });
    assert_eq!(out, messages);
}

/// Every status byte except 0xF0/0xF7 survives bytes -> UMP -> bytes,
/// including the undefined system statuses.
#[test]
fn test_all_status_bytes_roundtrip() {
    let mut rng = Lcg(13);
    let mut dispatcher = ToBytestreamDispatcher::new();

    for status in (0x80..=0xFEu8).filter(|&s| s != 0xF0 && s != 0xF7) {
        let len = message_length_from_first_byte(status);
        let mut bytes = vec![status];
        bytes.extend(rng.payload(len - 1));
        let group = rng.below(16) as u8;

        let packets = packets_of(&bytes, group);
        assert_eq!(packets.len(), 1, "status {status:#04x}");

        let mut out = Vec::new();
        dispatcher.dispatch(&packets[0], 0.0, |msg| out.push(msg));
        assert_eq!(out.len(), 1, "status {status:#04x}");
        assert_eq!(out[0].bytes(), bytes.as_slice());
        assert_eq!(out[0].group(), group);
    }
}

/// Bytes -> MIDI 2.0 UMP -> down-converted bytes is lossless for 7-bit data.
#[test]
fn test_bytestream_roundtrip_midi2() {
    init_tracing();
    let messages = sample_messages();

    let mut to_ump = BytestreamToUmpDispatcher::new(Protocol::Midi2, 0);
    let mut packets = Packets::new();
    to_ump.dispatch(&messages.concat(), 0.0, |view, _| packets.add(view));

    let mut to_bytes = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    to_bytes.dispatch_packets(&packets, 0.0, |msg| out.push(msg.bytes().to_vec()));
    assert_eq!(out, messages);
}

/// RPN, NRPN and bank select fold into single MIDI 2.0 packets and expand
/// back into the same controller sequences.
#[test]
fn test_parameter_numbers_roundtrip_midi2() {
    let messages: Vec<Vec<u8>> = vec![
        vec![0xB0, 101, 0x00],
        vec![0xB0, 100, 0x02],
        vec![0xB0, 6, 0x40],
        vec![0xB0, 38, 0x11],
        vec![0xB7, 99, 0x12],
        vec![0xB7, 98, 0x34],
        vec![0xB7, 6, 0x7F],
        vec![0xB7, 38, 0x00],
        vec![0xB3, 0, 0x05],
        vec![0xB3, 32, 0x06],
        vec![0xC3, 0x07],
    ];

    let mut to_ump = BytestreamToUmpDispatcher::new(Protocol::Midi2, 0);
    let mut packets = Packets::new();
    to_ump.dispatch(&messages.concat(), 0.0, |view, _| packets.add(view));
    assert_eq!(packets.num_packets(), 3);

    let mut to_bytes = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    to_bytes.dispatch_packets(&packets, 0.0, |msg| out.push(msg.bytes().to_vec()));
    assert_eq!(out, messages);
}

/// Every 7-bit velocity survives MIDI 1.0 -> 2.0 -> 1.0.
#[test]
fn test_note_velocity_roundtrip() {
    let mut translator = Midi1ToMidi2DefaultTranslator::new();
    let mut dispatcher = ToBytestreamDispatcher::new();

    for velocity in 1..=127u8 {
        let message = BytestreamMessage::note_on(4, 64, velocity);
        let mut words = Vec::new();
        translator.dispatch_message(message.as_bytes_on_group(), |v| {
            words.extend_from_slice(v.data())
        });

        let mut out = Vec::new();
        dispatcher.dispatch(&words, 0.0, |msg| out.push(msg));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bytes(), message.bytes());
    }
}

#[test]
fn test_midi2_ignore_keeps_sysex_state() {
    let bytes = framed_sysex(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let packets = packets_of(&bytes, 0);

    let mut words = packets[0].clone();
    words.extend_from_slice(&[0x4090_3C00, 0x8000_0000]);
    words.extend_from_slice(&packets[1]);

    let mut dispatcher = ToBytestreamDispatcher::new().with_midi2_handling(Midi2Handling::Ignore);
    let mut out = Vec::new();
    dispatcher.dispatch(&words, 0.0, |msg| out.push(msg.bytes().to_vec()));
    assert_eq!(out, vec![bytes]);
}

#[test]
fn test_rpn_downconversion_snapshot() {
    let mut dispatcher = ToBytestreamDispatcher::new();
    let mut out = Vec::new();
    dispatcher.dispatch(&[0x4424_0123, 0x4567_89AB], 0.0, |msg| {
        out.push(
            msg.bytes()
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    });
    insta::assert_snapshot!(out.join("\n"), @r"
    b4 65 01
    b4 64 23
    b4 06 22
    b4 26 59
    ");
}

// ---------------------------------------------------------------------------
// 3. Layout checks against the midi2 crate
// ---------------------------------------------------------------------------

fn translate(bytes: &[u8], group: u8) -> Vec<u32> {
    let mut translator = Midi1ToMidi2DefaultTranslator::new();
    let mut words = Vec::new();
    translator.dispatch_message(BytesOnGroup::new(group, bytes), |v| {
        words.extend_from_slice(v.data())
    });
    words
}

#[test]
fn test_note_on_matches_midi2_crate() {
    let mut expected = midi2::channel_voice2::NoteOn::<[u32; 2]>::new();
    expected.set_group(u4::new(3));
    expected.set_channel(u4::new(9));
    expected.set_note_number(u7::new(64));
    expected.set_velocity(scale_7_to_16(100));

    assert_eq!(translate(&[0x99, 64, 100], 3), expected.data());
}

#[test]
fn test_control_change_matches_midi2_crate() {
    let mut expected = midi2::channel_voice2::ControlChange::<[u32; 2]>::new();
    expected.set_group(u4::new(1));
    expected.set_channel(u4::new(2));
    expected.set_control(u7::new(74));
    expected.set_control_change_data(scale_7_to_32(33));

    assert_eq!(translate(&[0xB2, 74, 33], 1), expected.data());
}

#[test]
fn test_pitch_bend_matches_midi2_crate() {
    let mut expected = midi2::channel_voice2::ChannelPitchBend::<[u32; 2]>::new();
    expected.set_group(u4::new(0));
    expected.set_channel(u4::new(0));
    expected.set_pitch_bend_data(0x8000_0000);

    assert_eq!(translate(&[0xE0, 0x00, 0x40], 0), expected.data());
}

#[test]
fn test_views_are_validated() {
    assert!(View::try_new(&[0x4090_3C00]).is_err());
    assert!(Packets::try_from_words(&[0x2090_3C40, 0x4090_3C00]).is_err());
}
