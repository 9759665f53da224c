//! Universal MIDI Packet conversion for Tutti.
//!
//! Translates between MIDI 1.0 byte streams and Universal MIDI Packets, and
//! between the MIDI 1.0 and MIDI 2.0 channel voice protocols, including
//! SysEx7 fragmentation and reassembly.
//!
//! All conversions are synchronous and report their output through a
//! callback. Malformed input is dropped (and logged via `tracing`) rather
//! than reported as an error; only the checked constructors return
//! [`Result`].
//!
//! # Example
//!
//! ```
//! use tutti_ump_core::{BytesOnGroup, Midi1ToMidi2DefaultTranslator, ToBytestreamDispatcher};
//!
//! // MIDI 1.0 note on -> MIDI 2.0 UMP
//! let mut translator = Midi1ToMidi2DefaultTranslator::new();
//! let mut words = Vec::new();
//! translator.dispatch_message(BytesOnGroup::new(0, &[0x90, 60, 127]), |packet| {
//!     words.extend_from_slice(packet.data())
//! });
//! assert_eq!(words, [0x4090_3C00, 0xFFFF_0000]);
//!
//! // ...and back to bytes
//! let mut dispatcher = ToBytestreamDispatcher::new();
//! dispatcher.dispatch(&words, 0.0, |msg| assert_eq!(msg.bytes(), &[0x90, 60, 127]));
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

// Packet and message types
pub use message::{message_length_from_first_byte, BytesOnGroup, BytestreamMessage};
pub use self::midi2::{Midi2Event, Midi2MessageType};
pub use packet::{Packet, View};
pub use packets::{split_words, Packets};
pub use utils::{MessageKind, SysExStatus};

// Conversion
pub use conversion::{midi2_to_midi1_default_translation, to_midi1, SYSEX7_BYTES_PER_PACKET};
pub use converters::{
    GenericUmpConverter, Protocol, ToBytestreamConverter, ToUmp1Converter, ToUmp2Converter,
};
pub use midi1_to_bytestream::{Midi1ToBytestreamTranslator, SingleGroupMidi1ToBytestreamTranslator};
pub use midi1_to_midi2::Midi1ToMidi2DefaultTranslator;

// Stream entry points
pub use dispatcher::{
    BytestreamToUmpDispatcher, Midi2Handling, ToBytestreamDispatcher, DEFAULT_MAX_SYSEX_LEN,
};

// Re-export the typed message crate used by the interop helpers
pub use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

pub(crate) mod event;
pub(crate) mod message;
pub(crate) mod midi2;
pub(crate) mod serde_support;

pub mod conversion;
pub mod converters;
pub mod dispatcher;
pub mod midi1_to_bytestream;
pub mod midi1_to_midi2;
pub mod packet;
pub mod packets;
pub mod scale;
pub mod utils;
