//! Converter front-ends that pick a target protocol.

use serde::{Deserialize, Serialize};

use crate::conversion::{midi2_to_midi1_default_translation, to_midi1};
use crate::message::{BytesOnGroup, BytestreamMessage};
use crate::midi1_to_bytestream::Midi1ToBytestreamTranslator;
use crate::midi1_to_midi2::Midi1ToMidi2DefaultTranslator;
use crate::packet::View;

/// UMP protocol produced from byte-stream input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    /// MIDI 1.0 channel voice packets (type 0x2).
    #[default]
    Midi1,
    /// MIDI 2.0 channel voice packets (type 0x4).
    Midi2,
}

/// Byte stream to MIDI 1.0 UMP.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToUmp1Converter;

impl ToUmp1Converter {
    #[inline]
    pub fn convert(&mut self, message: BytesOnGroup<'_>, callback: impl FnMut(View<'_>)) {
        to_midi1(message, callback);
    }
}

/// Byte stream to MIDI 2.0 UMP.
#[derive(Clone, Debug, Default)]
pub struct ToUmp2Converter {
    translator: Midi1ToMidi2DefaultTranslator,
}

impl ToUmp2Converter {
    #[inline]
    pub fn convert(&mut self, message: BytesOnGroup<'_>, callback: impl FnMut(View<'_>)) {
        self.translator.dispatch_message(message, callback);
    }

    pub fn reset(&mut self) {
        self.translator.reset();
    }
}

/// Byte stream to UMP in a protocol chosen at runtime.
#[derive(Clone, Debug)]
pub enum GenericUmpConverter {
    Midi1(ToUmp1Converter),
    Midi2(ToUmp2Converter),
}

impl GenericUmpConverter {
    pub fn new(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Midi1 => Self::Midi1(ToUmp1Converter),
            Protocol::Midi2 => Self::Midi2(ToUmp2Converter::default()),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Midi1(_) => Protocol::Midi1,
            Self::Midi2(_) => Protocol::Midi2,
        }
    }

    pub fn convert(&mut self, message: BytesOnGroup<'_>, callback: impl FnMut(View<'_>)) {
        match self {
            Self::Midi1(converter) => converter.convert(message, callback),
            Self::Midi2(converter) => converter.convert(message, callback),
        }
    }

    pub fn reset(&mut self) {
        if let Self::Midi2(converter) = self {
            converter.reset();
        }
    }
}

impl Default for GenericUmpConverter {
    fn default() -> Self {
        Self::new(Protocol::default())
    }
}

/// UMP of either protocol to byte-stream messages.
///
/// MIDI 2.0 channel voice packets are translated down to MIDI 1.0 first.
#[derive(Clone, Debug, Default)]
pub struct ToBytestreamConverter {
    translator: Midi1ToBytestreamTranslator,
}

impl ToBytestreamConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(
        &mut self,
        view: View<'_>,
        timestamp: f64,
        mut callback: impl FnMut(BytestreamMessage),
    ) {
        midi2_to_midi1_default_translation(view, |midi1| {
            self.translator.dispatch(midi1, timestamp, &mut callback)
        });
    }

    pub fn reset(&mut self) {
        self.translator.reset();
    }
}
