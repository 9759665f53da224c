//! `MidiBridge`: both conversion directions behind one handle.

use tracing::debug;
use tutti_ump_core::{
    BytestreamMessage, BytestreamToUmpDispatcher, Packets, Protocol, ToBytestreamDispatcher, View,
};

use crate::builder::{BridgeConfig, MidiBridgeBuilder};

/// Converts a MIDI 1.0 byte stream to Universal MIDI Packets and UMP word
/// streams back to byte-stream messages.
///
/// Each direction keeps its own state (running status, partial SysEx,
/// RPN/NRPN sequences) between calls.
#[derive(Clone, Debug)]
pub struct MidiBridge {
    config: BridgeConfig,
    to_ump: BytestreamToUmpDispatcher,
    to_bytestream: ToBytestreamDispatcher,
}

impl MidiBridge {
    pub fn builder() -> MidiBridgeBuilder {
        MidiBridgeBuilder::default()
    }

    /// Callers must pass a validated config.
    pub(crate) fn from_config(config: BridgeConfig) -> Self {
        debug!(
            "MidiBridge: protocol={:?} group={} max_sysex_len={} midi2={:?}",
            config.protocol, config.group, config.max_sysex_len, config.midi2_handling
        );
        Self {
            config,
            to_ump: BytestreamToUmpDispatcher::new(config.protocol, config.group)
                .with_max_sysex_len(config.max_sysex_len),
            to_bytestream: ToBytestreamDispatcher::new()
                .with_midi2_handling(config.midi2_handling)
                .with_max_sysex_len(config.max_sysex_len),
        }
    }

    #[inline]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    /// Convert raw bytes, collecting the packets they complete.
    pub fn to_ump(&mut self, bytes: &[u8], timestamp: f64) -> Packets {
        let mut packets = Packets::new();
        self.to_ump_with(bytes, timestamp, |view, _| packets.add(view));
        packets
    }

    /// Convert raw bytes, handing each packet and its timestamp to `callback`.
    pub fn to_ump_with(
        &mut self,
        bytes: &[u8],
        timestamp: f64,
        callback: impl FnMut(View<'_>, f64),
    ) {
        self.to_ump.dispatch(bytes, timestamp, callback);
    }

    /// Convert UMP words, collecting the byte-stream messages they complete.
    pub fn to_bytestream(&mut self, words: &[u32], timestamp: f64) -> Vec<BytestreamMessage> {
        let mut messages = Vec::new();
        self.to_bytestream_with(words, timestamp, |msg| messages.push(msg));
        messages
    }

    pub fn to_bytestream_with(
        &mut self,
        words: &[u32],
        timestamp: f64,
        callback: impl FnMut(BytestreamMessage),
    ) {
        self.to_bytestream.dispatch(words, timestamp, callback);
    }

    /// Drop partial messages and accumulated controller state in both
    /// directions.
    pub fn reset(&mut self) {
        debug!("MidiBridge reset");
        self.to_ump.reset();
        self.to_bytestream.reset();
    }
}
