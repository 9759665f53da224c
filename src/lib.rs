//! # Tutti UMP - Universal MIDI Packet bridge
//!
//! Umbrella crate over the UMP conversion layer.
//!
//! ## Architecture
//!
//! - **tutti-ump-core** - Packet types, value scaling, SysEx7, MIDI 1.0 <-> MIDI 2.0
//!   translation and the stream dispatchers
//! - **tutti-ump** (this crate) - `MidiBridge`, builder/config and a unified error type
//!
//! ## Quick Start
//!
//! ```
//! use tutti_ump::prelude::*;
//!
//! let mut bridge = MidiBridge::builder()
//!     .protocol(Protocol::Midi2)
//!     .build()?;
//!
//! // MIDI 1.0 bytes in, MIDI 2.0 packets out
//! let packets = bridge.to_ump(&[0x90, 60, 127], 0.0);
//! assert_eq!(packets.data(), &[0x4090_3C00, 0xFFFF_0000]);
//!
//! // ...and back
//! let messages = bridge.to_bytestream(packets.data(), 0.0);
//! assert_eq!(messages[0].bytes(), &[0x90, 60, 127]);
//! # Ok::<(), tutti_ump::Error>(())
//! ```

/// Re-export of tutti-ump-core for direct access
pub use tutti_ump_core as core;

// Core types
pub use tutti_ump_core::{
    BytesOnGroup, BytestreamMessage, BytestreamToUmpDispatcher, GenericUmpConverter,
    Midi1ToBytestreamTranslator, Midi1ToMidi2DefaultTranslator, Midi2Event, Midi2Handling,
    Midi2MessageType, Packet, Packets, Protocol, ToBytestreamDispatcher, View,
};

mod bridge;
mod builder;
mod error;

pub use bridge::MidiBridge;
pub use builder::{BridgeConfig, MidiBridgeBuilder};
pub use error::{Error, Result};

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{BridgeConfig, MidiBridge, MidiBridgeBuilder};

    // Essential types
    pub use crate::core::{BytestreamMessage, Midi2Handling, Packets, Protocol, View};
}
