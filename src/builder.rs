//! Builder and serializable configuration for a `MidiBridge`.

use serde::{Deserialize, Serialize};
use tutti_ump_core::{Midi2Handling, Protocol, DEFAULT_MAX_SYSEX_LEN};

use crate::{Error, MidiBridge, Result};

/// Settings for both directions of a [`MidiBridge`].
///
/// Can be stored alongside other session state and fed back through
/// [`MidiBridgeBuilder::from_config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Protocol produced from byte-stream input.
    pub protocol: Protocol,
    /// UMP group (0-15) byte-stream input is placed on.
    pub group: u8,
    /// Longest SysEx payload accepted in either direction.
    pub max_sysex_len: usize,
    /// Treatment of MIDI 2.0 packets on the way back to bytes.
    pub midi2_handling: Midi2Handling,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::Midi1,
            group: 0,
            max_sysex_len: DEFAULT_MAX_SYSEX_LEN,
            midi2_handling: Midi2Handling::Downconvert,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.group > 0x0F {
            return Err(tutti_ump_core::Error::InvalidGroup(self.group).into());
        }
        if self.max_sysex_len == 0 {
            return Err(Error::InvalidConfig(
                "max_sysex_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// # Example
///
/// ```
/// use tutti_ump::prelude::*;
///
/// let bridge = MidiBridge::builder()
///     .protocol(Protocol::Midi2)
///     .group(3)
///     .build()?;
/// assert_eq!(bridge.config().group, 3);
/// # Ok::<(), tutti_ump::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MidiBridgeBuilder {
    config: BridgeConfig,
}

impl MidiBridgeBuilder {
    /// Start from a stored configuration. Validation happens in `build()`.
    pub fn from_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Default: `Protocol::Midi1`
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Default: 0
    pub fn group(mut self, group: u8) -> Self {
        self.config.group = group;
        self
    }

    /// Default: 64 KiB
    pub fn max_sysex_len(mut self, len: usize) -> Self {
        self.config.max_sysex_len = len;
        self
    }

    /// Default: `Midi2Handling::Downconvert`
    pub fn midi2_handling(mut self, handling: Midi2Handling) -> Self {
        self.config.midi2_handling = handling;
        self
    }

    pub fn build(self) -> Result<MidiBridge> {
        self.config.validate()?;
        Ok(MidiBridge::from_config(self.config))
    }
}
