//! Serde support for byte-stream messages and packet buffers.
//!
//! Both types are checked on the way in, so a deserialized value holds the
//! same invariants as one built through the checked constructors.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::message::BytestreamMessage;
use crate::packets::Packets;

#[derive(Serialize, Deserialize)]
struct SerializableMessage {
    bytes: Vec<u8>,
    timestamp: f64,
    group: u8,
}

impl Serialize for BytestreamMessage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        SerializableMessage {
            bytes: self.bytes().to_vec(),
            timestamp: self.timestamp(),
            group: self.group(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BytestreamMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let serializable = SerializableMessage::deserialize(deserializer)?;
        if serializable.group > 0x0F {
            return Err(D::Error::custom(crate::Error::InvalidGroup(
                serializable.group,
            )));
        }

        let msg = BytestreamMessage::new(&serializable.bytes).map_err(D::Error::custom)?;
        Ok(msg
            .with_group(serializable.group)
            .with_timestamp(serializable.timestamp))
    }
}

impl Serialize for Packets {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.data().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Packets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let words = Vec::<u32>::deserialize(deserializer)?;
        Packets::try_from_words(&words).map_err(D::Error::custom)
    }
}
