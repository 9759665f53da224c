//! Interop between byte-stream messages and typed `midi-msg` messages.

use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

use crate::error::Result;
use crate::message::BytestreamMessage;

impl BytestreamMessage {
    /// Encode a typed message. Fails for messages that do not form a single
    /// well-framed MIDI 1.0 message.
    pub fn from_midi_msg(msg: &MidiMsg) -> Result<Self> {
        Self::new(&msg.to_midi())
    }

    /// Decode into a typed message.
    pub fn to_midi_msg(&self) -> Result<MidiMsg> {
        let (msg, _len) = MidiMsg::from_midi(self.bytes())?;
        Ok(msg)
    }

    /// Encode a channel voice message. Variants that `midi-msg` expands into
    /// several messages (high-resolution notes and 14-bit controllers) are
    /// rejected.
    pub fn channel_voice(channel: u8, msg: ChannelVoiceMsg) -> Result<Self> {
        Self::new(&encode_channel_voice(channel, msg))
    }

    /// Only for variants that always encode to one message.
    fn single_channel_voice(channel: u8, msg: ChannelVoiceMsg) -> Self {
        Self::from_validated(&encode_channel_voice(channel, msg))
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::single_channel_voice(channel, ChannelVoiceMsg::NoteOn { note, velocity })
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::single_channel_voice(channel, ChannelVoiceMsg::NoteOff { note, velocity })
    }

    #[inline]
    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::single_channel_voice(
            channel,
            ChannelVoiceMsg::ControlChange {
                control: midi_msg::ControlChange::CC { control, value },
            },
        )
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::single_channel_voice(channel, ChannelVoiceMsg::ProgramChange { program })
    }

    /// 14-bit bend, 8192 is center.
    #[inline]
    pub fn pitch_bend(channel: u8, bend: u16) -> Self {
        Self::single_channel_voice(channel, ChannelVoiceMsg::PitchBend { bend })
    }
}

fn encode_channel_voice(channel: u8, msg: ChannelVoiceMsg) -> Vec<u8> {
    MidiMsg::ChannelVoice {
        channel: Channel::from_u8(channel),
        msg,
    }
    .to_midi()
}

impl TryFrom<&MidiMsg> for BytestreamMessage {
    type Error = crate::error::Error;

    fn try_from(msg: &MidiMsg) -> Result<Self> {
        Self::from_midi_msg(msg)
    }
}
