//! Byte encoding of channel messages.
//!
//! The status byte packs the message kind into its low nibble and the high nibble of the channel
//! byte into its high nibble. Callers that want channel `n` on the wire therefore pass `n << 4`
//! as the channel (see `NoteMessages`). This is the reverse of the usual MIDI status byte layout
//! and receivers must be built to match.
use midly::num::u7;
use smallvec::SmallVec;

/// Terminates a system exclusive message
pub const END_OF_EXCLUSIVE: u8 = 0xF7;

/// Largest 14-bit pitch bend value. The centre is 8192.
pub const PITCH_BEND_MAX: u16 = 0x3FFF;
pub const PITCH_BEND_CENTRE: u16 = 0x2000;

pub mod controller {
    pub const ALL_SOUNDS_OFF: u8 = 120;
    pub const RESET_ALL_CONTROLLERS: u8 = 121;
    pub const LOCAL_CONTROL: u8 = 122;
    pub const ALL_NOTES_OFF: u8 = 123;
    pub const OMNI_OFF: u8 = 124;
    pub const OMNI_ON: u8 = 125;
    pub const MONO_ON: u8 = 126;
    pub const POLY_ON: u8 = 127;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    NoteOff,
    NoteOn,
    PolyKeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    SystemExclusive,
}

impl MessageKind {
    pub const fn nibble(self) -> u8 {
        match self {
            Self::NoteOff => 0x8,
            Self::NoteOn => 0x9,
            Self::PolyKeyPressure => 0xA,
            Self::ControlChange => 0xB,
            Self::ProgramChange => 0xC,
            Self::ChannelPressure => 0xD,
            Self::PitchBend => 0xE,
            Self::SystemExclusive => 0xF,
        }
    }

    pub fn from_nibble(nibble: u8) -> Option<Self> {
        let kind = match nibble & 0x0F {
            0x8 => Self::NoteOff,
            0x9 => Self::NoteOn,
            0xA => Self::PolyKeyPressure,
            0xB => Self::ControlChange,
            0xC => Self::ProgramChange,
            0xD => Self::ChannelPressure,
            0xE => Self::PitchBend,
            0xF => Self::SystemExclusive,
            _ => return None,
        };
        Some(kind)
    }

    /// Number of bytes following the status byte. System exclusive messages have a variable
    /// length so this returns `None` for them.
    pub const fn num_data_bytes(self) -> Option<usize> {
        match self {
            Self::ProgramChange | Self::ChannelPressure => Some(1),
            Self::SystemExclusive => None,
            _ => Some(2),
        }
    }
}

pub const fn status_byte(kind: MessageKind, channel: u8) -> u8 {
    (kind.nibble() & 0x0F) | (channel & 0xF0)
}

fn data(byte: u8) -> u8 {
    u7::from_int_lossy(byte).as_int()
}

/// An encoded message ready to be written to a byte stream. Channel messages are at most 3 bytes
/// long and never allocate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(SmallVec<[u8; 3]>);

/// Builds a message from a status byte and data bytes. The data bytes are copied unchanged.
pub fn encode(kind: MessageKind, channel: u8, data: &[u8]) -> Message {
    let mut bytes = SmallVec::with_capacity(1 + data.len());
    bytes.push(status_byte(kind, channel));
    bytes.extend_from_slice(data);
    Message(bytes)
}

impl Message {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn status(&self) -> u8 {
        self.0[0]
    }

    pub fn kind(&self) -> Option<MessageKind> {
        MessageKind::from_nibble(self.status())
    }

    /// The channel bits of the status byte, still in the high nibble
    pub fn channel(&self) -> u8 {
        self.status() & 0xF0
    }

    pub fn data(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        encode(MessageKind::NoteOn, channel, &[data(note), data(velocity)])
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        encode(MessageKind::NoteOff, channel, &[data(note), data(velocity)])
    }

    pub fn poly_key_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        encode(
            MessageKind::PolyKeyPressure,
            channel,
            &[data(note), data(pressure)],
        )
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        encode(
            MessageKind::ControlChange,
            channel,
            &[data(controller), data(value)],
        )
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        encode(MessageKind::ProgramChange, channel, &[data(program)])
    }

    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        encode(MessageKind::ChannelPressure, channel, &[data(pressure)])
    }

    /// Pitch bend from the two 7-bit halves of the 14-bit value
    pub fn pitch_bend(channel: u8, lsb: u8, msb: u8) -> Self {
        encode(MessageKind::PitchBend, channel, &[data(lsb), data(msb)])
    }

    /// Pitch bend from a value between -1 and 1 where 0 means no bend. Values out of range are
    /// clamped and NaN is treated as 0.
    pub fn pitch_bend_f32(channel: u8, value: f32) -> Self {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(-1.0, 1.0)
        };
        let bend = (value * PITCH_BEND_CENTRE as f32 + PITCH_BEND_CENTRE as f32)
            .round()
            .clamp(0.0, PITCH_BEND_MAX as f32) as u16;
        let lsb = (bend & 0x7F) as u8;
        let msb = (bend >> 7) as u8;
        Self::pitch_bend(channel, lsb, msb)
    }

    /// The 14-bit value of a pitch bend message
    pub fn pitch_bend_value(&self) -> Option<u16> {
        match (self.kind(), self.data()) {
            (Some(MessageKind::PitchBend), &[lsb, msb]) => {
                Some(((msb as u16) << 7) | lsb as u16)
            }
            _ => None,
        }
    }

    /// Frames an arbitrary payload between a system exclusive header on channel 0 and the
    /// end-of-exclusive terminator. The payload is copied unchanged.
    pub fn system_exclusive(payload: &[u8]) -> Self {
        let mut message = encode(MessageKind::SystemExclusive, 0, payload);
        message.0.push(END_OF_EXCLUSIVE);
        message
    }

    pub fn all_sounds_off(channel: u8) -> Self {
        Self::control_change(channel, controller::ALL_SOUNDS_OFF, 0)
    }

    pub fn reset_all_controllers(channel: u8) -> Self {
        Self::control_change(channel, controller::RESET_ALL_CONTROLLERS, 0)
    }

    pub fn local_control(channel: u8, on: bool) -> Self {
        let value = if on { 127 } else { 0 };
        Self::control_change(channel, controller::LOCAL_CONTROL, value)
    }

    pub fn all_notes_off(channel: u8) -> Self {
        Self::control_change(channel, controller::ALL_NOTES_OFF, 0)
    }

    pub fn omni_off(channel: u8) -> Self {
        Self::control_change(channel, controller::OMNI_OFF, 0)
    }

    pub fn omni_on(channel: u8) -> Self {
        Self::control_change(channel, controller::OMNI_ON, 0)
    }

    pub fn mono_on(channel: u8) -> Self {
        Self::control_change(channel, controller::MONO_ON, 0)
    }

    pub fn poly_on(channel: u8) -> Self {
        Self::control_change(channel, controller::POLY_ON, 0)
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn full_bend_up_is_clamped() {
        let message = Message::pitch_bend_f32(0, 1.0);
        assert_eq!(message.as_bytes(), &[0x0E, 127, 127]);
        assert_eq!(message.pitch_bend_value(), Some(PITCH_BEND_MAX));
    }

    #[test]
    fn no_bend_is_centred() {
        let message = Message::pitch_bend_f32(0, 0.0);
        assert_eq!(message.data(), &[0, 64]);
        assert_eq!(message.pitch_bend_value(), Some(8192));
    }

    #[test]
    fn bend_extremes_and_nan() {
        let bend = |value| Message::pitch_bend_f32(0, value).pitch_bend_value();
        assert_eq!(bend(-1.0), Some(0));
        assert_eq!(bend(-7.5), Some(0));
        assert_eq!(bend(3.0), Some(PITCH_BEND_MAX));
        assert_eq!(bend(f32::NAN), Some(PITCH_BEND_CENTRE));
        assert_eq!(bend(0.5), Some(12288));
    }

    #[test]
    fn bend_sweep_is_within_half_a_step() {
        for step in -16..16 {
            let value = step as f32 / 16.0;
            let bend = Message::pitch_bend_f32(0, value)
                .pitch_bend_value()
                .unwrap();
            let centre = PITCH_BEND_CENTRE as f32;
            let recovered = (bend as f32 - centre) / centre;
            assert_abs_diff_eq!(recovered, value, epsilon = 0.5 / centre);
        }
    }

    #[test]
    fn status_byte_keeps_only_high_nibble_of_channel() {
        assert_eq!(status_byte(MessageKind::NoteOn, 0), 0x09);
        assert_eq!(status_byte(MessageKind::NoteOn, 0x30), 0x39);
        // the low nibble of the channel is discarded
        assert_eq!(status_byte(MessageKind::NoteOn, 0x03), 0x09);
        let message = Message::note_off(0x50, 60, 0);
        assert_eq!(message.kind(), Some(MessageKind::NoteOff));
        assert_eq!(message.channel(), 0x50);
    }

    #[test]
    fn encode_copies_data_verbatim() {
        let message = encode(MessageKind::ControlChange, 0x10, &[0xFF, 0x80]);
        assert_eq!(message.as_bytes(), &[0x1B, 0xFF, 0x80]);
    }

    #[test]
    fn constructors_mask_data_to_seven_bits() {
        let message = Message::note_on(0, 0x80 | 60, 200);
        assert_eq!(message.data(), &[60, 200 & 0x7F]);
        assert_eq!(Message::program_change(0, 5).as_bytes(), &[0x0C, 5]);
        assert_eq!(Message::channel_pressure(0x20, 99).as_bytes(), &[0x2D, 99]);
        assert_eq!(
            Message::poly_key_pressure(0, 61, 12).as_bytes(),
            &[0x0A, 61, 12]
        );
    }

    #[test]
    fn system_exclusive_is_framed() {
        let message = Message::system_exclusive(&[0x7E, 0x7F, 0x09, 0x01]);
        assert_eq!(
            message.as_bytes(),
            &[0x0F, 0x7E, 0x7F, 0x09, 0x01, END_OF_EXCLUSIVE]
        );
        assert_eq!(message.kind(), Some(MessageKind::SystemExclusive));
        assert_eq!(Message::system_exclusive(&[]).as_bytes(), &[0x0F, 0xF7]);
    }

    #[test]
    fn channel_mode_messages() {
        let cases = [
            (Message::all_sounds_off(0x10), 120, 0),
            (Message::reset_all_controllers(0x10), 121, 0),
            (Message::local_control(0x10, false), 122, 0),
            (Message::local_control(0x10, true), 122, 127),
            (Message::all_notes_off(0x10), 123, 0),
            (Message::omni_off(0x10), 124, 0),
            (Message::omni_on(0x10), 125, 0),
            (Message::mono_on(0x10), 126, 0),
            (Message::poly_on(0x10), 127, 0),
        ];
        for (message, controller, value) in cases {
            assert_eq!(message.as_bytes(), &[0x1B, controller, value]);
        }
    }

    #[test]
    fn data_byte_counts() {
        for (message, kind) in [
            (Message::note_on(0, 60, 100), MessageKind::NoteOn),
            (Message::program_change(0, 1), MessageKind::ProgramChange),
            (Message::pitch_bend(0, 0, 64), MessageKind::PitchBend),
        ] {
            assert_eq!(Some(message.data().len()), kind.num_data_bytes());
        }
    }
}
