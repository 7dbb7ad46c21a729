use crate::codec::Message;
use ivory_keyboard::{NoteEvent, NotePhase};
use midly::num::{u4, u7};

/// Turns note events from the keyboard into note on and note off messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMessages {
    pub channel: u4,
    pub velocity: u7,
}

impl Default for NoteMessages {
    fn default() -> Self {
        Self {
            channel: 0.into(),
            velocity: 100.into(),
        }
    }
}

impl NoteMessages {
    pub fn new(channel: u4, velocity: u7) -> Self {
        Self { channel, velocity }
    }

    /// The channel as the codec expects it, in the high nibble
    pub fn channel_byte(&self) -> u8 {
        self.channel.as_int() << 4
    }

    pub fn message(&self, event: NoteEvent) -> Message {
        let note = event.note.to_midi_index();
        match event.phase {
            NotePhase::Down => Message::note_on(
                self.channel_byte(),
                note,
                self.velocity.as_int(),
            ),
            NotePhase::Up => Message::note_off(self.channel_byte(), note, 0),
        }
    }

    pub fn messages<'a>(
        &'a self,
        events: impl IntoIterator<Item = NoteEvent> + 'a,
    ) -> impl Iterator<Item = Message> + 'a {
        events.into_iter().map(|event| self.message(event))
    }

    /// Silences anything left sounding on this channel
    pub fn panic(&self) -> Message {
        Message::all_notes_off(self.channel_byte())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::MessageKind;
    use ivory_keyboard::Note;

    #[test]
    fn note_events_become_note_messages() {
        let note_messages = NoteMessages::new(2.into(), 90.into());
        let c_4 = Note::MIDDLE_C;
        let messages = note_messages
            .messages([NoteEvent::down(c_4), NoteEvent::up(c_4)])
            .collect::<Vec<_>>();
        assert_eq!(messages[0].as_bytes(), &[0x29, 60, 90]);
        assert_eq!(messages[1].as_bytes(), &[0x28, 60, 0]);
        assert_eq!(messages[1].kind(), Some(MessageKind::NoteOff));
    }

    #[test]
    fn panic_targets_the_channel() {
        let note_messages = NoteMessages {
            channel: 15.into(),
            ..Default::default()
        };
        assert_eq!(note_messages.panic().as_bytes(), &[0xFB, 123, 0]);
    }
}
