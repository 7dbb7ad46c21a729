use crate::note::Note;
use smallvec::{SmallVec, smallvec};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotePhase {
    Down,
    Up,
}

/// A key being pressed or released
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteEvent {
    pub phase: NotePhase,
    pub note: Note,
}

impl NoteEvent {
    pub fn down(note: Note) -> Self {
        Self {
            phase: NotePhase::Down,
            note,
        }
    }

    pub fn up(note: Note) -> Self {
        Self {
            phase: NotePhase::Up,
            note,
        }
    }

    pub fn is_down(&self) -> bool {
        self.phase == NotePhase::Down
    }
}

/// The note events produced while handling one frame's worth of input. A frame rarely presses or
/// releases more than a few keys, so this only uses the heap when a lot of fingers land or lift
/// at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteEvents(SmallVec<[NoteEvent; 4]>);

impl NoteEvents {
    pub fn empty() -> Self {
        Self(smallvec![])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, note_event: NoteEvent) {
        self.0.push(note_event);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEvent> {
        self.0.iter()
    }
}

impl IntoIterator for NoteEvents {
    type Item = NoteEvent;

    type IntoIter = smallvec::IntoIter<[NoteEvent; 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NoteEvents {
    type Item = &'a NoteEvent;

    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<NoteEvent> for NoteEvents {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = NoteEvent>,
    {
        Self(iter.into_iter().collect())
    }
}

/// Receives note events as soon as the keyboard produces them
pub trait NoteListener {
    fn note_event(&mut self, event: NoteEvent);
}

impl NoteListener for Vec<NoteEvent> {
    fn note_event(&mut self, event: NoteEvent) {
        self.push(event);
    }
}

impl NoteListener for NoteEvents {
    fn note_event(&mut self, event: NoteEvent) {
        self.push(event);
    }
}

/// Adapts a closure into a `NoteListener`
pub struct ListenerFn<F>(pub F);

impl<F> NoteListener for ListenerFn<F>
where
    F: FnMut(NoteEvent),
{
    fn note_event(&mut self, event: NoteEvent) {
        (self.0)(event)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn listeners_see_events_in_order() {
        let c_4 = Note::MIDDLE_C;
        let mut events = NoteEvents::empty();
        let mut num_downs = 0;
        let mut count_downs = ListenerFn(|event: NoteEvent| {
            if event.is_down() {
                num_downs += 1;
            }
        });
        for event in [NoteEvent::down(c_4), NoteEvent::up(c_4)] {
            events.note_event(event);
            count_downs.note_event(event);
        }
        assert_eq!(num_downs, 1);
        assert_eq!(events.len(), 2);
        let num_buffered_downs =
            (&events).into_iter().filter(|event| event.is_down()).count();
        assert_eq!(num_buffered_downs, 1);
        assert_eq!(
            events.into_iter().map(|event| event.phase).collect::<Vec<_>>(),
            vec![NotePhase::Down, NotePhase::Up]
        );
    }

    #[test]
    fn cleared_buffer_is_reused() {
        let mut events = NoteEvents::empty();
        events.note_event(NoteEvent::down(Note::MIDDLE_C));
        events.clear();
        assert!(events.is_empty());
        events.note_event(NoteEvent::up(Note::MIDDLE_C));
        assert_eq!(
            events.iter().copied().collect::<Vec<_>>(),
            vec![NoteEvent::up(Note::MIDDLE_C)]
        );
    }
}
