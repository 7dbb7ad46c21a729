//! Notes of an 88-key piano in MIDI numbering. The lowest key is A_0 (MIDI index 21) and the
//! highest is C_8 (MIDI index 108). C is considered the first note in each octave and C_4 is
//! middle C. Only the first and last octaves are partial: octave 0 holds A_0, A_sharp_0 and B_0,
//! and octave 8 holds only C_8.
use crate::error::{Error, Result};
use std::fmt::Display;

pub const NOTES_PER_OCTAVE: u8 = 12;
pub const WHITE_KEYS_PER_OCTAVE: usize = 7;
pub const NUM_KEYS: usize = 88;
pub const NUM_WHITE_KEYS: usize = 52;
pub const NUM_BLACK_KEYS: usize = 36;

const LOWEST_MIDI_INDEX: u8 = 21;
const HIGHEST_MIDI_INDEX: u8 = 108;

const NAMES_SHARP: [&str; NOTES_PER_OCTAVE as usize] = [
    "C", "C_sharp", "D", "D_sharp", "E", "F", "F_sharp", "G", "G_sharp", "A",
    "A_sharp", "B",
];

/// An octave containing at least one key of the piano. Octaves 0 and 8 are only partially
/// present on the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Octave {
    index: u8,
}

impl Octave {
    pub const MIN: Self = Self { index: 0 };
    pub const MAX: Self = Self { index: 8 };
    pub const MIDDLE: Self = Self { index: 4 };

    pub fn new(index: i32) -> Option<Self> {
        if index < Self::MIN.index as i32 || index > Self::MAX.index as i32 {
            None
        } else {
            Some(Self { index: index as u8 })
        }
    }

    /// Like `new` but out of range indices are moved to the nearest octave on the keyboard
    pub fn clamped(index: i32) -> Self {
        Self {
            index: index.clamp(Self::MIN.index as i32, Self::MAX.index as i32)
                as u8,
        }
    }

    pub const fn index(self) -> u8 {
        self.index
    }

    /// The MIDI index of this octave's C. This may be below the keyboard (for octave 0).
    pub const fn c_midi_index(self) -> u8 {
        (self.index + 1) * NOTES_PER_OCTAVE
    }

    /// Steps by a number of octaves, stopping at either end of the keyboard
    pub fn offset_clamped(self, num_octaves: i32) -> Self {
        Self::clamped(self.index as i32 + num_octaves)
    }

    /// The notes of this octave which exist on the keyboard, in ascending order
    pub fn notes(self) -> impl Iterator<Item = Note> {
        let c = self.c_midi_index();
        (c..(c + NOTES_PER_OCTAVE))
            .filter_map(|midi_index| Note::from_midi_index(midi_index).ok())
    }

    /// The range of notes of this octave which exist on the keyboard
    pub fn note_range(self) -> NoteRange {
        let c = self.c_midi_index();
        NoteRange {
            low: Note::clamped(c),
            high: Note::clamped(c + NOTES_PER_OCTAVE - 1),
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN.index..=Self::MAX.index).map(|index| Self { index })
    }
}

impl Default for Octave {
    fn default() -> Self {
        Self::MIDDLE
    }
}

/// A key of the piano identified by its MIDI index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note {
    midi_index: u8,
}

impl Note {
    pub const LOWEST: Self = Self {
        midi_index: LOWEST_MIDI_INDEX,
    };
    pub const HIGHEST: Self = Self {
        midi_index: HIGHEST_MIDI_INDEX,
    };
    pub const MIDDLE_C: Self = Self { midi_index: 60 };

    /// Notes outside the piano's range are rejected here so they never reach the geometry
    pub fn from_midi_index(midi_index: u8) -> Result<Self> {
        if (LOWEST_MIDI_INDEX..=HIGHEST_MIDI_INDEX).contains(&midi_index) {
            Ok(Self { midi_index })
        } else {
            Err(Error::OutOfRangeNote(midi_index))
        }
    }

    fn clamped(midi_index: u8) -> Self {
        Self {
            midi_index: midi_index.clamp(LOWEST_MIDI_INDEX, HIGHEST_MIDI_INDEX),
        }
    }

    pub const fn to_midi_index(self) -> u8 {
        self.midi_index
    }

    /// Position of the key counting from the lowest key (0 to 87)
    pub const fn key_index(self) -> usize {
        (self.midi_index - LOWEST_MIDI_INDEX) as usize
    }

    pub fn from_key_index(key_index: usize) -> Option<Self> {
        if key_index < NUM_KEYS {
            Some(Self {
                midi_index: LOWEST_MIDI_INDEX + key_index as u8,
            })
        } else {
            None
        }
    }

    /// Position within the octave where C is 0 and B is 11
    pub const fn pitch_class(self) -> u8 {
        self.midi_index % NOTES_PER_OCTAVE
    }

    pub const fn octave(self) -> Octave {
        Octave {
            index: (self.midi_index / NOTES_PER_OCTAVE) - 1,
        }
    }

    pub fn is_black(self) -> bool {
        crate::shape::KeyShape::for_note(self).is_black
    }

    /// Returns a str representation of the note name where all accidentals are sharp, formatted
    /// like "C" or "C_sharp"
    pub fn name_sharp(self) -> &'static str {
        NAMES_SHARP[self.pitch_class() as usize]
    }

    /// All 88 keys from lowest to highest
    pub fn all() -> impl Iterator<Item = Self> {
        (LOWEST_MIDI_INDEX..=HIGHEST_MIDI_INDEX)
            .map(|midi_index| Self { midi_index })
    }
}

impl TryFrom<u8> for Note {
    type Error = Error;

    fn try_from(midi_index: u8) -> Result<Self> {
        Self::from_midi_index(midi_index)
    }
}

/// Example formats: "C_sharp:4", "A:0"
impl Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name_sharp(), self.octave().index())
    }
}

/// An inclusive range of notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteRange {
    pub low: Note,
    pub high: Note,
}

impl NoteRange {
    pub const FULL: Self = Self {
        low: Note::LOWEST,
        high: Note::HIGHEST,
    };

    pub fn contains(&self, note: Note) -> bool {
        self.low <= note && note <= self.high
    }

    pub fn len(&self) -> usize {
        self.high.key_index() + 1 - self.low.key_index()
    }

    pub fn iter(&self) -> impl Iterator<Item = Note> {
        let Self { low, high } = *self;
        Note::all().filter(move |&note| low <= note && note <= high)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_count() {
        assert_eq!(Note::all().count(), NUM_KEYS);
        assert_eq!(Note::all().filter(|note| note.is_black()).count(), 36);
        assert_eq!(Note::all().filter(|note| !note.is_black()).count(), 52);
    }

    #[test]
    fn out_of_range_notes_are_rejected() {
        assert_eq!(Note::from_midi_index(20), Err(Error::OutOfRangeNote(20)));
        assert_eq!(Note::from_midi_index(109), Err(Error::OutOfRangeNote(109)));
        assert_eq!(Note::from_midi_index(21).map(Note::key_index), Ok(0));
        assert_eq!(Note::from_midi_index(108).map(Note::key_index), Ok(87));
    }

    #[test]
    fn boundary_octaves() {
        assert_eq!(Note::LOWEST.octave(), Octave::MIN);
        assert_eq!(Note::HIGHEST.octave(), Octave::MAX);
        assert_eq!(Note::MIDDLE_C.octave(), Octave::MIDDLE);
        assert_eq!(Octave::MIN.notes().count(), 3);
        assert_eq!(Octave::MAX.notes().count(), 1);
        assert_eq!(Octave::MIDDLE.notes().count(), 12);
    }

    #[test]
    fn octave_clamping() {
        assert_eq!(Octave::new(9), None);
        assert_eq!(Octave::clamped(-3), Octave::MIN);
        assert_eq!(Octave::MAX.offset_clamped(1), Octave::MAX);
        assert_eq!(Octave::MIDDLE.offset_clamped(-1).index(), 3);
    }

    #[test]
    fn partial_octave_ranges() {
        assert_eq!(
            Octave::MIN.note_range(),
            NoteRange {
                low: Note::LOWEST,
                high: Note::from_midi_index(23).unwrap(),
            }
        );
        assert_eq!(Octave::MAX.note_range().len(), 1);
        assert_eq!(Octave::MIDDLE.note_range().len(), 12);
    }

    #[test]
    fn display() {
        assert_eq!(Note::LOWEST.to_string(), "A:0");
        assert_eq!(Note::from_midi_index(61).unwrap().to_string(), "C_sharp:4");
    }
}
