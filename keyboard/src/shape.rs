use crate::note::{NOTES_PER_OCTAVE, Note, WHITE_KEYS_PER_OCTAVE};

/// Width of a black key as a fraction of the width of a white key
pub const BLACK_KEY_WIDTH_RATIO: f64 = 0.6;

/// Length of a black key as a fraction of the length of a white key
pub const BLACK_KEY_HEIGHT_RATIO: f64 = 0.62;

const WHITE_KEY_WIDTH_01: f64 = 1.0 / WHITE_KEYS_PER_OCTAVE as f64;
const BLACK_KEY_WIDTH_01: f64 = WHITE_KEY_WIDTH_01 * BLACK_KEY_WIDTH_RATIO;

/// The outline of one key within a single octave, normalized so the octave (from the left edge
/// of C to the right edge of B) covers the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyShape {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub is_black: bool,
}

impl KeyShape {
    /// The `i`th white key of the octave, counting from C
    const fn white(i: usize) -> Self {
        Self {
            left: i as f64 * WHITE_KEY_WIDTH_01,
            top: 0.0,
            right: (i + 1) as f64 * WHITE_KEY_WIDTH_01,
            bottom: 1.0,
            is_black: false,
        }
    }

    /// A black key centred on the boundary to the left of the `i`th white key
    const fn black(i: usize) -> Self {
        let centre = i as f64 * WHITE_KEY_WIDTH_01;
        Self {
            left: centre - (BLACK_KEY_WIDTH_01 / 2.0),
            top: 0.0,
            right: centre + (BLACK_KEY_WIDTH_01 / 2.0),
            bottom: BLACK_KEY_HEIGHT_RATIO,
            is_black: true,
        }
    }

    pub fn for_note(note: Note) -> &'static Self {
        &KEY_SHAPES[note.pitch_class() as usize]
    }

    pub fn centre_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Shapes of the keys of one octave, indexed by pitch class (C is 0)
pub static KEY_SHAPES: [KeyShape; NOTES_PER_OCTAVE as usize] = [
    KeyShape::white(0),
    KeyShape::black(1),
    KeyShape::white(1),
    KeyShape::black(2),
    KeyShape::white(2),
    KeyShape::white(3),
    KeyShape::black(4),
    KeyShape::white(4),
    KeyShape::black(5),
    KeyShape::white(5),
    KeyShape::black(6),
    KeyShape::white(6),
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shapes_stay_in_unit_square() {
        for shape in &KEY_SHAPES {
            assert!(shape.left >= 0.0 && shape.right <= 1.0);
            assert!(shape.top >= 0.0 && shape.bottom <= 1.0);
            assert!(shape.left < shape.right && shape.top < shape.bottom);
        }
    }

    #[test]
    fn seven_white_keys_tile_the_octave() {
        let whites = KEY_SHAPES
            .iter()
            .filter(|shape| !shape.is_black)
            .collect::<Vec<_>>();
        assert_eq!(whites.len(), 7);
        assert_eq!(whites[0].left, 0.0);
        for pair in whites.windows(2) {
            assert_eq!(pair[0].right, pair[1].left);
        }
        approx::assert_abs_diff_eq!(whites[6].right, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn black_keys_are_shorter_and_narrower() {
        let white = KEY_SHAPES[0];
        for shape in KEY_SHAPES.iter().filter(|shape| shape.is_black) {
            assert!(shape.bottom < white.bottom);
            assert!(shape.right - shape.left < white.right - white.left);
        }
    }

    #[test]
    fn every_note_has_a_shape() {
        for note in Note::all() {
            let shape = KeyShape::for_note(note);
            assert_eq!(
                shape.is_black,
                matches!(note.pitch_class(), 1 | 3 | 6 | 8 | 10)
            );
        }
    }
}
