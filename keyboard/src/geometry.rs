//! Placement of keys on a pane. All functions here are pure: the same inputs always produce the
//! same rectangles, and it's up to the caller to lay out again whenever a pane is resized, the
//! navigation mode changes or the scroll position moves.
use crate::{
    error::{Error, Result},
    note::{
        NUM_KEYS, NUM_WHITE_KEYS, Note, NoteRange, Octave,
        WHITE_KEYS_PER_OCTAVE,
    },
    shape::KeyShape,
};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Width:height of the whole 88-key keyboard, roughly that of a grand piano
pub const DEFAULT_ASPECT_RATIO: f64 = 6.52;

const NUM_OCTAVES: usize = Octave::MAX.index() as usize + 1;

/// Keys must overlap a span by more than this to be considered inside it
const MIN_OVERLAP_PX: f64 = 1e-6;

/// How the size of the keys is derived from the size of the pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizingMode {
    /// Key widths are chosen so the keyboard exactly spans the pane. Without an octave cursor
    /// all 52 white keys fill the width. With an octave cursor the 7 white keys of that octave
    /// fill the width.
    FitWidthToWhiteKeys,
    /// Key widths are derived from the pane height so the keyboard keeps its aspect ratio. The
    /// keyboard may be wider than the pane, in which case it can be scrolled.
    FitHeightByAspectRatio,
}

/// The position of the detail keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cursor {
    /// Horizontal scroll position where 0 shows the lowest key at the left edge of the pane and
    /// 1 shows the highest key at the right edge
    Free { scroll_01: f64 },
    /// A single octave is shown at a time
    Octave(Octave),
}

impl Cursor {
    pub const START: Self = Self::Free { scroll_01: 0.0 };
}

/// A key placed on a pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRect {
    pub note: Note,
    pub rect: Rect,
    pub is_black: bool,
}

impl KeyRect {
    pub fn new(note: Note) -> Self {
        Self {
            note,
            rect: Rect::ZERO,
            is_black: note.is_black(),
        }
    }

    /// One unplaced key for each note of the keyboard in ascending order
    pub fn all() -> Vec<Self> {
        Note::all().map(Self::new).collect()
    }
}

/// Numbers describing the current layout that are needed to turn drags on the overview into
/// movement of the detail keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub overview_width: f64,
    pub overview_octave_width: f64,
    pub detail_width: f64,
    /// Width of all 88 keys at the detail pane's scale
    pub detail_keyboard_width: f64,
}

impl LayoutMetrics {
    /// The fraction of the keyboard visible in the detail pane
    pub fn visible_fraction(&self) -> f64 {
        if self.detail_keyboard_width <= 0.0 {
            1.0
        } else {
            (self.detail_width / self.detail_keyboard_width).min(1.0)
        }
    }

    /// How far the detail keyboard can be scrolled, in detail pane pixels
    pub fn scrollable_width(&self) -> f64 {
        (self.detail_keyboard_width - self.detail_width).max(0.0)
    }

    /// How far the viewport indicator can move along the overview, in overview pixels
    pub fn overview_travel(&self) -> f64 {
        self.overview_width * (1.0 - self.visible_fraction())
    }
}

/// Where the keyboard sits within a pane and how large its keys are
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    left: f64,
    top: f64,
    white_key_width: f64,
    height: f64,
}

impl Placement {
    fn octave_width(&self) -> f64 {
        self.white_key_width * WHITE_KEYS_PER_OCTAVE as f64
    }

    fn keyboard_width(&self) -> f64 {
        self.white_key_width * NUM_WHITE_KEYS as f64
    }

    fn right(&self) -> f64 {
        self.left + self.keyboard_width()
    }
}

fn validate(bounds: Rect) -> Result<()> {
    let width = bounds.width();
    let height = bounds.height();
    // written so that NaN is rejected too
    if width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidBounds { width, height })
    }
}

/// Distance from the left edge of C_0 to the left edge of the lowest key, in octaves
fn lowest_key_offset_01() -> f64 {
    KeyShape::for_note(Note::LOWEST).left
}

/// Distance from the left edge of the lowest key to the left edge of the C of an octave. This is
/// negative for octave 0 whose C is not on the keyboard.
fn octave_offset(octave: Octave, octave_width: f64) -> f64 {
    (octave.index() as f64 - lowest_key_offset_01()) * octave_width
}

/// Position of the centre of a key as a fraction of the width of the keyboard
pub fn note_centre_01(note: Note) -> f64 {
    let octave_width_01 =
        WHITE_KEYS_PER_OCTAVE as f64 / NUM_WHITE_KEYS as f64;
    let shape = KeyShape::for_note(note);
    (note.octave().index() as f64 - lowest_key_offset_01() + shape.centre_x())
        * octave_width_01
}

/// Divides a view into an overview strip along the top and a detail pane below it. The strip is
/// as tall as an overview keyboard spanning the width of the view, but never more than half the
/// view.
pub fn split_view(view: Rect, aspect_ratio: f64) -> Result<(Rect, Rect)> {
    validate(view)?;
    let strip_height = (view.width() / aspect_ratio).min(view.height() / 2.0);
    let split_y = view.y0 + strip_height;
    let overview = Rect::new(view.x0, view.y0, view.x1, split_y);
    let detail = Rect::new(view.x0, split_y, view.x1, view.y1);
    Ok((overview, detail))
}

/// Finds the key under a point. Black keys are drawn over white keys so they are tested first.
pub fn hit_test(keys: &[KeyRect], point: Point) -> Option<Note> {
    let black_keys = keys.iter().filter(|key| key.is_black);
    let white_keys = keys.iter().filter(|key| !key.is_black);
    black_keys
        .chain(white_keys)
        .find(|key| key.rect.contains(point))
        .map(|key| key.note)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardGeometry {
    aspect_ratio: f64,
}

impl Default for KeyboardGeometry {
    fn default() -> Self {
        Self {
            aspect_ratio: DEFAULT_ASPECT_RATIO,
        }
    }
}

impl KeyboardGeometry {
    pub fn new(aspect_ratio: f64) -> Self {
        if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
            Self { aspect_ratio }
        } else {
            log::warn!(
                "Ignoring aspect ratio {}, using {} instead",
                aspect_ratio,
                DEFAULT_ASPECT_RATIO
            );
            Self::default()
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    fn placement(
        &self,
        bounds: Rect,
        sizing_mode: SizingMode,
        cursor: Cursor,
    ) -> Result<Placement> {
        validate(bounds)?;
        let width = bounds.width();
        let height = bounds.height();
        let placement = match (sizing_mode, cursor) {
            (SizingMode::FitWidthToWhiteKeys, Cursor::Free { .. }) => {
                Placement {
                    left: bounds.x0,
                    top: bounds.y0,
                    white_key_width: width / NUM_WHITE_KEYS as f64,
                    height: (width / self.aspect_ratio).min(height),
                }
            }
            (SizingMode::FitWidthToWhiteKeys, Cursor::Octave(octave)) => {
                let white_key_width = width / WHITE_KEYS_PER_OCTAVE as f64;
                let octave_width =
                    white_key_width * WHITE_KEYS_PER_OCTAVE as f64;
                Placement {
                    left: bounds.x0 - octave_offset(octave, octave_width),
                    top: bounds.y0,
                    white_key_width,
                    height,
                }
            }
            (
                SizingMode::FitHeightByAspectRatio,
                Cursor::Free { scroll_01 },
            ) => {
                let white_key_width =
                    (height * self.aspect_ratio) / NUM_WHITE_KEYS as f64;
                let keyboard_width = white_key_width * NUM_WHITE_KEYS as f64;
                let scroll_px = scroll_01.clamp(0.0, 1.0)
                    * (keyboard_width - width).max(0.0);
                Placement {
                    left: bounds.x0 - scroll_px,
                    top: bounds.y0,
                    white_key_width,
                    height,
                }
            }
            (SizingMode::FitHeightByAspectRatio, Cursor::Octave(octave)) => {
                let white_key_width =
                    (height * self.aspect_ratio) / NUM_WHITE_KEYS as f64;
                let octave_width =
                    white_key_width * WHITE_KEYS_PER_OCTAVE as f64;
                Placement {
                    left: bounds.x0 - octave_offset(octave, octave_width),
                    top: bounds.y0,
                    white_key_width,
                    height,
                }
            }
        };
        Ok(placement)
    }

    /// Places each key in `keys` on the pane. The keys may be in any order and need not cover
    /// the whole keyboard. Rectangles of the partial octaves at either end are clipped to the
    /// edges of the keyboard.
    pub fn layout_into(
        &self,
        bounds: Rect,
        sizing_mode: SizingMode,
        cursor: Cursor,
        keys: &mut [KeyRect],
    ) -> Result<()> {
        let placement = self.placement(bounds, sizing_mode, cursor)?;
        let octave_width = placement.octave_width();
        let keyboard_left = placement.left;
        let keyboard_right = placement.right();
        let mut octave_lefts = [0.0; NUM_OCTAVES];
        // C_0 lies to the left of the lowest key
        let mut octave_left =
            keyboard_left - lowest_key_offset_01() * octave_width;
        for slot in octave_lefts.iter_mut() {
            *slot = octave_left;
            octave_left += octave_width;
        }
        for key in keys.iter_mut() {
            let shape = KeyShape::for_note(key.note);
            let octave_left = octave_lefts[key.note.octave().index() as usize];
            let x0 =
                (octave_left + shape.left * octave_width).max(keyboard_left);
            let x1 =
                (octave_left + shape.right * octave_width).min(keyboard_right);
            key.rect = Rect::new(
                x0,
                placement.top + shape.top * placement.height,
                x1,
                placement.top + shape.bottom * placement.height,
            );
            key.is_black = shape.is_black;
        }
        Ok(())
    }

    /// Returns a rectangle for each of the 88 keys in ascending order of note
    pub fn compute_layout(
        &self,
        bounds: Rect,
        sizing_mode: SizingMode,
        cursor: Cursor,
    ) -> Result<Vec<KeyRect>> {
        let mut keys = KeyRect::all();
        self.layout_into(bounds, sizing_mode, cursor, &mut keys)?;
        debug_assert_eq!(keys.len(), NUM_KEYS);
        Ok(keys)
    }

    pub fn metrics(
        &self,
        overview: Rect,
        detail: Rect,
        detail_sizing_mode: SizingMode,
        cursor: Cursor,
    ) -> Result<LayoutMetrics> {
        let overview_placement = self.placement(
            overview,
            SizingMode::FitWidthToWhiteKeys,
            Cursor::START,
        )?;
        let detail_placement =
            self.placement(detail, detail_sizing_mode, cursor)?;
        Ok(LayoutMetrics {
            overview_width: overview_placement.keyboard_width(),
            overview_octave_width: overview_placement.octave_width(),
            detail_width: detail.width(),
            detail_keyboard_width: detail_placement.keyboard_width(),
        })
    }

    /// The part of the overview corresponding to what the detail pane currently shows
    pub fn viewport_indicator(
        &self,
        overview: Rect,
        cursor: Cursor,
        metrics: &LayoutMetrics,
    ) -> Result<Rect> {
        let placement = self.placement(
            overview,
            SizingMode::FitWidthToWhiteKeys,
            Cursor::START,
        )?;
        let bottom = placement.top + placement.height;
        let rect = match cursor {
            Cursor::Free { scroll_01 } => {
                let x0 = placement.left
                    + scroll_01.clamp(0.0, 1.0) * metrics.overview_travel();
                let width =
                    placement.keyboard_width() * metrics.visible_fraction();
                Rect::new(x0, placement.top, x0 + width, bottom)
            }
            Cursor::Octave(octave) => {
                let octave_width = placement.octave_width();
                let x0 = placement.left + octave_offset(octave, octave_width);
                Rect::new(
                    x0.max(placement.left),
                    placement.top,
                    (x0 + octave_width).min(placement.right()),
                    bottom,
                )
            }
        };
        Ok(rect)
    }

    /// The range of notes whose keys lie (at least partially) within the horizontal span of the
    /// pane. Keys which merely touch an edge of the pane don't count. `keys` must be in ascending
    /// order of note.
    pub fn notes_in_span(keys: &[KeyRect], bounds: Rect) -> Option<NoteRange> {
        let mut intersecting = keys
            .iter()
            .filter(|key| {
                let overlap =
                    key.rect.x1.min(bounds.x1) - key.rect.x0.max(bounds.x0);
                overlap > MIN_OVERLAP_PX
            })
            .map(|key| key.note);
        let low = intersecting.next()?;
        let high = intersecting.last().unwrap_or(low);
        Some(NoteRange { low, high })
    }
}
