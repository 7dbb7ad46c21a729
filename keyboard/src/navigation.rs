use crate::{
    geometry::{
        Cursor, KeyRect, KeyboardGeometry, LayoutMetrics, note_centre_01,
    },
    note::{Note, NoteRange, Octave},
};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// The detail keyboard scrolls smoothly across the whole range
    #[default]
    Free,
    /// The detail keyboard shows one octave at a time and jumps between octaves
    Octave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    last_x: f64,
    /// Distance dragged since the last octave jump. Only used in octave mode.
    accumulated_px: f64,
}

/// Owns the position of the detail keyboard and moves it in response to drags on the overview
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    mode: NavigationMode,
    scroll_01: f64,
    octave: Octave,
    drag: Option<Drag>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(NavigationMode::Free, Octave::default())
    }
}

impl NavigationState {
    pub fn new(mode: NavigationMode, octave: Octave) -> Self {
        Self {
            mode,
            scroll_01: 0.0,
            octave,
            drag: None,
        }
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn scroll_01(&self) -> f64 {
        self.scroll_01
    }

    pub fn octave(&self) -> Octave {
        self.octave
    }

    pub fn cursor(&self) -> Cursor {
        match self.mode {
            NavigationMode::Free => Cursor::Free {
                scroll_01: self.scroll_01,
            },
            NavigationMode::Octave => Cursor::Octave(self.octave),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self, x: f64) {
        self.drag = Some(Drag {
            last_x: x,
            accumulated_px: 0.0,
        });
    }

    /// Moves the cursor according to how far the pointer moved since the previous call (or since
    /// the drag began). Returns true if the cursor changed, meaning the keyboard must be laid out
    /// again.
    pub fn continue_drag(&mut self, x: f64, metrics: &LayoutMetrics) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let delta_px = x - drag.last_x;
        drag.last_x = x;
        match self.mode {
            NavigationMode::Free => {
                let travel_px = metrics.overview_travel();
                if travel_px <= 0.0 {
                    // the whole keyboard is visible so there is nowhere to scroll to
                    let changed = self.scroll_01 != 0.0;
                    self.scroll_01 = 0.0;
                    return changed;
                }
                let previous = self.scroll_01;
                self.scroll_01 =
                    (self.scroll_01 + delta_px / travel_px).clamp(0.0, 1.0);
                self.scroll_01 != previous
            }
            NavigationMode::Octave => {
                drag.accumulated_px += delta_px;
                let threshold_px = metrics.overview_octave_width;
                if drag.accumulated_px.abs() <= threshold_px {
                    return false;
                }
                let step = if drag.accumulated_px > 0.0 { 1 } else { -1 };
                drag.accumulated_px = 0.0;
                let previous = self.octave;
                self.octave = self.octave.offset_clamped(step);
                if self.octave != previous {
                    log::debug!("Jumped to octave {}", self.octave.index());
                }
                self.octave != previous
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Changes mode, keeping roughly the same part of the keyboard in view. `visible` is the range
    /// visible before the change.
    pub fn set_mode(
        &mut self,
        mode: NavigationMode,
        visible: Option<NoteRange>,
        metrics: Option<&LayoutMetrics>,
    ) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        // a drag in progress carries on in the new mode from the pointer's current position
        if let Some(drag) = self.drag.as_mut() {
            drag.accumulated_px = 0.0;
        }
        if let Some(visible) = visible {
            let centre = Note::from_key_index(
                (visible.low.key_index() + visible.high.key_index()) / 2,
            )
            .unwrap_or(Note::MIDDLE_C);
            self.scroll_to_note(centre, metrics);
        }
    }

    pub fn set_octave(&mut self, octave: Octave) {
        self.octave = octave;
    }

    pub fn set_scroll_01(&mut self, scroll_01: f64) {
        self.scroll_01 = if scroll_01.is_nan() {
            0.0
        } else {
            scroll_01.clamp(0.0, 1.0)
        };
    }

    /// Brings a note into view. In octave mode this selects the note's octave. In free mode the
    /// detail keyboard is scrolled to centre the note as far as the ends of the keyboard allow.
    pub fn scroll_to_note(
        &mut self,
        note: Note,
        metrics: Option<&LayoutMetrics>,
    ) {
        match self.mode {
            NavigationMode::Octave => self.octave = note.octave(),
            NavigationMode::Free => {
                if let Some(metrics) = metrics {
                    let scrollable_px = metrics.scrollable_width();
                    if scrollable_px <= 0.0 {
                        self.scroll_01 = 0.0;
                    } else {
                        let centre_px = note_centre_01(note)
                            * metrics.detail_keyboard_width;
                        self.set_scroll_01(
                            (centre_px - metrics.detail_width / 2.0)
                                / scrollable_px,
                        );
                    }
                }
            }
        }
    }

    /// The notes shown by the detail pane. `detail_keys` must have been laid out with this
    /// state's current cursor and be in ascending order of note.
    pub fn visible_note_range(
        &self,
        detail_keys: &[KeyRect],
        detail_bounds: Rect,
    ) -> Option<NoteRange> {
        match self.mode {
            NavigationMode::Octave => Some(self.octave.note_range()),
            NavigationMode::Free => {
                KeyboardGeometry::notes_in_span(detail_keys, detail_bounds)
            }
        }
    }
}
