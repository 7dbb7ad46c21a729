//! The keyboard as a whole: two panes of keys, the navigation cursor and the pointers touching
//! it. Changing anything that affects the position of keys only marks the keyboard as needing
//! layout. The layout is recomputed at most once per batch of changes, either explicitly with
//! `relayout` or lazily when the next pointer event or frame needs it.
use crate::{
    config::KeyboardConfig,
    error::Result,
    event::{NoteEvent, NoteListener},
    geometry::{
        Cursor, KeyRect, KeyboardGeometry, LayoutMetrics, SizingMode,
        split_view,
    },
    navigation::{NavigationMode, NavigationState},
    note::{Note, NoteRange, Octave},
    touch::{HitRegions, PointerEvent, PointerPhase, TouchController},
};
use kurbo::Rect;
use std::collections::BTreeSet;

/// A key as it should be drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame {
    pub note: Note,
    /// Clipped to the pane
    pub rect: Rect,
    pub is_black: bool,
    pub is_held: bool,
    /// The key is currently shown in the detail pane
    pub in_visible_range: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaneFrame {
    pub bounds: Rect,
    /// White keys followed by black keys, so drawing them in order leaves black keys on top
    pub keys: Vec<KeyFrame>,
}

/// A snapshot of everything a renderer needs to draw the keyboard
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub overview: PaneFrame,
    pub detail: PaneFrame,
    /// The part of the overview showing what the detail pane shows
    pub viewport_indicator: Rect,
    pub visible_range: Option<NoteRange>,
}

/// The result of the most recent successful layout pass
#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    overview_bounds: Rect,
    detail_bounds: Rect,
    metrics: LayoutMetrics,
    viewport_indicator: Rect,
    visible_range: Option<NoteRange>,
}

/// Forwards note events to the caller's listener, updating the set of highlighted keys on the way
/// if local echo is enabled
struct Echo<'a, L> {
    displayed: Option<&'a mut BTreeSet<Note>>,
    listener: &'a mut L,
}

impl<L: NoteListener> NoteListener for Echo<'_, L> {
    fn note_event(&mut self, event: NoteEvent) {
        if let Some(displayed) = self.displayed.as_mut() {
            if event.is_down() {
                displayed.insert(event.note);
            } else {
                displayed.remove(&event.note);
            }
        }
        self.listener.note_event(event);
    }
}

fn detail_sizing_mode(mode: NavigationMode) -> SizingMode {
    match mode {
        NavigationMode::Free => SizingMode::FitHeightByAspectRatio,
        NavigationMode::Octave => SizingMode::FitWidthToWhiteKeys,
    }
}

fn pane_frame(
    bounds: Rect,
    keys: &[KeyRect],
    displayed: &BTreeSet<Note>,
    visible_range: Option<NoteRange>,
) -> PaneFrame {
    let whites = keys.iter().filter(|key| !key.is_black);
    let blacks = keys.iter().filter(|key| key.is_black);
    let keys = whites
        .chain(blacks)
        .filter_map(|key| {
            let rect = key.rect.intersect(bounds);
            if rect.area() <= 0.0 {
                return None;
            }
            Some(KeyFrame {
                note: key.note,
                rect,
                is_black: key.is_black,
                is_held: displayed.contains(&key.note),
                in_visible_range: visible_range
                    .is_some_and(|range| range.contains(key.note)),
            })
        })
        .collect();
    PaneFrame { bounds, keys }
}

pub struct Keyboard {
    config: KeyboardConfig,
    geometry: KeyboardGeometry,
    navigation: NavigationState,
    touch: TouchController,
    view_bounds: Option<Rect>,
    overview_keys: Vec<KeyRect>,
    detail_keys: Vec<KeyRect>,
    layout: Option<Layout>,
    /// Notes drawn as held
    displayed: BTreeSet<Note>,
    needs_layout: bool,
}

impl Keyboard {
    pub fn new(config: KeyboardConfig) -> Self {
        let geometry = KeyboardGeometry::new(config.aspect_ratio);
        let navigation =
            NavigationState::new(config.navigation_mode(), config.octave());
        Self {
            config,
            geometry,
            navigation,
            touch: TouchController::new(),
            view_bounds: None,
            overview_keys: KeyRect::all(),
            detail_keys: KeyRect::all(),
            layout: None,
            displayed: BTreeSet::new(),
            needs_layout: true,
        }
    }

    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// The area containing both panes
    pub fn set_view_bounds(&mut self, view_bounds: Rect) {
        if self.view_bounds != Some(view_bounds) {
            self.view_bounds = Some(view_bounds);
            self.needs_layout = true;
        }
    }

    /// Changes navigation mode, keeping the notes shown by the most recent layout in view
    pub fn set_mode(&mut self, mode: NavigationMode) {
        if mode == self.navigation.mode() {
            return;
        }
        log::debug!("Switching to {:?} mode", mode);
        // a drag may have moved the cursor since the last frame
        self.relayout();
        let visible_range = self.layout.and_then(|layout| layout.visible_range);
        // the size of the detail keyboard depends on the mode
        let metrics = self.layout.and_then(|layout| {
            self.geometry
                .metrics(
                    layout.overview_bounds,
                    layout.detail_bounds,
                    detail_sizing_mode(mode),
                    Cursor::START,
                )
                .ok()
        });
        self.navigation.set_mode(mode, visible_range, metrics.as_ref());
        self.config.octave_mode = mode == NavigationMode::Octave;
        self.needs_layout = true;
    }

    pub fn toggle_mode(&mut self) {
        let mode = match self.navigation.mode() {
            NavigationMode::Free => NavigationMode::Octave,
            NavigationMode::Octave => NavigationMode::Free,
        };
        self.set_mode(mode);
    }

    pub fn set_octave(&mut self, octave: Octave) {
        self.navigation.set_octave(octave);
        self.config.octave = octave.index();
        self.needs_layout = true;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.geometry = KeyboardGeometry::new(aspect_ratio);
        self.config.aspect_ratio = self.geometry.aspect_ratio();
        self.needs_layout = true;
    }

    /// Turning local echo on makes the highlighted keys match the keys currently held. Turning it
    /// off leaves the highlighted keys entirely up to `set_note_displayed`.
    pub fn set_local_echo(&mut self, local_echo: bool) {
        if local_echo == self.config.local_echo {
            return;
        }
        self.config.local_echo = local_echo;
        self.displayed.clear();
        if local_echo {
            self.displayed.extend(self.touch.held_notes());
        }
    }

    pub fn scroll_to_note(&mut self, note: Note) {
        self.relayout();
        let metrics = self.layout.map(|layout| layout.metrics);
        self.navigation.scroll_to_note(note, metrics.as_ref());
        self.needs_layout = true;
    }

    /// Highlights or un-highlights a key. Hosts that disable local echo call this once they have
    /// acted on a note event.
    pub fn set_note_displayed(&mut self, note: Note, displayed: bool) {
        if displayed {
            self.displayed.insert(note);
        } else {
            self.displayed.remove(&note);
        }
    }

    pub fn is_note_displayed(&self, note: Note) -> bool {
        self.displayed.contains(&note)
    }

    /// Notes held by pointers, in ascending order. This can differ from the highlighted notes
    /// when local echo is off.
    pub fn held_notes(&self) -> Vec<Note> {
        self.touch.held_notes()
    }

    /// The notes shown in the detail pane as of the most recent layout
    pub fn visible_range(&self) -> Option<NoteRange> {
        self.layout.and_then(|layout| layout.visible_range)
    }

    fn try_layout(&mut self, view_bounds: Rect) -> Result<Layout> {
        let (overview_bounds, detail_bounds) =
            split_view(view_bounds, self.geometry.aspect_ratio())?;
        let cursor = self.navigation.cursor();
        let detail_sizing_mode = detail_sizing_mode(self.navigation.mode());
        let metrics = self.geometry.metrics(
            overview_bounds,
            detail_bounds,
            detail_sizing_mode,
            cursor,
        )?;
        let viewport_indicator =
            self.geometry
                .viewport_indicator(overview_bounds, cursor, &metrics)?;
        self.geometry.layout_into(
            overview_bounds,
            SizingMode::FitWidthToWhiteKeys,
            Cursor::START,
            &mut self.overview_keys,
        )?;
        self.geometry.layout_into(
            detail_bounds,
            detail_sizing_mode,
            cursor,
            &mut self.detail_keys,
        )?;
        let visible_range = self
            .navigation
            .visible_note_range(&self.detail_keys, detail_bounds);
        Ok(Layout {
            overview_bounds,
            detail_bounds,
            metrics,
            viewport_indicator,
            visible_range,
        })
    }

    /// Recomputes the rectangles of both panes and the visible range if anything changed since
    /// the last layout. If the view is degenerate the previous layout is kept.
    pub fn relayout(&mut self) {
        if !self.needs_layout {
            return;
        }
        self.needs_layout = false;
        let Some(view_bounds) = self.view_bounds else {
            return;
        };
        match self.try_layout(view_bounds) {
            Ok(layout) => self.layout = Some(layout),
            Err(e) => log::warn!("Skipping layout: {}", e),
        }
    }

    /// Feeds a pointer event through the keyboard. Note events are passed to `listener` as they
    /// happen.
    pub fn handle_pointer<L: NoteListener>(
        &mut self,
        event: PointerEvent,
        listener: &mut L,
    ) {
        self.relayout();
        match event.phase {
            PointerPhase::Down => {
                let Some(layout) = self.layout else {
                    log::debug!("Ignoring press before the first layout");
                    return;
                };
                let regions = HitRegions {
                    overview: layout.overview_bounds,
                    detail: layout.detail_bounds,
                    detail_keys: &self.detail_keys,
                };
                let mut echo = Echo {
                    displayed: self
                        .config
                        .local_echo
                        .then_some(&mut self.displayed),
                    listener,
                };
                self.touch.pointer_down(
                    event.pointer,
                    event.position,
                    &regions,
                    &mut self.navigation,
                    &mut echo,
                );
            }
            PointerPhase::Move => {
                let Some(layout) = self.layout else {
                    return;
                };
                if self.touch.pointer_move(
                    event.pointer,
                    event.position,
                    &layout.metrics,
                    &mut self.navigation,
                ) {
                    self.needs_layout = true;
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let mut echo = Echo {
                    displayed: self
                        .config
                        .local_echo
                        .then_some(&mut self.displayed),
                    listener,
                };
                self.touch
                    .pointer_up(event.pointer, &mut self.navigation, &mut echo);
            }
        }
    }

    /// Releases every pointer, e.g. when the window loses focus
    pub fn cancel_all<L: NoteListener>(&mut self, listener: &mut L) {
        let mut echo = Echo {
            displayed: self.config.local_echo.then_some(&mut self.displayed),
            listener,
        };
        self.touch.cancel_all(&mut self.navigation, &mut echo);
    }

    /// Lays out the keyboard if necessary and describes how to draw it. Returns `None` until the
    /// keyboard has been given a usable view.
    pub fn frame(&mut self) -> Option<Frame> {
        self.relayout();
        let layout = self.layout?;
        Some(Frame {
            overview: pane_frame(
                layout.overview_bounds,
                &self.overview_keys,
                &self.displayed,
                layout.visible_range,
            ),
            detail: pane_frame(
                layout.detail_bounds,
                &self.detail_keys,
                &self.displayed,
                layout.visible_range,
            ),
            viewport_indicator: layout.viewport_indicator,
            visible_range: layout.visible_range,
        })
    }
}
