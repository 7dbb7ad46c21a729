//! Tracks every pointer (finger, mouse, stylus) touching the keyboard. A pointer that lands on
//! the overview drags the detail keyboard around, and a pointer that lands on a key of the detail
//! pane holds that key down until the pointer is lifted. Each held key produces exactly one down
//! event and, eventually, exactly one up event.
use crate::{
    event::{NoteEvent, NoteListener},
    geometry::{KeyRect, LayoutMetrics, hit_test},
    navigation::NavigationState,
    note::Note,
};
use itertools::Itertools;
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Identifies one point of contact for the duration of its down-move-up lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer: PointerId,
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(
        pointer: PointerId,
        phase: PointerPhase,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            pointer,
            phase,
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerState {
    DraggingOverview,
    HoldingKey(Note),
}

/// The parts of the current layout that pointers can land on
#[derive(Debug, Clone, Copy)]
pub struct HitRegions<'a> {
    pub overview: Rect,
    pub detail: Rect,
    /// Keys of the detail pane in ascending order of note
    pub detail_keys: &'a [KeyRect],
}

#[derive(Debug, Default)]
pub struct TouchController {
    pointers: HashMap<PointerId, PointerState>,
    overview_owner: Option<PointerId>,
}

impl TouchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, note: Note) -> bool {
        self.pointers
            .values()
            .any(|&state| state == PointerState::HoldingKey(note))
    }

    /// Notes currently held by a pointer, in ascending order
    pub fn held_notes(&self) -> Vec<Note> {
        self.pointers
            .values()
            .filter_map(|state| match state {
                PointerState::HoldingKey(note) => Some(*note),
                PointerState::DraggingOverview => None,
            })
            .sorted()
            .collect()
    }

    pub fn overview_owner(&self) -> Option<PointerId> {
        self.overview_owner
    }

    pub fn num_pointers(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer_down<L: NoteListener>(
        &mut self,
        pointer: PointerId,
        position: Point,
        regions: &HitRegions,
        navigation: &mut NavigationState,
        listener: &mut L,
    ) {
        if self.pointers.contains_key(&pointer) {
            // The host never told us this pointer went up. Release whatever it was doing so its
            // note can't get stuck.
            log::debug!("Pointer {:?} went down twice", pointer);
            self.pointer_up(pointer, navigation, listener);
        }
        if regions.overview.contains(position) {
            if self.overview_owner.is_none() {
                log::debug!("Pointer {:?} is dragging the overview", pointer);
                self.overview_owner = Some(pointer);
                self.pointers.insert(pointer, PointerState::DraggingOverview);
                navigation.begin_drag(position.x);
            }
            return;
        }
        if !regions.detail.contains(position) {
            return;
        }
        let Some(note) = hit_test(regions.detail_keys, position) else {
            return;
        };
        if self.is_held(note) {
            return;
        }
        self.pointers.insert(pointer, PointerState::HoldingKey(note));
        listener.note_event(NoteEvent::down(note));
    }

    /// Returns true if the pointer was dragging the overview and the drag moved the detail
    /// keyboard, in which case the keyboard must be laid out again.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        position: Point,
        metrics: &LayoutMetrics,
        navigation: &mut NavigationState,
    ) -> bool {
        match self.pointers.get(&pointer) {
            Some(PointerState::DraggingOverview) => {
                navigation.continue_drag(position.x, metrics)
            }
            // held keys don't slide onto neighbouring keys
            Some(PointerState::HoldingKey(_)) | None => false,
        }
    }

    /// Handles a pointer being lifted or cancelled by the host
    pub fn pointer_up<L: NoteListener>(
        &mut self,
        pointer: PointerId,
        navigation: &mut NavigationState,
        listener: &mut L,
    ) {
        match self.pointers.remove(&pointer) {
            Some(PointerState::DraggingOverview) => {
                if self.overview_owner == Some(pointer) {
                    self.overview_owner = None;
                }
                navigation.end_drag();
            }
            Some(PointerState::HoldingKey(note)) => {
                listener.note_event(NoteEvent::up(note));
            }
            None => {
                log::debug!("Ignoring release of unknown pointer {:?}", pointer)
            }
        }
    }

    /// Forgets every pointer, releasing all held notes in ascending order
    pub fn cancel_all<L: NoteListener>(
        &mut self,
        navigation: &mut NavigationState,
        listener: &mut L,
    ) {
        let held_notes = self.held_notes();
        if !held_notes.is_empty() {
            log::debug!("Cancelling {} held notes", held_notes.len());
        }
        self.pointers.clear();
        if self.overview_owner.take().is_some() {
            navigation.end_drag();
        }
        for note in held_notes {
            listener.note_event(NoteEvent::up(note));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        event::NotePhase,
        geometry::{Cursor, KeyboardGeometry, SizingMode},
        navigation::NavigationMode,
        note::Octave,
    };

    const OVERVIEW: Rect = Rect::new(0.0, 0.0, 520.0, 80.0);
    const DETAIL: Rect = Rect::new(0.0, 80.0, 700.0, 280.0);

    fn note(midi_index: u8) -> Note {
        Note::from_midi_index(midi_index).unwrap()
    }

    /// Detail pane showing octave 4 with 100px white keys
    fn detail_keys() -> Vec<KeyRect> {
        KeyboardGeometry::default()
            .compute_layout(
                DETAIL,
                SizingMode::FitWidthToWhiteKeys,
                Cursor::Octave(Octave::MIDDLE),
            )
            .unwrap()
    }

    fn metrics() -> LayoutMetrics {
        LayoutMetrics {
            overview_width: 520.0,
            overview_octave_width: 70.0,
            detail_width: 700.0,
            detail_keyboard_width: 5200.0,
        }
    }

    struct Fixture {
        touch: TouchController,
        navigation: NavigationState,
        keys: Vec<KeyRect>,
        events: Vec<NoteEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                touch: TouchController::new(),
                navigation: NavigationState::new(
                    NavigationMode::Octave,
                    Octave::MIDDLE,
                ),
                keys: detail_keys(),
                events: Vec::new(),
            }
        }

        fn down(&mut self, pointer: u64, x: f64, y: f64) {
            let regions = HitRegions {
                overview: OVERVIEW,
                detail: DETAIL,
                detail_keys: &self.keys,
            };
            self.touch.pointer_down(
                PointerId(pointer),
                Point::new(x, y),
                &regions,
                &mut self.navigation,
                &mut self.events,
            );
        }

        fn up(&mut self, pointer: u64) {
            self.touch.pointer_up(
                PointerId(pointer),
                &mut self.navigation,
                &mut self.events,
            );
        }
    }

    #[test]
    fn press_and_release_emits_one_pair() {
        let mut f = Fixture::new();
        // middle of E_4, below the black keys
        f.down(1, 250.0, 250.0);
        f.up(1);
        assert_eq!(
            f.events,
            vec![NoteEvent::down(note(64)), NoteEvent::up(note(64))]
        );
        assert!(f.touch.held_notes().is_empty());
    }

    #[test]
    fn black_key_takes_priority() {
        let mut f = Fixture::new();
        f.down(1, 100.0, 100.0);
        assert_eq!(f.events, vec![NoteEvent::down(note(61))]);
    }

    #[test]
    fn two_pointers_hold_two_keys_independently() {
        let mut f = Fixture::new();
        f.down(1, 50.0, 250.0);
        f.down(2, 450.0, 250.0);
        assert_eq!(f.touch.held_notes(), vec![note(60), note(67)]);
        f.up(1);
        assert_eq!(f.touch.held_notes(), vec![note(67)]);
        assert!(f.touch.is_held(note(67)));
        assert_eq!(
            f.events.iter().filter(|e| e.phase == NotePhase::Up).count(),
            1
        );
    }

    #[test]
    fn pressing_a_held_note_again_is_ignored() {
        let mut f = Fixture::new();
        f.down(1, 50.0, 250.0);
        f.down(2, 60.0, 260.0);
        f.up(2);
        assert_eq!(f.events, vec![NoteEvent::down(note(60))]);
        f.up(1);
        assert_eq!(f.events.len(), 2);
    }

    #[test]
    fn unknown_pointers_are_ignored() {
        let mut f = Fixture::new();
        f.up(42);
        assert!(f.events.is_empty());
        // a press that misses every key isn't tracked either
        f.down(3, 350.0, 290.0);
        f.up(3);
        assert!(f.events.is_empty());
    }

    #[test]
    fn repeated_down_releases_previous_note() {
        let mut f = Fixture::new();
        f.down(1, 50.0, 250.0);
        f.down(1, 450.0, 250.0);
        assert_eq!(
            f.events,
            vec![
                NoteEvent::down(note(60)),
                NoteEvent::up(note(60)),
                NoteEvent::down(note(67)),
            ]
        );
    }

    #[test]
    fn cancel_releases_every_held_note() {
        let mut f = Fixture::new();
        f.down(1, 50.0, 250.0);
        f.down(2, 250.0, 250.0);
        f.down(3, 450.0, 250.0);
        f.down(4, 10.0, 10.0);
        f.events.clear();
        f.touch.cancel_all(&mut f.navigation, &mut f.events);
        assert_eq!(
            f.events,
            vec![
                NoteEvent::up(note(60)),
                NoteEvent::up(note(64)),
                NoteEvent::up(note(67)),
            ]
        );
        assert!(f.touch.held_notes().is_empty());
        assert_eq!(f.touch.num_pointers(), 0);
        assert_eq!(f.touch.overview_owner(), None);
        assert!(!f.navigation.is_dragging());
        // the pointers are gone so lifting them now does nothing
        f.up(1);
        assert_eq!(f.events.len(), 3);
    }

    #[test]
    fn only_one_pointer_drags_the_overview() {
        let mut f = Fixture::new();
        f.down(1, 10.0, 10.0);
        f.down(2, 200.0, 10.0);
        assert_eq!(f.touch.overview_owner(), Some(PointerId(1)));
        assert!(f.events.is_empty());
        // the second pointer is inert
        assert!(!f.touch.pointer_move(
            PointerId(2),
            Point::new(500.0, 10.0),
            &metrics(),
            &mut f.navigation,
        ));
        assert!(f.touch.pointer_move(
            PointerId(1),
            Point::new(90.0, 10.0),
            &metrics(),
            &mut f.navigation,
        ));
        assert_eq!(f.navigation.octave().index(), 5);
        f.up(1);
        assert_eq!(f.touch.overview_owner(), None);
        assert!(!f.navigation.is_dragging());
        f.down(2, 200.0, 10.0);
        assert_eq!(f.touch.overview_owner(), Some(PointerId(2)));
    }

    #[test]
    fn held_keys_ignore_movement() {
        let mut f = Fixture::new();
        f.down(1, 50.0, 250.0);
        assert!(!f.touch.pointer_move(
            PointerId(1),
            Point::new(450.0, 250.0),
            &metrics(),
            &mut f.navigation,
        ));
        f.up(1);
        assert_eq!(
            f.events,
            vec![NoteEvent::down(note(60)), NoteEvent::up(note(60))]
        );
    }
}
