use crate::{
    geometry::DEFAULT_ASPECT_RATIO, navigation::NavigationMode, note::Octave,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSet {
    pub background: Rgb,
    pub white_key: Rgb,
    pub black_key: Rgb,
    pub held_key: Rgb,
    /// Keys of the overview that are shown in the detail pane
    pub visible_key: Rgb,
    pub viewport_indicator: Rgb,
    pub outline: Rgb,
    pub divider: Rgb,
}

impl Default for ColorSet {
    fn default() -> Self {
        Self {
            background: Rgb::new(0x20, 0x20, 0x20),
            white_key: Rgb::new(0xF4, 0xF1, 0xEA),
            black_key: Rgb::new(0x18, 0x18, 0x18),
            held_key: Rgb::new(0x4A, 0x90, 0xD9),
            visible_key: Rgb::new(0xFF, 0xE8, 0xB0),
            viewport_indicator: Rgb::new(0xD9, 0x4A, 0x4A),
            outline: Rgb::new(0x60, 0x60, 0x60),
            divider: Rgb::new(0x80, 0x80, 0x80),
        }
    }
}

/// Everything about the keyboard that a user can configure. Missing fields take their default
/// values when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Width:height of the whole keyboard
    pub aspect_ratio: f64,
    pub colors: ColorSet,
    /// Draw a line between the overview and the detail pane
    pub show_dividers: bool,
    /// Draw an outline around each key
    pub show_outlines: bool,
    /// Start in octave mode rather than free mode
    pub octave_mode: bool,
    /// Octave shown in octave mode
    pub octave: u8,
    /// When set the keyboard highlights keys as soon as they are pressed. Otherwise keys are only
    /// highlighted when the host reports that the note is playing.
    pub local_echo: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            colors: ColorSet::default(),
            show_dividers: true,
            show_outlines: true,
            octave_mode: false,
            octave: Octave::MIDDLE.index(),
            local_echo: true,
        }
    }
}

impl KeyboardConfig {
    pub fn navigation_mode(&self) -> NavigationMode {
        if self.octave_mode {
            NavigationMode::Octave
        } else {
            NavigationMode::Free
        }
    }

    /// The configured octave, moved onto the keyboard if necessary
    pub fn octave(&self) -> Octave {
        Octave::clamped(self.octave as i32)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn out_of_range_octave_is_clamped() {
        let config = KeyboardConfig {
            octave: 200,
            ..Default::default()
        };
        assert_eq!(config.octave(), Octave::MAX);
    }

    #[test]
    fn mode_follows_flag() {
        let mut config = KeyboardConfig::default();
        assert_eq!(config.navigation_mode(), NavigationMode::Free);
        config.octave_mode = true;
        assert_eq!(config.navigation_mode(), NavigationMode::Octave);
    }
}
