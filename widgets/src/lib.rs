//! SDL2 front end for the touch piano keyboard. This library doesn't know about MIDI or UDP. It
//! opens a window, feeds mouse and finger input into an `ivory_keyboard::Keyboard`, draws the
//! keyboard each frame and hands note events back to the caller. The `ivory_piano_app` crate is
//! an executable that sends those note events over UDP.

mod input;
mod piano;
mod window;

pub use input::*;
pub use piano::*;
