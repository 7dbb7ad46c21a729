//! Encoding of the keyboard's output as MIDI-like channel messages

mod codec;
mod note_messages;

pub use codec::*;
pub use note_messages::*;

pub use midly::num::{u4, u7};
