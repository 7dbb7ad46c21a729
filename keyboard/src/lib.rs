//! Abstract representation of a touch piano keyboard with two panes: an overview strip showing
//! all 88 keys, which doubles as a scrollbar, and a larger detail keyboard used for playing. This
//! crate knows nothing about windows or pixels on a screen. It turns pane sizes and pointer events
//! into key rectangles and note events, and leaves painting and sending messages to its callers.

mod config;
mod error;
mod event;
mod geometry;
mod keyboard;
mod navigation;
mod note;
mod shape;
mod touch;

pub use config::*;
pub use error::{Error, Result};
pub use event::*;
pub use geometry::*;
pub use keyboard::*;
pub use navigation::*;
pub use note::*;
pub use shape::*;
pub use touch::*;

pub use kurbo::{Point, Rect};
