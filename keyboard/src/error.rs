use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A pane had no area to lay keys out in. The layout pass for the frame should be skipped.
    #[error("Invalid pane bounds: {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("Note {0} is outside the piano range (21 to 108)")]
    OutOfRangeNote(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
