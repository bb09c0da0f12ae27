//! Pure session-side state with no I/O dependencies.

pub mod cursor;

pub use cursor::{CursorCache, CursorEntry};
