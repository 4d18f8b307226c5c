//! Text helpers (ANSI scanning, width calculations, truncation).
//!
//! These helpers are pure (string in/string out) so widgets and the line editor can share them.

pub mod ansi;
pub mod utils;
pub mod width;
