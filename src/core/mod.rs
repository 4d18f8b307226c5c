//! Core terminal interfaces, key decoding and line input.

pub mod input;
pub mod line_input;
pub mod style;
pub mod terminal;
pub mod text;
