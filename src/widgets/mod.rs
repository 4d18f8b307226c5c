//! Boxed dialogs built on the in-place renderer.

pub mod r#box;
pub mod input;
pub mod select_list;

pub use input::{prompt_text, prompt_text_with, InputAction, InputState, TextPrompt};
pub use r#box::Panel;
pub use select_list::{
    select_from_list, select_from_list_with, SelectAction, SelectDialog, SelectState,
};
