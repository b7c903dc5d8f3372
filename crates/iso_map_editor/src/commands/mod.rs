//! Keyboard commands for the editor

mod shortcuts;

pub use shortcuts::handle_keyboard_shortcuts;
