//! Dialog components for TUI

mod base;
mod error_dialog;
mod file_prompt;

pub use error_dialog::render_error_dialog;
pub use file_prompt::render_file_prompt;
