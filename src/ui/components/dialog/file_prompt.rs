//! File path prompt for attachment fields

use super::base::{key_hint, render_dialog, DialogConfig};
use crate::state::FilePrompt;
use ratatui::{style::Color, text::Span, Frame};

/// Render the file path prompt overlay
pub fn render_file_prompt(frame: &mut Frame, prompt: &FilePrompt) {
    let hint = vec![
        key_hint("Enter"),
        Span::raw(" attach  "),
        key_hint("Esc"),
        Span::raw(" cancel"),
    ];
    let message = format!("Path to the file for \"{}\"", prompt.label);

    render_dialog(
        frame,
        DialogConfig {
            title: "Choose File",
            title_color: Color::Cyan,
            border_color: Color::Cyan,
            message: &message,
            input: Some(&prompt.path),
            error: prompt.error.as_deref(),
            hint: Some(hint),
            max_width: 70,
        },
    );
}
