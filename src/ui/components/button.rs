//! Button component for TUI

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Label shown on a submit button while its submission is in flight
pub const LOADING_LABEL: &str = "Loading...";

/// Render a generic button with border
pub fn render_button(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    is_selected: bool,
    is_enabled: bool,
) {
    let border_style = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text_style = if !is_enabled {
        Style::default().fg(Color::DarkGray)
    } else if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(format!(" {content} ")).style(text_style);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(paragraph.block(block), area);
}

/// Text a submit button shows for the given loading state
pub fn submit_label(label: &str, is_loading: bool) -> &str {
    if is_loading {
        LOADING_LABEL
    } else {
        label
    }
}

/// Render a submit button; disabled and relabelled while loading
pub fn render_submit_button(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    is_selected: bool,
    is_loading: bool,
) {
    render_button(
        frame,
        area,
        submit_label(label, is_loading),
        is_selected,
        !is_loading,
    );
}
