//! UI module for rendering the TUI

mod components;
pub mod forms;
mod layout;
mod registered;

use crate::app::App;
use crate::state::View;
use components::{render_error_dialog, render_file_prompt};
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let main_area = layout::create_layout(frame.area());

    // Draw main content based on current view
    match &app.state.current_view {
        View::Intake => forms::draw_intake(frame, main_area, app),
        View::Registered => registered::draw(frame, main_area, app),
    }

    // Draw status bar
    layout::draw_status_bar(frame, app);

    // Modal overlays
    if let Some(prompt) = &app.state.file_prompt {
        render_file_prompt(frame, prompt);
    }
    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, error);
    }
}
