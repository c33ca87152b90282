//! Layout components (content area, status bar)

use crate::app::App;
use crate::state::forms::SubmissionPhase;
use crate::state::View;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Create the main layout, reserving the bottom line for the status bar
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    chunks[0]
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![];

    // Submission status
    let submit_status = match app.controller.phase() {
        SubmissionPhase::Submitting => {
            Span::styled(" ◌ submitting ", Style::default().fg(Color::Yellow))
        }
        SubmissionPhase::Idle => Span::styled(" ● ", Style::default().fg(Color::Green)),
    };
    spans.push(submit_status);

    spans.push(Span::styled(
        get_view_hints(&app.state.current_view),
        Style::default().fg(Color::Gray),
    ));

    if let Some(session) = &app.session {
        let errors = session.state().visible_error_count();
        if errors > 0 {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("{errors} error(s)"),
                Style::default().fg(Color::Red),
            ));
        }
    }

    if let Some(msg) = &app.state.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Green)));
    }

    if !app.state.service_address.is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            &app.state.service_address,
            Style::default().fg(Color::Blue),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);

    let quit_hint = " ^C:quit ";
    let quit_area = Rect {
        x: area.width.saturating_sub(quit_hint.len() as u16),
        y: area.height.saturating_sub(1),
        width: quit_hint.len() as u16,
        height: 1,
    };
    let quit_widget =
        Paragraph::new(quit_hint).style(Style::default().bg(Color::DarkGray).fg(Color::Gray));
    frame.render_widget(quit_widget, quit_area);
}

/// Get keyboard hints for the current view
fn get_view_hints(view: &View) -> &'static str {
    match view {
        View::Intake => "Tab:next  ←→:choose  Space:toggle  Enter:open",
        View::Registered => "Esc:new registration  q:quit",
    }
}
