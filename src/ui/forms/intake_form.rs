//! Patient intake form view

use super::field_renderer::{draw_field, draw_help_text, field_height};
use crate::app::App;
use crate::platform::{PASTE_SHORTCUT, RESET_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::forms::intake::SECTIONS;
use crate::state::forms::IntakeSession;
use crate::ui::components::{render_submit_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SECTION_HEADER_HEIGHT: u16 = 2;

/// One vertically stacked element of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Section(&'static str),
    Field(usize),
    Submit,
}

/// Rows in display order with their heights
fn form_rows(session: &IntakeSession) -> Vec<(Row, u16)> {
    let schema = session.schema();
    let mut rows = Vec::with_capacity(schema.len() + SECTIONS.len() + 1);
    for (idx, field) in schema.fields().iter().enumerate() {
        if let Some((title, _)) = SECTIONS.iter().find(|(_, first)| *first == field.name) {
            rows.push((Row::Section(*title), SECTION_HEADER_HEIGHT));
        }
        rows.push((Row::Field(idx), field_height(field)));
    }
    rows.push((Row::Submit, BUTTON_HEIGHT));
    rows
}

/// First row to draw so that the row at `active` is fully visible.
/// Starts at the top whenever everything up to the active row fits.
fn first_visible_row(heights: &[u16], active: usize, viewport: u16) -> usize {
    let Some(last) = heights.len().checked_sub(1) else {
        return 0;
    };
    let active = active.min(last);
    let mut start = active;
    let mut used = heights[active];
    while start > 0 && used + heights[start - 1] <= viewport {
        start -= 1;
        used += heights[start];
    }
    start
}

/// Draw the intake form
pub fn draw_intake(frame: &mut Frame, area: Rect, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let title = if app.controller.is_loading() {
        " Patient Registration (submitting) "
    } else {
        " Patient Registration "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Greeting
            Constraint::Min(0),    // Fields
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let greeting = Paragraph::new(vec![
        Line::from(Span::styled(
            "Welcome",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Let us know more about yourself.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(greeting, chunks[0]);

    draw_rows(frame, chunks[1], app, session);

    let help = format!(
        "Tab/Shift+Tab:field  {SUBMIT_SHORTCUT}:submit  {RESET_SHORTCUT}:reset  {PASTE_SHORTCUT}:paste  Esc:quit"
    );
    draw_help_text(frame, chunks[2], &help);
}

fn draw_rows(frame: &mut Frame, area: Rect, app: &App, session: &IntakeSession) {
    let rows = form_rows(session);
    let heights: Vec<u16> = rows.iter().map(|(_, h)| *h).collect();
    let active_row = rows
        .iter()
        .position(|(row, _)| match row {
            Row::Field(idx) => *idx == session.active_field_index,
            Row::Submit => session.is_submit_row_active(),
            Row::Section(_) => false,
        })
        .unwrap_or(0);
    let start = first_visible_row(&heights, active_row, area.height);

    let mut y = area.y;
    let bottom = area.y + area.height;
    for (row, height) in rows.into_iter().skip(start) {
        if y + height > bottom {
            break;
        }
        let row_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height,
        };
        match row {
            Row::Section(title) => draw_section_header(frame, row_area, title),
            Row::Field(idx) => {
                if let Some(field) = session.schema().get(idx) {
                    draw_field(frame, row_area, field, &session.binding(field));
                }
            }
            Row::Submit => {
                let button_area = Rect {
                    width: row_area.width.min(24),
                    ..row_area
                };
                render_submit_button(
                    frame,
                    button_area,
                    "Get Started",
                    session.is_submit_row_active(),
                    app.controller.is_loading(),
                );
            }
        }
        y += height;
    }
}

fn draw_section_header(frame: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ]);
    frame.render_widget(header, area);
}
