//! Field rendering utilities for forms
//!
//! Every field is drawn from the same binding: a bordered block titled with
//! the label, the value (or placeholder) inside, and the error, if any, on
//! the bottom border.

use super::controls::control_lines;
use crate::state::forms::{FieldBinding, FieldDefinition, FieldKind, FieldValue};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const TEXTAREA_ROWS: u16 = 3;

/// Rows a field occupies, borders included
pub fn field_height(field: &FieldDefinition) -> u16 {
    let content = match &field.kind {
        FieldKind::TextArea => TEXTAREA_ROWS,
        FieldKind::Composite(control) => control.content_height(),
        _ => 1,
    };
    content + 2
}

/// Draw a form field from its binding
pub fn draw_field(frame: &mut Frame, area: Rect, field: &FieldDefinition, binding: &FieldBinding) {
    let border_style = match (binding.error.is_some(), binding.is_active) {
        (true, _) => Style::default().fg(Color::Red),
        (false, true) => Style::default().fg(Color::Cyan),
        (false, false) => Style::default().fg(Color::DarkGray),
    };

    let lines = match &field.kind {
        FieldKind::Composite(control) => control_lines(control.as_ref(), binding),
        kind => primitive_lines(kind, binding),
    };

    let title = match &field.kind {
        // The checkbox label sits next to the box instead
        FieldKind::Checkbox => String::new(),
        _ if field.required => format!(" {} * ", binding.label),
        _ => format!(" {} ", binding.label),
    };

    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    if let Some(error) = binding.error {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {error} "),
            Style::default().fg(Color::Red),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn primitive_lines(kind: &FieldKind, binding: &FieldBinding) -> Vec<Line<'static>> {
    let value_style = if binding.is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };
    let hint_style = Style::default().fg(Color::DarkGray);
    let cursor = Span::styled(
        if binding.is_active { "▌" } else { "" },
        Style::default().fg(Color::Cyan),
    );

    match kind {
        FieldKind::Checkbox => {
            let marker = if binding.value.as_bool() { "[x]" } else { "[ ]" };
            vec![Line::from(vec![
                Span::styled(marker, value_style),
                Span::raw(" "),
                Span::styled(binding.label.to_string(), value_style),
            ])]
        }
        FieldKind::Date => {
            let mut spans = vec![Span::styled(binding.value.display_value(), value_style)];
            if binding.is_active {
                spans.push(Span::styled("  ↑↓ day  ←→ month  PgUp/PgDn year", hint_style));
            }
            vec![Line::from(spans)]
        }
        FieldKind::Select(_) => {
            let current = binding.value.as_text();
            let mut spans = if current.is_empty() {
                vec![Span::styled(
                    binding.placeholder.unwrap_or("Select an option").to_string(),
                    hint_style,
                )]
            } else {
                vec![Span::styled(current.to_string(), value_style)]
            };
            if binding.is_active {
                spans.insert(0, Span::styled("‹ ", hint_style));
                spans.push(Span::styled(" ›", hint_style));
            }
            vec![Line::from(spans)]
        }
        FieldKind::Text | FieldKind::Phone | FieldKind::TextArea => {
            text_lines(binding, value_style, hint_style, cursor)
        }
        FieldKind::Composite(_) => Vec::new(),
    }
}

fn text_lines(
    binding: &FieldBinding,
    value_style: Style,
    hint_style: Style,
    cursor: Span<'static>,
) -> Vec<Line<'static>> {
    let text = match binding.value {
        FieldValue::Text(text) => text.as_str(),
        _ => "",
    };

    if text.is_empty() {
        let placeholder = binding.placeholder.unwrap_or("");
        return vec![Line::from(vec![
            cursor,
            Span::styled(placeholder.to_string(), hint_style),
        ])];
    }

    let mut lines: Vec<Line<'static>> = text
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), value_style)))
        .collect();
    if let Some(last) = lines.last_mut() {
        last.spans.push(cursor);
    }
    lines
}

/// Draw help text at the bottom of a form
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::RadioGroup;
    use std::sync::Arc;

    fn binding<'a>(value: &'a FieldValue, placeholder: Option<&'a str>) -> FieldBinding<'a> {
        FieldBinding {
            label: "Label",
            placeholder,
            value,
            error: None,
            is_active: false,
        }
    }

    fn text_of(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_field_heights() {
        assert_eq!(field_height(&FieldDefinition::text("a", "A")), 3);
        assert_eq!(field_height(&FieldDefinition::textarea("b", "B")), 5);
        assert_eq!(
            field_height(&FieldDefinition::composite(
                "c",
                "C",
                Arc::new(RadioGroup::new(&["x", "y"])),
                FieldValue::text("x"),
            )),
            3
        );
    }

    #[test]
    fn test_empty_text_shows_placeholder() {
        let value = FieldValue::text("");
        let lines = primitive_lines(&FieldKind::Text, &binding(&value, Some("John Doe")));
        assert_eq!(text_of(&lines), vec!["John Doe"]);
    }

    #[test]
    fn test_multiline_text_splits_lines() {
        let value = FieldValue::text("Peanuts\nPollen");
        let lines = primitive_lines(&FieldKind::TextArea, &binding(&value, None));
        assert_eq!(text_of(&lines), vec!["Peanuts", "Pollen"]);
    }

    #[test]
    fn test_checkbox_shows_label_next_to_box() {
        let value = FieldValue::Bool(true);
        let lines = primitive_lines(&FieldKind::Checkbox, &binding(&value, None));
        assert_eq!(text_of(&lines), vec!["[x] Label"]);
    }

    #[test]
    fn test_unset_select_shows_placeholder() {
        let value = FieldValue::text("");
        let lines = primitive_lines(
            &FieldKind::Select(&["A", "B"]),
            &binding(&value, Some("Select a physician")),
        );
        assert_eq!(text_of(&lines), vec!["Select a physician"]);
    }
}
