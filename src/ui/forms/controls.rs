//! Rendering for composite field controls

use crate::state::forms::{CompositeControl, ControlItem, ControlLayout, Emphasis, FieldBinding};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn item_style(emphasis: Emphasis, is_active: bool) -> Style {
    match (emphasis, is_active) {
        (Emphasis::Selected, true) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        (Emphasis::Selected, false) | (Emphasis::Normal, false) => {
            Style::default().fg(Color::White)
        }
        (Emphasis::Normal, true) => Style::default().fg(Color::Cyan),
        (Emphasis::Muted, _) => Style::default().fg(Color::DarkGray),
    }
}

fn item_spans(item: ControlItem, is_active: bool) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(item.text, item_style(item.emphasis, is_active))];
    if let Some(detail) = item.detail {
        spans.push(Span::styled(
            format!("  {detail}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans
}

/// Content lines for a composite field
pub fn control_lines(
    control: &dyn CompositeControl,
    binding: &FieldBinding<'_>,
) -> Vec<Line<'static>> {
    let items = control.items(binding);
    match control.layout() {
        ControlLayout::Inline => {
            let mut spans = Vec::with_capacity(items.len() * 2);
            for item in items {
                spans.extend(item_spans(item, binding.is_active));
                spans.push(Span::raw("  "));
            }
            spans.pop();
            vec![Line::from(spans)]
        }
        ControlLayout::Stacked => items
            .into_iter()
            .map(|item| Line::from(item_spans(item, binding.is_active)))
            .collect(),
    }
}
