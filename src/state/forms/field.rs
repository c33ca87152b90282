//! Field kinds, kind-tagged values and field definitions

use super::attachment::AttachmentSet;
use super::composite::CompositeControl;
use super::validation::Rule;
use chrono::{Days, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::sync::Arc;

/// Shape of the value a field kind produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Bool,
    Date,
    Files,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueShape::Text => "text",
            ValueShape::Bool => "boolean",
            ValueShape::Date => "date",
            ValueShape::Files => "file list",
        };
        f.write_str(name)
    }
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Files(AttachmentSet),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            FieldValue::Text(_) => ValueShape::Text,
            FieldValue::Bool(_) => ValueShape::Bool,
            FieldValue::Date(_) => ValueShape::Date,
            FieldValue::Files(_) => ValueShape::Files,
        }
    }

    /// Get the text value (returns empty string for other shapes)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            _ => "",
        }
    }

    /// Get the boolean value (returns false for other shapes)
    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&AttachmentSet> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// True for blank text, `false` and empty attachment sets
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Bool(b) => !*b,
            FieldValue::Date(_) => false,
            FieldValue::Files(files) => files.is_empty(),
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(true) => "[x]".to_string(),
            FieldValue::Bool(false) => "[ ]".to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Files(files) => files
                .files()
                .iter()
                .map(|f| f.file_name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Declared kind of a form field
#[derive(Clone)]
pub enum FieldKind {
    Text,
    Phone,
    Date,
    Select(&'static [&'static str]),
    TextArea,
    Checkbox,
    /// Rendering and input delegated to a caller-supplied control
    Composite(Arc<dyn CompositeControl>),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("Text"),
            FieldKind::Phone => f.write_str("Phone"),
            FieldKind::Date => f.write_str("Date"),
            FieldKind::Select(options) => f.debug_tuple("Select").field(options).finish(),
            FieldKind::TextArea => f.write_str("TextArea"),
            FieldKind::Checkbox => f.write_str("Checkbox"),
            FieldKind::Composite(control) => {
                f.debug_tuple("Composite").field(&control.name()).finish()
            }
        }
    }
}

impl FieldKind {
    /// Shape of the value this kind stores
    pub fn value_shape(&self) -> ValueShape {
        match self {
            FieldKind::Text
            | FieldKind::Phone
            | FieldKind::Select(_)
            | FieldKind::TextArea => ValueShape::Text,
            FieldKind::Date => ValueShape::Date,
            FieldKind::Checkbox => ValueShape::Bool,
            FieldKind::Composite(control) => control.value_shape(),
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::TextArea)
    }

    /// Whether free text (typing, paste) can be appended to values of this kind
    pub fn accepts_text(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Phone | FieldKind::TextArea)
    }

    /// Append pasted or typed text, filtering characters the kind rejects.
    /// Returns `None` when nothing would change.
    pub fn append_text(&self, value: &FieldValue, text: &str) -> Option<FieldValue> {
        if !self.accepts_text() {
            return None;
        }
        let accepted: String = text
            .chars()
            .filter(|c| match self {
                FieldKind::Phone => is_phone_char(*c),
                FieldKind::TextArea => *c == '\n' || !c.is_control(),
                _ => !c.is_control(),
            })
            .collect();
        if accepted.is_empty() {
            return None;
        }
        let mut next = value.as_text().to_string();
        next.push_str(&accepted);
        Some(FieldValue::Text(next))
    }

    /// Apply a key press to a built-in kind. Composite kinds return `None`;
    /// their control handles input instead.
    pub fn edit(&self, value: &FieldValue, key: KeyEvent) -> Option<FieldValue> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match self {
            FieldKind::Text | FieldKind::Phone | FieldKind::TextArea => match key.code {
                KeyCode::Char(c) => self.append_text(value, &c.to_string()),
                KeyCode::Enter if self.is_multiline() => self.append_text(value, "\n"),
                KeyCode::Backspace => {
                    let mut text = value.as_text().to_string();
                    text.pop().map(|_| FieldValue::Text(text))
                }
                _ => None,
            },
            FieldKind::Date => {
                let date = value.as_date()?;
                let next = match key.code {
                    KeyCode::Up => date.checked_add_days(Days::new(1)),
                    KeyCode::Down => date.checked_sub_days(Days::new(1)),
                    KeyCode::Right => date.checked_add_months(Months::new(1)),
                    KeyCode::Left => date.checked_sub_months(Months::new(1)),
                    KeyCode::PageUp => date.checked_add_months(Months::new(12)),
                    KeyCode::PageDown => date.checked_sub_months(Months::new(12)),
                    _ => None,
                }?;
                Some(FieldValue::Date(next))
            }
            FieldKind::Select(options) => {
                let forward = match key.code {
                    KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => true,
                    KeyCode::Left | KeyCode::Up => false,
                    _ => return None,
                };
                cycle_option(options, value.as_text(), forward).map(FieldValue::text)
            }
            FieldKind::Checkbox => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => Some(FieldValue::Bool(!value.as_bool())),
                _ => None,
            },
            FieldKind::Composite(_) => None,
        }
    }
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')')
}

/// Step through a static option list, wrapping at both ends.
/// An unset current value steps to the first (or last) option.
pub fn cycle_option(
    options: &[&'static str],
    current: &str,
    forward: bool,
) -> Option<&'static str> {
    if options.is_empty() {
        return None;
    }
    let count = options.len();
    let next = match options.iter().position(|o| *o == current) {
        Some(i) if forward => (i + 1) % count,
        Some(0) => count - 1,
        Some(i) => i - 1,
        None if forward => 0,
        None => count - 1,
    };
    Some(options[next])
}

/// Declaration of a single form field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub default_value: FieldValue,
    pub required: bool,
    /// Message used when a required field is left empty
    pub required_message: Option<&'static str>,
    pub rules: Vec<Rule>,
}

impl FieldDefinition {
    fn new(name: &'static str, label: &'static str, kind: FieldKind, default_value: FieldValue) -> Self {
        Self {
            name,
            kind,
            label,
            placeholder: None,
            default_value,
            required: false,
            required_message: None,
            rules: Vec::new(),
        }
    }

    /// Create a single-line text field
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text, FieldValue::default())
    }

    /// Create a phone number field
    pub fn phone(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Phone, FieldValue::default())
    }

    /// Create a date field with an initial date
    pub fn date(name: &'static str, label: &'static str, initial: NaiveDate) -> Self {
        Self::new(name, label, FieldKind::Date, FieldValue::Date(initial))
    }

    /// Create a dropdown over a static option list
    pub fn select(name: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(name, label, FieldKind::Select(options), FieldValue::default())
    }

    /// Create a multi-line text field
    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::TextArea, FieldValue::default())
    }

    /// Create a checkbox, unchecked by default
    pub fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Checkbox, FieldValue::Bool(false))
    }

    /// Create a field rendered by a caller-supplied control
    pub fn composite(
        name: &'static str,
        label: &'static str,
        control: Arc<dyn CompositeControl>,
        default_value: FieldValue,
    ) -> Self {
        Self::new(name, label, FieldKind::Composite(control), default_value)
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default_value = value;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_with(mut self, message: &'static str) -> Self {
        self.required = true;
        self.required_message = Some(message);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}
