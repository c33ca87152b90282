//! Strategy interface for composite (caller-rendered) fields

use super::field::{FieldValue, ValueShape};
use crossterm::event::KeyEvent;

/// The view of a field handed to a composite control
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding<'a> {
    pub label: &'a str,
    pub placeholder: Option<&'a str>,
    pub value: &'a FieldValue,
    pub error: Option<&'a str>,
    pub is_active: bool,
}

/// What a composite control wants done with a key press
#[derive(Debug, Clone, PartialEq)]
pub enum ControlResponse {
    Ignored,
    /// New value for the bound field, applied like any other field change
    Change(FieldValue),
    /// Ask the host to open the file picker for the bound field
    RequestFile,
}

/// How strongly a control item stands out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Selected,
    Normal,
    Muted,
}

/// One piece of a composite control's display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlItem {
    pub text: String,
    /// Secondary text shown dimmed after the item
    pub detail: Option<String>,
    pub emphasis: Emphasis,
}

impl ControlItem {
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            detail: None,
            emphasis,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Whether items share one row or get a row each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLayout {
    Inline,
    Stacked,
}

/// Caller-supplied input strategy and display model for a composite field.
///
/// Controls never validate or store state; value changes travel back through
/// [`ControlResponse::Change`] into the form session.
pub trait CompositeControl: Send + Sync {
    /// Name used in debug output
    fn name(&self) -> &'static str;

    /// Shape of the value the control edits
    fn value_shape(&self) -> ValueShape;

    /// Display items for the bound field
    fn items(&self, binding: &FieldBinding<'_>) -> Vec<ControlItem>;

    /// Translate a key press into a response for the bound field
    fn on_key(&self, binding: &FieldBinding<'_>, key: KeyEvent) -> ControlResponse;

    fn layout(&self) -> ControlLayout {
        ControlLayout::Stacked
    }

    /// Rows needed inside the field border
    fn content_height(&self) -> u16 {
        1
    }
}
