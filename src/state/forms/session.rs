//! Form session: the intake form's lifetime-scoped context
//!
//! A session is created when the intake view is entered and dropped when the
//! user navigates away or resets. It owns the form values and the active
//! field cursor; the submission controller borrows it for the duration of a
//! submit call.

use super::composite::{ControlResponse, FieldBinding};
use super::field::{FieldDefinition, FieldKind, FieldValue};
use super::form_state::{Form, FormError, FormState};
use super::schema::FormSchema;
use super::validation::ValidationVerdict;
use crossterm::event::KeyEvent;
use std::sync::Arc;

/// Result of routing a key press to the active field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Unchanged,
    Changed,
    /// The active field asked for a file selection
    RequestFile(&'static str),
}

/// Values to prefill when a session starts for a known user
#[derive(Debug, Clone, Default)]
pub struct Prefill {
    pub user_id: Option<String>,
    pub values: Vec<(&'static str, FieldValue)>,
}

pub struct IntakeSession {
    schema: Arc<FormSchema>,
    state: FormState,
    prefill: Prefill,
    /// Index into the schema fields; `schema.len()` is the submit button row
    pub active_field_index: usize,
}

impl IntakeSession {
    #[cfg(test)]
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self::with_prefill(schema, Prefill::default())
    }

    /// Start a session with some values already filled in. Prefilled values
    /// do not count as touched.
    pub fn with_prefill(schema: Arc<FormSchema>, prefill: Prefill) -> Self {
        let state = Self::initial_state(&schema, &prefill);
        Self {
            schema,
            state,
            prefill,
            active_field_index: 0,
        }
    }

    fn initial_state(schema: &FormSchema, prefill: &Prefill) -> FormState {
        let mut state = FormState::from_schema(schema);
        for (name, value) in &prefill.values {
            if let Err(err) = state.prefill(schema, name, value.clone()) {
                tracing::warn!(field = *name, error = %err, "Ignoring prefill value");
            }
        }
        state
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn user_id(&self) -> Option<&str> {
        self.prefill.user_id.as_deref()
    }

    /// Route a value change through incremental validation
    pub fn set_value(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        self.state.set_value(&self.schema, name, value)
    }

    /// Full validation, used as the submit gate
    pub fn validate_all(&mut self) -> ValidationVerdict {
        self.state.validate_all(&self.schema)
    }

    /// Throw away all input and start over from the initial values
    pub fn reset(&mut self) {
        self.state = Self::initial_state(&self.schema, &self.prefill);
        self.active_field_index = 0;
    }

    pub fn is_submit_row_active(&self) -> bool {
        self.active_field_index == self.schema.len()
    }

    pub fn active_definition(&self) -> Option<&FieldDefinition> {
        self.schema.get(self.active_field_index)
    }

    /// Binding handed to renderers and composite controls
    pub fn binding<'a>(&'a self, field: &'a FieldDefinition) -> FieldBinding<'a> {
        FieldBinding {
            label: field.label,
            placeholder: field.placeholder,
            value: self
                .state
                .value(field.name)
                .unwrap_or(&field.default_value),
            error: self.state.error(field.name),
            is_active: self.active_definition().is_some_and(|a| a.name == field.name),
        }
    }

    /// Apply a key press to the active field
    pub fn edit_active(&mut self, key: KeyEvent) -> Result<EditOutcome, FormError> {
        let Some(field) = self.active_definition() else {
            return Ok(EditOutcome::Unchanged);
        };
        let name = field.name;
        let next = match &field.kind {
            FieldKind::Composite(control) => match control.on_key(&self.binding(field), key) {
                ControlResponse::Ignored => None,
                ControlResponse::Change(value) => Some(value),
                ControlResponse::RequestFile => return Ok(EditOutcome::RequestFile(name)),
            },
            kind => {
                let current = self.state.value(name).unwrap_or(&field.default_value);
                kind.edit(current, key)
            }
        };

        match next {
            Some(value) => {
                self.set_value(name, value)?;
                Ok(EditOutcome::Changed)
            }
            None => Ok(EditOutcome::Unchanged),
        }
    }

    /// Append pasted text to the active field if it takes free text
    pub fn paste_into_active(&mut self, text: &str) -> Result<EditOutcome, FormError> {
        let Some(field) = self.active_definition() else {
            return Ok(EditOutcome::Unchanged);
        };
        let name = field.name;
        let current = self.state.value(name).unwrap_or(&field.default_value);
        match field.kind.append_text(current, text) {
            Some(value) => {
                self.set_value(name, value)?;
                Ok(EditOutcome::Changed)
            }
            None => Ok(EditOutcome::Unchanged),
        }
    }
}

impl Form for IntakeSession {
    fn field_count(&self) -> usize {
        self.schema.len() + 1 // fields + submit button row
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.schema.len());
    }
}
