//! Form values, field errors and touched tracking

use super::attachment::AttachmentSet;
use super::field::{FieldDefinition, FieldValue, ValueShape};
use super::schema::FormSchema;
use super::validation::{validate_field, validate_form, ValidationVerdict};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Trait for common form navigation
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
}

/// Errors raised when updating form values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{field}` takes a {expected} value, got a {found}")]
    ShapeMismatch {
        field: String,
        expected: ValueShape,
        found: ValueShape,
    },
}

/// Current values of a form, one per declared field
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, FieldValue>,
    errors: BTreeMap<String, String>,
    touched: BTreeSet<String>,
}

impl FormState {
    /// Populate every declared field with its default value
    pub fn from_schema(schema: &FormSchema) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| (f.name.to_string(), f.default_value.clone()))
            .collect();
        Self {
            values,
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
        }
    }

    #[cfg(test)]
    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Text value of a field, empty for unknown or non-text fields
    pub fn text(&self, name: &str) -> &str {
        self.value(name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn flag(&self, name: &str) -> bool {
        self.value(name).is_some_and(FieldValue::as_bool)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.value(name).and_then(FieldValue::as_date)
    }

    pub fn files(&self, name: &str) -> Option<&AttachmentSet> {
        self.value(name).and_then(FieldValue::as_files)
    }

    /// Error to display for a field. Untouched fields never report one.
    pub fn error(&self, name: &str) -> Option<&str> {
        if !self.touched.contains(name) {
            return None;
        }
        self.errors.get(name).map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn visible_error_count(&self) -> usize {
        self.errors
            .keys()
            .filter(|name| self.touched.contains(*name))
            .count()
    }

    fn check_value<'s>(
        schema: &'s FormSchema,
        name: &str,
        value: &FieldValue,
    ) -> Result<&'s FieldDefinition, FormError> {
        let field = schema
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let expected = field.kind.value_shape();
        if value.shape() != expected {
            return Err(FormError::ShapeMismatch {
                field: name.to_string(),
                expected,
                found: value.shape(),
            });
        }
        Ok(field)
    }

    /// Store a new value and re-validate only that field
    pub fn set_value(
        &mut self,
        schema: &FormSchema,
        name: &str,
        value: FieldValue,
    ) -> Result<(), FormError> {
        let field = Self::check_value(schema, name, &value)?;

        match validate_field(field, &value) {
            Some(message) => {
                tracing::debug!(field = name, "Field failed validation");
                self.errors.insert(name.to_string(), message);
            }
            None => {
                self.errors.remove(name);
            }
        }
        self.touched.insert(name.to_string());
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Replace a value without validating it or marking the field touched
    pub fn prefill(
        &mut self,
        schema: &FormSchema,
        name: &str,
        value: FieldValue,
    ) -> Result<(), FormError> {
        Self::check_value(schema, name, &value)?;
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Validate every field, mark them all touched and replace the error map
    pub fn validate_all(&mut self, schema: &FormSchema) -> ValidationVerdict {
        let verdict = validate_form(schema, &self.values);
        self.touched = schema.fields().iter().map(|f| f.name.to_string()).collect();
        self.errors = verdict.field_errors().clone();
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::validation::Rule;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldDefinition::text("name", "Name")
                .required()
                .rule(Rule::min_length(2, "Name must be at least 2 characters")),
            FieldDefinition::phone("phone", "Phone").rule(Rule::phone("Invalid phone number")),
            FieldDefinition::checkbox("consent", "Consent").required_with("Consent needed"),
        ])
        .unwrap()
    }

    struct Cycle {
        active: usize,
    }

    impl Form for Cycle {
        fn field_count(&self) -> usize {
            3
        }
        fn active_field(&self) -> usize {
            self.active
        }
        fn set_active_field(&mut self, index: usize) {
            self.active = index.min(2);
        }
    }

    mod navigation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_next_field_wraps() {
            let mut form = Cycle { active: 2 };
            form.next_field();
            assert_eq!(form.active, 0);
        }

        #[test]
        fn test_prev_field_wraps() {
            let mut form = Cycle { active: 0 };
            form.prev_field();
            assert_eq!(form.active, 2);
        }
    }

    mod values {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_from_schema_has_one_entry_per_field() {
            let schema = schema();
            let state = FormState::from_schema(&schema);
            assert_eq!(
                state.values().keys().cloned().collect::<Vec<_>>(),
                vec!["consent", "name", "phone"]
            );
            for field in schema.fields() {
                assert_eq!(state.value(field.name), Some(&field.default_value));
            }
        }

        #[test]
        fn test_set_value_unknown_field_rejected() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            let err = state
                .set_value(&schema, "nickname", FieldValue::text("Jo"))
                .unwrap_err();
            assert_eq!(err, FormError::UnknownField("nickname".to_string()));
            assert_eq!(state.values().len(), 3);
        }

        #[test]
        fn test_set_value_shape_mismatch_rejected() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            let err = state
                .set_value(&schema, "consent", FieldValue::text("yes"))
                .unwrap_err();
            assert!(matches!(err, FormError::ShapeMismatch { .. }));
            assert!(!state.flag("consent"));
        }

        #[test]
        fn test_prefill_does_not_touch() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.prefill(&schema, "name", FieldValue::text("J")).unwrap();
            assert_eq!(state.text("name"), "J");
            assert!(!state.is_touched("name"));
            assert!(state.error("name").is_none());
            assert!(state.prefill(&schema, "consent", FieldValue::text("x")).is_err());
        }

        #[test]
        fn test_accessors() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state
                .set_value(&schema, "consent", FieldValue::Bool(true))
                .unwrap();
            assert!(state.flag("consent"));
            assert_eq!(state.text("missing"), "");
            assert!(state.date("name").is_none());
            assert!(state.files("name").is_none());
        }
    }

    mod incremental_validation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_untouched_fields_show_no_errors() {
            let schema = schema();
            let state = FormState::from_schema(&schema);
            assert!(state.error("name").is_none());
            assert!(!state.is_touched("name"));
            assert_eq!(state.visible_error_count(), 0);
        }

        #[test]
        fn test_change_validates_only_touched_field() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.set_value(&schema, "name", FieldValue::text("J")).unwrap();

            assert_eq!(state.error("name"), Some("Name must be at least 2 characters"));
            assert!(state.error("consent").is_none());
            assert!(!state.is_touched("consent"));
        }

        #[test]
        fn test_fixing_value_clears_error() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.set_value(&schema, "name", FieldValue::text("J")).unwrap();
            state.set_value(&schema, "name", FieldValue::text("Jo")).unwrap();
            assert!(state.error("name").is_none());
        }

        #[test]
        fn test_cleared_required_field_is_touched_invalid() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.set_value(&schema, "name", FieldValue::text("")).unwrap();
            assert_eq!(state.error("name"), Some("Name is required"));
        }
    }

    mod full_validation {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_marks_all_fields_touched() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            let verdict = state.validate_all(&schema);

            assert!(!verdict.is_valid());
            assert_eq!(state.error("name"), Some("Name is required"));
            assert_eq!(state.error("consent"), Some("Consent needed"));
            assert!(state.error("phone").is_none());
            assert_eq!(state.visible_error_count(), 2);
        }

        #[test]
        fn test_is_idempotent() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            let first = state.validate_all(&schema);
            let snapshot = state.clone();
            let second = state.validate_all(&schema);
            assert_eq!(first, second);
            assert_eq!(snapshot, state);
        }

        #[test]
        fn test_consent_false_always_errors_true_never_does() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.set_value(&schema, "consent", FieldValue::Bool(false)).unwrap();
            assert!(state.validate_all(&schema).error_for("consent").is_some());
            state.set_value(&schema, "consent", FieldValue::Bool(true)).unwrap();
            assert!(state.validate_all(&schema).error_for("consent").is_none());
        }

        #[test]
        fn test_valid_form() {
            let schema = schema();
            let mut state = FormState::from_schema(&schema);
            state.set_value(&schema, "name", FieldValue::text("Jane")).unwrap();
            state.set_value(&schema, "consent", FieldValue::Bool(true)).unwrap();
            let verdict = state.validate_all(&schema);
            assert!(verdict.is_valid());
            assert_eq!(state.visible_error_count(), 0);
        }
    }
}
