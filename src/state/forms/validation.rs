//! Declarative field rules and form verdicts

use super::field::{FieldDefinition, FieldValue};
use super::schema::FormSchema;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{10,15}$").expect("valid phone regex"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A single check attached to a field, with the message shown when it fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    MinLength { min: usize, message: &'static str },
    MaxLength { max: usize, message: &'static str },
    /// International format: `+` followed by 10-15 digits. Spaces, dashes
    /// and parentheses are ignored.
    PhoneNumber { message: &'static str },
    Email { message: &'static str },
    OneOf {
        options: &'static [&'static str],
        message: &'static str,
    },
    MustBeTrue { message: &'static str },
}

impl Rule {
    pub fn min_length(min: usize, message: &'static str) -> Self {
        Rule::MinLength { min, message }
    }

    pub fn max_length(max: usize, message: &'static str) -> Self {
        Rule::MaxLength { max, message }
    }

    pub fn phone(message: &'static str) -> Self {
        Rule::PhoneNumber { message }
    }

    pub fn email(message: &'static str) -> Self {
        Rule::Email { message }
    }

    pub fn one_of(options: &'static [&'static str], message: &'static str) -> Self {
        Rule::OneOf { options, message }
    }

    pub fn must_be_true(message: &'static str) -> Self {
        Rule::MustBeTrue { message }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rule::MinLength { message, .. }
            | Rule::MaxLength { message, .. }
            | Rule::PhoneNumber { message }
            | Rule::Email { message }
            | Rule::OneOf { message, .. }
            | Rule::MustBeTrue { message } => *message,
        }
    }

    /// Check a value, returning the rule's message on failure
    pub fn check(&self, value: &FieldValue) -> Result<(), &'static str> {
        let passed = match (self, value) {
            (Rule::MinLength { min, .. }, FieldValue::Text(s)) => s.trim().chars().count() >= *min,
            (Rule::MaxLength { max, .. }, FieldValue::Text(s)) => s.trim().chars().count() <= *max,
            (Rule::PhoneNumber { .. }, FieldValue::Text(s)) => {
                let compact: String = s
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                    .collect();
                PHONE_PATTERN.is_match(&compact)
            }
            (Rule::Email { .. }, FieldValue::Text(s)) => EMAIL_PATTERN.is_match(s.trim()),
            (Rule::OneOf { options, .. }, FieldValue::Text(s)) => options.iter().any(|o| *o == s.as_str()),
            (Rule::MustBeTrue { .. }, FieldValue::Bool(b)) => *b,
            // A rule applied to a value it does not understand never passes
            _ => false,
        };
        if passed {
            Ok(())
        } else {
            Err(self.message())
        }
    }
}

/// Validate one field, returning the first failing message
pub fn validate_field(field: &FieldDefinition, value: &FieldValue) -> Option<String> {
    let expected = field.kind.value_shape();
    if value.shape() != expected {
        return Some(format!("Expected a {expected} value"));
    }

    if value.is_empty() {
        if field.required {
            return Some(
                field
                    .required_message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} is required", field.label)),
            );
        }
        // An unticked box is empty but still answers to its predicates
        if !matches!(value, FieldValue::Bool(_)) {
            return None;
        }
    }

    field
        .rules
        .iter()
        .find_map(|rule| rule.check(value).err())
        .map(str::to_string)
}

/// Run every field of the schema against the given values
pub fn validate_form(schema: &FormSchema, values: &BTreeMap<String, FieldValue>) -> ValidationVerdict {
    let field_errors = schema
        .fields()
        .iter()
        .filter_map(|field| {
            let value = values.get(field.name).unwrap_or(&field.default_value);
            validate_field(field, value).map(|message| (field.name.to_string(), message))
        })
        .collect();
    ValidationVerdict { field_errors }
}

/// Outcome of a full validation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationVerdict {
    field_errors: BTreeMap<String, String>,
}

impl ValidationVerdict {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.field_errors.get(name).map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.field_errors.len()
    }
}
