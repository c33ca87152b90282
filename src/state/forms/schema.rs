//! Form schema: the ordered, immutable set of field definitions

use super::field::{FieldDefinition, ValueShape};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building a form schema
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("form has no fields")]
    Empty,
    #[error("field `{0}` is declared more than once")]
    DuplicateField(&'static str),
    #[error("default value of `{field}` is a {found}, expected a {expected}")]
    DefaultShapeMismatch {
        field: &'static str,
        expected: ValueShape,
        found: ValueShape,
    },
}

/// Validated list of field definitions
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldDefinition>,
}

impl FormSchema {
    /// Build a schema, rejecting duplicate names and defaults that do not
    /// match their field kind.
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name) {
                return Err(SchemaError::DuplicateField(field.name));
            }
            let expected = field.kind.value_shape();
            let found = field.default_value.shape();
            if expected != found {
                return Err(SchemaError::DefaultShapeMismatch {
                    field: field.name,
                    expected,
                    found,
                });
            }
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&FieldDefinition> {
        self.fields.get(index)
    }

    #[cfg(test)]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::forms::field::FieldValue;

    #[test]
    fn test_new_keeps_declaration_order() {
        let schema = FormSchema::new(vec![
            FieldDefinition::text("b", "B"),
            FieldDefinition::text("a", "A"),
        ])
        .unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.get(0).unwrap().name, "b");
        assert_eq!(schema.index_of("a"), Some(1));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert_eq!(FormSchema::new(vec![]).unwrap_err(), SchemaError::Empty);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = FormSchema::new(vec![
            FieldDefinition::text("name", "Name"),
            FieldDefinition::phone("name", "Phone"),
        ])
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("name"));
    }

    #[test]
    fn test_default_shape_mismatch_rejected() {
        let err = FormSchema::new(vec![
            FieldDefinition::checkbox("consent", "Consent").default_value(FieldValue::text("yes")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DefaultShapeMismatch {
                field: "consent",
                expected: ValueShape::Bool,
                found: ValueShape::Text,
            }
        );
        assert_eq!(
            err.to_string(),
            "default value of `consent` is a text, expected a boolean"
        );
    }
}
