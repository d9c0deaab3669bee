//! # Structural Validator
//!
//! Checks a node value against its variant's schema: required fields,
//! field shapes, enum membership. Validation is pure and synchronous and
//! never panics - malformed input simply yields more failures.
//!
//! Union shapes are matched against each alternative; when none match,
//! the per-alternative failures are collapsed into a single generic
//! type-mismatch failure at the union field's path. One relevant message
//! beats a page of irrelevant ones.

use crate::node::Config;
use crate::schema::{Field, Schema, Shape};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields accepted on every variant regardless of schema
const UNIVERSAL_FIELDS: [&str; 3] = ["alias", "enabled", "condition"];

/// Outcome of validating one node value
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<Failure>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(failures) => failures,
        }
    }
}

/// One typed validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Dot-joined field path
    pub path: String,
    pub kind: FailureKind,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    MissingRequiredField,
    UnexpectedField,
    WrongType,
    WrongEnumValue,
}

/// Validate a node value against a variant schema
pub fn validate(value: &Value, schema: &Schema) -> ValidationResult {
    let mut failures = Vec::new();

    let Some(config) = value.as_object() else {
        failures.push(Failure {
            path: String::new(),
            kind: FailureKind::WrongType,
            expected: Some("object".to_string()),
            actual: Some(value_type_name(value).to_string()),
        });
        return ValidationResult::Invalid(failures);
    };

    check_fields("", config, &schema.fields, true, &mut failures);

    if failures.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(failures)
    }
}

fn check_fields(
    path: &str,
    config: &Config,
    fields: &[Field],
    top_level: bool,
    failures: &mut Vec<Failure>,
) {
    for field in fields {
        let field_path = join_path(path, &field.name);
        match config.get(&field.name) {
            None if field.required => failures.push(Failure {
                path: field_path,
                kind: FailureKind::MissingRequiredField,
                expected: Some(field.shape.name()),
                actual: None,
            }),
            None => {}
            Some(value) => check_shape(&field_path, value, &field.shape, failures),
        }
    }

    for name in config.keys() {
        let declared = fields.iter().any(|field| &field.name == name);
        let universal = top_level && UNIVERSAL_FIELDS.contains(&name.as_str());
        if !declared && !universal {
            failures.push(Failure {
                path: join_path(path, name),
                kind: FailureKind::UnexpectedField,
                expected: None,
                actual: None,
            });
        }
    }
}

fn check_shape(path: &str, value: &Value, shape: &Shape, failures: &mut Vec<Failure>) {
    match shape {
        Shape::Any => {}
        Shape::String => {
            if !value.is_string() {
                failures.push(wrong_type(path, shape, value));
            }
        }
        Shape::Boolean => {
            if !value.is_boolean() {
                failures.push(wrong_type(path, shape, value));
            }
        }
        Shape::Integer => {
            if !value.is_i64() && !value.is_u64() {
                failures.push(wrong_type(path, shape, value));
            }
        }
        Shape::Number => {
            if !value.is_number() {
                failures.push(wrong_type(path, shape, value));
            }
        }
        Shape::Enum(options) => match value.as_str() {
            Some(text) if options.iter().any(|option| option == text) => {}
            Some(text) => failures.push(Failure {
                path: path.to_string(),
                kind: FailureKind::WrongEnumValue,
                expected: Some(options.join(" | ")),
                actual: Some(text.to_string()),
            }),
            None => failures.push(wrong_type(path, shape, value)),
        },
        Shape::Object(fields) => match value.as_object() {
            Some(config) => check_fields(path, config, fields, false, failures),
            None => failures.push(wrong_type(path, shape, value)),
        },
        Shape::List(inner) => match value.as_array() {
            Some(items) => {
                for (index, item) in items.iter().enumerate() {
                    check_shape(&format!("{}.{}", path, index), item, inner, failures);
                }
            }
            None => failures.push(wrong_type(path, shape, value)),
        },
        Shape::Union(alternatives) => {
            // Collapse: if any alternative matches cleanly the value is
            // fine; otherwise suppress the per-alternative noise and
            // report one mismatch against the union as a whole.
            let matches_any = alternatives.iter().any(|alternative| {
                let mut scratch = Vec::new();
                check_shape(path, value, alternative, &mut scratch);
                scratch.is_empty()
            });
            if !matches_any {
                failures.push(wrong_type(path, shape, value));
            }
        }
    }
}

fn wrong_type(path: &str, shape: &Shape, value: &Value) -> Failure {
    Failure {
        path: path.to_string(),
        kind: FailureKind::WrongType,
        expected: Some(shape.name()),
        actual: Some(value_type_name(value).to_string()),
    }
}

fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
