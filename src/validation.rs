//! Field-level schema checks for JSON request bodies.
//!
//! A body is first checked against an [`ObjectSchema`], which reports every
//! missing, mistyped or unexpected field at once. Only a body that passes
//! is deserialized and handed to [`validator::Validate`] for value constraints.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// A whole number that fits in an `i32`.
    Integer,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value
                .as_i64()
                .and_then(|value| i32::try_from(value).ok())
                .is_some(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "32-bit integer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// The set of fields an object may carry. Fields not listed are rejected.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    pub fields: &'static [FieldSpec],
}

impl ObjectSchema {
    pub fn check(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let Some(object) = value.as_object() else {
            return Err(vec![Violation::not_an_object()]);
        };

        let violations = self.violations(object);

        match violations.is_empty() {
            true => Ok(()),
            false => Err(violations),
        }
    }

    fn violations(&self, object: &Map<String, Value>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for spec in self.fields {
            match object.get(spec.name) {
                None if spec.required => violations.push(Violation::missing(spec.name)),
                None => {}
                Some(value) if !spec.kind.matches(value) => {
                    violations.push(Violation::wrong_type(spec.name, spec.kind))
                }
                Some(_) => {}
            }
        }

        let mut unexpected: Vec<&String> = object
            .keys()
            .filter(|key| !self.fields.iter().any(|spec| spec.name == key.as_str()))
            .collect();
        unexpected.sort();

        violations.extend(unexpected.into_iter().map(|key| Violation::not_allowed(key)));

        violations
    }
}

/// Request bodies that declare the fields they accept.
pub trait BodySchema {
    const SCHEMA: ObjectSchema;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    NotAnObject,
    Missing,
    WrongType,
    NotAllowed,
    Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub reason: String,
}

impl Violation {
    fn not_an_object() -> Self {
        Self {
            field: String::new(),
            kind: ViolationKind::NotAnObject,
            reason: String::from("Body must be a JSON object"),
        }
    }

    fn missing(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::Missing,
            reason: format!("`{field}` is required"),
        }
    }

    fn wrong_type(field: &str, kind: FieldKind) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::WrongType,
            reason: format!("`{field}` must be of type {}", kind.name()),
        }
    }

    fn not_allowed(field: &str) -> Self {
        Self {
            field: field.to_string(),
            kind: ViolationKind::NotAllowed,
            reason: format!("`{field}` is not allowed"),
        }
    }

    /// Flattens `validator` errors, sorted by field name.
    pub fn from_validation_errors(errors: &validator::ValidationErrors) -> Vec<Self> {
        let mut violations: Vec<Self> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                let field = field.to_string();

                errors.iter().map(move |error| Self {
                    field: field.clone(),
                    kind: ViolationKind::Constraint,
                    reason: error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string()),
                })
            })
            .collect();

        violations.sort_by(|a, b| a.field.cmp(&b.field));

        violations
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const SCHEMA: ObjectSchema = ObjectSchema {
        fields: &[
            FieldSpec::required("title", FieldKind::String),
            FieldSpec::required("year", FieldKind::Integer),
            FieldSpec::optional("subtitle", FieldKind::String),
        ],
    };

    fn kinds(violations: &[Violation]) -> Vec<(&str, ViolationKind)> {
        violations
            .iter()
            .map(|violation| (violation.field.as_str(), violation.kind))
            .collect()
    }

    #[test]
    fn accepts_conforming_object() {
        assert!(SCHEMA.check(&json!({ "title": "Dune", "year": 1965 })).is_ok());
        assert!(SCHEMA
            .check(&json!({ "title": "Dune", "year": 1965, "subtitle": "" }))
            .is_ok());
    }

    #[test]
    fn rejects_non_objects() {
        let violations = SCHEMA.check(&json!([1, 2, 3])).unwrap_err();

        assert_eq!(kinds(&violations), vec![("", ViolationKind::NotAnObject)]);
    }

    #[test]
    fn reports_every_violation() {
        let violations = SCHEMA
            .check(&json!({ "year": "1965", "isbn": "123", "badField": true }))
            .unwrap_err();

        assert_eq!(
            kinds(&violations),
            vec![
                ("title", ViolationKind::Missing),
                ("year", ViolationKind::WrongType),
                ("badField", ViolationKind::NotAllowed),
                ("isbn", ViolationKind::NotAllowed),
            ]
        );
    }

    #[test]
    fn integer_rejects_values_outside_i32() {
        for year in [json!(3_000_000_000i64), json!(-3_000_000_000i64), json!(u64::MAX)] {
            let violations = SCHEMA
                .check(&json!({ "title": "Dune", "year": year }))
                .unwrap_err();

            assert_eq!(kinds(&violations), vec![("year", ViolationKind::WrongType)]);
        }

        assert!(SCHEMA
            .check(&json!({ "title": "Dune", "year": i32::MAX }))
            .is_ok());
        assert!(SCHEMA
            .check(&json!({ "title": "Dune", "year": i32::MIN }))
            .is_ok());
    }

    #[test]
    fn optional_field_may_be_absent_but_not_mistyped() {
        assert!(SCHEMA.check(&json!({ "title": "Dune", "year": 1965 })).is_ok());

        let violations = SCHEMA
            .check(&json!({ "title": "Dune", "year": 1965, "subtitle": 1 }))
            .unwrap_err();

        assert_eq!(kinds(&violations), vec![("subtitle", ViolationKind::WrongType)]);
    }

    #[test]
    fn integer_rejects_fractions() {
        let violations = SCHEMA
            .check(&json!({ "title": "Dune", "year": 1965.5 }))
            .unwrap_err();

        assert_eq!(kinds(&violations), vec![("year", ViolationKind::WrongType)]);
    }
}
