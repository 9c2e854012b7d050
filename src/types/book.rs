use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{BodySchema, FieldKind, FieldSpec, ObjectSchema};

/// A stored book. `isbn` is the primary key and never changes.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, ToSchema, sqlx::FromRow,
)]
pub struct Book {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

/// Body of `POST /books`.
#[derive(Debug, Clone, Deserialize, JsonSchema, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewBook {
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    #[validate(range(min = 1, message = "Must be a positive number"))]
    pub pages: i32,
    pub publisher: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub title: String,
    pub year: i32,
}

impl BodySchema for NewBook {
    const SCHEMA: ObjectSchema = ObjectSchema {
        fields: &[
            FieldSpec::required("isbn", FieldKind::String),
            FieldSpec::required("amazon_url", FieldKind::String),
            FieldSpec::required("author", FieldKind::String),
            FieldSpec::required("language", FieldKind::String),
            FieldSpec::required("pages", FieldKind::Integer),
            FieldSpec::required("publisher", FieldKind::String),
            FieldSpec::required("title", FieldKind::String),
            FieldSpec::required("year", FieldKind::Integer),
        ],
    };
}

/// Body of `PUT /books/{isbn}`. Replaces every mutable field.
///
/// `isbn` is taken from the path and is rejected if present in the body.
#[derive(Debug, Clone, Deserialize, JsonSchema, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct BookChanges {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    #[validate(range(min = 1, message = "Must be a positive number"))]
    pub pages: i32,
    pub publisher: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub title: String,
    pub year: i32,
}

impl BodySchema for BookChanges {
    const SCHEMA: ObjectSchema = ObjectSchema {
        fields: &[
            FieldSpec::required("amazon_url", FieldKind::String),
            FieldSpec::required("author", FieldKind::String),
            FieldSpec::required("language", FieldKind::String),
            FieldSpec::required("pages", FieldKind::Integer),
            FieldSpec::required("publisher", FieldKind::String),
            FieldSpec::required("title", FieldKind::String),
            FieldSpec::required("year", FieldKind::Integer),
        ],
    };
}
