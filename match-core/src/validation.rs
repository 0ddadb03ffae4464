//! Field-level validation error tree.
//!
//! Serializes to the shape clients expect from a 400 response:
//!
//! ```json
//! {"email": ["Enter a valid email address."],
//!  "profile": {"joinDate": ["This field is required."]}}
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const MIN_ONE: &str = "Ensure this value is greater than or equal to 1.";
pub const INVALID_DATE: &str =
    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
pub const INVALID_DATETIME: &str = "Datetime has wrong format. Use one of these formats \
     instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";
pub const DUPLICATE_EMAIL: &str = "user with this email already exists.";

/// Message for a string longer than `max` characters.
#[must_use]
pub fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

/// Message for an integer above `max`.
#[must_use]
pub fn too_large(max: u64) -> String {
    format!("Ensure this value is less than or equal to {max}.")
}

/// Message for a primary key given as the wrong JSON kind.
#[must_use]
pub fn incorrect_pk_type(kind: &str) -> String {
    format!("Incorrect type. Expected pk value, received {kind}.")
}

/// Message for a primary key that names no existing row.
#[must_use]
pub fn missing_pk(pk: i64) -> String {
    format!("Invalid pk \"{pk}\" - object does not exist.")
}

/// Errors recorded against one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldErrors {
    /// Messages for a scalar field.
    Messages(Vec<String>),
    /// Errors inside a nested object.
    Nested(ValidationErrors),
}

/// Ordered map from field name to its errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, FieldErrors>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A tree holding a single non-field error.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    /// Records `message` against `field`.
    ///
    /// A field that already holds nested errors keeps them and gains no
    /// scalar message.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        match self.0.get_mut(field) {
            Some(FieldErrors::Messages(messages)) => messages.push(message.into()),
            Some(FieldErrors::Nested(_)) => {}
            None => {
                self.0
                    .insert(field.to_owned(), FieldErrors::Messages(vec![message.into()]));
            }
        }
    }

    /// Records a nested error tree against `field`. Empty trees are ignored.
    pub fn nest(&mut self, field: &str, nested: ValidationErrors) {
        if !nested.is_empty() {
            self.0.insert(field.to_owned(), FieldErrors::Nested(nested));
        }
    }

    /// Folds `other` into `self`. Fields already present keep their place.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.0 {
            match errors {
                FieldErrors::Messages(messages) => {
                    for message in messages {
                        self.add(&field, message);
                    }
                }
                FieldErrors::Nested(nested) => self.nest(&field, nested),
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldErrors> {
        self.0.get(field)
    }

    /// Scalar messages for `field`; empty when none or when nested.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        match self.0.get(field) {
            Some(FieldErrors::Messages(messages)) => messages,
            _ => &[],
        }
    }

    /// Nested tree for `field`, if any.
    #[must_use]
    pub fn nested(&self, field: &str) -> Option<&ValidationErrors> {
        match self.0.get(field) {
            Some(FieldErrors::Nested(nested)) => Some(nested),
            _ => None,
        }
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    /// Returns `self` when it is non-empty.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            match errors {
                FieldErrors::Messages(messages) => write!(f, "{field}: {}", messages.join(" "))?,
                FieldErrors::Nested(nested) => write!(f, "{field}.{{{nested}}}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_appends_new_fields_and_extends_existing_ones() {
        let mut errors = ValidationErrors::new();
        errors.add("cohortSize", MIN_ONE);
        errors.add("programme", NOT_NULL);

        let mut found = ValidationErrors::new();
        found.add("createdBy", missing_pk(9));
        found.add("programme", missing_pk(3));
        errors.merge(found);

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, ["cohortSize", "programme", "createdBy"]);
        assert_eq!(errors.messages("programme"), [NOT_NULL.to_owned(), missing_pk(3)]);
        assert_eq!(errors.messages("createdBy"), [missing_pk(9)]);
    }

    #[test]
    fn validation_errors_serialize_nested_tree_in_order() {
        let mut profile = ValidationErrors::new();
        profile.add("joinDate", REQUIRED);

        let mut errors = ValidationErrors::new();
        errors.add("email", INVALID_EMAIL);
        errors.nest("profile", profile);
        errors.add("email", NOT_BLANK);

        let json = match serde_json::to_string(&errors) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        };
        assert_eq!(
            json,
            r#"{"email":["Enter a valid email address.","This field may not be blank."],"profile":{"joinDate":["This field is required."]}}"#
        );
    }

    #[test]
    fn validation_errors_empty_nest_is_ignored() {
        let mut errors = ValidationErrors::new();
        errors.nest("profile", ValidationErrors::new());
        assert!(errors.is_empty());
        assert!(errors.into_result(()).is_ok());
    }

    #[test]
    fn validation_errors_display_lists_fields() {
        let mut errors = ValidationErrors::non_field("Invalid data.");
        errors.add("name", REQUIRED);
        let text = errors.to_string();
        assert!(text.contains("non_field_errors: Invalid data."), "got {text}");
        assert!(text.contains("name: This field is required."), "got {text}");
    }
}
