//! Field-level validation errors.
//!
//! Produced locally by form validation (registration, shipping address) and
//! parsed from the server's 400 responses, which look like
//! `{"username": ["A user with that username already exists."]}` or
//! `{"error": "productId and action are required"}`.

use core::fmt;

use serde_json::Value;

/// Key used for messages that do not belong to a single field.
pub const NON_FIELD: &str = "non_field_errors";

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every failed rule for a form, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// A single error not tied to a field.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(NON_FIELD, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages reported for `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when there is at least one.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Parse a 400 response body.
    ///
    /// Object members become field errors in field-name order. Arrays
    /// contribute each element and nested objects are flattened with dotted
    /// field names. Anything else is kept as a general error. Returns an
    /// empty set for an empty body.
    #[must_use]
    pub fn from_response_body(body: &str) -> Self {
        let body = body.trim();
        if body.is_empty() {
            return Self::new();
        }
        let mut errors = Self::new();
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => {
                for (field, value) in map {
                    collect_messages(&mut errors, &field, &value);
                }
            }
            Ok(Value::String(message)) => errors.push(NON_FIELD, message),
            Ok(Value::Array(items)) => {
                for item in &items {
                    collect_messages(&mut errors, NON_FIELD, item);
                }
            }
            Ok(other) => errors.push(NON_FIELD, other.to_string()),
            Err(_) => errors.push(NON_FIELD, body.chars().take(200).collect::<String>()),
        }
        errors
    }
}

fn collect_messages(errors: &mut FieldErrors, field: &str, value: &Value) {
    match value {
        Value::String(message) => errors.push(field, message.clone()),
        Value::Array(items) => {
            for item in items {
                collect_messages(errors, field, item);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                collect_messages(errors, &format!("{field}.{key}"), nested);
            }
        }
        Value::Null => {}
        other => errors.push(field, other.to_string()),
    }
}

/// All messages joined by a single space, each distinct message once.
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut written: Vec<&str> = Vec::with_capacity(self.errors.len());
        for error in &self.errors {
            if written.contains(&error.message.as_str()) {
                continue;
            }
            if !written.is_empty() {
                f.write_str(" ")?;
            }
            f.write_str(&error.message)?;
            written.push(&error.message);
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_field_arrays() {
        let body = r#"{"username":["A user with that username already exists."],"email":["Enter a valid email address."]}"#;
        let errors = FieldErrors::from_response_body(body);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.for_field("username").collect::<Vec<_>>(),
            vec!["A user with that username already exists."]
        );
        assert_eq!(
            errors.to_string(),
            "Enter a valid email address. A user with that username already exists."
        );
    }

    #[test]
    fn test_parses_error_and_detail_strings() {
        let errors = FieldErrors::from_response_body(r#"{"error":"Payment verification failed","details":"bad signature"}"#);
        assert_eq!(errors.for_field("error").next(), Some("Payment verification failed"));
        assert_eq!(errors.for_field("details").next(), Some("bad signature"));
    }

    #[test]
    fn test_nested_objects_get_dotted_fields() {
        let errors =
            FieldErrors::from_response_body(r#"{"shipping":{"zipcode":["This field is required."]}}"#);
        assert_eq!(
            errors.for_field("shipping.zipcode").next(),
            Some("This field is required.")
        );
    }

    #[test]
    fn test_non_json_body_is_a_general_error() {
        let errors = FieldErrors::from_response_body("Bad Request");
        assert_eq!(errors.for_field(NON_FIELD).next(), Some("Bad Request"));
        assert!(FieldErrors::from_response_body("   ").is_empty());
    }

    #[test]
    fn test_display_collapses_repeated_messages() {
        let mut errors = FieldErrors::new();
        errors.push("city", "Required.");
        errors.push("state", "Required.");
        errors.push("phone", "Too short.");
        assert_eq!(errors.to_string(), "Required. Too short.");
    }

    #[test]
    fn test_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        let err = FieldErrors::general("nope").into_result().unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }
}
