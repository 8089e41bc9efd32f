use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

pub fn validate<T: Validate>(val: &T) -> Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Appends a field error carrying a user-facing message.
pub fn add_field_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: impl Into<String>,
) {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message.into()));
    errors.add(field, error);
}

pub fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<String>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    add_field_error(&mut errors, field, code, message);
    errors
}

/// Runs derive-based validation and lets the caller add checks the derive cannot express.
pub fn validate_with<T: Validate>(
    val: &T,
    extra: impl FnOnce(&mut ValidationErrors),
) -> Result<(), ValidationErrors> {
    let mut errors = match val.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    extra(&mut errors);
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
