//! Input validation helpers
//!
//! Field rules live on the request types as `validator` derives; this
//! module holds the pieces that sit around them.

use validator::ValidationErrors;

/// Canonical form of an email address used for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// First failing field and its message, in field-name order so the
/// reported error is stable across runs.
pub fn first_error(errors: &ValidationErrors) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields.into_iter().find_map(|(field, errs)| {
        errs.first().map(|err| {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", err.code));
            (field, message)
        })
    })
}
