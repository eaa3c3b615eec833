//! Contact form validation.
//!
//! A submission needs a non-blank name, email and message, and the email
//! must have a basic `local@domain.tld` shape. Fields are trimmed; a blank
//! subject is treated as absent.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::models::{ContactForm, NewContact};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Whether `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn non_blank(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn validate_contact(form: ContactForm) -> Result<NewContact, ValidationError> {
    let (Some(name), Some(email), Some(message)) = (
        non_blank(form.name),
        non_blank(form.email),
        non_blank(form.message),
    ) else {
        return Err(ValidationError::MissingFields);
    };

    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(NewContact {
        name,
        email,
        subject: non_blank(form.subject),
        message,
    })
}
