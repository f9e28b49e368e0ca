//! Contact form validation

use crate::i18n::{ErrorKey, Translation};
use serde::Deserialize;
use std::fmt;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 500;

/// Form fields of the contact page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted contact form. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub lang: String,
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    NameTooShort { min: usize },
    NameTooLong { max: usize },
    EmailInvalid,
    MessageTooShort { min: usize },
    MessageTooLong { max: usize },
}

impl ValidationError {
    pub fn field(self) -> Field {
        match self {
            ValidationError::NameTooShort { .. } | ValidationError::NameTooLong { .. } => Field::Name,
            ValidationError::EmailInvalid => Field::Email,
            ValidationError::MessageTooShort { .. } | ValidationError::MessageTooLong { .. } => {
                Field::Message
            }
        }
    }

    pub fn key(self) -> ErrorKey {
        match self {
            ValidationError::NameTooShort { .. } => ErrorKey::NameMin,
            ValidationError::NameTooLong { .. } => ErrorKey::NameMax,
            ValidationError::EmailInvalid => ErrorKey::EmailInvalid,
            ValidationError::MessageTooShort { .. } => ErrorKey::MessageMin,
            ValidationError::MessageTooLong { .. } => ErrorKey::MessageMax,
        }
    }

    pub fn params(self) -> Vec<String> {
        match self {
            ValidationError::NameTooShort { min } | ValidationError::MessageTooShort { min } => {
                vec![min.to_string()]
            }
            ValidationError::NameTooLong { max } | ValidationError::MessageTooLong { max } => {
                vec![max.to_string()]
            }
            ValidationError::EmailInvalid => Vec::new(),
        }
    }

    /// Raw code such as `z_name_min|2`
    pub fn code(self) -> String {
        std::iter::once(self.key().as_str().to_string())
            .chain(self.params())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Messages per field, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(Field, Vec<String>)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => {
                self.entries.push((field, vec![message.into()]));
                self.entries.sort_by_key(|(f, _)| *f);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: Field) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or_default()
    }

    /// First message for `field`, if any
    pub fn first(&self, field: Field) -> Option<&str> {
        self.get(field).first().map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.entries.iter().map(|(f, _)| *f)
    }

    /// Rewrite every raw code into its localized message
    pub fn translate(&mut self, translation: &Translation) {
        for (_, messages) in &mut self.entries {
            for message in messages.iter_mut() {
                *message = translation.translate_code(message);
            }
        }
    }
}

/// Validate a submission, collecting raw error codes per field
pub fn validate(submission: &ContactSubmission) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for error in check(submission) {
        errors.push(error.field(), error.code());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every rule the submission breaks
pub fn check(submission: &ContactSubmission) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let name_len = submission.name.chars().count();
    if name_len < NAME_MIN {
        errors.push(ValidationError::NameTooShort { min: NAME_MIN });
    } else if name_len > NAME_MAX {
        errors.push(ValidationError::NameTooLong { max: NAME_MAX });
    }

    if !is_valid_email(&submission.email) {
        errors.push(ValidationError::EmailInvalid);
    }

    let message_len = submission.message.chars().count();
    if message_len < MESSAGE_MIN {
        errors.push(ValidationError::MessageTooShort { min: MESSAGE_MIN });
    } else if message_len > MESSAGE_MAX {
        errors.push(ValidationError::MessageTooLong { max: MESSAGE_MAX });
    }

    errors
}

/// `local@domain.tld` with an ASCII local part, dotted domain labels and an
/// alphabetic top-level domain of at least two letters
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_'+-.".contains(c))
        && local
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphanumeric() || "_+-".contains(c));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    if hosts.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    hosts.iter().all(|label| {
        label
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
