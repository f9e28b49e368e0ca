//! Tagged success/failure values for operations whose failure is reported
//! rather than propagated.
//!
//! Device probing and model loading never fail past their own boundary: they
//! hand back an [`Outcome`] carrying either the value or a human-readable
//! reason, and the caller decides whether to look at it.

use crate::error::Error;

/// Either a value or a failure message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Ok(T),
    Error(String),
}

/// Wrap a value in a successful outcome
pub fn ok<T>(value: T) -> Outcome<T> {
    Outcome::Ok(value)
}

/// Build a failed outcome from a message
pub fn error<T>(message: impl Into<String>) -> Outcome<T> {
    Outcome::Error(message.into())
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        !self.is_ok()
    }

    /// Borrow the value of a successful outcome
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    /// Borrow the message of a failed outcome
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Error(message) => Some(message),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Error(message) => Outcome::Error(message),
        }
    }

    /// Convert into a crate [`Result`](crate::Result) so callers can use `?`
    pub fn into_result(self) -> crate::Result<T> {
        match self {
            Outcome::Ok(value) => Ok(value),
            Outcome::Error(message) => Err(Error::Visualization(message)),
        }
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for Outcome<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(e) => Outcome::Error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_are_exclusive() {
        let outcomes: Vec<Outcome<i32>> = vec![ok(1), ok(0), error("boom"), error("")];
        for outcome in &outcomes {
            assert_ne!(outcome.is_ok(), outcome.is_error());
        }
    }

    #[test]
    fn test_empty_message_is_still_an_error() {
        let outcome: Outcome<()> = error("");
        assert!(outcome.is_error());
        assert_eq!(outcome.error_message(), Some(""));
    }

    #[test]
    fn test_accessors() {
        let good = ok("model");
        assert_eq!(good.value(), Some(&"model"));
        assert_eq!(good.error_message(), None);

        let bad: Outcome<&str> = error("Failed to load model: 404");
        assert_eq!(bad.value(), None);
        assert_eq!(bad.error_message(), Some("Failed to load model: 404"));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ok(3).into_result().unwrap(), 3);
        let err = error::<u8>("no adapter").into_result().unwrap_err();
        assert!(err.to_string().contains("no adapter"));
    }

    #[test]
    fn test_from_result() {
        let outcome: Outcome<u8> = Err::<u8, _>(Error::Gpu("lost".into())).into();
        assert_eq!(outcome.error_message(), Some("GPU error: lost"));
        assert_eq!(ok(2).map(|v| v * 2), ok(4));
    }
}
