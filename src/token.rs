//! Request-scoped bearer credential.
//!
//! A `Token` is owned by exactly one guard for the duration of a request. The
//! raw value is kept in a `SecretString` so it never ends up in `Debug` output
//! or logs.

use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Default)]
pub struct Token {
    raw: Option<SecretString>,
    invalidated: bool,
}

impl Token {
    /// Wrap the optional result of a token source extraction.
    ///
    /// Empty and whitespace-only values are treated as absent.
    #[must_use]
    pub fn new(raw: Option<String>) -> Self {
        Self {
            raw: raw.and_then(normalize).map(SecretString::from),
            invalidated: false,
        }
    }

    /// Raw value, or `None` when absent or invalidated.
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        if self.invalidated {
            return None;
        }

        self.raw.as_ref().map(ExposeSecret::expose_secret)
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    #[must_use]
    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    /// Install a freshly issued value. Clears any previous invalidation.
    pub fn set(&mut self, raw: impl Into<String>) {
        self.raw = normalize(raw.into()).map(SecretString::from);
        self.invalidated = false;
    }

    /// Mark the current value as used up; it can no longer be read.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn unset(&mut self) {
        self.raw = None;
    }
}

fn normalize(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == raw.len() {
        Some(raw)
    } else {
        Some(trimmed.to_string())
    }
}
