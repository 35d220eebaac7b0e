//! Scope negotiation for credential authorization.

use std::fmt;

/// Ordered, de-duplicated set of scopes requested for a new token.
///
/// The initial scope always comes first, followed by the "uses" scopes in
/// their configured order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scopes {
    scopes: Vec<String>,
}

impl Scopes {
    #[must_use]
    pub fn new<I, S>(initial: &str, uses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut scopes = Self::default();
        scopes.push(initial);
        for scope in uses {
            scopes.push(scope.as_ref());
        }
        scopes
    }

    /// Parse a comma-delimited list, as sent on the wire.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let mut scopes = Self::default();
        for scope in list.split(',') {
            scopes.push(scope);
        }
        scopes
    }

    fn push(&mut self, scope: &str) {
        let scope = scope.trim();
        if scope.is_empty() || self.scopes.iter().any(|s| s == scope) {
            return;
        }
        self.scopes.push(scope.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Comma-joined form sent to the identity service.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.scopes.join(",")
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
