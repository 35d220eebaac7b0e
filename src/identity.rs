//! Verified principals returned by the identity service and the application
//! users built from them.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Principal payload returned by the identity service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Every other attribute the service chose to include.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            scopes: Vec::new(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

// Services disagree on whether ids are strings or integers.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(de::Error::custom(format!("invalid identity id: {other}"))),
    }
}

/// Anything the guard can treat as an authenticated principal.
pub trait HasIdentity {
    fn identity(&self) -> &Identity;

    fn identifier(&self) -> &str {
        &self.identity().id
    }
}

/// Maps a resolved identity into the application's user type.
pub trait UserFactory: Send + Sync {
    type User: HasIdentity + Clone + Send + Sync;

    fn create(&self, identity: Identity) -> Self::User;
}

/// User type used when the application has no richer model of its own.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct User {
    identity: Identity,
}

impl User {
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.identity.email.as_deref()
    }
}

impl HasIdentity for User {
    fn identity(&self) -> &Identity {
        &self.identity
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultUserFactory;

impl UserFactory for DefaultUserFactory {
    type User = User;

    fn create(&self, identity: Identity) -> User {
        User { identity }
    }
}
