//! Token to identity resolution.

use std::sync::Arc;
use tracing::debug;

use crate::{client::IdentityClient, identity::Identity};

/// Result of a single resolution, before it is exposed by the guard.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthOutcome<T> {
    Authenticated(T),
    /// The service does not recognise the token.
    Anonymous,
    /// The service could not be asked (transport error, bad response).
    Failed(String),
}

impl<T> AuthOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AuthOutcome<U> {
        match self {
            Self::Authenticated(value) => AuthOutcome::Authenticated(f(value)),
            Self::Anonymous => AuthOutcome::Anonymous,
            Self::Failed(reason) => AuthOutcome::Failed(reason),
        }
    }

    pub fn authenticated(self) -> Option<T> {
        match self {
            Self::Authenticated(value) => Some(value),
            Self::Anonymous | Self::Failed(_) => None,
        }
    }
}

/// Calls the identity service once per `resolve`; never retries and never
/// lets a client error through.
#[derive(Debug)]
pub struct IdentityResolver<C> {
    client: Arc<C>,
}

impl<C> Clone for IdentityResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: IdentityClient> IdentityResolver<C> {
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn resolve(&self, raw_token: &str) -> AuthOutcome<Identity> {
        match self.client.get_identity(raw_token).await {
            Ok(Some(identity)) => {
                debug!(identity = %identity.id, "token resolved");
                AuthOutcome::Authenticated(identity)
            }
            Ok(None) => {
                debug!("token not recognised by identity service");
                AuthOutcome::Anonymous
            }
            Err(e) => {
                debug!("identity resolution failed: {}", e);
                AuthOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeIdentityClient;

    #[tokio::test]
    async fn resolves_known_token() {
        let client = Arc::new(FakeIdentityClient::new().with_identity("good", Identity::new("u-1")));
        let resolver = IdentityResolver::new(Arc::clone(&client));

        let outcome = resolver.resolve("good").await;
        assert_eq!(outcome, AuthOutcome::Authenticated(Identity::new("u-1")));
        assert_eq!(client.calls().get_identity, 1);
    }

    #[tokio::test]
    async fn unknown_token_is_anonymous() {
        let client = Arc::new(FakeIdentityClient::new());
        let resolver = IdentityResolver::new(client);

        assert_eq!(resolver.resolve("unknown").await, AuthOutcome::Anonymous);
    }

    #[tokio::test]
    async fn transport_failure_is_failed_outcome_without_retry() {
        let client = Arc::new(FakeIdentityClient::new().failing_identity());
        let resolver = IdentityResolver::new(Arc::clone(&client));

        let outcome = resolver.resolve("good").await;
        assert!(matches!(outcome, AuthOutcome::Failed(_)));
        assert_eq!(outcome.authenticated(), None);
        assert_eq!(client.calls().get_identity, 1);
    }

    #[test]
    fn map_preserves_non_authenticated_variants() {
        let failed: AuthOutcome<u8> = AuthOutcome::Failed("down".to_string());
        assert_eq!(failed.map(|v| v + 1), AuthOutcome::Failed("down".to_string()));
        assert_eq!(AuthOutcome::Authenticated(1).map(|v| v + 1), AuthOutcome::Authenticated(2));
        assert_eq!(AuthOutcome::<u8>::Anonymous.map(|v| v + 1), AuthOutcome::Anonymous);
    }
}
