//! Per-request authentication guard.
//!
//! Flow Overview: the request token is resolved into a user at most once, on
//! the first `user()` call, and cached for the rest of the request. Every
//! remote failure ends up as "not authenticated"; only `logout` without a
//! token and `user_or_fail` without a user are reported as errors.
//!
//! A guard belongs to one request. It is driven through `&mut self` and is not
//! meant to be shared between tasks.

mod error;


pub use self::error::AuthError;

use http::request::Parts;
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, future::Future, sync::Arc};
use tracing::{debug, warn};

use crate::{
    client::IdentityClient,
    config::IdentityConfig,
    events::{AuthEvent, EventSink},
    identity::{HasIdentity, UserFactory},
    resolver::{AuthOutcome, IdentityResolver},
    scopes::Scopes,
    source::TokenSource,
    token::Token,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    /// Nothing has been resolved yet.
    Unresolved,
    Authenticated,
    /// Resolution ran and produced no user (no token, unknown token, or the
    /// identity service was unreachable). Reads like `LoggedOut` with a
    /// "no token" reason, but unlike `LoggedOut` a later `set_token` may
    /// resolve again.
    Anonymous,
    /// `logout()` ran. Only `set_user` or a successful `attempt` leaves it.
    LoggedOut,
}

#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: SecretString::from(password.into()),
        }
    }

    /// Email, when present and not blank.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }
}

/// Operations every authentication guard offers to request handlers.
pub trait AuthGuard {
    type User;

    /// The authenticated user, resolving the request token on first use.
    fn user(&mut self) -> impl Future<Output = Option<&Self::User>> + Send;

    /// # Errors
    /// Returns `AuthError::UserNotDefined` when no user can be resolved.
    fn user_or_fail(&mut self) -> impl Future<Output = Result<&Self::User, AuthError>> + Send;

    /// Check credentials without logging in.
    fn validate(&self, credentials: &Credentials) -> impl Future<Output = bool> + Send;

    /// Log in with credentials; `false` on any rejection or failure.
    fn attempt(
        &mut self,
        credentials: &Credentials,
        remember: bool,
    ) -> impl Future<Output = bool> + Send;

    /// # Errors
    /// Returns `AuthError::TokenMissing` when the request carries no usable token.
    fn logout(&mut self) -> impl Future<Output = Result<(), AuthError>> + Send;

    fn set_user(&mut self, user: Self::User) -> &mut Self;
}

pub struct Guard<C, F, E>
where
    F: UserFactory,
{
    name: String,
    resolver: IdentityResolver<C>,
    users: F,
    events: E,
    scopes: Scopes,
    token: Token,
    user: Option<F::User>,
    state: GuardState,
}

impl<C, F, E> Guard<C, F, E>
where
    C: IdentityClient,
    F: UserFactory,
    E: EventSink<F::User>,
{
    #[must_use]
    pub fn new(config: &IdentityConfig, client: Arc<C>, users: F, events: E, token: Token) -> Self {
        Self {
            name: config.guard_name().to_string(),
            resolver: IdentityResolver::new(client),
            users,
            events,
            scopes: config.scope_config().scopes(),
            token,
            user: None,
            state: GuardState::Unresolved,
        }
    }

    /// Build a guard for `request`, taking its token from `source`.
    #[must_use]
    pub fn from_request<S: TokenSource + ?Sized>(
        config: &IdentityConfig,
        client: Arc<C>,
        users: F,
        events: E,
        source: &S,
        request: &Parts,
    ) -> Self {
        let token = Token::new(source.extract(request));
        Self::new(config, client, users, events, token)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Replace the request token. An anonymous guard resolves the new token on
    /// the next `user()` call; a logged out guard stays logged out.
    pub fn set_token(&mut self, raw: impl Into<String>) -> &mut Self {
        self.token.set(raw);
        if self.state == GuardState::Anonymous {
            self.state = GuardState::Unresolved;
        }
        self
    }

    #[must_use]
    pub fn has_user(&self) -> bool {
        self.user.is_some()
    }

    pub async fn check(&mut self) -> bool {
        self.user().await.is_some()
    }

    pub async fn guest(&mut self) -> bool {
        !self.check().await
    }

    pub async fn id(&mut self) -> Option<String> {
        self.user().await.map(|user| user.identifier().to_string())
    }

    fn client(&self) -> &C {
        self.resolver.client()
    }

    fn require_token(&self) -> Result<&str, AuthError> {
        self.token.get().ok_or(AuthError::TokenMissing)
    }

    async fn attempt_by_email(&mut self, email: &str, password: &str, remember: bool) -> bool {
        let pair = match self
            .client()
            .authorize_by_credentials(email, password, &self.scopes)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                debug!(guard = %self.name, "authorization failed: {}", e);
                return false;
            }
        };

        let access_token = pair.access_token.value;

        let identity = match self.resolver.resolve(&access_token).await {
            AuthOutcome::Authenticated(identity) => identity,
            AuthOutcome::Anonymous => {
                debug!(guard = %self.name, "issued token was not recognised");
                return false;
            }
            AuthOutcome::Failed(reason) => {
                debug!(guard = %self.name, "identity lookup for issued token failed: {}", reason);
                return false;
            }
        };

        let user = self.users.create(identity);
        self.login(user, access_token, remember);

        true
    }

    fn login(&mut self, user: F::User, token: String, remember: bool) {
        self.token.set(token);
        self.user = Some(user.clone());
        self.state = GuardState::Authenticated;

        self.events.dispatch(AuthEvent::Login {
            guard: self.name.clone(),
            user,
            remember,
        });
    }
}

impl<C, F, E> AuthGuard for Guard<C, F, E>
where
    C: IdentityClient,
    F: UserFactory,
    E: EventSink<F::User>,
{
    type User = F::User;

    async fn user(&mut self) -> Option<&F::User> {
        if matches!(self.state, GuardState::Anonymous | GuardState::LoggedOut) {
            return None;
        }

        if self.user.is_none() {
            let Some(raw) = self.token.get().map(str::to_owned) else {
                debug!(guard = %self.name, "no token on request");
                self.state = GuardState::Anonymous;
                return None;
            };

            let outcome = self.resolver.resolve(&raw).await;

            match outcome.map(|identity| self.users.create(identity)).authenticated() {
                Some(user) => {
                    self.user = Some(user);
                    self.state = GuardState::Authenticated;
                }
                None => {
                    self.state = GuardState::Anonymous;
                    return None;
                }
            }
        }

        self.user.as_ref()
    }

    async fn user_or_fail(&mut self) -> Result<&F::User, AuthError> {
        self.user().await.ok_or(AuthError::UserNotDefined)
    }

    async fn validate(&self, credentials: &Credentials) -> bool {
        let Some(email) = credentials.email() else {
            return false;
        };

        match self
            .client()
            .validate_credentials(email, credentials.password.expose_secret())
            .await
        {
            Ok(valid) => valid,
            Err(e) => {
                debug!(guard = %self.name, "credential validation failed: {}", e);
                false
            }
        }
    }

    async fn attempt(&mut self, credentials: &Credentials, remember: bool) -> bool {
        self.events.dispatch(AuthEvent::Attempting {
            guard: self.name.clone(),
            email: credentials.email.clone(),
            remember,
        });

        let Some(email) = credentials.email() else {
            return false;
        };

        self.attempt_by_email(email, credentials.password.expose_secret(), remember)
            .await
    }

    async fn logout(&mut self) -> Result<(), AuthError> {
        let raw = self.require_token()?.to_owned();

        // Best effort: an unreachable service must not keep the caller logged in.
        if let Err(e) = self.client().invalidate_token(&raw).await {
            warn!(guard = %self.name, "remote token invalidation failed: {}", e);
        }

        self.token.invalidate();
        let user = self.user.take();
        self.state = GuardState::LoggedOut;
        self.token.unset();

        self.events.dispatch(AuthEvent::Logout {
            guard: self.name.clone(),
            user,
        });

        Ok(())
    }

    fn set_user(&mut self, user: F::User) -> &mut Self {
        self.user = Some(user);
        self.state = GuardState::Authenticated;
        self
    }
}

impl<C, F, E> fmt::Debug for Guard<C, F, E>
where
    F: UserFactory,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("token", &self.token)
            .field("has_user", &self.user.is_some())
            .finish_non_exhaustive()
    }
}
