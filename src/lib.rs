//! # Identity Guard
//!
//! A per-request authentication guard backed by a remote identity service.
//! The application never verifies tokens itself: it hands the request token
//! to the service and trusts the identity it gets back.
//!
//! ## Resolution
//!
//! - **Token sources:** the raw token comes from a header (`Authorization:
//!   Bearer`), a query field, or a cookie; [`source::ChainSource`] tries them in
//!   order.
//! - **Lazy, cached:** a [`guard::Guard`] asks the service who the token
//!   belongs to on the first `user()` call and remembers the answer for the
//!   rest of the request, including "nobody".
//! - **Failure is anonymity:** transport errors, rejections and unknown tokens
//!   all read as an unauthenticated caller. No retries.
//!
//! ## Login and Logout
//!
//! `attempt` exchanges credentials for a token pair, requesting the configured
//! scopes, and logs the caller in with the issued access token. `logout`
//! invalidates the token remotely on a best-effort basis and always clears the
//! local session. Both emit [`events::AuthEvent`]s.

pub mod cli;
pub mod client;
pub mod config;
pub mod events;
pub mod guard;
pub mod identity;
pub mod resolver;
pub mod scopes;
pub mod source;
pub mod token;

#[cfg(test)]
mod test_support;

pub use self::{
    client::{ClientError, HttpIdentityClient, IdentityClient},
    config::{IdentityConfig, ScopeConfig},
    events::{AuthEvent, EventSink},
    guard::{AuthError, AuthGuard, Credentials, Guard, GuardState},
    identity::{DefaultUserFactory, HasIdentity, Identity, User, UserFactory},
    resolver::AuthOutcome,
    token::Token,
};
