//! Protocol contract for the remote identity service.

pub mod http;

pub use self::http::HttpIdentityClient;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::{identity::Identity, scopes::Scopes};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid identity service url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid identity service url: {0}")]
    InvalidUrl(String),
    #[error("{url} - {status}, {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
    #[error("unexpected identity service response: {0}")]
    Decode(String),
}

impl ClientError {
    /// The service answered but declined the request (bad credentials,
    /// unknown scopes, expired token).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Access and refresh tokens issued by authorize and refresh calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: IssuedToken,
    pub refresh_token: IssuedToken,
}

/// Operations offered by the identity service. Every call is network I/O and
/// may fail; callers decide how failures map onto authentication outcomes.
pub trait IdentityClient: Send + Sync {
    fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<bool, ClientError>> + Send;

    fn authorize_by_credentials(
        &self,
        email: &str,
        password: &str,
        scopes: &Scopes,
    ) -> impl Future<Output = Result<TokenPair, ClientError>> + Send;

    /// `Ok(None)` when the service does not recognise the token.
    fn get_identity(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Option<Identity>, ClientError>> + Send;

    fn refresh_token(
        &self,
        refresh_token: &str,
        scopes: Option<&Scopes>,
    ) -> impl Future<Output = Result<TokenPair, ClientError>> + Send;

    fn invalidate_token(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;
}
