use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument, Span};
use url::Url;

use super::{ClientError, IdentityClient, TokenPair};
use crate::{config::IdentityConfig, identity::Identity, scopes::Scopes};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const API_TOKEN_HEADER: &str = "X-Api-Token";

#[derive(Deserialize)]
struct OperationResult {
    result: bool,
}

/// `IdentityClient` speaking HTTP+JSON to the identity service.
#[derive(Clone, Debug)]
pub struct HttpIdentityClient {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
    debug: bool,
}

/// Normalise `host` into `scheme://host:port[/path]` and append `prefix`.
///
/// # Errors
/// Returns an error if `host` cannot be parsed, has no host, or uses an unsupported scheme.
pub fn base_url(host: &str, prefix: &str) -> Result<String, ClientError> {
    let url = Url::parse(host)?;

    let scheme = url.scheme();

    let hostname = url
        .host()
        .ok_or_else(|| ClientError::InvalidUrl(format!("no host specified in {host}")))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => {
                return Err(ClientError::InvalidUrl(format!(
                    "unsupported scheme {scheme}"
                )))
            }
        },
    };

    let mut base = format!("{scheme}://{hostname}:{port}{}", url.path().trim_end_matches('/'));

    let prefix = prefix.trim_matches('/');
    if !prefix.is_empty() {
        base.push('/');
        base.push_str(prefix);
    }

    debug!("identity service base URL: {}", base);

    Ok(base)
}

fn error_message(json_response: &Value) -> &str {
    json_response
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| {
            json_response
                .get("errors")
                .and_then(|v| v.get(0))
                .and_then(Value::as_str)
        })
        .unwrap_or("")
}

impl HttpIdentityClient {
    /// # Errors
    /// Returns an error if the host is not a usable URL or the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url(config.host(), config.prefix())?,
            api_token: config.api_token().cloned(),
            debug: config.debug(),
        })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn with_api_token(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header(API_TOKEN_HEADER, token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, url: &str, request: RequestBuilder, span: Span) -> Result<Response, ClientError> {
        let response = self.with_api_token(request).send().instrument(span).await?;

        if self.debug {
            debug!(url, status = response.status().as_u16(), "identity service response");
        }

        Ok(response)
    }

    async fn ensure_success(url: &str, response: Response) -> Result<Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or(Value::Null);

        Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            message: error_message(&json_response).to_string(),
        })
    }

    async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{url}: {e}")))
    }
}

impl IdentityClient for HttpIdentityClient {
    async fn validate_credentials(&self, email: &str, password: &str) -> Result<bool, ClientError> {
        let url = self.endpoint("/api/auth/email/validate");

        let span = info_span!(
            "identity.validate_credentials",
            http.method = "POST",
            url = %url
        );
        let request = self.client.post(&url).json(&json!({
            "email": email,
            "password": password
        }));
        let response = self.send(&url, request, span).await?;
        let response = Self::ensure_success(&url, response).await?;

        let model: OperationResult = Self::decode(&url, response).await?;

        Ok(model.result)
    }

    async fn authorize_by_credentials(
        &self,
        email: &str,
        password: &str,
        scopes: &Scopes,
    ) -> Result<TokenPair, ClientError> {
        let url = self.endpoint("/api/auth/email/authorize");

        let span = info_span!(
            "identity.authorize_by_credentials",
            http.method = "POST",
            url = %url,
            scopes = %scopes
        );
        let request = self.client.post(&url).json(&json!({
            "email": email,
            "password": password,
            "scopes": scopes.serialize()
        }));
        let response = self.send(&url, request, span).await?;
        let response = Self::ensure_success(&url, response).await?;

        Self::decode(&url, response).await
    }

    async fn get_identity(&self, access_token: &str) -> Result<Option<Identity>, ClientError> {
        let url = self.endpoint("/api/identity");

        let span = info_span!(
            "identity.get_identity",
            http.method = "GET",
            url = %url
        );
        let request = self.client.get(&url).bearer_auth(access_token);
        let response = self.send(&url, request, span).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let response = Self::ensure_success(&url, response).await?;

        Self::decode(&url, response).await.map(Some)
    }

    async fn refresh_token(
        &self,
        refresh_token: &str,
        scopes: Option<&Scopes>,
    ) -> Result<TokenPair, ClientError> {
        let url = self.endpoint("/api/auth/jwt/refresh");

        let span = info_span!(
            "identity.refresh_token",
            http.method = "POST",
            url = %url
        );

        let mut payload = json!({ "token": refresh_token });
        if let Some(scopes) = scopes.filter(|s| !s.is_empty()) {
            payload["scopes"] = Value::String(scopes.serialize());
        }

        let request = self.client.post(&url).json(&payload);
        let response = self.send(&url, request, span).await?;
        let response = Self::ensure_success(&url, response).await?;

        Self::decode(&url, response).await
    }

    async fn invalidate_token(&self, access_token: &str) -> Result<(), ClientError> {
        let url = self.endpoint("/api/auth/jwt/invalidate");

        let span = info_span!(
            "identity.invalidate_token",
            http.method = "POST",
            url = %url
        );
        let request = self
            .client
            .post(&url)
            .json(&json!({ "token": access_token }));
        let response = self.send(&url, request, span).await?;
        Self::ensure_success(&url, response).await?;

        Ok(())
    }
}
