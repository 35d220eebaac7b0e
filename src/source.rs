//! Token extraction strategies.
//!
//! Each source looks at the request head only; the guard wraps whatever comes
//! back in a [`Token`](crate::token::Token).

use http::{
    header::{AUTHORIZATION, COOKIE},
    request::Parts,
    HeaderName,
};
use std::sync::Arc;
use url::form_urlencoded;

use crate::config::IdentityConfig;

pub const DEFAULT_TOKEN_KEY: &str = "token";

pub trait TokenSource: Send + Sync {
    fn extract(&self, request: &Parts) -> Option<String>;
}

/// `Authorization: Bearer <token>` or any other header with a scheme prefix.
#[derive(Clone, Debug)]
pub struct HeaderSource {
    header: HeaderName,
    prefix: String,
}

impl HeaderSource {
    #[must_use]
    pub fn new(header: HeaderName, prefix: impl Into<String>) -> Self {
        Self {
            header,
            prefix: prefix.into(),
        }
    }
}

impl Default for HeaderSource {
    fn default() -> Self {
        Self::new(AUTHORIZATION, "bearer")
    }
}

impl TokenSource for HeaderSource {
    fn extract(&self, request: &Parts) -> Option<String> {
        let value = request.headers.get(&self.header)?.to_str().ok()?.trim();

        if self.prefix.is_empty() {
            return non_empty(value);
        }

        let (scheme, token) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        non_empty(token)
    }
}

/// Turns an encrypted cookie value back into the raw token.
pub trait CookieDecrypter: Send + Sync {
    fn decrypt(&self, value: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct CookieSource {
    key: String,
    decrypter: Option<Arc<dyn CookieDecrypter>>,
}

impl CookieSource {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            decrypter: None,
        }
    }

    #[must_use]
    pub fn with_decrypter(mut self, decrypter: Arc<dyn CookieDecrypter>) -> Self {
        self.decrypter = Some(decrypter);
        self
    }
}

impl std::fmt::Debug for CookieSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieSource")
            .field("key", &self.key)
            .field("decrypt", &self.decrypter.is_some())
            .finish()
    }
}

impl TokenSource for CookieSource {
    fn extract(&self, request: &Parts) -> Option<String> {
        let value = request
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .find_map(|pair| {
                let (key, val) = pair.trim().split_once('=')?;
                (key.trim() == self.key).then(|| val.trim())
            })?;

        match &self.decrypter {
            Some(decrypter) => decrypter.decrypt(value).and_then(|v| non_empty(&v)),
            None => non_empty(value),
        }
    }
}

/// Named input field in the query string.
#[derive(Clone, Debug)]
pub struct InputSource {
    key: String,
}

impl InputSource {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl TokenSource for InputSource {
    fn extract(&self, request: &Parts) -> Option<String> {
        let query = request.uri.query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == self.key.as_str())
            .and_then(|(_, value)| non_empty(&value))
    }
}

/// Tries each source in order; the first hit wins.
#[derive(Default)]
pub struct ChainSource {
    sources: Vec<Box<dyn TokenSource>>,
}

impl ChainSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header, then query input, then cookie, all using the `token` key.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with(HeaderSource::default())
            .with(InputSource::new(DEFAULT_TOKEN_KEY))
            .with(CookieSource::new(DEFAULT_TOKEN_KEY))
    }

    /// The standard chain, with the cookie decrypted when the config asks for
    /// it and a decrypter is supplied.
    #[must_use]
    pub fn for_config(
        config: &IdentityConfig,
        decrypter: Option<Arc<dyn CookieDecrypter>>,
    ) -> Self {
        let cookie = match decrypter {
            Some(decrypter) if config.decrypt_cookies() => {
                CookieSource::new(DEFAULT_TOKEN_KEY).with_decrypter(decrypter)
            }
            _ => CookieSource::new(DEFAULT_TOKEN_KEY),
        };
        Self::new()
            .with(HeaderSource::default())
            .with(InputSource::new(DEFAULT_TOKEN_KEY))
            .with(cookie)
    }

    #[must_use]
    pub fn with(mut self, source: impl TokenSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl TokenSource for ChainSource {
    fn extract(&self, request: &Parts) -> Option<String> {
        self.sources.iter().find_map(|source| source.extract(request))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
