//! Identity service client configuration.
//!
//! Values only; how they are loaded (flags, env, files) is up to the caller.
//! The command line tool fills them from `clap`.

use secrecy::SecretString;
use std::time::Duration;

use crate::scopes::Scopes;

pub const DEFAULT_PREFIX: &str = "identity-service";
pub const DEFAULT_GUARD_NAME: &str = "identity-service-client-jwt-guard";
pub const DEFAULT_INITIAL_SCOPE: &str = "system-change-scopes";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeConfig {
    pub initial: String,
    pub uses: Vec<String>,
}

impl ScopeConfig {
    #[must_use]
    pub fn scopes(&self) -> Scopes {
        Scopes::new(&self.initial, &self.uses)
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_SCOPE.to_string(),
            uses: vec![DEFAULT_INITIAL_SCOPE.to_string()],
        }
    }
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    host: String,
    prefix: String,
    api_token: Option<SecretString>,
    scopes: ScopeConfig,
    guard_name: String,
    timeout: Duration,
    debug: bool,
    decrypt_cookies: bool,
}

impl IdentityConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            api_token: None,
            scopes: ScopeConfig::default(),
            guard_name: DEFAULT_GUARD_NAME.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            debug: false,
            decrypt_cookies: false,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_api_token(mut self, token: SecretString) -> Self {
        self.api_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: ScopeConfig) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_guard_name(mut self, name: impl Into<String>) -> Self {
        self.guard_name = name.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_decrypt_cookies(mut self, decrypt: bool) -> Self {
        self.decrypt_cookies = decrypt;
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn api_token(&self) -> Option<&SecretString> {
        self.api_token.as_ref()
    }

    #[must_use]
    pub fn scope_config(&self) -> &ScopeConfig {
        &self.scopes
    }

    #[must_use]
    pub fn guard_name(&self) -> &str {
        &self.guard_name
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether cookie sources built from this config should decrypt values.
    #[must_use]
    pub fn decrypt_cookies(&self) -> bool {
        self.decrypt_cookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults() {
        let config = IdentityConfig::new("https://id.example.com");
        assert_eq!(config.host(), "https://id.example.com");
        assert_eq!(config.prefix(), "identity-service");
        assert_eq!(config.guard_name(), "identity-service-client-jwt-guard");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.api_token().is_none());
        assert!(!config.debug());
        assert!(!config.decrypt_cookies());
        assert_eq!(config.scope_config().scopes().serialize(), "system-change-scopes");
    }

    #[test]
    fn builder_overrides() {
        let config = IdentityConfig::new("http://localhost:8000")
            .with_prefix("")
            .with_api_token(SecretString::from("service-token".to_string()))
            .with_scopes(ScopeConfig {
                initial: "S1".to_string(),
                uses: vec!["S2".to_string(), "S3".to_string()],
            })
            .with_guard_name("api")
            .with_timeout(Duration::from_secs(2))
            .with_debug(true)
            .with_decrypt_cookies(true);

        assert_eq!(config.prefix(), "");
        assert_eq!(
            config.api_token().map(|t| t.expose_secret().to_string()),
            Some("service-token".to_string())
        );
        assert_eq!(config.scope_config().scopes().serialize(), "S1,S2,S3");
        assert_eq!(config.guard_name(), "api");
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert!(config.debug());
        assert!(config.decrypt_cookies());
    }
}
