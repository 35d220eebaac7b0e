//! Identity service connection arguments.

use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use std::time::Duration;

use crate::config::{
    IdentityConfig, ScopeConfig, DEFAULT_GUARD_NAME, DEFAULT_INITIAL_SCOPE, DEFAULT_PREFIX,
};

pub const ARG_HOST: &str = "host";
pub const ARG_PREFIX: &str = "prefix";
pub const ARG_API_TOKEN: &str = "api-token";
pub const ARG_INITIAL_SCOPE: &str = "initial-scope";
pub const ARG_SCOPE: &str = "scope";
pub const ARG_DEBUG: &str = "debug";
pub const ARG_GUARD_NAME: &str = "guard-name";
pub const ARG_TIMEOUT: &str = "timeout";

/// Build the client configuration from matches.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn config(matches: &ArgMatches) -> anyhow::Result<IdentityConfig> {
    let get_non_empty = |id: &str| {
        matches
            .get_one::<String>(id)
            .cloned()
            .filter(|v| !v.trim().is_empty())
    };

    let host = get_non_empty(ARG_HOST)
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_HOST}"))?;

    let mut scopes = ScopeConfig::default();
    if let Some(initial) = get_non_empty(ARG_INITIAL_SCOPE) {
        scopes.initial = initial;
    }
    if let Some(uses) = matches.get_many::<String>(ARG_SCOPE) {
        scopes.uses = uses.filter(|v| !v.trim().is_empty()).cloned().collect();
    }

    let mut config = IdentityConfig::new(host)
        .with_prefix(get_non_empty(ARG_PREFIX).unwrap_or_default())
        .with_scopes(scopes)
        .with_guard_name(
            get_non_empty(ARG_GUARD_NAME).unwrap_or_else(|| DEFAULT_GUARD_NAME.to_string()),
        )
        .with_timeout(Duration::from_secs(
            matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10),
        ))
        .with_debug(matches.get_flag(ARG_DEBUG));

    if let Some(token) = get_non_empty(ARG_API_TOKEN) {
        config = config.with_api_token(SecretString::from(token));
    }

    Ok(config)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_HOST)
                .long(ARG_HOST)
                .help("Identity service base URL, example: https://id.example.com")
                .env("IDENTITY_SERVICE_CLIENT_HOST")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PREFIX)
                .long(ARG_PREFIX)
                .help("Path prefix of the identity service API")
                .env("IDENTITY_SERVICE_CLIENT_PREFIX")
                .default_value(DEFAULT_PREFIX),
        )
        .arg(
            Arg::new(ARG_API_TOKEN)
                .long(ARG_API_TOKEN)
                .help("Service API token sent with every request")
                .env("IDENTITY_SERVICE_CLIENT_HOST_API_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_INITIAL_SCOPE)
                .long(ARG_INITIAL_SCOPE)
                .help("Scope always requested when authorizing by credentials")
                .env("IDENTITY_SERVICE_CLIENT_SCOPE_INITIAL")
                .default_value(DEFAULT_INITIAL_SCOPE),
        )
        .arg(
            Arg::new(ARG_SCOPE)
                .long(ARG_SCOPE)
                .help("Additional scope to request, may be repeated")
                .env("IDENTITY_SERVICE_CLIENT_SCOPES")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new(ARG_DEBUG)
                .long(ARG_DEBUG)
                .help("Log identity service responses")
                .env("IDENTITY_SERVICE_CLIENT_DEBUG")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_GUARD_NAME)
                .long(ARG_GUARD_NAME)
                .help("Guard name reported in authentication events")
                .env("IDENTITY_SERVICE_CLIENT_GUARD_NAME")
                .default_value(DEFAULT_GUARD_NAME),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("IDENTITY_SERVICE_CLIENT_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn config_uses_defaults() -> Result<()> {
        temp_env::with_vars(
            [
                ("IDENTITY_SERVICE_CLIENT_HOST", None::<&str>),
                ("IDENTITY_SERVICE_CLIENT_SCOPES", None),
                ("IDENTITY_SERVICE_CLIENT_DEBUG", None),
                ("IDENTITY_SERVICE_CLIENT_HOST_API_TOKEN", None),
            ],
            || -> Result<()> {
                let matches =
                    command().get_matches_from(vec!["test", "--host", "https://id.example.com"]);
                let config = config(&matches)?;
                assert_eq!(config.host(), "https://id.example.com");
                assert_eq!(config.prefix(), "identity-service");
                assert_eq!(config.guard_name(), DEFAULT_GUARD_NAME);
                assert_eq!(config.timeout(), Duration::from_secs(10));
                assert!(!config.debug());
                assert!(config.api_token().is_none());
                assert_eq!(config.scope_config(), &ScopeConfig::default());
                Ok(())
            },
        )
    }

    #[test]
    fn config_collects_repeated_scopes() -> Result<()> {
        let matches = command().get_matches_from(vec![
            "test",
            "--host",
            "https://id.example.com",
            "--initial-scope",
            "S1",
            "--scope",
            "S2",
            "--scope",
            "S3",
            "--debug",
        ]);
        let config = config(&matches)?;
        assert_eq!(config.scope_config().scopes().serialize(), "S1,S2,S3");
        assert!(config.debug());
        Ok(())
    }

    #[test]
    fn config_from_env() -> Result<()> {
        temp_env::with_vars(
            [
                ("IDENTITY_SERVICE_CLIENT_HOST", Some("http://localhost:8000")),
                ("IDENTITY_SERVICE_CLIENT_PREFIX", Some("auth")),
                ("IDENTITY_SERVICE_CLIENT_HOST_API_TOKEN", Some("service-token")),
                ("IDENTITY_SERVICE_CLIENT_SCOPES", Some("S2,S3")),
                ("IDENTITY_SERVICE_CLIENT_DEBUG", Some("1")),
                ("IDENTITY_SERVICE_CLIENT_TIMEOUT", Some("3")),
            ],
            || -> Result<()> {
                let matches = command().get_matches_from(vec!["test"]);
                let config = config(&matches)?;
                assert_eq!(config.host(), "http://localhost:8000");
                assert_eq!(config.prefix(), "auth");
                assert_eq!(
                    config.api_token().map(|t| t.expose_secret().to_string()),
                    Some("service-token".to_string())
                );
                assert_eq!(
                    config.scope_config().scopes().serialize(),
                    "system-change-scopes,S2,S3"
                );
                assert!(config.debug());
                assert_eq!(config.timeout(), Duration::from_secs(3));
                Ok(())
            },
        )
    }
}
