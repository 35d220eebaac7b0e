//! Subcommands driving a guard against the identity service.

use clap::{builder::ValueParser, Arg, ArgAction, Command};
use regex::Regex;
use std::sync::LazyLock;

pub const CMD_VALIDATE: &str = "validate";
pub const CMD_LOGIN: &str = "login";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_REMEMBER: &str = "remember";
pub const ARG_TOKEN: &str = "token";
pub const ARG_SCOPE: &str = "scope";

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

pub fn valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

#[must_use]
pub fn validator_email() -> ValueParser {
    ValueParser::from(move |email: &str| -> std::result::Result<String, String> {
        if valid_email(email) {
            Ok(email.to_string())
        } else {
            Err("invalid email address".to_string())
        }
    })
}

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long(ARG_EMAIL)
        .help("Account email")
        .env("IDENTITY_GUARD_EMAIL")
        .required(true)
        .value_parser(validator_email())
}

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("IDENTITY_GUARD_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn token_arg(help: &'static str) -> Arg {
    Arg::new(ARG_TOKEN)
        .short('t')
        .long(ARG_TOKEN)
        .help(help)
        .env("IDENTITY_GUARD_TOKEN")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn with_subcommands(command: Command) -> Command {
    command
        .subcommand_required(true)
        .subcommand(
            Command::new(CMD_VALIDATE)
                .about("Check credentials without logging in")
                .arg(email_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new(CMD_LOGIN)
                .about("Log in with credentials and print the issued access token")
                .arg(email_arg())
                .arg(password_arg())
                .arg(
                    Arg::new(ARG_REMEMBER)
                        .long(ARG_REMEMBER)
                        .help("Flag the login as remembered in the login event")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(CMD_WHOAMI)
                .about("Resolve an access token into the user it belongs to")
                .arg(token_arg("Access token")),
        )
        .subcommand(
            Command::new(CMD_REFRESH)
                .about("Exchange a refresh token for a new token pair")
                .arg(token_arg("Refresh token"))
                .arg(
                    Arg::new(ARG_SCOPE)
                        .long(ARG_SCOPE)
                        .help("Scope to request for the new token, may be repeated")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new(CMD_LOGOUT)
                .about("Invalidate an access token")
                .arg(token_arg("Access token")),
        )
}
