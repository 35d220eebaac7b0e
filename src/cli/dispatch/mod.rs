use crate::cli::{
    actions::{
        session::{Args, Operation},
        Action,
    },
    commands::{identity, session},
};
use crate::{guard::Credentials, scopes::Scopes};
use anyhow::{Context, Result};
use clap::ArgMatches;

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn credentials(matches: &ArgMatches) -> Result<Credentials> {
    Ok(Credentials::new(
        required(matches, session::ARG_EMAIL)?,
        required(matches, session::ARG_PASSWORD)?,
    ))
}

/// # Errors
/// Returns an error if required arguments are missing or no subcommand was given.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let config = identity::config(matches)?;

    let operation = match matches.subcommand() {
        Some((session::CMD_VALIDATE, sub_m)) => Operation::Validate {
            credentials: credentials(sub_m)?,
        },
        Some((session::CMD_LOGIN, sub_m)) => Operation::Login {
            credentials: credentials(sub_m)?,
            remember: sub_m.get_flag(session::ARG_REMEMBER),
        },
        Some((session::CMD_WHOAMI, sub_m)) => Operation::WhoAmI {
            token: required(sub_m, session::ARG_TOKEN)?,
        },
        Some((session::CMD_REFRESH, sub_m)) => Operation::Refresh {
            token: required(sub_m, session::ARG_TOKEN)?,
            scopes: sub_m
                .get_many::<String>(session::ARG_SCOPE)
                .map(|scopes| Scopes::new("", scopes))
                .filter(|scopes| !scopes.is_empty()),
        },
        Some((session::CMD_LOGOUT, sub_m)) => Operation::Logout {
            token: required(sub_m, session::ARG_TOKEN)?,
        },
        _ => anyhow::bail!("no subcommand given"),
    };

    Ok(Action::Session(Args { config, operation }))
}
