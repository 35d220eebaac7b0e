pub mod identity;
pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("identity-guard")
        .about("Authenticate against a remote identity service")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles);

    let command = identity::with_args(command);
    let command = logging::with_args(command);
    session::with_subcommands(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV: [(&str, Option<&str>); 3] = [
        ("IDENTITY_GUARD_LOG_LEVEL", None),
        ("IDENTITY_GUARD_TOKEN", None),
        ("IDENTITY_SERVICE_CLIENT_HOST", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "identity-guard");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Authenticate against a remote identity service".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_whoami() {
        temp_env::with_vars(ENV, || {
            let matches = new().get_matches_from(vec![
                "identity-guard",
                "--host",
                "http://localhost:8000",
                "whoami",
                "--token",
                "access-1",
            ]);
            assert_eq!(matches.subcommand_name(), Some(session::CMD_WHOAMI));
            let token = matches
                .subcommand_matches(session::CMD_WHOAMI)
                .and_then(|m| m.get_one::<String>(session::ARG_TOKEN))
                .cloned();
            assert_eq!(token, Some("access-1".to_string()));
        });
    }

    #[test]
    fn test_subcommand_required() {
        temp_env::with_vars(ENV, || {
            let result =
                new().try_get_matches_from(vec!["identity-guard", "--host", "http://localhost"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("IDENTITY_GUARD_LOG_LEVEL", Some(level)),
                    ("IDENTITY_GUARD_TOKEN", Some("access-1")),
                    ("IDENTITY_SERVICE_CLIENT_HOST", Some("http://localhost:8000")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["identity-guard", "logout"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars(ENV, || {
                let mut args = vec![
                    "identity-guard".to_string(),
                    "--host".to_string(),
                    "http://localhost:8000".to_string(),
                    "logout".to_string(),
                    "--token".to_string(),
                    "access-1".to_string(),
                ];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(index as u8)
                );
            });
        }
    }
}
