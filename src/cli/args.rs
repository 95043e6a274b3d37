//! CLI argument parsing structures.

use clap::{Args, Parser};
use std::path::PathBuf;

use super::commands::Commands;

/// Main CLI structure for awssm.
#[derive(Parser, Debug)]
#[command(name = "awssm")]
#[command(
    about = "Add, read, update and remove keys inside a JSON secret in AWS Secrets Manager",
    long_about = None
)]
pub struct Cli {
    /// Name or ARN of the secret to operate on
    #[arg(short, long, global = true)]
    pub secret: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global connection and configuration arguments available to all commands.
#[derive(Debug, Default, Args)]
pub struct ConfigArgs {
    /// AWS profile to use
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// AWS region of the secret
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Override the Secrets Manager endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Path to a config file (default: search for awssm.kdl)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write even if the secret changed since it was read
    #[arg(long, global = true)]
    pub no_version_check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_secret_flag_before_or_after_subcommand() {
        let before = Cli::try_parse_from(["awssm", "--secret", "prod/app", "read", "--key", "a"])
            .unwrap();
        let after = Cli::try_parse_from(["awssm", "read", "-k", "a", "-s", "prod/app"]).unwrap();

        for cli in [before, after] {
            assert_eq!(cli.secret.as_deref(), Some("prod/app"));
            match cli.command {
                Some(Commands::Read { key }) => assert_eq!(key.as_deref(), Some("a")),
                other => panic!("expected read, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_key_value_and_json_flags() {
        let cli = Cli::try_parse_from([
            "awssm", "-s", "prod/app", "add", "-k", "db.port", "-v", "5432", "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.key.as_deref(), Some("db.port"));
                assert_eq!(args.value.as_deref(), Some("5432"));
                assert!(args.json);
            }
            other => panic!("expected add, got {:?}", other),
        }

        let cli = Cli::try_parse_from(["awssm", "update", "--key", "a", "--value", "2"]).unwrap();
        match cli.command {
            Some(Commands::Update(args)) => assert!(!args.json),
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_global_config_args() {
        let cli = Cli::try_parse_from([
            "awssm",
            "show",
            "--profile",
            "dev",
            "--region",
            "eu-west-1",
            "--endpoint-url",
            "http://localhost:4566",
            "--config",
            "/tmp/awssm.kdl",
            "--no-version-check",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Show)));
        assert_eq!(cli.config.profile.as_deref(), Some("dev"));
        assert_eq!(cli.config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(
            cli.config.endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
        assert_eq!(cli.config.config, Some(PathBuf::from("/tmp/awssm.kdl")));
        assert!(cli.config.no_version_check);
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["awssm"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.secret.is_none());
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["awssm", "rotate"]).is_err());
    }
}
