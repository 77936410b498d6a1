//! CLI parse tests.

use super::{file_config_or_default, Cli, CliCommand};
use clap::Parser;
use pincho_core::config::PinchoConfig;

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

mod send;

#[test]
fn cli_parse_config() {
    match parse(&["pincho", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_rejects_unknown_command() {
    assert!(Cli::try_parse_from(["pincho", "status"]).is_err());
}

#[test]
fn unreadable_config_file_falls_back_to_defaults() {
    let cfg = file_config_or_default(Err(anyhow::anyhow!("HOME is not set")));
    assert_eq!(cfg, PinchoConfig::default());

    let cfg = cfg.apply_env_from(|key| (key == "PINCHO_TOKEN").then(|| "abc12345".to_string()));
    assert_eq!(cfg.token.as_deref(), Some("abc12345"));
    assert!(cfg.into_client_config().is_ok());
}

#[test]
fn readable_config_file_is_used() {
    let file = PinchoConfig {
        max_retries: 0,
        ..PinchoConfig::default()
    };
    assert_eq!(file_config_or_default(Ok(file.clone())), file);
}
