// tests/cli_args.rs

use clap::Parser;
use servectl::cli::{CliArgs, LogLevel};
use servectl::types::Verb;

#[test]
fn positional_commands_are_collected_in_order() {
    let args = CliArgs::try_parse_from(["servectl", "stop", "build", "start"]).unwrap();

    assert_eq!(args.commands, vec!["stop", "build", "start"]);
    assert_eq!(args.config, "config.json");
    assert!(!args.dry_run);
    assert!(args.log_level.is_none());
    assert_eq!(
        Verb::parse_all(&args.commands),
        vec![Verb::Stop, Verb::Build, Verb::Start]
    );
}

#[test]
fn no_commands_is_valid() {
    let args = CliArgs::try_parse_from(["servectl"]).unwrap();
    assert!(args.commands.is_empty());
    assert!(Verb::parse_all(&args.commands).is_empty());
}

#[test]
fn unknown_words_are_accepted_and_dropped() {
    let args = CliArgs::try_parse_from(["servectl", "deploy", "kill"]).unwrap();
    assert_eq!(Verb::parse_all(&args.commands), vec![Verb::Kill]);
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "servectl",
        "--config",
        "deploy/config.json",
        "--log-level",
        "debug",
        "--dry-run",
        "workflow",
    ])
    .unwrap();

    assert_eq!(args.config, "deploy/config.json");
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.dry_run);
    assert_eq!(args.commands, vec!["workflow"]);
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(CliArgs::try_parse_from(["servectl", "--force", "start"]).is_err());
}
