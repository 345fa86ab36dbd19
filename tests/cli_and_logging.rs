// tests/cli_and_logging.rs

use std::error::Error;

use clap::Parser;
use sitedag::cli::{CliArgs, LogLevel};
use sitedag::logging::resolve_level;
use sitedag::types::Environment;
use tracing::Level;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn bare_invocation_runs_the_default_task() -> TestResult {
    let args = CliArgs::try_parse_from(["sitedag"])?;

    assert_eq!(args.task, "default");
    assert_eq!(args.env, None);
    assert!(!args.dry_run && !args.list);
    Ok(())
}

#[test]
fn flags_are_parsed() -> TestResult {
    let args = CliArgs::try_parse_from([
        "sitedag",
        "deploy",
        "--env",
        "production",
        "--config",
        "site.toml",
        "--log-level",
        "debug",
        "--dry-run",
    ])?;

    assert_eq!(args.task, "deploy");
    assert_eq!(args.env, Some(Environment::Production));
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("site.toml")));
    assert_eq!(args.log_level, Some(LogLevel::Debug));
    assert!(args.dry_run);
    Ok(())
}

#[test]
fn bad_environment_is_rejected() {
    assert!(CliArgs::try_parse_from(["sitedag", "--env", "staging"]).is_err());
}

#[test]
fn cli_level_beats_environment_value() {
    assert_eq!(resolve_level(Some(LogLevel::Trace), Some("error")), Level::TRACE);
    assert_eq!(resolve_level(None, Some("warning")), Level::WARN);
    assert_eq!(resolve_level(None, Some("nonsense")), Level::INFO);
    assert_eq!(resolve_level(None, None), Level::INFO);
}

#[tokio::test]
async fn dry_run_resolves_without_running() -> TestResult {
    let args = CliArgs::try_parse_from(["sitedag", "build", "--env", "development", "--dry-run"])?;
    sitedag::run(args).await?;
    Ok(())
}

#[tokio::test]
async fn unknown_task_fails_before_running() {
    let args = CliArgs::try_parse_from(["sitedag", "nope", "--env", "development"]).unwrap();

    let err = sitedag::run(args).await.unwrap_err();

    let err = err.downcast_ref::<sitedag::errors::SitedagError>().unwrap();
    assert!(err.is_configuration(), "got {err:?}");
}
