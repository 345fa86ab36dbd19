use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use sitedag::config::{load_and_validate, load_or_default, parse_str, ConfigFile};
use sitedag::errors::SitedagError;
use sitedag::types::{Environment, LintRule, Severity};
use sitedag_test_utils::builders::ConfigFileBuilder;
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

fn validate(toml: &str) -> Result<ConfigFile, SitedagError> {
    ConfigFile::try_from(parse_str(toml)?)
}

#[test]
fn empty_file_means_all_defaults() -> TestResult {
    let cfg = validate("")?;

    assert_eq!(cfg.paths.dist, PathBuf::from("dist"));
    assert_eq!(cfg.paths.stylesheet, PathBuf::from("src/styles/main.sass"));
    assert_eq!(cfg.paths.stylesheet_out(), PathBuf::from("dist/styles/main.css"));
    assert_eq!(cfg.paths.stylesheet_url(), "/styles/main.css");
    assert_eq!(cfg.site.root_for(Environment::Production), "/mealplans/");
    assert_eq!(cfg.site.root_for(Environment::Development), "/");
    assert_eq!(cfg.server.address(), "127.0.0.1:3333");
    assert_eq!(cfg.deploy.branch, "gh-pages");
    assert_eq!(cfg.lint.severity(LintRule::NoDebug), Severity::Error);
    assert_eq!(cfg.lint.severity(LintRule::NoImportant), Severity::Warning);

    let rules: Vec<(&str, bool)> = cfg
        .watch
        .iter()
        .map(|r| (r.name.as_str(), r.reload))
        .collect();
    assert_eq!(rules, vec![("html", true), ("plans", true), ("styles", false)]);
    Ok(())
}

#[test]
fn sections_override_defaults() -> TestResult {
    let cfg = validate(
        r#"
        [paths]
        dist = "public"
        stylesheet = "assets/site.sass"

        [site]
        production_root = "/blog/"

        [server]
        port = 8080
        live_reload = false

        [lint]
        max_line_length = 80
        rules = { no-debug = "warning", no-color-literals = "off" }

        [deploy]
        remote = "git@example.com:me/site.git"
        branch = "pages"

        [[watch]]
        name = "styles"
        patterns = ["assets/**/*.sass"]
        tasks = ["css"]
        reload = false
        "#,
    )?;

    assert_eq!(cfg.paths.stylesheet_out(), PathBuf::from("public/styles/site.css"));
    assert_eq!(cfg.paths.plans_dir, PathBuf::from("src/plans"));
    assert_eq!(cfg.site.root_for(Environment::Production), "/blog/");
    assert_eq!(cfg.server.port, 8080);
    assert!(!cfg.server.live_reload);
    assert_eq!(cfg.lint.max_line_length, 80);
    assert_eq!(cfg.lint.severity(LintRule::NoDebug), Severity::Warning);
    assert_eq!(cfg.lint.severity(LintRule::NoColorLiterals), Severity::Off);
    assert_eq!(cfg.deploy.remote.as_deref(), Some("git@example.com:me/site.git"));
    assert_eq!(cfg.watch.len(), 1, "explicit rules replace the defaults");
    Ok(())
}

#[test]
fn unknown_lint_rule_is_a_parse_error() {
    let err = validate("[lint]\nrules = { no-tabs = \"error\" }\n").unwrap_err();
    assert!(matches!(err, SitedagError::TomlError(_)), "got {err:?}");
    assert!(err.is_configuration());
}

#[test]
fn every_rule_can_be_configured_by_name() -> TestResult {
    let entries: Vec<String> = LintRule::ALL
        .iter()
        .map(|rule| format!("{} = \"off\"", rule.as_str()))
        .collect();

    let cfg = validate(&format!("[lint.rules]\n{}\n", entries.join("\n")))?;

    for rule in LintRule::ALL {
        assert_eq!(cfg.lint.severity(rule), Severity::Off, "{rule}");
    }
    Ok(())
}

#[test]
fn invalid_values_are_rejected() {
    let cases = [
        ("[server]\nport = 0\n", "port"),
        ("[site]\nproduction_root = \"mealplans/\"\n", "production_root"),
        ("[lint]\npatterns = [\"src/[\"]\n", "invalid glob"),
        ("[lint]\nmax_line_length = 0\n", "max_line_length"),
        ("[deploy]\nbranch = \"  \"\n", "branch"),
        (
            "[[watch]]\nname = \"x\"\npatterns = []\ntasks = [\"css\"]\n",
            "no patterns",
        ),
        (
            "[[watch]]\nname = \"x\"\npatterns = [\"a\"]\ntasks = []\n",
            "no tasks",
        ),
        (
            "[[watch]]\nname = \"x\"\npatterns = [\"a\"]\ntasks = [\"css\"]\n[[watch]]\nname = \"x\"\npatterns = [\"b\"]\ntasks = [\"css\"]\n",
            "more than once",
        ),
    ];

    for (toml, needle) in cases {
        match validate(toml) {
            Err(SitedagError::ConfigError(msg)) => {
                assert!(msg.contains(needle), "{needle:?} not in {msg:?}")
            }
            other => panic!("expected ConfigError for {toml:?}, got {other:?}"),
        }
    }
}

#[test]
fn load_and_validate_reads_a_file() -> TestResult {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "[server]\nport = 4000")?;

    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.server.port, 4000);
    Ok(())
}

#[test]
fn explicit_missing_config_is_an_error() {
    let err = load_or_default(Some(Path::new("does/not/exist.toml"))).unwrap_err();
    assert!(matches!(err, SitedagError::ConfigError(_)), "got {err:?}");
}

#[test]
fn builder_roots_paths_and_lint_patterns() {
    let cfg = ConfigFileBuilder::new().rooted_at("/tmp/site").with_port(9000).build();

    assert_eq!(cfg.paths.dist, PathBuf::from("/tmp/site/dist"));
    assert_eq!(cfg.lint.patterns, vec!["/tmp/site/src/styles/**/*.s[ac]ss"]);
    assert_eq!(cfg.server.port, 9000);
}

#[test]
fn environment_parses_short_and_long_names() {
    assert_eq!("production".parse(), Ok(Environment::Production));
    assert_eq!("Prod".parse(), Ok(Environment::Production));
    assert_eq!("dev".parse(), Ok(Environment::Development));
    assert!("staging".parse::<Environment>().is_err());
    assert_eq!(Environment::resolve(Some(Environment::Production)), Environment::Production);
}
