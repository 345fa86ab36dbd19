// tests/site_tasks.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sitedag::collab::deploy::DeployFuture;
use sitedag::collab::{copy_tree, Deployer, GitPagesDeployer};
use sitedag::config::DeploySection;
use sitedag::dag::TaskRegistry;
use sitedag::errors::SitedagError;
use sitedag::exec::TaskRunner;
use sitedag::fs::mock::MockFileSystem;
use sitedag::fs::FileSystem;
use sitedag::site::{register_build_tasks, register_site_tasks};
use sitedag::types::Environment;
use sitedag_test_utils::builders::{site_context, ConfigFileBuilder, MockSiteBuilder};
use sitedag_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Deployer that records what it was asked to publish.
#[derive(Debug, Default)]
struct RecordingDeployer {
    published: Mutex<Vec<PathBuf>>,
    reject: bool,
}

impl Deployer for RecordingDeployer {
    fn deploy<'a>(&'a self, dist: &'a Path) -> DeployFuture<'a> {
        Box::pin(async move {
            self.published.lock().unwrap().push(dist.to_path_buf());
            if self.reject {
                return Err(SitedagError::Deploy("remote rejected the push".into()));
            }
            Ok(())
        })
    }
}

fn build_registry(fs: &MockFileSystem, env: Environment, deployer: Arc<RecordingDeployer>) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    register_build_tasks(&mut registry, site_context(fs.clone(), env), deployer);
    registry
}

fn sample_site() -> MockSiteBuilder {
    MockSiteBuilder::new()
        .plan("a", r#"{"title":"A"}"#)
        .plan("b", r#"{"title":"B"}"#)
}

#[tokio::test]
async fn build_writes_every_output() -> TestResult {
    init_tracing();
    let fs = sample_site().build();
    let registry = build_registry(&fs, Environment::Development, Arc::default());

    with_timeout(TaskRunner::new(registry).run("build")).await?;

    assert_eq!(
        fs.files_under("dist"),
        vec![
            PathBuf::from("dist/index.html"),
            PathBuf::from("dist/plans/a.html"),
            PathBuf::from("dist/plans/b.html"),
            PathBuf::from("dist/styles/main.css"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn clean_build_leaves_no_stale_outputs() -> TestResult {
    init_tracing();
    let fs = sample_site()
        .file("dist/plans/removed.html", "stale")
        .file("dist/old.txt", "stale")
        .build();
    let registry = build_registry(&fs, Environment::Development, Arc::default());
    let runner = TaskRunner::new(registry);

    with_timeout(runner.run("build")).await?;
    assert!(!fs.exists(Path::new("dist/plans/removed.html")));
    assert!(!fs.exists(Path::new("dist/old.txt")));

    // Dropping a document drops its page on the next build.
    fs.remove_dir_all(Path::new("src/plans/b.json"))?;
    with_timeout(runner.run("build")).await?;

    assert_eq!(
        fs.files_under("dist/plans"),
        vec![PathBuf::from("dist/plans/a.html")]
    );
    Ok(())
}

#[tokio::test]
async fn production_build_minifies_the_stylesheet() -> TestResult {
    init_tracing();
    let fs = sample_site().build();
    let registry = build_registry(&fs, Environment::Production, Arc::default());

    let plan = registry.resolve("build")?;
    assert_eq!(
        plan.work_names(),
        vec!["clean", "html", "plans", "css", "minify:css"]
    );

    with_timeout(TaskRunner::new(registry).run("build")).await?;

    let css = fs.read_to_string(Path::new("dist/styles/main.css"))?;
    assert_eq!(css.trim_end().lines().count(), 1, "got {css}");
    Ok(())
}

#[test]
fn development_build_does_not_minify() -> TestResult {
    let fs = sample_site().build();
    let registry = build_registry(&fs, Environment::Development, Arc::default());

    assert_eq!(
        registry.resolve("build")?.work_names(),
        vec!["clean", "html", "plans", "css"]
    );
    assert_eq!(
        registry.resolve("minify")?.work_names(),
        vec!["css", "minify:css"]
    );
    Ok(())
}

#[tokio::test]
async fn deploy_publishes_after_a_fresh_build() -> TestResult {
    init_tracing();
    let fs = sample_site().build();
    let deployer = Arc::new(RecordingDeployer::default());
    let registry = build_registry(&fs, Environment::Production, Arc::clone(&deployer));

    assert_eq!(
        registry.resolve("deploy")?.work_names(),
        vec![
            "clean",
            "html",
            "plans",
            "css",
            "minify:css",
            "css",
            "minify:css",
            "deploy:ghpages"
        ]
    );

    with_timeout(TaskRunner::new(registry).run("deploy")).await?;

    assert_eq!(
        deployer.published.lock().unwrap().clone(),
        vec![PathBuf::from("dist")]
    );
    Ok(())
}

#[tokio::test]
async fn failed_deploy_keeps_build_artifacts() -> TestResult {
    init_tracing();
    let fs = sample_site().build();
    let deployer = Arc::new(RecordingDeployer {
        reject: true,
        ..RecordingDeployer::default()
    });
    let registry = build_registry(&fs, Environment::Development, deployer);

    let err = with_timeout(TaskRunner::new(registry).run("deploy"))
        .await
        .unwrap_err();

    assert_eq!(err.failed_task(), Some("deploy:ghpages"));
    assert!(matches!(err.root_cause(), SitedagError::Deploy(_)));
    assert!(fs.is_file(Path::new("dist/index.html")));
    Ok(())
}

#[tokio::test]
async fn broken_page_fails_build_but_siblings_finish() -> TestResult {
    init_tracing();
    let fs = sample_site().plan("broken", "{").build();
    let registry = build_registry(&fs, Environment::Development, Arc::default());

    let err = with_timeout(TaskRunner::new(registry).run("build"))
        .await
        .unwrap_err();

    assert_eq!(err.failed_task(), Some("plans"));
    assert!(fs.is_file(Path::new("dist/plans/a.html")));
    Ok(())
}

#[test]
fn site_catalogue_has_every_task() -> TestResult {
    let fs = sample_site().build();
    let cfg = ConfigFileBuilder::new().build();
    let deployer: Arc<dyn Deployer> = Arc::new(RecordingDeployer::default());

    let registry = register_site_tasks(site_context(fs, Environment::Development), &cfg, deployer)?;
    registry.validate()?;

    assert_eq!(
        registry.task_names(),
        vec![
            "build",
            "clean",
            "css",
            "default",
            "deploy",
            "deploy:ghpages",
            "html",
            "lint:sass",
            "minify",
            "minify:css",
            "plans",
            "serve",
            "watch",
        ]
    );
    assert_eq!(
        registry.resolve("default")?.work_names(),
        vec!["clean", "html", "plans", "css", "serve", "watch"]
    );
    Ok(())
}

#[test]
fn watch_rule_naming_unknown_task_is_rejected() {
    let fs = sample_site().build();
    let cfg = ConfigFileBuilder::new()
        .with_watch_rule("docs", &["docs/**/*.md"], &["docs"])
        .build();
    let deployer: Arc<dyn Deployer> = Arc::new(RecordingDeployer::default());

    let err = register_site_tasks(site_context(fs, Environment::Development), &cfg, deployer)
        .unwrap_err();

    assert!(matches!(err, SitedagError::ConfigError(ref msg) if msg.contains("docs")));
}

#[test]
fn copy_tree_mirrors_relative_layout() -> TestResult {
    let fs = sample_site().build();
    fs.add_file("dist/index.html", "i");
    fs.add_file("dist/plans/a.html", "a");

    let written = copy_tree(&fs, Path::new("dist"), Path::new(".publish"))?;

    assert_eq!(written.len(), 2);
    assert_eq!(
        fs.files_under(".publish"),
        vec![
            PathBuf::from(".publish/index.html"),
            PathBuf::from(".publish/plans/a.html"),
        ]
    );
    assert_eq!(fs.read(Path::new(".publish/plans/a.html"))?, b"a");
    Ok(())
}

#[tokio::test]
async fn deploying_a_missing_tree_fails_without_touching_git() {
    let dir = tempfile::tempdir().unwrap();
    let deployer = GitPagesDeployer::new(DeploySection {
        remote: Some("unused".into()),
        scratch_dir: dir.path().join(".publish"),
        ..DeploySection::default()
    });

    let err = deployer.deploy(&dir.path().join("dist")).await.unwrap_err();

    assert!(matches!(err, SitedagError::Deploy(ref msg) if msg.contains("nothing to deploy")));
    assert!(!dir.path().join(".publish").exists());
}
