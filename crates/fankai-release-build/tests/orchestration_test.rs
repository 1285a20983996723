//! Integration tests for the release pipeline orchestration
//!
//! Covers the fan-out/fan-in behavior with mock collaborators: empty-matrix
//! short-circuit, independent failure domains, the stage gate, and the
//! completion signals.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fankai_release_build::{
    CommitOutcome, CompletionSurface, PackageRequest, PackagerService, PipelineState,
    ReleaseContext, ReleaseError, ReleasePipeline, Result, VcsSurface,
};
use fankai_release_config::{Config, DockerConfig, NotifyConfig};
use fankai_release_core::{ChangeSet, PackagingDefaults, Platform};
use tempfile::TempDir;
use tokio::time::sleep;

/// Mock packaging service that materializes fake binaries without invoking
/// the real packager
#[derive(Clone, Default)]
struct MockPackager {
    operations: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<PackageRequest>>>,
    fail_for: Arc<Mutex<HashSet<String>>>,
    delay: Option<Duration>,
}

impl MockPackager {
    fn new() -> Self {
        Self::default()
    }

    fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    fn fail_artifact(&self, artifact_name: &str) {
        self.fail_for
            .lock()
            .unwrap()
            .insert(artifact_name.to_string());
    }

    fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    fn requests(&self) -> Vec<PackageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackagerService for MockPackager {
    async fn package(&self, request: &PackageRequest) -> Result<PathBuf> {
        let artifact_name = request
            .dist_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.operations
            .lock()
            .unwrap()
            .push(format!("package_{artifact_name}"));
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        if self.fail_for.lock().unwrap().contains(&artifact_name) {
            return Err(ReleaseError::packaging(&artifact_name, "mock packaging failure"));
        }

        let binary = request.dist_dir.join(&request.options.output_name);
        std::fs::write(&binary, b"mock binary")?;
        Ok(binary)
    }
}

/// Mock version-control surface with a preset diff
#[derive(Clone)]
struct MockVcs {
    changes: ChangeSet,
    message: String,
    operations: Arc<Mutex<Vec<String>>>,
}

impl MockVcs {
    fn new(paths: &[&str], message: &str) -> Self {
        Self {
            changes: ChangeSet::new(paths.iter().map(|p| p.to_string()).collect()),
            message: message.to_string(),
            operations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }
}

#[async_trait]
impl VcsSurface for MockVcs {
    async fn changed_files(&self, _repo: &Path, revision: &str) -> Result<ChangeSet> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("changed_files_{revision}"));
        Ok(self.changes.clone())
    }

    async fn commit_message(&self, _repo: &Path, revision: &str) -> Result<String> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("commit_message_{revision}"));
        Ok(self.message.clone())
    }

    async fn commit_all(&self, _repo: &Path, message: &str) -> Result<CommitOutcome> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("commit_all_{message}"));
        Ok(CommitOutcome::Committed("deadbeef".to_string()))
    }
}

/// Mock completion surface with controllable delivery failure
#[derive(Clone, Default)]
struct MockCompletion {
    operations: Arc<Mutex<Vec<String>>>,
    fail_announce: bool,
}

impl MockCompletion {
    fn new() -> Self {
        Self::default()
    }

    fn failing_announce() -> Self {
        Self { fail_announce: true, ..Self::default() }
    }

    fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionSurface for MockCompletion {
    async fn trigger_cleanup(&self, workflow: &str) -> Result<()> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("cleanup_{workflow}"));
        Ok(())
    }

    async fn announce(&self, revision: &str) -> Result<()> {
        self.operations
            .lock()
            .unwrap()
            .push(format!("announce_{revision}"));
        if self.fail_announce {
            return Err(ReleaseError::notification("mock delivery failure"));
        }
        Ok(())
    }
}

/// Create a test configuration backed by temporary directories
fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let deploy_repo = temp_dir.path().join("deploy");
    std::fs::create_dir_all(&deploy_repo).unwrap();
    let staging = temp_dir.path().join("dist");
    std::fs::create_dir_all(&staging).unwrap();

    let config = Config {
        source_repo: temp_dir.path().to_path_buf(),
        deploy_repo,
        source_dir: PathBuf::from("src"),
        staging_dir: staging,
        app_name: "Fankai".to_string(),
        requirements: temp_dir.path().join("requirements.txt"),
        packaging: PackagingDefaults::default(),
        docker: DockerConfig {
            context: PathBuf::from("docker"),
            dockerfile: PathBuf::from("docker/Dockerfile"),
            repository: "nackophilz/fankai_utilitaire".to_string(),
            registries: vec!["docker.io".to_string(), "ghcr.io".to_string()],
            default_tag: "latest".to_string(),
        },
        notify: NotifyConfig {
            cleanup_workflow: "purge-artifacts.yml".to_string(),
            dispatch_repo: "Nackophilz/fankai_utilitaire".to_string(),
            webhook_url: "https://hooks.example.com/fankai".to_string(),
        },
        parallel_jobs: 5,
    };

    (config, temp_dir)
}

fn pipeline_with(
    config: Config,
    packager: MockPackager,
    vcs: MockVcs,
    completion: MockCompletion,
) -> ReleasePipeline {
    let context = ReleaseContext::new(config, "0123456789abcdef", "");
    ReleasePipeline::new(context, Arc::new(packager), Arc::new(vcs), Arc::new(completion))
}

#[tokio::test]
async fn empty_matrix_short_circuits_all_downstream_stages() {
    let (config, _temp_dir) = create_test_config();
    let packager = MockPackager::new();
    let vcs = MockVcs::new(&["README.md", "docker/Dockerfile"], "docs only");
    let completion = MockCompletion::new();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.state, PipelineState::Skipped);
    assert!(report.outcomes.is_empty());
    assert!(report.redistribution.is_none());
    assert!(report.commit.is_none());

    // No downstream stage executed.
    assert!(packager.operations().is_empty());
    assert!(completion.operations().is_empty());
    let vcs_ops = vcs.operations();
    assert_eq!(vcs_ops.len(), 1);
    assert!(vcs_ops[0].starts_with("changed_files_"));
}

#[tokio::test]
async fn full_run_builds_redistributes_commits_and_notifies() {
    let (config, _temp_dir) = create_test_config();
    let deploy_repo = config.deploy_repo.clone();
    let packager = MockPackager::new();
    let vcs = MockVcs::new(&["src/Fankai.py", "README.md"], "release: update Fankai");
    let completion = MockCompletion::new();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.state, PipelineState::Completed);
    assert_eq!(report.outcomes.len(), 5);
    assert!(report.outcomes.iter().all(|o| o.is_success()));

    // One artifact merged per platform, no skips.
    let redistribution = report.redistribution.unwrap();
    assert_eq!(redistribution.merged.len(), 5);
    assert!(redistribution.skipped.is_empty());
    for platform in Platform::ALL {
        assert!(
            deploy_repo.join(platform.deploy_dir()).join("Fankai").is_file(),
            "{platform}"
        );
    }

    // Linux binaries mirrored into the image-build inputs.
    assert!(deploy_repo.join("docker/x86/Fankai").is_file());
    assert!(deploy_repo.join("docker/arm/Fankai").is_file());

    // Commit reused the triggering revision's message verbatim.
    assert_eq!(report.commit, Some(CommitOutcome::Committed("deadbeef".to_string())));
    assert!(vcs
        .operations()
        .contains(&"commit_all_release: update Fankai".to_string()));

    // Cleanup fired before the terminal message.
    let completion_ops = completion.operations();
    assert_eq!(
        completion_ops,
        vec![
            "cleanup_purge-artifacts.yml".to_string(),
            "announce_0123456789abcdef".to_string(),
        ]
    );
}

#[tokio::test]
async fn sibling_tasks_survive_one_platform_failure() {
    let (config, _temp_dir) = create_test_config();
    let packager = MockPackager::new();
    packager.fail_artifact("Fankai-windows-latest");
    let vcs = MockVcs::new(&["src/Fankai.py"], "release");
    let completion = MockCompletion::new();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());
    let result = pipeline.run().await;

    // The stage gate refuses to merge a partial artifact set.
    match result {
        Err(ReleaseError::StageGate { failed, total }) => {
            assert_eq!(failed, 1);
            assert_eq!(total, 5);
        }
        other => panic!("Expected stage gate error, got {other:?}"),
    }
    assert_eq!(pipeline.state(), PipelineState::Failed);

    // All five tasks reached the packager: no sibling was cancelled.
    let package_ops: Vec<_> = packager
        .operations()
        .into_iter()
        .filter(|op| op.starts_with("package_"))
        .collect();
    assert_eq!(package_ops.len(), 5);

    // Neither the commit nor the completion signals fired.
    assert!(!vcs
        .operations()
        .iter()
        .any(|op| op.starts_with("commit_all_")));
    assert!(completion.operations().is_empty());
}

#[tokio::test]
async fn service_script_gets_windowed_options_per_platform() {
    let (config, _temp_dir) = create_test_config();
    let packager = MockPackager::new();
    let vcs = MockVcs::new(&["src/Fankai-Service.py"], "release service");
    let completion = MockCompletion::new();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());
    pipeline.run().await.unwrap();

    let requests = packager.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests.iter().all(|r| r.options.windowed));

    let windows = requests
        .iter()
        .find(|r| r.dist_dir.ends_with("Fankai-Service-windows-latest"))
        .unwrap();
    assert_eq!(windows.options.upx_dir, Some(PathBuf::from("dev/upx/windows")));

    let linux = requests
        .iter()
        .find(|r| r.dist_dir.ends_with("Fankai-Service-ubicloud"))
        .unwrap();
    assert_eq!(linux.options.upx_dir, Some(PathBuf::from("dev/upx/linux/x64")));
}

#[tokio::test]
async fn notification_failure_fails_the_run() {
    let (config, _temp_dir) = create_test_config();
    let packager = MockPackager::new();
    let vcs = MockVcs::new(&["src/Fankai.py"], "release");
    let completion = MockCompletion::failing_announce();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());
    let result = pipeline.run().await;

    assert!(matches!(result, Err(ReleaseError::Notification { .. })));
    assert_eq!(pipeline.state(), PipelineState::Failed);

    // Redistribution and the commit had already happened.
    assert!(vcs
        .operations()
        .iter()
        .any(|op| op.starts_with("commit_all_")));
}

#[tokio::test]
async fn tasks_run_concurrently() {
    let (config, _temp_dir) = create_test_config();
    let packager = MockPackager::with_delay(Duration::from_millis(100));
    let vcs = MockVcs::new(&["src/Fankai.py"], "release");
    let completion = MockCompletion::new();

    let mut pipeline =
        pipeline_with(config, packager.clone(), vcs.clone(), completion.clone());

    let start = std::time::Instant::now();
    pipeline.run().await.unwrap();
    let duration = start.elapsed();

    // Five 100ms tasks on five slots should take far less than the 500ms a
    // sequential run would need.
    assert!(duration < Duration::from_millis(400), "fan-out took {duration:?}");
}
