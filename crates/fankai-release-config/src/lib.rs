//! Configuration management for the Fankai release pipeline
//!
//! This crate handles YAML configuration parsing, validation and environment
//! variable substitution.

use std::path::{Path, PathBuf};

use fankai_release_core::error::{Error, Result};
use fankai_release_core::PackagingDefaults;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Checkout of the source repository the triggering revision lives in
    #[serde(default = "default_source_repo")]
    pub source_repo: PathBuf,

    /// Checkout of the distribution repository (the persistent tree the
    /// redistributor merges into)
    pub deploy_repo: PathBuf,

    /// Directory holding the entry-point scripts
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Staging area for per-task artifact directories
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,

    /// Name of the primary executable mirrored into the image context
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Dependency manifest handed to the packaging service
    #[serde(default = "default_requirements")]
    pub requirements: PathBuf,

    /// Shared packaging inputs (compression tool root, icon, bundled modules)
    #[serde(default)]
    pub packaging: PackagingDefaults,

    /// Container image pipeline configuration
    pub docker: DockerConfig,

    /// Completion notification configuration
    pub notify: NotifyConfig,

    /// Number of concurrently running build tasks
    #[serde(default = "default_parallel_jobs")]
    pub parallel_jobs: usize,
}

/// Container image pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Build context directory
    #[serde(default = "default_docker_context")]
    pub context: PathBuf,

    /// Dockerfile path
    #[serde(default = "default_dockerfile")]
    pub dockerfile: PathBuf,

    /// Image repository, e.g. `nackophilz/fankai_utilitaire`
    pub repository: String,

    /// Registries every tag is pushed to
    pub registries: Vec<String>,

    /// User-facing tag; the revision tag is derived per run
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

/// Completion notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Name of the artifact-retention workflow fired after redistribution
    pub cleanup_workflow: String,

    /// Repository receiving the workflow dispatch
    pub dispatch_repo: String,

    /// Webhook receiving the terminal message
    pub webhook_url: String,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigError {
            message: format!("Failed to read config file {path:?}: {e}"),
        })?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError { message: format!("Failed to parse YAML: {e}") })?;

        // Expand environment variables
        config.expand_env_vars()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Expand environment variables in paths and the webhook URL
    fn expand_env_vars(&mut self) -> Result<()> {
        self.source_repo = expand_path(&self.source_repo)?;
        self.deploy_repo = expand_path(&self.deploy_repo)?;
        self.source_dir = expand_path(&self.source_dir)?;
        self.staging_dir = expand_path(&self.staging_dir)?;
        self.requirements = expand_path(&self.requirements)?;
        self.packaging.upx_root = expand_path(&self.packaging.upx_root)?;
        self.packaging.icon = expand_path(&self.packaging.icon)?;
        self.docker.context = expand_path(&self.docker.context)?;
        self.docker.dockerfile = expand_path(&self.docker.dockerfile)?;
        self.notify.webhook_url = expand_str(&self.notify.webhook_url)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.deploy_repo.exists() {
            return Err(Error::ConfigError {
                message: format!("Deploy repository does not exist: {0:?}", self.deploy_repo),
            });
        }

        // Create staging_dir if it doesn't exist
        if !self.staging_dir.exists() {
            std::fs::create_dir_all(&self.staging_dir).map_err(|e| Error::ConfigError {
                message: format!("Failed to create staging_dir: {e}"),
            })?;
        }

        if self.app_name.is_empty() {
            return Err(Error::ConfigError { message: "app_name cannot be empty".to_string() });
        }

        if self.docker.repository.is_empty() {
            return Err(Error::ConfigError {
                message: "Docker repository cannot be empty".to_string(),
            });
        }

        if self.docker.registries.is_empty() {
            return Err(Error::ConfigError {
                message: "At least one Docker registry is required".to_string(),
            });
        }

        if self.docker.default_tag.is_empty() {
            return Err(Error::ConfigError {
                message: "Docker default_tag cannot be empty".to_string(),
            });
        }

        if self.parallel_jobs == 0 {
            return Err(Error::ConfigError {
                message: "parallel_jobs must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Expand environment variables in a path
fn expand_path(path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(expand_str(&path.to_string_lossy())?))
}

/// Expand `${VAR}` and `$VAR` references in a string
fn expand_str(value: &str) -> Result<String> {
    let env_var_re =
        Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex");

    let mut result = value.to_string();
    for cap in env_var_re.captures_iter(value) {
        let var_name = cap.get(1).or_else(|| cap.get(2)).unwrap().as_str();
        let var_value = std::env::var(var_name).map_err(|_| Error::ConfigError {
            message: format!("Environment variable not found: {var_name}"),
        })?;

        result = result.replace(&cap[0], &var_value);
    }

    Ok(result)
}

fn default_source_repo() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_app_name() -> String {
    "Fankai".to_string()
}

fn default_requirements() -> PathBuf {
    PathBuf::from("requirements.txt")
}

fn default_docker_context() -> PathBuf {
    PathBuf::from("docker")
}

fn default_dockerfile() -> PathBuf {
    PathBuf::from("docker/Dockerfile")
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_parallel_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use std::env;

    use tempfile::TempDir;

    use super::*;

    fn test_config(deploy_repo: PathBuf, staging_dir: PathBuf) -> Config {
        Config {
            source_repo: default_source_repo(),
            deploy_repo,
            source_dir: default_source_dir(),
            staging_dir,
            app_name: default_app_name(),
            requirements: default_requirements(),
            packaging: PackagingDefaults::default(),
            docker: DockerConfig {
                context: default_docker_context(),
                dockerfile: default_dockerfile(),
                repository: "nackophilz/fankai_utilitaire".to_string(),
                registries: vec!["docker.io".to_string(), "ghcr.io".to_string()],
                default_tag: default_tag(),
            },
            notify: NotifyConfig {
                cleanup_workflow: "purge-artifacts.yml".to_string(),
                dispatch_repo: "Nackophilz/fankai_utilitaire".to_string(),
                webhook_url: "https://hooks.example.com/fankai".to_string(),
            },
            parallel_jobs: 4,
        }
    }

    #[test]
    fn test_expand_str() {
        env::set_var("FANKAI_TEST_VAR", "/test/path");

        let expanded = expand_str("${FANKAI_TEST_VAR}/sub").unwrap();
        assert_eq!(expanded, "/test/path/sub");

        let expanded = expand_str("$FANKAI_TEST_VAR/sub").unwrap();
        assert_eq!(expanded, "/test/path/sub");
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let result = expand_str("${FANKAI_TEST_DOES_NOT_EXIST}");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_creates_staging_dir() {
        let temp_dir = TempDir::new().unwrap();
        let deploy_repo = temp_dir.path().join("deploy");
        std::fs::create_dir_all(&deploy_repo).unwrap();
        let staging = temp_dir.path().join("dist");

        let config = test_config(deploy_repo, staging.clone());
        assert!(config.validate().is_ok());
        assert!(staging.exists());
    }

    #[test]
    fn test_validation_rejects_empty_registries() {
        let temp_dir = TempDir::new().unwrap();
        let deploy_repo = temp_dir.path().join("deploy");
        std::fs::create_dir_all(&deploy_repo).unwrap();

        let mut config = test_config(deploy_repo, temp_dir.path().join("dist"));
        config.docker.registries.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let deploy_repo = temp_dir.path().join("deploy");
        std::fs::create_dir_all(&deploy_repo).unwrap();

        let yaml = format!(
            r#"
deploy_repo: {deploy}
staging_dir: {staging}
docker:
  repository: nackophilz/fankai_utilitaire
  registries: [docker.io, ghcr.io]
notify:
  cleanup_workflow: purge-artifacts.yml
  dispatch_repo: Nackophilz/fankai_utilitaire
  webhook_url: https://hooks.example.com/fankai
"#,
            deploy = deploy_repo.display(),
            staging = temp_dir.path().join("dist").display(),
        );

        let config_path = temp_dir.path().join("fankai-release.yaml");
        std::fs::write(&config_path, yaml).unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.app_name, "Fankai");
        assert_eq!(config.docker.default_tag, "latest");
        assert_eq!(config.docker.registries.len(), 2);
        assert_eq!(config.packaging.upx_root, PathBuf::from("dev/upx"));
    }
}
