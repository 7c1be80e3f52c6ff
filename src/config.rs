//! Composer configuration.
//!
//! Settings come from an optional `graph-composer.toml` in the project
//! directory; command-line flags are layered on top by the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rules::{DependencyRuleChain, DevDependencyRule, PackageRuleChain, RuleError};
use crate::status::{OutdatedCommand, VersionStatusClassifier};

/// Name of the optional configuration file inside a project.
pub const CONFIG_FILE: &str = "graph-composer.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything a composition needs to know besides the dependency model.
///
/// # Example
///
/// ```rust
/// use graph_composer::config::ComposerConfig;
///
/// let config: ComposerConfig = toml::from_str(r#"
///     max_depth = 2
///     colorize = true
///     exclude_packages = ["^ext-", "^php$"]
/// "#).unwrap();
///
/// assert_eq!(config.max_depth, Some(2));
/// assert_eq!(config.format, "svg");
/// assert_eq!(config.package_rule().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Project whose dependencies are drawn
    pub project_dir: PathBuf,
    /// Deepest level drawn below the root; `None` draws everything
    pub max_depth: Option<usize>,
    /// Fill vertices by version status
    pub colorize: bool,
    /// Where to write dependency statistics, if anywhere
    pub export_file: Option<PathBuf>,
    /// Image format handed to the renderer
    pub format: String,
    /// Regular expressions of package names to leave out
    pub exclude_packages: Vec<String>,
    /// Regular expressions of version constraints to leave out
    pub exclude_constraints: Vec<String>,
    /// Leave out dev dependencies entirely, including the root's
    pub no_dev: bool,
    /// Seconds the outdated report may take before it is abandoned
    pub outdated_timeout_secs: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            max_depth: None,
            colorize: false,
            export_file: None,
            format: "svg".to_string(),
            exclude_packages: Vec::new(),
            exclude_constraints: Vec::new(),
            no_dev: false,
            outdated_timeout_secs: 30,
        }
    }
}

impl ComposerConfig {
    /// Loads `graph-composer.toml` from `project_dir`, falling back to
    /// defaults when the file doesn't exist.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(CONFIG_FILE);

        let mut config = if path.is_file() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.clone(),
                source,
            })?
        } else {
            Self::default()
        };

        config.project_dir = project_dir.to_path_buf();
        Ok(config)
    }

    /// Maximum depth with `None` mapped to unbounded.
    pub fn depth_limit(&self) -> usize {
        self.max_depth.unwrap_or(usize::MAX)
    }

    /// Builds the package exclusion chain.
    pub fn package_rule(&self) -> Result<PackageRuleChain, RuleError> {
        PackageRuleChain::from_patterns(&self.exclude_packages)
    }

    /// Builds the dependency exclusion chain.
    pub fn dependency_rule(&self) -> Result<DependencyRuleChain, RuleError> {
        let mut chain = DependencyRuleChain::from_patterns(&self.exclude_constraints)?;
        if self.no_dev {
            chain.push(DevDependencyRule);
        }
        Ok(chain)
    }

    /// Builds a classifier backed by `composer outdated`.
    pub fn classifier(&self) -> VersionStatusClassifier {
        let command =
            OutdatedCommand::default().with_timeout(Duration::from_secs(self.outdated_timeout_secs));
        VersionStatusClassifier::new(&self.project_dir, command)
    }
}
