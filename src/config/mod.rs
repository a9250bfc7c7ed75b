//! Config module - The `nautikos.yaml` configuration file.
//!
//! ```yaml
//! environments:
//! - name: prod
//!   manifests:
//!   - path: prod/app/deployment.yaml
//!     type: kubernetes
//!     repositories: [repository-a]
//!     labels: [app]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// ConfigError is returned when the configuration cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Config lists the environments and the manifests that belong to each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environments: Vec<Environment>,
}

/// Environment is a named group of manifests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    #[serde(default)]
    pub manifests: Vec<ManifestConfig>,
}

/// ManifestConfig describes one manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Path of the manifest, relative to the configuration file.
    pub path: PathBuf,
    /// Manifest type name, e.g. `kubernetes`. Unknown names are rejected
    /// when the manifest is processed, not when the file is read.
    #[serde(rename = "type")]
    pub kind: String,
    /// When set, only these repositories are updated in the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeSet<String>>,
}

impl Config {
    /// Reads the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_yaml(&text)
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Returns the environment called `name`.
    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.name == name)
    }
}

impl ManifestConfig {
    /// Returns true if the manifest should be updated for `repository`.
    pub fn accepts_repository(&self, repository: &str) -> bool {
        self.repositories
            .as_ref()
            .map_or(true, |repositories| repositories.contains(repository))
    }

    /// Returns true if the manifest carries every requested label.
    ///
    /// An empty request matches every manifest; a manifest without labels
    /// matches only the empty request.
    pub fn has_labels(&self, requested: &[String]) -> bool {
        if requested.is_empty() {
            return true;
        }
        match &self.labels {
            Some(labels) => requested.iter().all(|label| labels.contains(label)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG_FILE: &str = "environments:
- name: prod 
  manifests: 
  - path: prod/app1/deployment.yaml
    type: kubernetes
    labels: [app1, backend]
  - path: prod/app2/kustomize.yaml
    type: kustomize
    repositories:
      - repository-b
      - repository-c
- name: dev
  manifests: 
  - path: dev/app3/deployment.yaml
    type: kubernetes
";

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(CONFIG_FILE).unwrap();
        assert_eq!(config.environments.len(), 2);

        let prod = config.environment("prod").unwrap();
        assert_eq!(prod.manifests.len(), 2);
        assert_eq!(prod.manifests[0].kind, "kubernetes");
        assert_eq!(prod.manifests[0].path, PathBuf::from("prod/app1/deployment.yaml"));
        assert_eq!(prod.manifests[0].repositories, None);
        assert_eq!(
            prod.manifests[1].repositories,
            Some(["repository-b", "repository-c"].iter().map(|s| s.to_string()).collect())
        );
        assert!(config.environment("staging").is_none());
    }

    #[test]
    fn test_repository_filter() {
        let config = Config::from_yaml(CONFIG_FILE).unwrap();
        let prod = config.environment("prod").unwrap();
        assert!(prod.manifests[0].accepts_repository("repository-a"));
        assert!(!prod.manifests[1].accepts_repository("repository-a"));
        assert!(prod.manifests[1].accepts_repository("repository-b"));
    }

    #[test]
    fn test_label_subset() {
        let config = Config::from_yaml(CONFIG_FILE).unwrap();
        let prod = config.environment("prod").unwrap();
        let labels = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(prod.manifests[0].has_labels(&[]));
        assert!(prod.manifests[0].has_labels(&labels(&["app1"])));
        assert!(prod.manifests[0].has_labels(&labels(&["backend", "app1"])));
        assert!(!prod.manifests[0].has_labels(&labels(&["app1", "app2"])));
        assert!(!prod.manifests[1].has_labels(&labels(&["app1"])));
        assert!(prod.manifests[1].has_labels(&[]));
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_yaml("environments:\n- manifests: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid configuration:"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nautikos.yaml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nautikos.yaml"));
    }
}
