//! Server configuration

use crate::cli::{ArtifactArgs, ListenArgs};
use reviewpulse_classifiers::ArtifactPaths;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ListenConfig,

    /// Artifact locations
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(
        config_path: &Path,
        artifacts: &ArtifactArgs,
        listen: &ListenArgs,
    ) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(dir) = &artifacts.model_dir {
            config.artifacts.base_dir = dir.clone();
        }
        if let Some(file) = &artifacts.classifier {
            config.artifacts.classifier = file.clone();
        }
        if let Some(file) = &artifacts.vectorizer {
            config.artifacts.vectorizer = file.clone();
        }

        if let Some(address) = &listen.listen {
            config.server.listen = address.clone();
        }
        if let Some(port) = listen.port {
            config.server.port = port;
        }

        Ok(config)
    }

    /// Resolved paths of both artifact files
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.artifacts.base_dir,
            &self.artifacts.vectorizer,
            &self.artifacts.classifier,
        )
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.listen, self.server.port).parse()?)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Requests with larger bodies are rejected with 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Artifact file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding both artifact files
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Classifier file name inside `base_dir`
    #[serde(default = "default_classifier")]
    pub classifier: String,

    /// Vectorizer file name inside `base_dir`
    #[serde(default = "default_vectorizer")]
    pub vectorizer: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            classifier: default_classifier(),
            vectorizer: default_vectorizer(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_classifier() -> String {
    "lr_best.json".to_string()
}

fn default_vectorizer() -> String {
    "vectorizer.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::load(
            Path::new("/nonexistent/reviewpulse.yaml"),
            &ArtifactArgs::default(),
            &ListenArgs::default(),
        )
        .unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(
            config.artifact_paths().classifier,
            PathBuf::from("./models/lr_best.json")
        );
    }

    #[test]
    fn test_partial_yaml_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviewpulse.yaml");
        std::fs::write(
            &path,
            "server:\n  port: 8081\nartifacts:\n  base_dir: /srv/models\n",
        )
        .unwrap();

        let artifacts = ArtifactArgs {
            vectorizer: Some("tfidf_v2.json".to_string()),
            ..Default::default()
        };
        let listen = ListenArgs {
            listen: Some("127.0.0.1".to_string()),
            port: None,
        };
        let config = ServerConfig::load(&path, &artifacts, &listen).unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8081");
        let paths = config.artifact_paths();
        assert_eq!(paths.vectorizer, PathBuf::from("/srv/models/tfidf_v2.json"));
        assert_eq!(paths.classifier, PathBuf::from("/srv/models/lr_best.json"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "server: [not, a, map").unwrap();
        assert!(ServerConfig::load(&path, &ArtifactArgs::default(), &ListenArgs::default()).is_err());
    }
}
