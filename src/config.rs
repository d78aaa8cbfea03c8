//! Harness configuration.
//!
//! Everything the harness needs to know about the outside world (where the
//! subject lives, where fixtures and docs are) is carried by an explicit
//! [`HarnessConfig`]. Values come from three layers, later ones winning:
//! built-in defaults, an optional YAML file, command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::KatsError;

/// Config file picked up from the working directory when `--config` is not
/// given. Its absence is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "kats.yaml";

/// Resolved configuration for one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Subject executable, invoked as `<subject> <input>`.
    pub subject: PathBuf,
    /// Directory fixture input file names are resolved against.
    pub tests_dir: PathBuf,
    /// The fixture document.
    pub fixtures: PathBuf,
    /// Directory whose files are scanned for code snippets.
    pub docs_dir: PathBuf,
    /// Shared file each snippet is written to before it runs.
    pub scratch: PathBuf,
    /// Optional per-case wall-clock limit.
    pub timeout: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            subject: PathBuf::from("./kestrel"),
            tests_dir: PathBuf::from("tests"),
            fixtures: PathBuf::from("tests/tests.txt"),
            docs_dir: PathBuf::from("docs"),
            scratch: PathBuf::from("tests/tmp.ke"),
            timeout: None,
        }
    }
}

impl HarnessConfig {
    /// Applies every value set in `layer` on top of `self`.
    pub fn layered(mut self, layer: ConfigLayer) -> Self {
        if let Some(subject) = layer.subject {
            self.subject = subject;
        }
        if let Some(tests_dir) = layer.tests_dir {
            self.tests_dir = tests_dir;
        }
        if let Some(fixtures) = layer.fixtures {
            self.fixtures = fixtures;
        }
        if let Some(docs_dir) = layer.docs_dir {
            self.docs_dir = docs_dir;
        }
        if let Some(scratch) = layer.scratch {
            self.scratch = scratch;
        }
        if let Some(secs) = layer.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        self
    }
}

/// A partial configuration: the shape of `kats.yaml`, and of the overrides
/// collected from command-line flags.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub subject: Option<PathBuf>,
    pub tests_dir: Option<PathBuf>,
    pub fixtures: Option<PathBuf>,
    pub docs_dir: Option<PathBuf>,
    pub scratch: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// Parses a YAML config document. `path` only labels errors.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self, KatsError> {
        // An empty file deserializes as YAML null, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| KatsError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, KatsError> {
        let text = fs::read_to_string(path).map_err(|e| KatsError::read(path, e))?;
        Self::from_yaml(&text, path)
    }

    /// Loads `path` if it exists, otherwise returns an empty layer.
    pub fn load_optional(path: &Path) -> Result<Self, KatsError> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_kestrel_layout() {
        let config = HarnessConfig::default();
        assert_eq!(config.subject, PathBuf::from("./kestrel"));
        assert_eq!(config.fixtures, PathBuf::from("tests/tests.txt"));
        assert_eq!(config.docs_dir, PathBuf::from("docs"));
        assert_eq!(config.scratch, PathBuf::from("tests/tmp.ke"));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn yaml_layer_overrides_only_what_it_sets() {
        let layer = ConfigLayer::from_yaml(
            "subject: target/release/kestrel\ntimeout_secs: 5\n",
            Path::new("kats.yaml"),
        )
        .unwrap();
        let config = HarnessConfig::default().layered(layer);
        assert_eq!(config.subject, PathBuf::from("target/release/kestrel"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.tests_dir, PathBuf::from("tests"));
    }

    #[test]
    fn later_layers_win() {
        let file = ConfigLayer {
            subject: Some("from-file".into()),
            docs_dir: Some("manual".into()),
            ..ConfigLayer::default()
        };
        let flags = ConfigLayer {
            subject: Some("from-flag".into()),
            ..ConfigLayer::default()
        };
        let config = HarnessConfig::default().layered(file).layered(flags);
        assert_eq!(config.subject, PathBuf::from("from-flag"));
        assert_eq!(config.docs_dir, PathBuf::from("manual"));
    }

    #[test]
    fn empty_file_is_an_empty_layer() {
        let layer = ConfigLayer::from_yaml("\n", Path::new("kats.yaml")).unwrap();
        assert_eq!(layer, ConfigLayer::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ConfigLayer::from_yaml("subjct: ./kestrel\n", Path::new("kats.yaml")).unwrap_err();
        assert!(matches!(err, KatsError::Config { .. }));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let layer = ConfigLayer::load_optional(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(layer, ConfigLayer::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLayer::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, KatsError::ReadFile { .. }));
    }
}
