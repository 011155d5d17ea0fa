use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dosetest_patterns::{BendSetConfig, PatternSetConfig};

use crate::gds::GdsOptions;

/// File looked up in the working directory when no other path is given.
pub const CONFIG_FILE_NAME: &str = "dosetest.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One generated layout and where its outputs go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    pub gds: PathBuf,
    pub preview: PathBuf,
}

impl JobOutput {
    fn named(stem: &str) -> Self {
        Self {
            gds: PathBuf::from(format!("{stem}.gds")),
            preview: PathBuf::from(format!("{stem}.svg")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternJob {
    pub output: JobOutput,
    pub layout: PatternSetConfig,
}

impl Default for PatternJob {
    fn default() -> Self {
        Self {
            output: JobOutput::named("patterns_fixed_angle"),
            layout: PatternSetConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendJob {
    pub output: JobOutput,
    pub layout: BendSetConfig,
}

impl Default for BendJob {
    fn default() -> Self {
        Self {
            output: JobOutput::named("L_shapes"),
            layout: BendSetConfig::default(),
        }
    }
}

/// Everything a run needs. Every field has a default, so a config file only
/// lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory all outputs are written to.
    pub output_dir: PathBuf,
    pub patterns: PatternJob,
    pub bends: BendJob,
    pub gds: GdsOptions,
    /// Render SVG previews next to the layouts.
    pub preview: bool,
    /// Re-read each written file and compare it with what was generated.
    pub verify: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            patterns: PatternJob::default(),
            bends: BendJob::default(),
            gds: GdsOptions::default(),
            preview: true,
            verify: true,
        }
    }
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Using config {}", path.display());
                Self::from_json(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No {} found, using built-in parameters", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.output_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let cfg = RunConfig::from_json("{}").unwrap();
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(cfg.patterns.output.gds, PathBuf::from("patterns_fixed_angle.gds"));
        assert_eq!(cfg.bends.output.gds, PathBuf::from("L_shapes.gds"));
    }

    #[test]
    fn test_partial_override() {
        let cfg = RunConfig::from_json(
            r#"{
                "preview": false,
                "patterns": { "layout": { "checkerboard": { "rows": 4 } } },
                "bends": { "layout": { "bends": { "count": 3, "stacking": 30.0 } } }
            }"#,
        )
        .unwrap();
        assert!(!cfg.preview);
        assert_eq!(cfg.patterns.layout.checkerboard.rows, 4);
        assert_eq!(cfg.patterns.layout.checkerboard.cols, 6);
        assert_eq!(cfg.bends.layout.bends.count, 3);
        assert_eq!(cfg.bends.layout.bends.stacking, Some(30.0));
        assert_eq!(cfg.patterns.output, JobOutput::named("patterns_fixed_angle"));
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        assert!(matches!(
            RunConfig::from_json("{ \"preview\": 3 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = RunConfig::load_or_default("/nonexistent/dir/dosetest.json").unwrap();
        assert_eq!(cfg, RunConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let cfg = RunConfig::default();
        let back = RunConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
