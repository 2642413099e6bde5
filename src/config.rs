use crate::branch::{BranchClassifier, ClassifierConfig};
use crate::error::ConfigError;
use crate::flow::FlowDefinition;
use crate::token::{CodecConfig, TemplateCodec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine-wide settings, loadable from JSON. Missing sections take their defaults.
///
/// ```json
/// {
///   "codec": { "error_policy": "first_wins", "reference_class": "badge" },
///   "branch": { "matching": "segmented" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub codec: CodecConfig,
    pub branch: ClassifierConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn codec<'a>(&self, flow: &'a FlowDefinition) -> TemplateCodec<'a> {
        TemplateCodec::builder(flow)
            .with_config(self.codec.clone())
            .build()
    }

    pub fn classifier(&self) -> BranchClassifier {
        BranchClassifier::builder().with_config(self.branch).build()
    }
}
