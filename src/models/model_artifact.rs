use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of model artifact stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    /// Compiled inference engine, used as the ASR model when filtering data
    #[serde(rename = "TRTLLM")]
    Trtllm,
    /// Raw weights, used as the base model of a training run
    #[serde(rename = "RAW_WEIGHT")]
    RawWeight,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Trtllm => "TRTLLM",
            ArtifactType::RawWeight => "RAW_WEIGHT",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "TRTLLM" => Ok(ArtifactType::Trtllm),
            "RAW_WEIGHT" | "RAW" => Ok(ArtifactType::RawWeight),
            other => Err(format!("unknown artifact type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub artifact_id: String,
    pub artifact_type: ArtifactType,
    pub model_artifact_name: String,
    pub s3_path: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub training_execution_id: Option<String>,
    #[serde(default)]
    pub model_size_mb: Option<f64>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub model_tag: Option<String>,
    pub created_at: String,
}
