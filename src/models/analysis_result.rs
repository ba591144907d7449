use serde::{Deserialize, Serialize};

/// Object detected in the image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f64,
}

impl DetectedObject {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Scene classification label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneLabel {
    pub label: String,
    pub confidence: f64,
}

impl SceneLabel {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Canonical, provider-independent analysis result
///
/// All confidences are fractions in [0, 1]. `objects` and `scene` are
/// always present, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub description: String,
    pub objects: Vec<DetectedObject>,
    pub text: Option<String>,
    pub scene: Vec<SceneLabel>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}
