//! Maps each provider's raw response onto the canonical `AnalysisResult`.
//!
//! Every function here is total: missing or odd fields degrade to documented
//! fallbacks instead of producing errors.

use crate::models::analysis_result::{AnalysisResult, DetectedObject, SceneLabel};
use crate::services::providers::azure::AzureAnalyzeResponse;
use crate::services::providers::google::{GoogleAnnotateResponse, Rgb};
use crate::services::providers::RawProviderResponse;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Overall confidence when a provider reports none
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

pub const GOOGLE_FALLBACK_DESCRIPTION: &str = "Google Vision analysis result";
pub const AZURE_FALLBACK_DESCRIPTION: &str = "Azure Vision analysis result";

const FALLBACK_OBJECT_NAME: &str = "detected content";
const FALLBACK_OBJECT_CONFIDENCE: f64 = 0.8;
const FALLBACK_SCENE_LABEL: &str = "generic scene";
const FALLBACK_SCENE_CONFIDENCE: f64 = 0.7;

const GOOGLE_DESCRIPTION_LABELS: usize = 3;
const GOOGLE_SCENE_LABELS: usize = 5;

/// Dispatch on the raw response variant
pub fn normalize(raw: RawProviderResponse) -> AnalysisResult {
    match raw {
        RawProviderResponse::Demo(result) => normalize_demo(result),
        RawProviderResponse::OpenAi(content) => normalize_openai(&content),
        RawProviderResponse::Google(response) => normalize_google(&response),
        RawProviderResponse::Azure(response) => normalize_azure(&response),
    }
}

/// Demo fixtures are canonical already
pub fn normalize_demo(result: AnalysisResult) -> AnalysisResult {
    result
}

/// Scale a provider score into [0, 1]
///
/// Scores above 1 are read as percentages. NaN becomes 0.
pub fn unit_confidence(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    let score = if score > 1.0 { score / 100.0 } else { score };
    score.clamp(0.0, 1.0)
}

/// Parse the assistant reply as JSON, falling back to plain text
pub fn normalize_openai(content: &str) -> AnalysisResult {
    let body = strip_code_fence(content);

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => openai_from_json(&map),
        _ => {
            tracing::debug!("OpenAI reply is not a JSON object, using text fallback");
            openai_text_fallback(content)
        }
    }
}

fn openai_text_fallback(content: &str) -> AnalysisResult {
    AnalysisResult {
        description: content.to_string(),
        objects: vec![DetectedObject::new(
            FALLBACK_OBJECT_NAME,
            FALLBACK_OBJECT_CONFIDENCE,
        )],
        text: None,
        scene: vec![SceneLabel::new(
            FALLBACK_SCENE_LABEL,
            FALLBACK_SCENE_CONFIDENCE,
        )],
        confidence: DEFAULT_CONFIDENCE,
        colors: None,
        mood: None,
    }
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

/// Models like to wrap JSON in a markdown fence
fn strip_code_fence(content: &str) -> &str {
    CODE_FENCE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content)
}

fn openai_from_json(map: &serde_json::Map<String, Value>) -> AnalysisResult {
    let description = map
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let objects = json_items(map.get("objects"), &["name", "label"])
        .into_iter()
        .map(|(name, confidence)| DetectedObject::new(name, confidence))
        .collect();

    let scene = json_items(map.get("scene"), &["label", "name"])
        .into_iter()
        .map(|(label, confidence)| SceneLabel::new(label, confidence))
        .collect();

    let text = map
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string);

    let confidence = map
        .get("confidence")
        .and_then(Value::as_f64)
        .map(unit_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let colors = map.get("colors").and_then(Value::as_array).map(|colors| {
        colors
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let mood = map.get("mood").and_then(Value::as_str).map(str::to_string);

    AnalysisResult {
        description,
        objects,
        text,
        scene,
        confidence,
        colors,
        mood,
    }
}

/// Accept `[{"name": .., "confidence": ..}]` as well as bare strings
fn json_items(value: Option<&Value>, name_keys: &[&str]) -> Vec<(String, f64)> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some((name.clone(), DEFAULT_CONFIDENCE)),
            Value::Object(obj) => {
                let name = name_keys
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(Value::as_str))?;
                let confidence = obj
                    .get("confidence")
                    .or_else(|| obj.get("score"))
                    .and_then(Value::as_f64)
                    .map(unit_confidence)
                    .unwrap_or(DEFAULT_CONFIDENCE);
                Some((name.to_string(), confidence))
            }
            _ => None,
        })
        .collect()
}

/// Labels drive description, objects, scene and confidence
pub fn normalize_google(response: &GoogleAnnotateResponse) -> AnalysisResult {
    let labels = &response.label_annotations;

    let description = if labels.is_empty() {
        GOOGLE_FALLBACK_DESCRIPTION.to_string()
    } else {
        labels
            .iter()
            .take(GOOGLE_DESCRIPTION_LABELS)
            .map(|label| label.description.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let objects = labels
        .iter()
        .map(|label| {
            DetectedObject::new(
                label.description.clone(),
                unit_confidence(label.score.unwrap_or_default()),
            )
        })
        .collect();

    let scene = labels
        .iter()
        .take(GOOGLE_SCENE_LABELS)
        .map(|label| {
            SceneLabel::new(
                label.description.clone(),
                unit_confidence(label.score.unwrap_or_default()),
            )
        })
        .collect();

    let text = response
        .text_annotations
        .first()
        .map(|annotation| annotation.description.clone());

    let confidence = labels
        .first()
        .and_then(|label| label.score)
        .filter(|score| *score > 0.0)
        .map(unit_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let colors = response
        .image_properties_annotation
        .as_ref()
        .map(|props| {
            props
                .dominant_colors
                .colors
                .iter()
                .map(|info| hex_color(&info.color))
                .collect::<Vec<_>>()
        })
        .filter(|colors| !colors.is_empty());

    AnalysisResult {
        description,
        objects,
        text,
        scene,
        confidence,
        colors,
        mood: None,
    }
}

fn hex_color(rgb: &Rgb) -> String {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(rgb.red),
        channel(rgb.green),
        channel(rgb.blue)
    )
}

/// Caption, objects, categories and OCR content
pub fn normalize_azure(response: &AzureAnalyzeResponse) -> AnalysisResult {
    let caption = response
        .description
        .as_ref()
        .and_then(|description| description.captions.first());

    let description = caption
        .map(|c| c.text.clone())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| AZURE_FALLBACK_DESCRIPTION.to_string());

    let objects = response
        .objects
        .iter()
        .map(|obj| DetectedObject::new(obj.object.clone(), unit_confidence(obj.confidence)))
        .collect();

    let scene = response
        .categories
        .iter()
        .map(|cat| SceneLabel::new(cat.name.clone(), unit_confidence(cat.score)))
        .collect();

    let text = response
        .read_result
        .as_ref()
        .and_then(|read| read.content.clone());

    let confidence = caption
        .and_then(|c| c.confidence)
        .filter(|score| *score > 0.0)
        .map(unit_confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let colors = response
        .color
        .as_ref()
        .map(|color| color.dominant_colors.clone())
        .filter(|colors| !colors.is_empty());

    AnalysisResult {
        description,
        objects,
        text,
        scene,
        confidence,
        colors,
        mood: None,
    }
}
