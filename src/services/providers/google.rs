use super::{ensure_success, join_url, require_api_key, RawProviderResponse, VisionAdapter};
use crate::error::AdapterError;
use crate::models::image::ImagePayload;
use crate::models::settings::{Provider, Settings};
use crate::services::ingestion::to_base64;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Results requested per feature
const MAX_RESULTS: u32 = 10;

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults", skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

impl Feature {
    fn new(kind: &'static str, max_results: Option<u32>) -> Self {
        Self { kind, max_results }
    }
}

#[derive(Deserialize)]
struct BatchAnnotateResponse {
    #[serde(default)]
    responses: Vec<GoogleAnnotateResponse>,
}

/// One `AnnotateImageResponse`; every part is optional on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleAnnotateResponse {
    pub label_annotations: Vec<EntityAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    pub image_properties_annotation: Option<ImageProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAnnotation {
    pub description: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedObjectAnnotation {
    pub name: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProperties {
    pub dominant_colors: DominantColors,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DominantColors {
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInfo {
    pub color: Rgb,
    pub score: Option<f64>,
    pub pixel_fraction: Option<f64>,
}

/// Channels in 0..=255; absent channels are 0 on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

/// Google Cloud Vision `images:annotate` adapter
#[derive(Clone)]
pub struct GoogleAdapter {
    client: reqwest::Client,
}

impl GoogleAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisionAdapter for GoogleAdapter {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn analyze(
        &self,
        payload: &ImagePayload,
        settings: &Settings,
    ) -> Result<RawProviderResponse, AdapterError> {
        let api_key = require_api_key(settings, Provider::Google)?;
        let url = join_url(&settings.endpoints.google_base_url, "images:annotate");

        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: to_base64(payload, false),
                },
                features: vec![
                    Feature::new("LABEL_DETECTION", Some(MAX_RESULTS)),
                    Feature::new("TEXT_DETECTION", Some(MAX_RESULTS)),
                    Feature::new("OBJECT_LOCALIZATION", Some(MAX_RESULTS)),
                    Feature::new("IMAGE_PROPERTIES", None),
                ],
            }],
        };

        tracing::info!(bytes = payload.size_bytes(), "sending image to Google Vision");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response, Provider::Google).await?;

        let data: BatchAnnotateResponse = response.json().await?;
        let first = data.responses.into_iter().next().unwrap_or_default();

        Ok(RawProviderResponse::Google(first))
    }
}
