use super::{ensure_success, join_url, require_api_key, RawProviderResponse, VisionAdapter};
use crate::error::AdapterError;
use crate::models::image::ImagePayload;
use crate::models::settings::{Provider, Settings};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

const ANALYZE_PATH: &str = "vision/v3.2/analyze";
const VISUAL_FEATURES: &str = "Categories,Description,Objects,Tags,Adult,Color,Faces,ImageType,Tags";
const DETAILS: &str = "Landmarks";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Body of a v3.2 `analyze` response (only the parts we map)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureAnalyzeResponse {
    pub categories: Vec<AzureCategory>,
    pub description: Option<AzureDescription>,
    pub objects: Vec<AzureObject>,
    pub read_result: Option<AzureReadResult>,
    pub color: Option<AzureColor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AzureCategory {
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AzureDescription {
    pub tags: Vec<String>,
    pub captions: Vec<AzureCaption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AzureCaption {
    pub text: String,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AzureObject {
    pub object: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AzureReadResult {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AzureColor {
    pub dominant_colors: Vec<String>,
    pub accent_color: Option<String>,
}

/// Azure Computer Vision v3.2 `analyze` adapter (multipart upload)
#[derive(Clone)]
pub struct AzureAdapter {
    client: reqwest::Client,
}

impl AzureAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn analyze_url(endpoint: &str) -> String {
        format!(
            "{}?visualFeatures={}&details={}",
            join_url(endpoint, ANALYZE_PATH),
            VISUAL_FEATURES,
            DETAILS
        )
    }
}

#[async_trait]
impl VisionAdapter for AzureAdapter {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    async fn analyze(
        &self,
        payload: &ImagePayload,
        settings: &Settings,
    ) -> Result<RawProviderResponse, AdapterError> {
        let api_key = require_api_key(settings, Provider::Azure)?;
        let endpoint = settings
            .endpoints
            .azure_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AdapterError::NotConfigured {
                provider: Provider::Azure.as_str(),
                detail: "azureEndpoint is not set".to_string(),
            })?;

        let part = Part::bytes(payload.bytes().to_vec())
            .file_name(payload.file_name().to_string())
            .mime_str(payload.mime_type())
            .map_err(|e| AdapterError::NetworkError(format!("Failed to build upload: {}", e)))?;
        let form = Form::new().part("file", part);

        tracing::info!(bytes = payload.size_bytes(), "sending image to Azure Vision");

        let response = self
            .client
            .post(Self::analyze_url(endpoint))
            .header(SUBSCRIPTION_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response, Provider::Azure).await?;

        let data: AzureAnalyzeResponse = response.json().await?;
        Ok(RawProviderResponse::Azure(data))
    }
}
