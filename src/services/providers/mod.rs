pub mod azure;
pub mod demo;
pub mod google;
pub mod openai;

// Re-export main types
pub use azure::{AzureAdapter, AzureAnalyzeResponse};
pub use demo::DemoAdapter;
pub use google::{GoogleAdapter, GoogleAnnotateResponse};
pub use openai::OpenAiAdapter;

use crate::error::AdapterError;
use crate::models::analysis_result::AnalysisResult;
use crate::models::image::ImagePayload;
use crate::models::settings::{Provider, Settings};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Provider-specific response, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawProviderResponse {
    /// Demo fixtures are already canonical
    Demo(AnalysisResult),
    /// Assistant message content of the chat completion
    OpenAi(String),
    /// First entry of `responses` from `images:annotate`
    Google(GoogleAnnotateResponse),
    /// Body of the `analyze` call
    Azure(AzureAnalyzeResponse),
}

impl RawProviderResponse {
    pub fn provider(&self) -> Provider {
        match self {
            RawProviderResponse::Demo(_) => Provider::Demo,
            RawProviderResponse::OpenAi(_) => Provider::OpenAi,
            RawProviderResponse::Google(_) => Provider::Google,
            RawProviderResponse::Azure(_) => Provider::Azure,
        }
    }
}

/// Vision adapter - one implementation per analysis backend
///
/// A single call per analysis, no retry. Adapters never see the session.
#[async_trait]
pub trait VisionAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    async fn analyze(
        &self,
        payload: &ImagePayload,
        settings: &Settings,
    ) -> Result<RawProviderResponse, AdapterError>;
}

/// Closed set of adapters, one slot per `Provider` variant
#[derive(Clone)]
pub struct ProviderRegistry {
    demo: Arc<dyn VisionAdapter>,
    openai: Arc<dyn VisionAdapter>,
    google: Arc<dyn VisionAdapter>,
    azure: Arc<dyn VisionAdapter>,
}

impl ProviderRegistry {
    /// Registry with the built-in adapters sharing one HTTP client
    pub fn new() -> Result<Self, AdapterError> {
        let client = build_http_client()?;
        Ok(Self {
            demo: Arc::new(DemoAdapter::new()),
            openai: Arc::new(OpenAiAdapter::new(client.clone())),
            google: Arc::new(GoogleAdapter::new(client.clone())),
            azure: Arc::new(AzureAdapter::new(client)),
        })
    }

    /// Replace the adapter registered for `provider`
    pub fn with_adapter(mut self, provider: Provider, adapter: Arc<dyn VisionAdapter>) -> Self {
        match provider {
            Provider::Demo => self.demo = adapter,
            Provider::OpenAi => self.openai = adapter,
            Provider::Google => self.google = adapter,
            Provider::Azure => self.azure = adapter,
        }
        self
    }

    pub fn get(&self, provider: Provider) -> Arc<dyn VisionAdapter> {
        match provider {
            Provider::Demo => Arc::clone(&self.demo),
            Provider::OpenAi => Arc::clone(&self.openai),
            Provider::Google => Arc::clone(&self.google),
            Provider::Azure => Arc::clone(&self.azure),
        }
    }
}

/// Shared HTTP client for the remote adapters
///
/// Only a connect timeout is set; overall request time is left to the caller.
pub fn build_http_client() -> Result<reqwest::Client, AdapterError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| AdapterError::NetworkError(format!("Failed to create HTTP client: {}", e)))
}

/// Fail fast when the provider needs a key and none is set
pub(crate) fn require_api_key<'a>(
    settings: &'a Settings,
    provider: Provider,
) -> Result<&'a str, AdapterError> {
    if !settings.has_api_key() {
        return Err(AdapterError::MissingCredential {
            provider: provider.as_str(),
        });
    }
    Ok(settings.api_key.trim())
}

/// Map a non-success status to `RemoteError`, logging the body
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: Provider,
) -> Result<reqwest::Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        provider = provider.as_str(),
        status = status.as_u16(),
        body = %truncate(&body, 512),
        "provider request failed"
    );
    Err(AdapterError::RemoteError(status.as_u16()))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Join a configured base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::CandidateFile;
    use crate::services::ingestion;

    struct FixedAdapter(Provider);

    #[async_trait]
    impl VisionAdapter for FixedAdapter {
        fn provider(&self) -> Provider {
            self.0
        }

        async fn analyze(
            &self,
            _payload: &ImagePayload,
            _settings: &Settings,
        ) -> Result<RawProviderResponse, AdapterError> {
            Ok(RawProviderResponse::OpenAi("fixed".to_string()))
        }
    }

    #[test]
    fn test_registry_dispatch_is_exhaustive() {
        let registry = ProviderRegistry::new().unwrap();
        for provider in Provider::ALL {
            assert_eq!(registry.get(provider).provider(), provider);
        }
    }

    #[tokio::test]
    async fn test_registry_with_adapter_replaces_slot() {
        let registry = ProviderRegistry::new()
            .unwrap()
            .with_adapter(Provider::Google, Arc::new(FixedAdapter(Provider::Google)));

        let payload =
            ingestion::validate(CandidateFile::new("a.png", "image/png", vec![1, 2, 3])).unwrap();
        let raw = registry
            .get(Provider::Google)
            .analyze(&payload, &Settings::default())
            .await
            .unwrap();

        assert_eq!(raw, RawProviderResponse::OpenAi("fixed".to_string()));
    }

    #[test]
    fn test_require_api_key() {
        let empty = Settings::new(Provider::OpenAi, "   ");
        assert_eq!(
            require_api_key(&empty, Provider::OpenAi),
            Err(AdapterError::MissingCredential { provider: "openai" })
        );

        let set = Settings::new(Provider::OpenAi, " key ");
        assert_eq!(require_api_key(&set, Provider::OpenAi), Ok("key"));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a/v1/", "/chat"), "https://a/v1/chat");
        assert_eq!(join_url("https://a/v1", "chat"), "https://a/v1/chat");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("猫猫猫", 2), "猫猫");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
