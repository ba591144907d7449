use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Vision provider choice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    Google,
    Azure,
    /// Also chosen for unrecognized stored values
    #[default]
    #[serde(other)]
    Demo,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Demo,
        Provider::OpenAi,
        Provider::Google,
        Provider::Azure,
    ];

    /// Stable identifier, matches the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Demo => "demo",
            Provider::OpenAi => "openai",
            Provider::Google => "google",
            Provider::Azure => "azure",
        }
    }

    /// Whether calls to this provider need an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Provider::Demo)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider endpoints and request tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_max_tokens: u32,
    pub google_base_url: String,
    /// Azure resource endpoint, e.g. `https://<name>.cognitiveservices.azure.com`
    pub azure_endpoint: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4-vision-preview".to_string(),
            openai_max_tokens: 1000,
            google_base_url: "https://vision.googleapis.com/v1".to_string(),
            azure_endpoint: None,
        }
    }
}

/// User settings: provider choice + credential
///
/// Missing keys in stored JSON fall back to the defaults field by field.
#[derive(Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub provider: Provider,
    pub api_key: String,
    pub endpoints: EndpointConfig,
}

impl Settings {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            endpoints: EndpointConfig::default(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("Settings")
            .field("provider", &self.provider)
            .field("api_key", &key)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Process-wide settings handle injected into the session
pub type SharedSettings = Arc<RwLock<Settings>>;

pub fn shared_settings(settings: Settings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.provider, Provider::Demo);
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.endpoints.openai_model, "gpt-4-vision-preview");
        assert_eq!(settings.endpoints.openai_max_tokens, 1000);
        assert!(settings.endpoints.azure_endpoint.is_none());
    }

    #[test]
    fn test_provider_serialization() {
        assert_eq!(serde_json::to_string(&Provider::Demo).unwrap(), "\"demo\"");
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), "\"openai\"");
        assert_eq!(serde_json::to_string(&Provider::Google).unwrap(), "\"google\"");
        assert_eq!(serde_json::to_string(&Provider::Azure).unwrap(), "\"azure\"");

        for provider in Provider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }

    #[test]
    fn test_settings_json_keys() {
        let settings = Settings::new(Provider::Google, "abc");
        let value = serde_json::to_value(&settings).unwrap();

        assert_eq!(value["provider"], "google");
        assert_eq!(value["apiKey"], "abc");
        assert!(value["endpoints"]["openaiBaseUrl"].is_string());
    }

    #[test]
    fn test_settings_merge_over_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"provider":"azure"}"#).unwrap();
        assert_eq!(settings.provider, Provider::Azure);
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.endpoints, EndpointConfig::default());

        let settings: Settings =
            serde_json::from_str(r#"{"apiKey":"k","endpoints":{"azureEndpoint":"https://x"}}"#)
                .unwrap();
        assert_eq!(settings.provider, Provider::Demo);
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.endpoints.azure_endpoint.as_deref(), Some("https://x"));
        assert_eq!(settings.endpoints.google_base_url, "https://vision.googleapis.com/v1");
    }

    #[test]
    fn test_debug_masks_api_key() {
        let settings = Settings::new(Provider::OpenAi, "sk-secret");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_requires_api_key() {
        assert!(!Provider::Demo.requires_api_key());
        assert!(Provider::OpenAi.requires_api_key());
        assert!(Provider::Google.requires_api_key());
        assert!(Provider::Azure.requires_api_key());
    }

    #[test]
    fn test_unknown_provider_falls_back_to_demo() {
        let settings: Settings =
            serde_json::from_str(r#"{"provider":"baidu","apiKey":"k"}"#).unwrap();

        assert_eq!(settings.provider, Provider::Demo);
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.endpoints, EndpointConfig::default());

        let known: Settings = serde_json::from_str(r#"{"provider":"demo"}"#).unwrap();
        assert_eq!(known.provider, Provider::Demo);
    }
}
