use crate::error::{AdapterError, SessionError};
use crate::models::analysis_result::AnalysisResult;
use crate::models::image::{CandidateFile, ImagePayload, ImagePreview};
use crate::models::settings::{Provider, SharedSettings};
use crate::services::ingestion;
use crate::services::normalizer::normalize;
use crate::services::providers::ProviderRegistry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of the single analysis session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Upload,
    Preview,
    Analyzing,
    Results,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Upload => "upload",
            SessionState::Preview => "preview",
            SessionState::Analyzing => "analyzing",
            SessionState::Results => "results",
        }
    }
}

/// What the presentation layer reads after every transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub image: Option<ImagePreview>,
    pub result: Option<AnalysisResult>,
    pub provider: Option<Provider>,
    /// Completion time of the stored result (epoch millis)
    pub analyzed_at: Option<i64>,
}

#[derive(Default)]
struct SessionInner {
    state: SessionState,
    image: Option<Arc<ImagePayload>>,
    // Built once per selected image
    preview: Option<ImagePreview>,
    result: Option<AnalysisResult>,
    provider: Option<Provider>,
    analyzed_at: Option<i64>,
    // Bumped on every start and reset; a completion with a stale value is dropped
    generation: u64,
}

/// Upload -> Preview -> Analyzing -> Results state machine
///
/// At most one analysis is in flight. The lock is never held across the
/// adapter call, so `reset` and `snapshot` stay responsive while analyzing.
pub struct AnalysisSession {
    inner: Mutex<SessionInner>,
    settings: SharedSettings,
    registry: ProviderRegistry,
}

impl AnalysisSession {
    pub fn new(settings: SharedSettings, registry: ProviderRegistry) -> Self {
        Self {
            inner: Mutex::new(SessionInner::default()),
            settings,
            registry,
        }
    }

    /// Session backed by the built-in adapters
    pub fn with_default_providers(settings: SharedSettings) -> Result<Self, AdapterError> {
        Ok(Self::new(settings, ProviderRegistry::new()?))
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn image(&self) -> Option<Arc<ImagePayload>> {
        self.inner.lock().image.clone()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.inner.lock().result.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            state: inner.state,
            image: inner.preview.clone(),
            result: inner.result.clone(),
            provider: inner.provider,
            analyzed_at: inner.analyzed_at,
        }
    }

    /// Validate and adopt a new image (Upload, Preview or Results -> Preview)
    ///
    /// On any error the session is left untouched.
    pub fn select_image(&self, file: CandidateFile) -> Result<ImagePreview, SessionError> {
        if self.state() == SessionState::Analyzing {
            return Err(SessionError::Busy);
        }

        let payload = match ingestion::validate(file) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "image rejected");
                return Err(e.into());
            }
        };
        let preview = payload.preview();

        let mut inner = self.inner.lock();
        if inner.state == SessionState::Analyzing {
            return Err(SessionError::Busy);
        }
        tracing::info!(
            file = payload.file_name(),
            bytes = payload.size_bytes(),
            from = inner.state.as_str(),
            "image selected"
        );
        inner.image = Some(Arc::new(payload));
        inner.preview = Some(preview.clone());
        inner.result = None;
        inner.provider = None;
        inner.analyzed_at = None;
        inner.state = SessionState::Preview;

        Ok(preview)
    }

    /// Run the provider chosen in the current settings (Preview -> Analyzing)
    ///
    /// Success moves to Results; failure returns to Preview keeping the image.
    /// Settings are read once here and not re-read while the call is in flight.
    pub async fn start_analysis(&self) -> Result<AnalysisResult, SessionError> {
        let (payload, settings, generation) = {
            let mut inner = self.inner.lock();
            match inner.state {
                SessionState::Preview => {}
                SessionState::Analyzing => return Err(SessionError::Busy),
                other => {
                    return Err(SessionError::InvalidTransition {
                        action: "start analysis",
                        state: other.as_str(),
                    })
                }
            }
            let payload = inner.image.clone().ok_or(SessionError::InvalidTransition {
                action: "start analysis",
                state: "preview without image",
            })?;

            inner.state = SessionState::Analyzing;
            inner.generation += 1;
            (payload, self.settings.read().clone(), inner.generation)
        };

        let provider = settings.provider;
        let adapter = self.registry.get(provider);
        tracing::info!(provider = provider.as_str(), file = payload.file_name(), "analysis started");

        let guard = AnalysisGuard::new(&self.inner, generation);
        let outcome = adapter.analyze(&payload, &settings).await.map(normalize);
        drop(payload);
        guard.disarm();

        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.state != SessionState::Analyzing {
            tracing::info!(provider = provider.as_str(), "stale analysis result discarded");
            return Err(SessionError::Superseded);
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    provider = provider.as_str(),
                    objects = result.objects.len(),
                    confidence = result.confidence,
                    "analysis finished"
                );
                inner.state = SessionState::Results;
                inner.result = Some(result.clone());
                inner.provider = Some(provider);
                inner.analyzed_at = Some(chrono::Utc::now().timestamp_millis());
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(provider = provider.as_str(), error = %e, "analysis failed");
                inner.state = SessionState::Preview;
                inner.result = None;
                Err(e.into())
            }
        }
    }

    /// Back to Upload from any state, dropping image and result
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let generation = inner.generation + 1;
        *inner = SessionInner {
            generation,
            ..SessionInner::default()
        };
        tracing::debug!("session reset");
    }
}

/// Puts the session back in Preview if the analysis future is dropped
/// before the adapter call completes (caller timeout, cancelled task).
struct AnalysisGuard<'a> {
    inner: &'a Mutex<SessionInner>,
    generation: u64,
    armed: bool,
}

impl<'a> AnalysisGuard<'a> {
    fn new(inner: &'a Mutex<SessionInner>, generation: u64) -> Self {
        Self {
            inner,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock();
        if inner.generation == self.generation && inner.state == SessionState::Analyzing {
            tracing::warn!("analysis cancelled before completion");
            inner.state = SessionState::Preview;
            inner.result = None;
        }
    }
}
