//! End-to-end runs of the analysis session through the public API

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vision_lens::services::providers::DemoAdapter;
use vision_lens::{
    shared_settings, AdapterError, AnalysisSession, CandidateFile, MemorySettingsStore, Provider,
    ProviderRegistry, SessionError, SessionState, Settings, SettingsStore, ValidationError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_session(settings: Settings) -> AnalysisSession {
    let registry = ProviderRegistry::new()
        .unwrap()
        .with_adapter(Provider::Demo, Arc::new(DemoAdapter::with_delay(Duration::ZERO)));
    AnalysisSession::new(shared_settings(settings), registry)
}

fn image(name: &str) -> CandidateFile {
    CandidateFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
}

fn assert_canonical(result: &vision_lens::AnalysisResult) {
    assert!((0.0..=1.0).contains(&result.confidence));
    assert!(result.objects.iter().all(|o| (0.0..=1.0).contains(&o.confidence)));
    assert!(result.scene.iter().all(|s| (0.0..=1.0).contains(&s.confidence)));
}

#[tokio::test]
async fn demo_round_trip_and_reset() {
    let session = fast_session(Settings::default());
    assert_eq!(session.state(), SessionState::Upload);

    let preview = session.select_image(image("my_cat.jpg")).unwrap();
    assert_eq!(preview.file_name, "my_cat.jpg");
    assert_eq!(session.state(), SessionState::Preview);

    let result = session.start_analysis().await.unwrap();
    assert_eq!(session.state(), SessionState::Results);
    assert_eq!(result.objects[0].name, "猫");
    assert!(result.colors.is_some());
    assert_canonical(&result);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.provider, Some(Provider::Demo));
    assert!(snapshot.analyzed_at.is_some());
    assert_eq!(snapshot.result.as_ref(), Some(&result));

    session.reset();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Upload);
    assert!(snapshot.image.is_none());
    assert!(snapshot.result.is_none());
}

#[tokio::test]
async fn demo_is_deterministic_per_file_name() {
    let session = fast_session(Settings::default());

    session.select_image(image("DOG_park.png")).unwrap();
    let first = session.start_analysis().await.unwrap();

    session.select_image(image("DOG_park.png")).unwrap();
    let second = session.start_analysis().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.objects[0].name, "狗");
}

#[tokio::test]
async fn rejected_upload_leaves_session_untouched() {
    let session = fast_session(Settings::default());

    let err = session
        .select_image(CandidateFile::new("notes.txt", "text/plain", b"hi".to_vec()))
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::InvalidType { .. })
    ));
    assert_eq!(session.state(), SessionState::Upload);
}

#[tokio::test]
async fn missing_key_fails_without_leaving_preview() {
    let session = fast_session(Settings::new(Provider::OpenAi, ""));
    session.select_image(image("photo.jpg")).unwrap();

    let err = session.start_analysis().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Adapter(AdapterError::MissingCredential { provider: "openai" })
    );
    assert_eq!(session.state(), SessionState::Preview);
    assert!(session.image().is_some());
}

#[tokio::test]
async fn openai_reply_is_normalized() {
    let server = MockServer::start().await;
    let reply = "```json\n{\"description\":\"A red bicycle\",\"objects\":[{\"name\":\"bicycle\",\"confidence\":0.9}],\"scene\":[\"street\"],\"confidence\":0.85}\n```";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = Settings::new(Provider::OpenAi, "sk-test");
    settings.endpoints.openai_base_url = server.uri();
    let session = fast_session(settings);

    session.select_image(image("bike.jpg")).unwrap();
    let result = session.start_analysis().await.unwrap();

    assert_eq!(result.description, "A red bicycle");
    assert_eq!(result.objects[0].name, "bicycle");
    assert_eq!(result.confidence, 0.85);
    assert_canonical(&result);
    assert_eq!(session.snapshot().provider, Some(Provider::OpenAi));
}

#[tokio::test]
async fn remote_error_returns_to_preview_and_retry_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/images:annotate"))
        .and(query_param("key", "g-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responses": [{
                "labelAnnotations": [
                    { "description": "Mountain", "score": 0.93 },
                    { "description": "Sky", "score": 0.88 }
                ]
            }]
        })))
        .mount(&server)
        .await;

    let mut settings = Settings::new(Provider::Google, "g-key");
    settings.endpoints.google_base_url = server.uri();
    let session = fast_session(settings);
    session.select_image(image("hike.jpg")).unwrap();

    let err = session.start_analysis().await.unwrap_err();
    assert_eq!(err, SessionError::Adapter(AdapterError::RemoteError(503)));
    assert_eq!(session.state(), SessionState::Preview);

    let result = session.start_analysis().await.unwrap();
    assert_eq!(session.state(), SessionState::Results);
    assert_eq!(result.confidence, 0.93);
    assert!(result.objects.iter().any(|o| o.name == "Mountain"));
    assert_canonical(&result);
}

#[tokio::test]
async fn provider_switch_applies_to_next_analysis() {
    let store = MemorySettingsStore::new();
    let session = fast_session(store.load().unwrap());

    session.select_image(image("car_photo.jpg")).unwrap();
    let demo = session.start_analysis().await.unwrap();
    assert_eq!(demo.objects[0].name, "汽车");

    let switched = Settings::new(Provider::Azure, "");
    store.save(&switched).unwrap();
    *session.settings().write() = store.load().unwrap();

    session.select_image(image("car_photo.jpg")).unwrap();
    let err = session.start_analysis().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Adapter(AdapterError::MissingCredential { provider: "azure" })
    );
}
