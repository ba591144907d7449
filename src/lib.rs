//! Image analysis client core
//!
//! An image goes through ingestion (type and size checks), one of the
//! provider adapters (demo fixtures, OpenAI, Google Cloud Vision or Azure
//! Computer Vision), and the normalizer, which maps every provider's output to
//! a single [`AnalysisResult`]. [`AnalysisSession`] sequences the steps for a
//! front-end; the optional `desktop` feature wires it into a Tauri shell.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(feature = "desktop")]
mod commands;

pub use error::{AdapterError, ConfigError, SessionError, ValidationError};
pub use models::analysis_result::{AnalysisResult, DetectedObject, SceneLabel};
pub use models::image::{CandidateFile, ImagePayload, ImagePreview};
pub use models::settings::{shared_settings, EndpointConfig, Provider, Settings, SharedSettings};
pub use services::{
    AnalysisSession, ConfigManager, MemorySettingsStore, ProviderRegistry, RawProviderResponse,
    SessionSnapshot, SessionState, SettingsStore, VisionAdapter,
};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::analysis::{
        get_session, reset_session, select_image, select_image_path, start_analysis,
    };
    use commands::config::{get_config_path, init_config_manager, load_settings, save_settings};
    use std::sync::Arc;

    utils::init_logging();

    // Initialize config manager
    let config_manager = init_config_manager().expect("Failed to initialize config manager");

    let settings = match config_manager.lock() {
        Ok(manager) => manager.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }),
        Err(_) => Settings::default(),
    };

    let session = AnalysisSession::with_default_providers(shared_settings(settings))
        .expect("Failed to build HTTP client");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(config_manager)
        .manage(Arc::new(session))
        .invoke_handler(tauri::generate_handler![
            load_settings,
            save_settings,
            get_config_path,
            select_image,
            select_image_path,
            start_analysis,
            reset_session,
            get_session
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
