use super::analysis::SessionHandle;
use crate::models::settings::Settings;
use crate::services::config::{ConfigManager, SettingsStore};
use std::sync::Mutex;
use tauri::State;

/// State wrapper for configuration manager
pub type ConfigState = Mutex<ConfigManager>;

/// Initialize config manager state
pub fn init_config_manager() -> Result<ConfigState, String> {
    let manager = ConfigManager::new().map_err(|e| e.to_string())?;
    Ok(Mutex::new(manager))
}

/// Load persisted settings (defaults when nothing is stored)
#[tauri::command]
pub fn load_settings(state: State<ConfigState>) -> Result<Settings, String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    manager.load().map_err(|e| e.to_string())
}

/// Persist settings and make them visible to the next analysis
#[tauri::command]
pub fn save_settings(
    state: State<ConfigState>,
    session: State<SessionHandle>,
    settings: Settings,
) -> Result<(), String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    manager.save(&settings).map_err(|e| e.to_string())?;
    *session.settings().write() = settings;

    Ok(())
}

/// Get settings file path
#[tauri::command]
pub fn get_config_path(state: State<ConfigState>) -> Result<String, String> {
    let manager = state
        .lock()
        .map_err(|e| format!("Failed to lock config manager: {}", e))?;

    Ok(manager.config_file_path().to_string_lossy().into_owned())
}
