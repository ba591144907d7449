use crate::models::analysis_result::AnalysisResult;
use crate::models::image::ImagePreview;
use crate::services::ingestion;
use crate::services::session::{AnalysisSession, SessionSnapshot};
use std::path::PathBuf;
use std::sync::Arc;
use tauri::State;

/// Managed handle to the single analysis session
pub type SessionHandle = Arc<AnalysisSession>;

/// Select an image uploaded by the web view as base64
#[tauri::command]
pub fn select_image(
    session: State<SessionHandle>,
    file_name: String,
    mime_type: String,
    data: String,
) -> Result<ImagePreview, String> {
    let candidate =
        ingestion::decode_upload(file_name, mime_type, &data).map_err(|e| e.to_string())?;

    session.select_image(candidate).map_err(|e| e.to_string())
}

/// Select an image from a local path (drag and drop, file dialog)
#[tauri::command]
pub fn select_image_path(session: State<SessionHandle>, path: PathBuf) -> Result<ImagePreview, String> {
    let candidate = ingestion::read_candidate(&path).map_err(|e| e.to_string())?;

    session.select_image(candidate).map_err(|e| e.to_string())
}

/// Run the selected image through the configured provider
#[tauri::command]
pub async fn start_analysis(session: State<'_, SessionHandle>) -> Result<AnalysisResult, String> {
    // Owned handle, independent of the State borrow
    let session = Arc::clone(&session);
    session.start_analysis().await.map_err(|e| e.to_string())
}

/// Back to the upload step, discarding image and result
#[tauri::command]
pub fn reset_session(session: State<SessionHandle>) -> SessionSnapshot {
    session.reset();
    session.snapshot()
}

#[tauri::command]
pub fn get_session(session: State<SessionHandle>) -> SessionSnapshot {
    session.snapshot()
}
