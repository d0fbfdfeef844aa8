// Tauri commands exposed to the webview

use crate::assign::AssignSnapshot;
use crate::chat::ChatSnapshot;
use crate::home::HomeSnapshot;
use crate::state::{AppState, AssignOutcome};
use tauri::{AppHandle, Emitter, State};

/// Event carrying the chat snapshot while a reply is still outstanding.
pub const CHAT_UPDATED_EVENT: &str = "chat_updated";

// --- Chat home ---

#[tauri::command]
pub async fn load_clusters(state: State<'_, AppState>) -> Result<HomeSnapshot, String> {
    log::info!("Frontend requested the cluster list");
    Ok(state.load_clusters().await)
}

#[tauri::command]
pub async fn home_snapshot(state: State<'_, AppState>) -> Result<HomeSnapshot, String> {
    Ok(state.home_snapshot().await)
}

#[tauri::command]
pub async fn select_cluster(state: State<'_, AppState>, cluster_id: String) -> Result<HomeSnapshot, String> {
    log::info!("Frontend selected cluster {}", cluster_id);
    state.select_cluster(&cluster_id).await.map_err(|e| {
        log::error!("Failed to select cluster {}: {:?}", cluster_id, e);
        format!("Failed to select cluster: {}", e)
    })
}

#[tauri::command]
pub async fn set_chat_input(state: State<'_, AppState>, text: String) -> Result<ChatSnapshot, String> {
    Ok(state.set_chat_input(text).await)
}

#[tauri::command]
pub async fn send_message(
    app_handle: AppHandle,
    state: State<'_, AppState>,
    text: String,
) -> Result<ChatSnapshot, String> {
    log::info!("Frontend requested to send a message");
    let snapshot = state
        .send_message(text, |pending| {
            if let Err(e) = app_handle.emit(CHAT_UPDATED_EVENT, pending) {
                log::error!("Failed to emit {} event: {:?}", CHAT_UPDATED_EVENT, e);
            }
        })
        .await;
    Ok(snapshot)
}

// --- Model assignment ---

#[tauri::command]
pub async fn mount_assign_page(state: State<'_, AppState>) -> Result<AssignSnapshot, String> {
    log::info!("Frontend opened the assignment page");
    Ok(state.mount_assign_page().await)
}

#[tauri::command]
pub async fn unmount_assign_page(state: State<'_, AppState>) -> Result<(), String> {
    state.unmount_assign_page().await;
    Ok(())
}

#[tauri::command]
pub async fn select_assign_cluster(state: State<'_, AppState>, cluster_id: String) -> Result<AssignSnapshot, String> {
    Ok(state.select_assign_cluster(cluster_id).await)
}

#[tauri::command]
pub async fn select_assign_model(state: State<'_, AppState>, model_id: String) -> Result<AssignSnapshot, String> {
    Ok(state.select_assign_model(model_id).await)
}

#[tauri::command]
pub async fn assign_model(state: State<'_, AppState>) -> Result<AssignOutcome, String> {
    log::info!("Frontend submitted a model assignment");
    Ok(state.assign_model().await)
}
