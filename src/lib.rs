// Desktop chat client for Depin compute clusters.
// Everything except `commands` and `run` builds without the webview shell.

pub mod api;
pub mod assign;
pub mod chat;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod fields;
pub mod home;
pub mod models;
pub mod state;
pub mod store;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use crate::api::{DepinApi, HttpDepinApi};
    use crate::config::AppConfig;
    use crate::state::AppState;
    use std::sync::Arc;
    use tauri::Manager;

    // Initialize logging
    env_logger::init();

    tauri::Builder::default()
        .setup(|app| {
            let config = AppConfig::from_env()?;
            log::info!(
                "Using cluster API at {} (default chat endpoint {})",
                config.api_base_url,
                config.default_chat_url
            );

            let api: Arc<dyn DepinApi> = Arc::new(HttpDepinApi::new(&config.api_base_url));
            app.manage(AppState::new(api, config));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::load_clusters,
            commands::home_snapshot,
            commands::select_cluster,
            commands::set_chat_input,
            commands::send_message,
            commands::mount_assign_page,
            commands::unmount_assign_page,
            commands::select_assign_cluster,
            commands::select_assign_model,
            commands::assign_model
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
