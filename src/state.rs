use crate::api::{ClusterQuery, DepinApi};
use crate::assign::{AssignForm, AssignSnapshot};
use crate::chat::ChatSnapshot;
use crate::config::AppConfig;
use crate::home::{HomeSnapshot, HomeState};
use crate::models::{now_millis, Route};
use crate::store::MessageStore;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

// Core application state accessible by Tauri commands
#[derive(Clone)] // Allow cloning for background tasks
pub struct AppState {
    pub api: Arc<dyn DepinApi>,
    pub config: Arc<AppConfig>,
    // Chat histories for this session, keyed by cluster id
    pub store: Arc<MessageStore>,
    // View state lives behind async mutexes; no guard is held across a request
    pub home: Arc<Mutex<HomeState>>,
    pub assign: Arc<Mutex<AssignForm>>,
}

/// Result of an assignment submit: the form as it now stands, plus where to
/// go next when the assignment went through.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignOutcome {
    pub form: AssignSnapshot,
    pub navigate: Option<Route>,
}

impl AppState {
    pub fn new(api: Arc<dyn DepinApi>, config: AppConfig) -> Self {
        Self {
            api,
            config: Arc::new(config),
            store: Arc::new(MessageStore::new()),
            home: Arc::new(Mutex::new(HomeState::new())),
            assign: Arc::new(Mutex::new(AssignForm::new())),
        }
    }

    pub async fn home_snapshot(&self) -> HomeSnapshot {
        self.home.lock().await.snapshot()
    }

    /// Fetches the active clusters for the sidebar. Failures leave the list
    /// empty and are only logged.
    pub async fn load_clusters(&self) -> HomeSnapshot {
        self.home.lock().await.directory.begin_load();
        let result = self.api.list_clusters(ClusterQuery::home()).await;

        let mut home = self.home.lock().await;
        home.directory.finish_load(result);
        home.snapshot()
    }

    /// Fetches detail for `cluster_id` and makes it the active cluster, unless
    /// the user picked another one while the fetch was outstanding.
    pub async fn select_cluster(&self, cluster_id: &str) -> Result<HomeSnapshot> {
        let (token, cluster) = self
            .home
            .lock()
            .await
            .begin_select(cluster_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown cluster: {}", cluster_id))?;

        let detail = self.api.cluster_detail(cluster_id).await;

        // A superseded pick still returns the current view
        let mut home = self.home.lock().await;
        home.finish_select(token, cluster, detail, &self.store);
        Ok(home.snapshot())
    }

    pub async fn set_chat_input(&self, text: String) -> ChatSnapshot {
        let mut home = self.home.lock().await;
        home.chat.set_input(text);
        home.chat.snapshot()
    }

    /// Sends `text` to the active cluster. It replaces the input buffer and is
    /// committed under the same lock, so a stale `set_chat_input` cannot change
    /// what goes out. `on_update` receives the snapshot with the user message
    /// committed, before the request goes out; the returned snapshot includes
    /// the reply or the error message.
    pub async fn send_message(&self, text: String, on_update: impl Fn(&ChatSnapshot) + Send) -> ChatSnapshot {
        let (pending, snapshot) = {
            let mut home = self.home.lock().await;
            home.chat.set_input(text);
            let pending = home
                .chat
                .begin_send(&self.store, &self.config.default_chat_url, now_millis());
            (pending, home.chat.snapshot())
        };
        let Some(pending) = pending else {
            log::warn!("Send ignored: chat is not ready or input is empty");
            return snapshot;
        };
        on_update(&snapshot);

        let result = self.api.send_chat(&pending.endpoint, &pending.prompt).await;

        let mut home = self.home.lock().await;
        home.chat.finish_send(&self.store, &pending, result, now_millis());
        home.chat.snapshot()
    }

    /// Mounts the assignment page and loads clusters and models concurrently.
    pub async fn mount_assign_page(&self) -> AssignSnapshot {
        let token = self.assign.lock().await.mount();

        let (clusters, models) = futures::join!(
            self.api.list_clusters(ClusterQuery::assignable()),
            self.api.list_models()
        );

        let mut form = self.assign.lock().await;
        form.finish_load(token, clusters, models);
        form.snapshot()
    }

    pub async fn unmount_assign_page(&self) {
        self.assign.lock().await.unmount();
    }

    pub async fn select_assign_cluster(&self, cluster_id: String) -> AssignSnapshot {
        let mut form = self.assign.lock().await;
        form.select_cluster(cluster_id);
        form.snapshot()
    }

    pub async fn select_assign_model(&self, model_id: String) -> AssignSnapshot {
        let mut form = self.assign.lock().await;
        form.select_model(model_id);
        form.snapshot()
    }

    /// Submits the selected cluster/model pair.
    pub async fn assign_model(&self) -> AssignOutcome {
        let submit = self.assign.lock().await.begin_submit();
        let Some((token, request)) = submit else {
            return AssignOutcome { form: self.assign.lock().await.snapshot(), navigate: None };
        };

        let result = self.api.assign_model(&request).await;

        let mut form = self.assign.lock().await;
        let navigate = form.finish_submit(token, result);
        if navigate.is_some() {
            form.unmount();
        }
        AssignOutcome { form: form.snapshot(), navigate }
    }
}
