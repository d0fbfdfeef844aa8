use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use depin_chat_lib::api::{ClusterQuery, DepinApi};
use depin_chat_lib::chat::{ChatBody, ChatPhase, ChatSnapshot};
use depin_chat_lib::config::AppConfig;
use depin_chat_lib::error::ApiError;
use depin_chat_lib::models::{AssignRequest, Cluster, ClusterDetail, Model, Role, Route};
use depin_chat_lib::state::AppState;
use serde_json::{json, Value};

// In-process stand-in for the cluster, model, and chat services
#[derive(Default)]
struct FakeApi {
    clusters: Vec<Cluster>,
    list_error: Option<ApiError>,
    details: HashMap<String, ClusterDetail>,
    chat_error: Option<ApiError>,
    models: Vec<Model>,
    models_error: Option<ApiError>,
    assign_error: Option<ApiError>,
    queries: Mutex<Vec<ClusterQuery>>,
    chat_calls: Mutex<Vec<(String, String)>>,
    assigned: Mutex<Vec<AssignRequest>>,
}

#[async_trait]
impl DepinApi for FakeApi {
    async fn list_clusters(&self, query: ClusterQuery) -> Result<Vec<Cluster>, ApiError> {
        self.queries.lock().unwrap().push(query);
        match &self.list_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.clusters.clone()),
        }
    }

    async fn cluster_detail(&self, cluster_id: &str) -> Result<ClusterDetail, ApiError> {
        self.details.get(cluster_id).cloned().ok_or(ApiError::Status(500))
    }

    async fn list_models(&self) -> Result<Vec<Model>, ApiError> {
        match &self.models_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.models.clone()),
        }
    }

    async fn assign_model(&self, request: &AssignRequest) -> Result<(), ApiError> {
        self.assigned.lock().unwrap().push(request.clone());
        match &self.assign_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn send_chat(&self, endpoint: &str, prompt: &str) -> Result<Value, ApiError> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), prompt.to_string()));
        match &self.chat_error {
            Some(e) => Err(e.clone()),
            None => Ok(json!({ "response": format!("echo: {}", prompt) })),
        }
    }
}

fn cluster(id: &str, status: &str) -> Cluster {
    Cluster {
        cluster_id: id.to_string(),
        template_id: "tpl".to_string(),
        min_devices: 1,
        max_devices: 4,
        connected_devices: 2,
        status: status.to_string(),
    }
}

fn accepting(url: Option<&str>) -> ClusterDetail {
    ClusterDetail {
        prompt_url: url.map(str::to_string),
        accepting: Some(true),
        ..Default::default()
    }
}

fn state_with(api: FakeApi) -> (AppState, Arc<FakeApi>) {
    let api = Arc::new(api);
    let state = AppState::new(api.clone(), AppConfig::default());
    (state, api)
}

async fn say(state: &AppState, text: &str) -> ChatSnapshot {
    state.send_message(text.to_string(), |_| {}).await
}

fn transcript(snapshot: &ChatSnapshot) -> Vec<String> {
    match &snapshot.body {
        ChatBody::Transcript { bubbles } => bubbles.iter().map(|b| b.text.clone()).collect(),
        _ => Vec::new(),
    }
}

#[tokio::test]
async fn failed_listing_leaves_directory_empty() {
    let (state, api) = state_with(FakeApi {
        list_error: Some(ApiError::Network("Network Error".into())),
        ..Default::default()
    });

    let home = state.load_clusters().await;
    assert!(!home.directory.loading);
    assert!(home.directory.entries.is_empty());
    assert_eq!(home.directory.placeholder, Some("No active clusters"));
    assert_eq!(api.queries.lock().unwrap()[0], ClusterQuery::home());
}

#[tokio::test]
async fn send_round_trips_through_store() {
    let mut details = HashMap::new();
    details.insert("a".to_string(), accepting(Some("http://node-a:9000")));
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active")],
        details,
        ..Default::default()
    });
    state.load_clusters().await;
    state.select_cluster("a").await.unwrap();

    let updates = Mutex::new(Vec::new());
    let done = state
        .send_message("hello".to_string(), |snap| updates.lock().unwrap().push(snap.clone()))
        .await;

    let updates = updates.into_inner().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].phase, ChatPhase::Sending);
    assert_eq!(transcript(&updates[0]), vec!["hello"]);
    assert_eq!(updates[0].input, "");

    assert_eq!(done.phase, ChatPhase::Ready);
    assert_eq!(transcript(&done), vec!["hello", "echo: hello"]);
    assert_eq!(
        api.chat_calls.lock().unwrap().as_slice(),
        &[("http://node-a:9000".to_string(), "hello".to_string())]
    );

    let stored = state.store.get("a");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].role, Role::User);
    assert_eq!(stored[1].role, Role::Assistant);
}

#[tokio::test]
async fn histories_survive_switching_clusters() {
    let mut details = HashMap::new();
    details.insert("a".to_string(), accepting(None));
    details.insert("b".to_string(), accepting(None));
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active"), cluster("b", "Active")],
        details,
        ..Default::default()
    });
    state.load_clusters().await;

    state.select_cluster("a").await.unwrap();
    let a_history = transcript(&say(&state, "first for a").await);

    state.select_cluster("b").await.unwrap();
    let b_snapshot = say(&state, "only for b").await;
    assert_eq!(transcript(&b_snapshot), vec!["only for b", "echo: only for b"]);

    let back = state.select_cluster("a").await.unwrap();
    assert_eq!(transcript(&back.chat), a_history);
    assert_eq!(a_history, vec!["first for a", "echo: first for a"]);

    // Missing promptUrl falls back to the configured default
    let endpoint = api.chat_calls.lock().unwrap()[0].0.clone();
    assert_eq!(endpoint, AppConfig::default().default_chat_url);
}

#[tokio::test]
async fn send_uses_given_text_over_stale_buffer() {
    let mut details = HashMap::new();
    details.insert("a".to_string(), accepting(None));
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active")],
        details,
        ..Default::default()
    });
    state.load_clusters().await;
    state.select_cluster("a").await.unwrap();

    // Buffer still holds an earlier keystroke when the send arrives
    state.set_chat_input("hell".to_string()).await;
    let done = state.send_message("hello".to_string(), |_| {}).await;

    assert_eq!(transcript(&done), vec!["hello", "echo: hello"]);
    assert_eq!(done.input, "");
    assert_eq!(api.chat_calls.lock().unwrap()[0].1, "hello");
}

#[tokio::test]
async fn blank_send_is_ignored() {
    let mut details = HashMap::new();
    details.insert("a".to_string(), accepting(None));
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active")],
        details,
        ..Default::default()
    });
    state.load_clusters().await;
    state.select_cluster("a").await.unwrap();

    let snap = say(&state, "   ").await;
    assert_eq!(snap.phase, ChatPhase::Ready);
    assert!(api.chat_calls.lock().unwrap().is_empty());
    assert!(state.store.get("a").is_empty());
}

#[tokio::test]
async fn chat_failure_becomes_error_message() {
    let mut details = HashMap::new();
    details.insert("a".to_string(), accepting(None));
    let (state, _) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active")],
        details,
        chat_error: Some(ApiError::Network("Network Error".into())),
        ..Default::default()
    });
    state.load_clusters().await;
    state.select_cluster("a").await.unwrap();

    let done = say(&state, "hello").await;
    assert_eq!(transcript(&done), vec!["hello", "Error: Network Error"]);
    assert!(!done.send_enabled && done.input_enabled);
    assert_eq!(done.typing, None);
}

#[tokio::test]
async fn detail_failure_shows_syncing_and_blocks_send() {
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("a", "Active")],
        ..Default::default()
    });
    state.load_clusters().await;

    let home = state.select_cluster("a").await.unwrap();
    assert_eq!(home.chat.phase, ChatPhase::Syncing);
    assert!(!home.chat.input_enabled);
    assert!(home.directory.entries[0].active);
    assert!(!home.directory.entries[0].ready);

    let snap = say(&state, "hello").await;
    assert_eq!(snap.phase, ChatPhase::Syncing);
    assert!(api.chat_calls.lock().unwrap().is_empty());
    assert!(state.store.get("a").is_empty());
}

#[tokio::test]
async fn selecting_unknown_cluster_is_an_error() {
    let (state, _) = state_with(FakeApi::default());
    state.load_clusters().await;
    assert!(state.select_cluster("ghost").await.is_err());
}

#[tokio::test]
async fn assignment_page_loads_ready_clusters_and_submits() {
    let (state, api) = state_with(FakeApi {
        clusters: vec![cluster("ready-1", "Ready"), cluster("busy-1", "Active")],
        models: vec![Model { id: "m1".into(), name: "m1".into() }],
        ..Default::default()
    });

    let form = state.mount_assign_page().await;
    assert!(!form.loading);
    assert_eq!(form.cluster_options.len(), 1);
    assert_eq!(form.cluster_options[0].value, "ready-1");
    assert!(!form.submit_enabled);
    assert_eq!(api.queries.lock().unwrap()[0], ClusterQuery::assignable());

    state.select_assign_cluster("ready-1".into()).await;
    let form = state.select_assign_model("m1".into()).await;
    assert!(form.submit_enabled);

    let outcome = state.assign_model().await;
    assert_eq!(outcome.navigate, Some(Route::Home));
    assert_eq!(
        api.assigned.lock().unwrap().as_slice(),
        &[AssignRequest { cluster_id: "ready-1".into(), model_id: "m1".into() }]
    );
}

#[tokio::test]
async fn assignment_failures_show_inline() {
    let (state, _) = state_with(FakeApi {
        clusters: vec![cluster("ready-1", "ready")],
        models: vec![Model { id: "m1".into(), name: "Model One".into() }],
        assign_error: Some(ApiError::Status(409)),
        ..Default::default()
    });
    state.mount_assign_page().await;
    state.select_assign_cluster("ready-1".into()).await;
    state.select_assign_model("m1".into()).await;

    let outcome = state.assign_model().await;
    assert_eq!(outcome.navigate, None);
    assert_eq!(outcome.form.error.as_deref(), Some("HTTP 409"));
    assert_eq!(outcome.form.selected_cluster_id, "ready-1");
    assert!(outcome.form.submit_enabled);
}

#[tokio::test]
async fn assignment_load_failure_is_labelled() {
    let (state, _) = state_with(FakeApi {
        models_error: Some(ApiError::Status(500)),
        ..Default::default()
    });
    let form = state.mount_assign_page().await;
    assert_eq!(form.error.as_deref(), Some("Models HTTP 500"));
    assert!(!form.loading);
}

#[tokio::test]
async fn submit_without_selection_is_ignored() {
    let (state, api) = state_with(FakeApi::default());
    state.mount_assign_page().await;
    let outcome = state.assign_model().await;
    assert_eq!(outcome.navigate, None);
    assert!(api.assigned.lock().unwrap().is_empty());
}
