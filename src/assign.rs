use crate::error::ApiError;
use crate::models::{AssignRequest, Cluster, Model, Route};
use serde::Serialize;

/// Identifies one mount of the assignment page. Results tagged with a token
/// from an earlier mount are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountToken(u64);

/// State of the "Assign Model" form.
#[derive(Debug, Default)]
pub struct AssignForm {
    generation: u64,
    mounted: Option<MountToken>,
    clusters: Vec<Cluster>,
    models: Vec<Model>,
    selected_cluster_id: String,
    selected_model_id: String,
    loading: bool,
    submitting: bool,
    error: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub cluster_placeholder: &'static str,
    pub cluster_options: Vec<SelectOption>,
    pub selected_cluster_id: String,
    pub model_placeholder: &'static str,
    pub model_options: Vec<SelectOption>,
    pub selected_model_id: String,
    pub submit_enabled: bool,
    pub submit_label: &'static str,
}

pub fn is_ready(cluster: &Cluster) -> bool {
    cluster.status.to_lowercase() == "ready"
}

impl AssignForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh mount: clears the form and enters the loading state.
    pub fn mount(&mut self) -> MountToken {
        self.generation += 1;
        let token = MountToken(self.generation);
        *self = Self {
            generation: self.generation,
            mounted: Some(token),
            loading: true,
            ..Self::default()
        };
        token
    }

    pub fn unmount(&mut self) {
        self.mounted = None;
    }

    pub fn is_current(&self, token: MountToken) -> bool {
        self.mounted == Some(token)
    }

    /// Applies the paired cluster/model loads. Returns `false` when the
    /// result belongs to a mount that has since gone away.
    pub fn finish_load(
        &mut self,
        token: MountToken,
        clusters: Result<Vec<Cluster>, ApiError>,
        models: Result<Vec<Model>, ApiError>,
    ) -> bool {
        if !self.is_current(token) {
            log::debug!("Discarding assignment data for a stale mount");
            return false;
        }
        match (clusters, models) {
            (Err(e), _) => self.error = Some(e.labelled("Clusters")),
            (_, Err(e)) => self.error = Some(e.labelled("Models")),
            (Ok(clusters), Ok(models)) => {
                self.clusters = clusters.into_iter().filter(is_ready).collect();
                self.models = models;
                log::info!(
                    "Assignment form loaded {} ready clusters and {} models",
                    self.clusters.len(),
                    self.models.len()
                );
            }
        }
        if let Some(e) = &self.error {
            log::error!("Failed to load assignment data: {}", e);
        }
        self.loading = false;
        true
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn select_cluster(&mut self, cluster_id: impl Into<String>) {
        self.selected_cluster_id = cluster_id.into();
    }

    pub fn select_model(&mut self, model_id: impl Into<String>) {
        self.selected_model_id = model_id.into();
    }

    pub fn can_submit(&self) -> bool {
        !self.selected_cluster_id.is_empty() && !self.selected_model_id.is_empty() && !self.submitting
    }

    pub fn begin_submit(&mut self) -> Option<(MountToken, AssignRequest)> {
        let token = self.mounted?;
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some((
            token,
            AssignRequest {
                cluster_id: self.selected_cluster_id.clone(),
                model_id: self.selected_model_id.clone(),
            },
        ))
    }

    /// Returns the route to navigate to on success. On failure the message
    /// is kept for the inline banner and the selections stay put.
    pub fn finish_submit(&mut self, token: MountToken, result: Result<(), ApiError>) -> Option<Route> {
        if !self.is_current(token) {
            log::debug!("Discarding assignment result for a stale mount");
            return None;
        }
        self.submitting = false;
        match result {
            Ok(()) => {
                log::info!("Assigned model {} to cluster {}", self.selected_model_id, self.selected_cluster_id);
                Some(Route::Home)
            }
            Err(e) => {
                log::error!("Model assignment failed: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn snapshot(&self) -> AssignSnapshot {
        AssignSnapshot {
            loading: self.loading,
            error: self.error.clone(),
            cluster_placeholder: "Choose a cluster",
            cluster_options: self
                .clusters
                .iter()
                .map(|c| SelectOption {
                    value: c.cluster_id.clone(),
                    label: format!("{} • {}/{} devices", c.label(), c.connected_devices, c.max_devices),
                })
                .collect(),
            selected_cluster_id: self.selected_cluster_id.clone(),
            model_placeholder: "Choose a model",
            model_options: self
                .models
                .iter()
                .map(|m| SelectOption { value: m.id.clone(), label: m.name.clone() })
                .collect(),
            selected_model_id: self.selected_model_id.clone(),
            submit_enabled: self.can_submit(),
            submit_label: if self.submitting { "Assigning..." } else { "Assign model" },
        }
    }
}
