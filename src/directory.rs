use crate::error::ApiError;
use crate::models::{Cluster, Route, SelectedCluster};
use serde::Serialize;

pub const LOADING_TEXT: &str = "Loading clusters...";
pub const EMPTY_TEXT: &str = "No active clusters";

/// Sidebar list of active clusters.
#[derive(Debug)]
pub struct ClusterDirectory {
    clusters: Vec<Cluster>,
    loading: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub cluster_id: String,
    pub initials: String,
    pub label: String,
    pub summary: String,
    pub active: bool,
    pub ready: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    pub loading: bool,
    pub heading: &'static str,
    pub placeholder: Option<&'static str>,
    pub entries: Vec<DirectoryEntry>,
    pub footer_label: &'static str,
    pub footer_route: Option<Route>,
}

impl Default for ClusterDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterDirectory {
    /// Starts in the loading state; the first fetch is issued on mount.
    pub fn new() -> Self {
        Self { clusters: Vec::new(), loading: true }
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Applies a listing result. Failures are logged and otherwise ignored,
    /// leaving whatever was shown before (nothing, on first mount).
    pub fn finish_load(&mut self, result: Result<Vec<Cluster>, ApiError>) {
        match result {
            Ok(clusters) => {
                log::info!("Directory loaded {} clusters", clusters.len());
                self.clusters = clusters;
            }
            Err(e) => log::error!("Failed to fetch clusters: {}", e),
        }
        self.loading = false;
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn find(&self, cluster_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.cluster_id == cluster_id)
    }

    pub fn snapshot(&self, active: Option<&SelectedCluster>) -> DirectorySnapshot {
        let active_id = active.map(|selected| selected.id());
        let ready_id = active.filter(|selected| selected.accepting()).map(|s| s.id());

        let entries = self
            .clusters
            .iter()
            .map(|c| DirectoryEntry {
                cluster_id: c.cluster_id.clone(),
                initials: c.initials(),
                label: c.label(),
                summary: format!("{}/{} devices • {}", c.connected_devices, c.max_devices, c.status),
                active: active_id == Some(c.cluster_id.as_str()),
                ready: ready_id == Some(c.cluster_id.as_str()),
            })
            .collect();

        let empty_after_load = !self.loading && self.clusters.is_empty();
        let placeholder = if self.loading {
            Some(LOADING_TEXT)
        } else if empty_after_load {
            Some(EMPTY_TEXT)
        } else {
            None
        };

        DirectorySnapshot {
            loading: self.loading,
            heading: if self.loading { LOADING_TEXT } else { "Chats" },
            placeholder,
            entries,
            footer_label: if empty_after_load { "Assign Model" } else { "Manage clusters" },
            footer_route: empty_after_load.then_some(Route::AssignModel),
        }
    }
}
