use serde::Serialize;

use crate::chat::{ChatSnapshot, ChatView};
use crate::directory::{ClusterDirectory, DirectorySnapshot};
use crate::error::ApiError;
use crate::models::{Cluster, ClusterDetail, SelectedCluster};
use crate::store::MessageStore;

/// Identifies one cluster pick. Only the latest pick's detail is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectToken(u64);

/// The chat home route: cluster sidebar plus chat pane.
#[derive(Debug, Default)]
pub struct HomeState {
    pub directory: ClusterDirectory,
    pub chat: ChatView,
    detail_loading: bool,
    selections: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HomeSnapshot {
    pub directory: DirectorySnapshot,
    pub chat: ChatSnapshot,
    pub detail_loading: bool,
}

impl HomeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_detail_loading(&self) -> bool {
        self.detail_loading
    }

    /// Marks a detail fetch as outstanding and returns the base record to
    /// enrich, or `None` when the id is not in the directory.
    pub fn begin_select(&mut self, cluster_id: &str) -> Option<(SelectToken, Cluster)> {
        let cluster = self.directory.find(cluster_id)?.clone();
        self.selections += 1;
        self.detail_loading = true;
        Some((SelectToken(self.selections), cluster))
    }

    /// Makes `cluster` the active one, enriched when the detail fetch worked.
    /// A failed fetch still selects the bare record. Returns `false` and
    /// changes nothing when a later pick has superseded `token`.
    pub fn finish_select(
        &mut self,
        token: SelectToken,
        cluster: Cluster,
        detail: Result<ClusterDetail, ApiError>,
        store: &MessageStore,
    ) -> bool {
        if token != SelectToken(self.selections) {
            log::debug!("Dropping superseded detail for {}", cluster.cluster_id);
            return false;
        }
        let selected = match detail {
            Ok(detail) => {
                log::info!(
                    "Cluster {} detail: accepting={:?} model={:?}",
                    cluster.cluster_id,
                    detail.accepting,
                    detail.model
                );
                SelectedCluster::Enriched(cluster.enrich(detail))
            }
            Err(e) => {
                log::error!("Failed to fetch cluster details for {}: {}", cluster.cluster_id, e);
                SelectedCluster::Base(cluster)
            }
        };
        self.chat.select(selected, store);
        self.detail_loading = false;
        true
    }

    pub fn snapshot(&self) -> HomeSnapshot {
        HomeSnapshot {
            directory: self.directory.snapshot(self.chat.cluster()),
            chat: self.chat.snapshot(),
            detail_loading: self.detail_loading,
        }
    }
}
