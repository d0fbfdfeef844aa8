use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

// A cluster as returned by the listing endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub cluster_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_devices: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_devices: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connected_devices: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String, // e.g. "Active", "Ready"
}

// Listing entries sometimes carry explicit nulls
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Cluster {
    /// Display label built from the tail of the identifier, e.g. `Cluster 9f3a21bc`.
    pub fn label(&self) -> String {
        format!("Cluster {}", tail(&self.cluster_id, 8))
    }

    /// Two-letter badge shown next to the label.
    pub fn initials(&self) -> String {
        tail(&self.cluster_id, 2).to_uppercase()
    }

    /// Merges per-cluster detail onto this record.
    pub fn enrich(self, detail: ClusterDetail) -> EnrichedCluster {
        EnrichedCluster {
            cluster: self,
            prompt_url: detail.prompt_url,
            accepting: detail.accepting.unwrap_or(false),
            devices: detail.devices.unwrap_or_default(),
            model: detail.model,
        }
    }
}

fn tail(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    if count <= n {
        return s;
    }
    let start = s
        .char_indices()
        .nth(count - n)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    &s[start..]
}

// Device-state breakdown reported by the prompt endpoint
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceBreakdown {
    #[serde(rename = "Active", default)]
    pub active: i64,
    #[serde(rename = "Syncing", default)]
    pub syncing: i64,
}

// Body of `GET /api/v1/cluster/prompt/{clusterId}`. Every field may be missing.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDetail {
    #[serde(default)]
    pub prompt_url: Option<String>,
    #[serde(default)]
    pub accepting: Option<bool>,
    #[serde(default)]
    pub devices: Option<DeviceBreakdown>,
    #[serde(default)]
    pub model: Option<String>,
}

/// A cluster after its detail has been fetched.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedCluster {
    #[serde(flatten)]
    pub cluster: Cluster,
    pub prompt_url: Option<String>,
    pub accepting: bool,
    pub devices: DeviceBreakdown,
    pub model: Option<String>,
}

/// The cluster currently shown in the chat pane.
///
/// `Base` is what the user gets when the detail request failed; it is never
/// accepting, so the chat pane shows it as syncing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectedCluster {
    Base(Cluster),
    Enriched(EnrichedCluster),
}

impl SelectedCluster {
    pub fn cluster(&self) -> &Cluster {
        match self {
            SelectedCluster::Base(cluster) => cluster,
            SelectedCluster::Enriched(enriched) => &enriched.cluster,
        }
    }

    pub fn id(&self) -> &str {
        &self.cluster().cluster_id
    }

    pub fn accepting(&self) -> bool {
        matches!(self, SelectedCluster::Enriched(e) if e.accepting)
    }

    pub fn prompt_url(&self) -> Option<&str> {
        match self {
            SelectedCluster::Base(_) => None,
            SelectedCluster::Enriched(e) => e.prompt_url.as_deref().filter(|u| !u.is_empty()),
        }
    }

    pub fn devices(&self) -> DeviceBreakdown {
        match self {
            SelectedCluster::Base(_) => DeviceBreakdown::default(),
            SelectedCluster::Enriched(e) => e.devices,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            SelectedCluster::Base(_) => None,
            SelectedCluster::Enriched(e) => e.model.as_deref(),
        }
    }
}

// Body of the cluster listing endpoint
#[derive(Deserialize, Debug, Default)]
pub struct ClusterPage {
    #[serde(default)]
    pub data: Option<Vec<Cluster>>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

// A single chat bubble
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: i64, // milliseconds since epoch
}

impl Message {
    pub fn user(text: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: now_ms.to_string(),
            role: Role::User,
            text: text.into(),
            timestamp: now_ms,
        }
    }

    // Offset by one so a reply in the same millisecond still gets its own id
    pub fn assistant(text: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: (now_ms + 1).to_string(),
            role: Role::Assistant,
            text: text.into(),
            timestamp: now_ms,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    pub name: String,
}

// Body of `POST /api/v1/model/assign`
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub cluster_id: String,
    pub model_id: String,
}

/// Pages the webview can show.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    #[serde(rename = "/")]
    Home,
    #[serde(rename = "/assign-model")]
    AssignModel,
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
