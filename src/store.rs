use crate::models::Message;
use dashmap::DashMap;

/// Per-cluster chat histories for the lifetime of the app session.
///
/// Nothing is written to disk; closing the app drops every history.
#[derive(Debug, Default)]
pub struct MessageStore {
    histories: DashMap<String, Vec<Message>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for `cluster_id`, oldest first. Unknown clusters have none.
    pub fn get(&self, cluster_id: &str) -> Vec<Message> {
        self.histories
            .get(cluster_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Replaces the whole history for `cluster_id`.
    pub fn set(&self, cluster_id: &str, messages: Vec<Message>) {
        log::debug!("Storing {} messages for cluster {}", messages.len(), cluster_id);
        self.histories.insert(cluster_id.to_string(), messages);
    }

    /// Appends one message and returns the updated history.
    pub fn append(&self, cluster_id: &str, message: Message) -> Vec<Message> {
        let mut history = self.get(cluster_id);
        history.push(message);
        self.set(cluster_id, history.clone());
        history
    }
}
