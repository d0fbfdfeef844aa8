use std::fmt::Display;

use chrono::{Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::fields;
use crate::models::{Message, Role, SelectedCluster};
use crate::store::MessageStore;

pub const TYPING_TEXT: &str = "Assistant is typing...";

/// Where the chat pane is in its lifecycle.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChatPhase {
    /// Nothing selected yet.
    Idle,
    /// Selected cluster is not accepting requests; input is locked.
    Syncing,
    /// Accepting cluster, no request outstanding. The body shows the opening
    /// prompt until the first message.
    Ready,
    /// One chat request is outstanding.
    Sending,
}

/// A chat request that has been committed to the history but not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub cluster_id: String,
    pub endpoint: String,
    pub prompt: String,
}

/// Chat pane state for the selected cluster.
#[derive(Debug, Default)]
pub struct ChatView {
    cluster: Option<SelectedCluster>,
    messages: Vec<Message>,
    input: String,
    sending: bool,
    revision: u64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Align {
    Left,
    Right,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bubble {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub align: Align,
    pub time: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChatBody {
    Prompt { title: &'static str },
    Syncing { title: &'static str, subtitle: &'static str, devices: String },
    Transcript { bubbles: Vec<Bubble> },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHeader {
    pub initials: String,
    pub title: String,
    pub model: String,
    pub devices_active: String,
    pub devices_syncing: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub cluster_id: Option<String>,
    pub phase: ChatPhase,
    pub header: ChatHeader,
    pub body: ChatBody,
    pub typing: Option<&'static str>,
    pub input: String,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub send_label: &'static str,
    pub composer_visible: bool,
    /// Bumped whenever the message list changes; the renderer scrolls to the
    /// bottom when it sees a new value.
    pub revision: u64,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `cluster`. Switching to a different cluster reloads its history
    /// from the store; re-selecting the same one only refreshes its details.
    pub fn select(&mut self, cluster: SelectedCluster, store: &MessageStore) {
        let switched = self.cluster.as_ref().map(|c| c.id()) != Some(cluster.id());
        if switched {
            self.messages = store.get(cluster.id());
            self.revision += 1;
            log::debug!("Chat switched to {} ({} messages)", cluster.id(), self.messages.len());
        }
        self.cluster = Some(cluster);
    }

    pub fn cluster(&self) -> Option<&SelectedCluster> {
        self.cluster.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn phase(&self) -> ChatPhase {
        match &self.cluster {
            None => ChatPhase::Idle,
            Some(c) if !c.accepting() => ChatPhase::Syncing,
            Some(_) if self.sending => ChatPhase::Sending,
            Some(_) => ChatPhase::Ready,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.phase() == ChatPhase::Ready
    }

    pub fn can_send(&self) -> bool {
        self.input_enabled() && !self.input.trim().is_empty()
    }

    /// Commits the current input as a user message and clears the input.
    /// Returns the request to issue, or `None` when sending is not allowed.
    pub fn begin_send(&mut self, store: &MessageStore, default_endpoint: &str, now_ms: i64) -> Option<PendingSend> {
        if !self.can_send() {
            return None;
        }
        let cluster = self.cluster.as_ref()?;
        let cluster_id = cluster.id().to_string();
        let endpoint = cluster.prompt_url().unwrap_or(default_endpoint).to_string();
        let prompt = std::mem::take(&mut self.input);

        self.messages = store.append(&cluster_id, Message::user(prompt.clone(), now_ms));
        self.sending = true;
        self.revision += 1;
        log::info!("Sending prompt to cluster {} via {}", cluster_id, endpoint);

        Some(PendingSend { cluster_id, endpoint, prompt })
    }

    /// Records the outcome of `pending` as an assistant message and clears
    /// the sending flag. Failures become an `Error: ...` message.
    pub fn finish_send(
        &mut self,
        store: &MessageStore,
        pending: &PendingSend,
        result: Result<Value, ApiError>,
        now_ms: i64,
    ) {
        let text = match result {
            Ok(body) => fields::reply_text(&body),
            Err(e) => {
                log::error!("Chat request to {} failed: {}", pending.endpoint, e);
                format!("Error: {}", e)
            }
        };
        let history = store.append(&pending.cluster_id, Message::assistant(text, now_ms));

        // A reply for a cluster the user has since left only goes to the store
        if self.cluster.as_ref().map(|c| c.id()) == Some(pending.cluster_id.as_str()) {
            self.messages = history;
            self.revision += 1;
        }
        self.sending = false;
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_in(&Local)
    }

    /// Snapshot with bubble times rendered in `tz`.
    pub fn snapshot_in<Tz: TimeZone>(&self, tz: &Tz) -> ChatSnapshot
    where
        Tz::Offset: Display,
    {
        let phase = self.phase();
        let cluster = self.cluster.as_ref();
        let devices = cluster.map(|c| c.devices()).unwrap_or_default();

        let header = ChatHeader {
            initials: cluster.map(|c| c.cluster().initials()).unwrap_or_else(|| "CL".to_string()),
            title: cluster
                .map(|c| c.cluster().label())
                .unwrap_or_else(|| "Select a cluster".to_string()),
            model: format!("Model: {}", cluster.and_then(|c| c.model()).unwrap_or_default()),
            devices_active: format!("{} devices active", devices.active),
            devices_syncing: format!("{} devices syncing", devices.syncing),
        };

        let body = match cluster {
            Some(c) if !c.accepting() => ChatBody::Syncing {
                title: "Cluster is syncing",
                subtitle: "Please wait while the cluster initializes...",
                devices: format!(
                    "{}/{} devices connected",
                    c.cluster().connected_devices,
                    c.cluster().max_devices
                ),
            },
            Some(_) if !self.messages.is_empty() => ChatBody::Transcript {
                bubbles: self.messages.iter().map(|m| bubble(m, tz)).collect(),
            },
            _ => ChatBody::Prompt { title: "Where should we begin?" },
        };

        ChatSnapshot {
            cluster_id: cluster.map(|c| c.id().to_string()),
            phase,
            header,
            body,
            typing: self.sending.then_some(TYPING_TEXT),
            input: self.input.clone(),
            input_enabled: self.input_enabled(),
            send_enabled: self.can_send(),
            send_label: if self.sending { "Sending..." } else { "Send" },
            composer_visible: cluster.map(|c| c.accepting()).unwrap_or(false),
            revision: self.revision,
        }
    }
}

fn bubble<Tz: TimeZone>(message: &Message, tz: &Tz) -> Bubble
where
    Tz::Offset: Display,
{
    Bubble {
        id: message.id.clone(),
        role: message.role,
        text: message.text.clone(),
        align: match message.role {
            Role::User => Align::Right,
            Role::Assistant => Align::Left,
        },
        time: time_of_day(message.timestamp, tz),
    }
}

/// Formats a millisecond timestamp as a time of day, e.g. `3:04:05 PM`.
pub fn time_of_day<Tz: TimeZone>(timestamp_ms: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%-I:%M:%S %p").to_string())
        .unwrap_or_default()
}
