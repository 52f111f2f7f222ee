use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Sidebar previews keep at most this many characters of the first user
/// message before the `...` marker.
pub const SNIPPET_MAX_CHARS: usize = 30;
pub const EMPTY_SNIPPET: &str = "Empty conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. The serialized form is exactly the wire shape the
/// chat endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation ids carry the millisecond timestamp they were minted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl ConversationId {
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mints conversation ids from the clock. Strictly increasing, so two mints
/// within the same millisecond still yield distinct ids.
#[derive(Debug, Default)]
pub struct IdMinter {
    last: i64,
}

impl IdMinter {
    pub fn mint(&mut self) -> ConversationId {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        ConversationId(self.last)
    }
}

/// A saved conversation: the machine model it was held against plus the
/// chronological message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub model: String,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Preview text for the sidebar: the first user message, truncated on a
    /// character boundary.
    pub fn snippet(&self) -> String {
        let Some(first_user) = self.messages.iter().find(|m| m.role == Role::User) else {
            return EMPTY_SNIPPET.to_string();
        };
        truncate_chars(&first_user.content, SNIPPET_MAX_CHARS)
    }

    pub fn sidebar_label(&self) -> String {
        format!("Model: {} - {}", self.model, self.snippet())
    }
}

/// The conversation currently shown and editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: ConversationId,
    pub model: String,
    pub messages: Vec<Message>,
    /// True once any message has been added since the last save or reset.
    pub modified: bool,
    /// True while the session holds messages loaded from the store that have
    /// not been added to since loading.
    pub resumed: bool,
}

impl ActiveSession {
    pub fn new(id: ConversationId, model: String) -> Self {
        Self {
            id,
            model,
            messages: Vec::new(),
            modified: false,
            resumed: false,
        }
    }

    pub fn as_conversation(&self) -> Conversation {
        Conversation {
            model: self.model.clone(),
            messages: self.messages.clone(),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
