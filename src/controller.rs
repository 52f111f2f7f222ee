use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

use crate::events::ChatEvent;
use crate::session::{ActiveSession, ConversationId, IdMinter, Message, Role};
use crate::store::{ConversationStore, Upsert};

/// An issued exchange: the request snapshot plus the id of the conversation
/// that issued it. [`ChatController::resolve`] applies the outcome only
/// while that id is still the active one.
#[derive(Debug, Clone)]
pub struct PendingReply {
    pub exchange: Uuid,
    pub conversation_id: ConversationId,
    pub model: String,
    pub conversation: Vec<Message>,
}

/// The conversation state machine: one active session, the store of saved
/// conversations, and the id minter. Every user action is a method here;
/// methods return the change events for the rendering layer and never
/// perform IO themselves.
pub struct ChatController {
    session: ActiveSession,
    store: ConversationStore,
    minter: IdMinter,
}

impl ChatController {
    pub fn new(default_model: Option<String>) -> Self {
        let mut minter = IdMinter::default();
        let id = minter.mint();
        Self {
            session: ActiveSession::new(id, default_model.unwrap_or_default()),
            store: ConversationStore::new(),
            minter,
        }
    }

    pub fn session(&self) -> &ActiveSession {
        &self.session
    }

    #[cfg(test)]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Saves the current conversation if it has been modified, then asks the
    /// model source for a model identifier. No identifier aborts the reset;
    /// the save above still stands.
    pub fn new_chat(&mut self, model_source: impl FnOnce() -> Option<String>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        if self.session.modified && !self.session.messages.is_empty() {
            events.push(self.save_active());
        }
        let model = match model_source() {
            Some(m) if !m.trim().is_empty() => m.trim().to_string(),
            _ => return events,
        };
        self.session = ActiveSession::new(self.minter.mint(), model);
        events.push(ChatEvent::TranscriptCleared);
        events
    }

    /// Appends the user's message and hands back the request snapshot for
    /// the network exchange. Empty input after trimming is a no-op.
    pub fn submit(&mut self, input: &str) -> Option<(PendingReply, Vec<ChatEvent>)> {
        let content = input.trim();
        if content.is_empty() {
            return None;
        }
        // Continuing a resumed conversation forks: a new id is minted so the
        // saved entry stays exactly as it was loaded.
        if self.session.resumed {
            self.session.id = self.minter.mint();
            self.session.resumed = false;
        }
        self.session.messages.push(Message::user(content));
        self.session.modified = true;
        let pending = PendingReply {
            exchange: Uuid::new_v4(),
            conversation_id: self.session.id,
            model: self.session.model.clone(),
            conversation: self.session.messages.clone(),
        };
        debug!(
            exchange = %pending.exchange,
            conversation = %pending.conversation_id,
            "exchange issued"
        );
        let events = vec![ChatEvent::MessageAppended {
            role: Role::User,
            content: content.to_string(),
        }];
        Some((pending, events))
    }

    /// Applies the outcome of an exchange. A reply ticketed for a
    /// conversation that is no longer active is discarded. Failures are
    /// rendered as an assistant entry but leave session state untouched.
    pub fn resolve(&mut self, pending: PendingReply, outcome: Result<String>) -> Vec<ChatEvent> {
        if pending.conversation_id != self.session.id {
            debug!(exchange = %pending.exchange, "late reply discarded");
            return Vec::new();
        }
        match outcome {
            Ok(reply) => {
                self.session.messages.push(Message::assistant(reply.clone()));
                let mut events = vec![ChatEvent::MessageAppended {
                    role: Role::Assistant,
                    content: reply,
                }];
                if self.store.contains(self.session.id) {
                    events.push(self.save_active());
                }
                events
            }
            Err(err) => vec![ChatEvent::MessageAppended {
                role: Role::Assistant,
                content: format!("Error: {err}"),
            }],
        }
    }

    /// Copies a stored conversation into the active session by value and
    /// marks it resumed. Unknown ids are ignored.
    pub fn load(&mut self, id: ConversationId) -> Vec<ChatEvent> {
        let Some(stored) = self.store.get(id) else {
            debug!(conversation = %id, "load ignored, id not in store");
            return Vec::new();
        };
        self.session = ActiveSession {
            id,
            model: stored.model.clone(),
            messages: stored.messages.clone(),
            modified: false,
            resumed: true,
        };
        let mut events = vec![ChatEvent::TranscriptCleared];
        events.extend(self.session.messages.iter().map(|m| ChatEvent::MessageAppended {
            role: m.role,
            content: m.content.clone(),
        }));
        events
    }

    fn save_active(&mut self) -> ChatEvent {
        let conversation = self.session.as_conversation();
        let label = conversation.sidebar_label();
        let id = self.session.id;
        match self.store.upsert(id, conversation) {
            Upsert::Inserted => ChatEvent::SidebarInserted { id, label },
            Upsert::Updated => ChatEvent::SidebarUpdated { id, label },
        }
    }
}
