use std::collections::HashMap;

use crate::session::{Conversation, ConversationId};

/// Outcome of an upsert, so the caller can emit the matching sidebar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Saved conversations, keyed by id. In-memory only; entries live for the
/// process lifetime and are never removed.
#[derive(Debug, Default)]
pub struct ConversationStore {
    entries: HashMap<ConversationId, Conversation>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, id: ConversationId, conversation: Conversation) -> Upsert {
        match self.entries.insert(id, conversation) {
            None => Upsert::Inserted,
            Some(_) => Upsert::Updated,
        }
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
