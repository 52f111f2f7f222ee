use crate::session::{ConversationId, Role};

/// Change events emitted by controller operations. The rendering layer
/// applies them; state code never prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A transcript entry. Emitted for session messages and for rendered
    /// errors that never enter session state.
    MessageAppended { role: Role, content: String },
    TranscriptCleared,
    /// A conversation was saved for the first time; its entry goes to the
    /// top of the sidebar.
    SidebarInserted { id: ConversationId, label: String },
    /// An already-listed conversation changed; its entry updates in place.
    SidebarUpdated { id: ConversationId, label: String },
}
