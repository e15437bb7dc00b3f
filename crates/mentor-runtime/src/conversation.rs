//! Conversation state.

use mentor_models::{ChatTurn, Role};

use crate::backend::HistoryEntry;

/// Append-only chat transcript. Turns are never edited once added.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn and returns a copy of it.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> ChatTurn {
        let turn = ChatTurn::new(role, content);
        self.turns.push(turn.clone());
        turn
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// The last `window` turns in wire form, oldest first.
    pub fn history(&self, window: usize) -> Vec<HistoryEntry> {
        let start = self.turns.len().saturating_sub(window);
        self.turns[start..].iter().map(HistoryEntry::from).collect()
    }
}
