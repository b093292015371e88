use tanit_core::config::ChatConfig;
use tanit_core::{ConversationTurn, EmptyTurnMode};

/// What to do with a user turn whose text is empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyTurnPolicy {
    /// Record the turn with this marker as its content.
    Placeholder(String),
    /// Record only the assistant reply.
    Skip,
}

impl EmptyTurnPolicy {
    pub fn from_config(config: &ChatConfig) -> Self {
        match config.empty_turn {
            EmptyTurnMode::Placeholder => Self::Placeholder(config.placeholder.clone()),
            EmptyTurnMode::Skip => Self::Skip,
        }
    }

    fn user_turn(&self, text: &str) -> Option<ConversationTurn> {
        if !text.trim().is_empty() {
            return Some(ConversationTurn::user(text));
        }
        match self {
            Self::Placeholder(marker) => Some(ConversationTurn::user(marker.as_str())),
            Self::Skip => None,
        }
    }
}

impl Default for EmptyTurnPolicy {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

/// Append-only conversation log. Updates return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// A copy of this history followed by the user turn (subject to `policy`) and the reply.
    pub fn with_exchange(&self, user_text: &str, reply: &str, policy: &EmptyTurnPolicy) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 2);
        turns.extend_from_slice(&self.turns);
        turns.extend(policy.user_turn(user_text));
        turns.push(ConversationTurn::assistant(reply));
        Self { turns }
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(turns: Vec<ConversationTurn>) -> Self {
        Self { turns }
    }
}
