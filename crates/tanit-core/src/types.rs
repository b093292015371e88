use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One role-tagged message. Fields are private so a turn cannot change once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    role: Role,
    content: String,
}

impl ConversationTurn {
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

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    pub text: String,
    /// Language reported by the auto-detect pass.
    pub detected_language: String,
    /// Set when the detected language was outside the whitelist and a forced pass ran.
    pub forced_language: Option<String>,
}

/// Options for a single decoding pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// `None` asks the engine to detect the language itself.
    pub language: Option<String>,
    pub beam_size: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            language: None,
            beam_size: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeOutput {
    /// Text segments in emission order.
    pub segments: Vec<String>,
    pub detected_language: String,
}

impl DecodeOutput {
    /// Segments concatenated without separator, then trimmed.
    pub fn text(&self) -> String {
        self.segments.concat().trim().to_string()
    }
}

/// Raw inputs of one user interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnInput {
    pub text: Option<String>,
    pub audio: Option<PathBuf>,
    pub image: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Which input slots the front-end should clear after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResets {
    pub text: bool,
    pub audio: bool,
    pub image: bool,
    pub pdf: bool,
}

impl InputResets {
    pub fn all() -> Self {
        Self {
            text: true,
            audio: true,
            image: true,
            pdf: true,
        }
    }
}
