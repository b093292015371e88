pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, EmptyTurnMode, SpeechConfig};
pub use error::{AsrError, ChatError, ConfigError};
pub use types::{
    ConversationTurn, DecodeOptions, DecodeOutput, InputResets, Role, TranscriptionResult,
    TurnInput,
};
