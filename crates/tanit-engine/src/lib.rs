pub mod audio;
pub mod engine_trait;
pub mod null_engine;
pub mod registry;
pub mod service;
#[cfg(feature = "whisper")]
pub mod whisper_engine;

pub use engine_trait::SpeechEngine;
pub use null_engine::NullEngine;
pub use registry::EngineRegistry;
pub use service::{LanguagePolicy, TranscriptionService};
#[cfg(feature = "whisper")]
pub use whisper_engine::WhisperEngine;
