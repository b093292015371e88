use async_trait::async_trait;
use std::path::Path;
use tanit_core::{AsrError, DecodeOptions, DecodeOutput};

/// A speech-recognition backend that decodes whole audio files.
///
/// Engines are created through [`EngineRegistry`](crate::EngineRegistry) and
/// configured once with [`initialize`](Self::initialize); after that the
/// handle is shared and only [`decode`](Self::decode) is called.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Registry name of the engine (e.g. `"null"`, `"whisper"`).
    fn name(&self) -> &str;
    /// Load the model described by the engine-specific TOML table.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError>;
    /// Run one decoding pass over the audio file at `path`.
    async fn decode(&self, path: &Path, options: &DecodeOptions) -> Result<DecodeOutput, AsrError>;
    async fn shutdown(&self) -> Result<(), AsrError>;
}
