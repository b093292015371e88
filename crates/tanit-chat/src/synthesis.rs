use async_trait::async_trait;
use std::path::PathBuf;
use tanit_core::ChatError;

/// Text-to-speech for assistant replies. Returns the path of the rendered audio, if any.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;
    async fn synthesize(&self, text: &str, language: &str) -> Result<Option<PathBuf>, ChatError>;
}

/// Produces no audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSynthesizer;

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    fn name(&self) -> &str {
        "silent"
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Option<PathBuf>, ChatError> {
        if !text.trim().is_empty() {
            tracing::trace!(language, chars = text.len(), "speech synthesis skipped");
        }
        Ok(None)
    }
}

pub fn build_synthesizer(backend: &str) -> Result<Box<dyn SpeechSynthesizer>, ChatError> {
    match backend {
        "silent" => Ok(Box::new(SilentSynthesizer)),
        other => Err(ChatError::BackendNotFound(format!("speech synthesis '{other}'"))),
    }
}
