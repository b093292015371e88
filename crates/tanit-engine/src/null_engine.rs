use crate::engine_trait::SpeechEngine;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tanit_core::{AsrError, DecodeOptions, DecodeOutput};

/// Engine that returns scripted segments instead of running a model.
///
/// Recognised config keys: `segments`, `detected_language` (default `"und"`)
/// and `forced_segments`, returned when a language is forced (defaults to
/// `segments`). The audio file must exist but is never read.
pub struct NullEngine {
    segments: Vec<String>,
    forced_segments: Option<Vec<String>>,
    detected_language: String,
    pass_count: Arc<AtomicUsize>,
}

impl NullEngine {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            forced_segments: None,
            detected_language: "und".to_string(),
            pass_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn pass_count(&self) -> usize {
        self.pass_count.load(Ordering::Relaxed)
    }

    /// Shared counter, still readable after the engine is boxed into a service.
    pub fn pass_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pass_count)
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn string_list(config: &toml::Value, key: &str) -> Result<Option<Vec<String>>, AsrError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    let items = value.as_array().ok_or_else(|| {
        AsrError::InitializationFailed(format!("'{key}' must be an array of strings"))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                AsrError::InitializationFailed(format!("'{key}' must be an array of strings"))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[async_trait]
impl SpeechEngine for NullEngine {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError> {
        if let Some(segments) = string_list(&config, "segments")? {
            self.segments = segments;
        }
        self.forced_segments = string_list(&config, "forced_segments")?;
        if let Some(lang) = config.get("detected_language").and_then(|v| v.as_str()) {
            self.detected_language = lang.to_string();
        }
        tracing::debug!(
            segments = self.segments.len(),
            detected_language = %self.detected_language,
            "NullEngine initialized"
        );
        Ok(())
    }

    async fn decode(&self, path: &Path, options: &DecodeOptions) -> Result<DecodeOutput, AsrError> {
        if !path.exists() {
            return Err(AsrError::ProcessingFailed(format!(
                "audio file not found: {}",
                path.display()
            )));
        }
        let pass = self.pass_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!("NullEngine pass #{pass} over {:?}", path);

        let output = match options.language {
            Some(ref forced) => DecodeOutput {
                segments: self
                    .forced_segments
                    .clone()
                    .unwrap_or_else(|| self.segments.clone()),
                detected_language: forced.clone(),
            },
            None => DecodeOutput {
                segments: self.segments.clone(),
                detected_language: self.detected_language.clone(),
            },
        };
        Ok(output)
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}
