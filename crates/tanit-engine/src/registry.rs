use crate::engine_trait::SpeechEngine;
use std::collections::BTreeMap;
use tanit_core::AsrError;

type EngineFactory = fn() -> Box<dyn SpeechEngine>;

struct EngineEntry {
    factory: EngineFactory,
    description: &'static str,
}

/// Speech engines this build can construct, keyed by the name used in
/// `[transcription] engine`.
pub struct EngineRegistry {
    entries: BTreeMap<String, EngineEntry>,
}

impl EngineRegistry {
    /// Registry with every engine compiled into this build.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("null", "scripted segments, no model (tests, dry runs)", || {
            Box::new(crate::null_engine::NullEngine::new())
        });
        #[cfg(feature = "whisper")]
        registry.register("whisper", "whisper.cpp via whisper-rs", || {
            Box::new(crate::whisper_engine::WhisperEngine::new())
        });
        registry
    }

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registering an existing name replaces its entry.
    pub fn register(&mut self, name: &str, description: &'static str, factory: EngineFactory) {
        self.entries.insert(
            name.to_string(),
            EngineEntry {
                factory,
                description,
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn SpeechEngine>, AsrError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| AsrError::EngineNotFound(name.to_string()))?;
        tracing::debug!(engine = name, "constructing speech engine");
        Ok((entry.factory)())
    }

    pub fn describe(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|entry| entry.description)
    }

    /// Engine names in lexical order.
    pub fn list_engines(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
