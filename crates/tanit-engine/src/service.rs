use crate::engine_trait::SpeechEngine;
use crate::registry::EngineRegistry;
use std::path::Path;
use tanit_core::config::TranscriptionConfig;
use tanit_core::{AsrError, DecodeOptions, TranscriptionResult};
use tokio::sync::OnceCell;

/// When to trust the auto-detected pass and which language to force otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePolicy {
    pub whitelist: Vec<String>,
    pub fallback_language: String,
    pub beam_size: u32,
}

impl LanguagePolicy {
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        Self {
            whitelist: config.whitelist.clone(),
            fallback_language: config.fallback_language.clone(),
            beam_size: config.beam_size,
        }
    }

    pub fn is_trusted(&self, language: &str) -> bool {
        self.whitelist
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(language))
    }

    fn auto_options(&self) -> DecodeOptions {
        DecodeOptions {
            language: None,
            beam_size: self.beam_size,
        }
    }

    fn forced_options(&self) -> DecodeOptions {
        DecodeOptions {
            language: Some(self.fallback_language.clone()),
            beam_size: self.beam_size,
        }
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::from_config(&TranscriptionConfig::default())
    }
}

/// Owns the speech engine and applies the two-pass language policy.
///
/// Build one per process and share it (`Arc<TranscriptionService>`). The
/// engine is created on the first transcription that actually has audio and
/// is kept until the service is dropped.
pub struct TranscriptionService {
    engine_name: String,
    engine_config: toml::Value,
    registry: EngineRegistry,
    policy: LanguagePolicy,
    engine: OnceCell<Box<dyn SpeechEngine>>,
}

impl TranscriptionService {
    /// Fails fast when `engine_name` is not in `registry`; the model itself loads lazily.
    pub fn new(
        engine_name: &str,
        engine_config: toml::Value,
        registry: EngineRegistry,
        policy: LanguagePolicy,
    ) -> Result<Self, AsrError> {
        if !registry.contains(engine_name) {
            return Err(AsrError::EngineNotFound(engine_name.to_string()));
        }
        Ok(Self {
            engine_name: engine_name.to_string(),
            engine_config,
            registry,
            policy,
            engine: OnceCell::new(),
        })
    }

    pub fn from_config(config: &TranscriptionConfig) -> Result<Self, AsrError> {
        let engine_config = config
            .engine_config()
            .map_err(|e| AsrError::InitializationFailed(e.to_string()))?;
        Self::new(
            &config.engine,
            engine_config,
            EngineRegistry::new(),
            LanguagePolicy::from_config(config),
        )
    }

    /// Wrap an engine that is already initialized.
    pub fn with_engine(engine: Box<dyn SpeechEngine>, policy: LanguagePolicy) -> Self {
        Self {
            engine_name: engine.name().to_string(),
            engine_config: toml::Value::Table(Default::default()),
            registry: EngineRegistry::new(),
            policy,
            engine: OnceCell::new_with(Some(engine)),
        }
    }

    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    pub fn policy(&self) -> &LanguagePolicy {
        &self.policy
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.initialized()
    }

    async fn engine(&self) -> Result<&dyn SpeechEngine, AsrError> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                let mut engine = self.registry.create(&self.engine_name)?;
                engine.initialize(self.engine_config.clone()).await?;
                tracing::info!(engine = %self.engine_name, "speech engine loaded");
                Ok::<_, AsrError>(engine)
            })
            .await?;
        Ok(engine.as_ref())
    }

    /// Transcribe `audio`, or return an empty string when there is none.
    pub async fn transcribe(&self, audio: Option<&Path>) -> Result<String, AsrError> {
        Ok(self
            .transcribe_detailed(audio)
            .await?
            .map(|result| result.text)
            .unwrap_or_default())
    }

    pub async fn transcribe_detailed(
        &self,
        audio: Option<&Path>,
    ) -> Result<Option<TranscriptionResult>, AsrError> {
        let Some(path) = audio else {
            return Ok(None);
        };
        let engine = self.engine().await?;

        let first = engine.decode(path, &self.policy.auto_options()).await?;
        if self.policy.is_trusted(&first.detected_language) {
            tracing::debug!(
                detected_language = %first.detected_language,
                "first pass trusted"
            );
            return Ok(Some(TranscriptionResult {
                text: first.text(),
                detected_language: first.detected_language,
                forced_language: None,
            }));
        }

        tracing::info!(
            detected_language = %first.detected_language,
            fallback = %self.policy.fallback_language,
            "detected language outside whitelist, re-decoding with forced language"
        );
        let second = engine.decode(path, &self.policy.forced_options()).await?;
        Ok(Some(TranscriptionResult {
            text: second.text(),
            detected_language: first.detected_language,
            forced_language: Some(self.policy.fallback_language.clone()),
        }))
    }

    pub async fn shutdown(&self) -> Result<(), AsrError> {
        match self.engine.get() {
            Some(engine) => engine.shutdown().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullEngine;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tanit_core::DecodeOutput;

    fn audio_fixture(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("tanit_service_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"fixture").unwrap();
        path
    }

    async fn scripted_service(config: &str) -> (TranscriptionService, Arc<AtomicUsize>) {
        let mut engine = NullEngine::new();
        engine
            .initialize(toml::from_str(config).unwrap())
            .await
            .unwrap();
        let passes = engine.pass_counter();
        (
            TranscriptionService::with_engine(Box::new(engine), LanguagePolicy::default()),
            passes,
        )
    }

    /// Records the options of every pass it runs.
    struct RecordingEngine {
        calls: Arc<std::sync::Mutex<Vec<DecodeOptions>>>,
        detected: &'static str,
    }

    #[async_trait]
    impl SpeechEngine for RecordingEngine {
        fn name(&self) -> &str {
            "recording"
        }

        async fn initialize(&mut self, _config: toml::Value) -> Result<(), AsrError> {
            Ok(())
        }

        async fn decode(
            &self,
            _path: &Path,
            options: &DecodeOptions,
        ) -> Result<DecodeOutput, AsrError> {
            self.calls.lock().unwrap().push(options.clone());
            Ok(DecodeOutput {
                segments: vec!["x".into()],
                detected_language: self.detected.into(),
            })
        }

        async fn shutdown(&self) -> Result<(), AsrError> {
            Ok(())
        }
    }

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    struct CountingLoadEngine;

    #[async_trait]
    impl SpeechEngine for CountingLoadEngine {
        fn name(&self) -> &str {
            "counting"
        }

        async fn initialize(&mut self, _config: toml::Value) -> Result<(), AsrError> {
            LOADS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn decode(
            &self,
            _path: &Path,
            _options: &DecodeOptions,
        ) -> Result<DecodeOutput, AsrError> {
            Ok(DecodeOutput {
                segments: vec![" hello".into()],
                detected_language: "en".into(),
            })
        }

        async fn shutdown(&self) -> Result<(), AsrError> {
            Ok(())
        }
    }

    #[test]
    fn test_policy_is_trusted_case_insensitive() {
        let policy = LanguagePolicy::default();
        assert!(policy.is_trusted("fr"));
        assert!(policy.is_trusted("EN"));
        assert!(!policy.is_trusted("es"));
        assert!(!policy.is_trusted(""));
    }

    #[test]
    fn test_new_unknown_engine_fails() {
        let result = TranscriptionService::new(
            "nope",
            toml::Value::Table(Default::default()),
            EngineRegistry::new(),
            LanguagePolicy::default(),
        );
        assert!(matches!(result, Err(AsrError::EngineNotFound(name)) if name == "nope"));
    }

    #[tokio::test]
    async fn test_transcribe_none_returns_empty_without_loading() {
        let service = TranscriptionService::new(
            "null",
            toml::Value::Table(Default::default()),
            EngineRegistry::new(),
            LanguagePolicy::default(),
        )
        .unwrap();
        assert_eq!(service.transcribe(None).await.unwrap(), "");
        assert!(service.transcribe_detailed(None).await.unwrap().is_none());
        assert!(!service.is_loaded());
    }

    #[tokio::test]
    async fn test_whitelisted_language_runs_single_pass() {
        let (service, passes) = scripted_service(
            r#"
segments = [" Bonjour,", " j'ai 38 ans. "]
forced_segments = [" wrong"]
detected_language = "fr"
"#,
        )
        .await;
        let path = audio_fixture("fr.wav");

        let result = service
            .transcribe_detailed(Some(&path))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.text, "Bonjour, j'ai 38 ans.");
        assert_eq!(result.detected_language, "fr");
        assert!(result.forced_language.is_none());
        assert_eq!(passes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_non_whitelisted_language_uses_second_pass_only() {
        let (service, passes) = scripted_service(
            r#"
segments = [" Tengo", " SOP"]
forced_segments = [" J'ai", " le SOPK"]
detected_language = "es"
"#,
        )
        .await;
        let path = audio_fixture("es.wav");

        let result = service
            .transcribe_detailed(Some(&path))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.text, "J'ai le SOPK");
        assert!(!result.text.contains("Tengo"));
        assert_eq!(result.detected_language, "es");
        assert_eq!(result.forced_language.as_deref(), Some("fr"));
        assert_eq!(passes.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_passes_use_auto_then_forced_options() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let engine = RecordingEngine {
            calls: Arc::clone(&calls),
            detected: "de",
        };
        let policy = LanguagePolicy {
            whitelist: vec!["en".into()],
            fallback_language: "en".into(),
            beam_size: 3,
        };
        let service = TranscriptionService::with_engine(Box::new(engine), policy);
        let path = audio_fixture("de.wav");

        service.transcribe(Some(&path)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                DecodeOptions {
                    language: None,
                    beam_size: 3
                },
                DecodeOptions {
                    language: Some("en".into()),
                    beam_size: 3
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_engine_loaded_exactly_once() {
        let mut registry = EngineRegistry::new();
        registry.register("counting", "counts model loads", || Box::new(CountingLoadEngine));
        let service = TranscriptionService::new(
            "counting",
            toml::Value::Table(Default::default()),
            registry,
            LanguagePolicy::default(),
        )
        .unwrap();
        let path = audio_fixture("once.wav");

        assert_eq!(LOADS.load(Ordering::SeqCst), 0);
        for _ in 0..3 {
            assert_eq!(service.transcribe(Some(&path)).await.unwrap(), "hello");
        }
        assert!(service.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_propagates() {
        let (service, passes) = scripted_service("detected_language = \"fr\"").await;
        let result = service
            .transcribe(Some(Path::new("/nonexistent/voice.wav")))
            .await;
        assert!(matches!(result, Err(AsrError::ProcessingFailed(_))));
        assert_eq!(passes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_initialization_failure_propagates() {
        let service = TranscriptionService::new(
            "null",
            toml::from_str("segments = \"not a list\"").unwrap(),
            EngineRegistry::new(),
            LanguagePolicy::default(),
        )
        .unwrap();
        let path = audio_fixture("init.wav");
        let result = service.transcribe(Some(&path)).await;
        assert!(matches!(result, Err(AsrError::InitializationFailed(_))));
        assert!(!service.is_loaded());
    }

    #[tokio::test]
    async fn test_shutdown_without_engine_is_ok() {
        let service = TranscriptionService::from_config(&TranscriptionConfig {
            engine: "null".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(service.shutdown().await.is_ok());
    }

    #[test]
    fn test_service_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TranscriptionService>();
    }
}
