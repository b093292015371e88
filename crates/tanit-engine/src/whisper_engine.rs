use crate::audio;
use crate::engine_trait::SpeechEngine;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tanit_core::{AsrError, DecodeOptions, DecodeOutput};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// whisper.cpp backend. Load a quantized ggml model (e.g. `q8_0`) for
/// reduced-precision CPU inference.
pub struct WhisperEngine {
    ctx: Option<Arc<WhisperContext>>,
    threads: Option<i32>,
}

impl WhisperEngine {
    pub fn new() -> Self {
        Self {
            ctx: None,
            threads: None,
        }
    }
}

impl Default for WhisperEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn processing(err: impl std::fmt::Display) -> AsrError {
    AsrError::ProcessingFailed(err.to_string())
}

fn run_full(
    ctx: &WhisperContext,
    path: &Path,
    options: &DecodeOptions,
    threads: Option<i32>,
) -> Result<DecodeOutput, AsrError> {
    let samples = audio::load_for_recognition(path)?;

    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: options.beam_size as i32,
        patience: -1.0,
    });
    params.set_language(Some(options.language.as_deref().unwrap_or("auto")));
    if let Some(n) = threads {
        params.set_n_threads(n);
    }
    params.set_translate(false);
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let mut state = ctx.create_state().map_err(processing)?;
    state.full(params, &samples).map_err(processing)?;

    let lang_id = state.full_lang_id_from_state().map_err(processing)?;
    let detected_language = whisper_rs::get_lang_str(lang_id)
        .unwrap_or("und")
        .to_string();

    let num_segments = state.full_n_segments().map_err(processing)?;
    let segments = (0..num_segments)
        .map(|i| state.full_get_segment_text(i).map_err(processing))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodeOutput {
        segments,
        detected_language,
    })
}

#[async_trait]
impl SpeechEngine for WhisperEngine {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), AsrError> {
        let model_path = config
            .get("model_path")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .ok_or_else(|| {
                AsrError::InitializationFailed("missing 'model_path' in whisper config".to_string())
            })?;
        if !model_path.exists() {
            return Err(AsrError::InitializationFailed(format!(
                "whisper model not found at {}",
                model_path.display()
            )));
        }
        let use_gpu = config
            .get("use_gpu")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        self.threads = config
            .get("threads")
            .and_then(|v| v.as_integer())
            .map(|n| n as i32);

        tracing::info!(
            model_path = %model_path.display(),
            use_gpu,
            threads = ?self.threads,
            "loading whisper model"
        );

        let ctx = tokio::task::spawn_blocking(move || {
            let mut params = WhisperContextParameters::default();
            params.use_gpu(use_gpu);
            WhisperContext::new_with_params(&model_path.to_string_lossy(), params)
        })
        .await
        .map_err(|e| AsrError::InitializationFailed(e.to_string()))?
        .map_err(|e| AsrError::InitializationFailed(format!("failed to load whisper model: {e}")))?;

        self.ctx = Some(Arc::new(ctx));
        Ok(())
    }

    async fn decode(&self, path: &Path, options: &DecodeOptions) -> Result<DecodeOutput, AsrError> {
        let ctx = self
            .ctx
            .clone()
            .ok_or_else(|| AsrError::ProcessingFailed("whisper model not loaded".to_string()))?;
        let path = path.to_path_buf();
        let options = options.clone();
        let threads = self.threads;

        // Each call builds its own decoding state; the context itself is shared read-only.
        tokio::task::spawn_blocking(move || run_full(&ctx, &path, &options, threads))
            .await
            .map_err(processing)?
    }

    async fn shutdown(&self) -> Result<(), AsrError> {
        Ok(())
    }
}
