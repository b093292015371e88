use crate::analysis::{build_analyzer, MediaAnalyzer, MediaKind};
use crate::assembler::assemble;
use crate::history::{ConversationHistory, EmptyTurnPolicy};
use crate::responder::{CannedResponder, ResponseGenerator};
use crate::retrieval::build_retriever;
use crate::synthesis::{build_synthesizer, SilentSynthesizer, SpeechSynthesizer};
use std::path::PathBuf;
use std::sync::Arc;
use tanit_core::{AppConfig, ChatError, InputResets, TurnInput};
use tanit_engine::TranscriptionService;

/// Result of one interaction: the new history plus what the front-end should reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub history: ConversationHistory,
    pub resets: InputResets,
    pub reply_audio: Option<PathBuf>,
}

/// Handles chat turns end to end. Collaborators are fixed at construction.
pub struct ChatPipeline {
    transcription: Arc<TranscriptionService>,
    image: Box<dyn MediaAnalyzer>,
    pdf: Box<dyn MediaAnalyzer>,
    responder: Box<dyn ResponseGenerator>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    empty_turn: EmptyTurnPolicy,
}

impl ChatPipeline {
    pub fn new(
        transcription: Arc<TranscriptionService>,
        image: Box<dyn MediaAnalyzer>,
        pdf: Box<dyn MediaAnalyzer>,
        responder: Box<dyn ResponseGenerator>,
        empty_turn: EmptyTurnPolicy,
    ) -> Self {
        Self {
            transcription,
            image,
            pdf,
            responder,
            synthesizer: Box::new(SilentSynthesizer),
            empty_turn,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        transcription: Arc<TranscriptionService>,
    ) -> Result<Self, ChatError> {
        let image = build_analyzer(MediaKind::Image, &config.analysis.image)?;
        let pdf = build_analyzer(MediaKind::Pdf, &config.analysis.pdf)?;
        let retriever = build_retriever(&config.retrieval.backend)?;
        let synthesizer = build_synthesizer(&config.speech.synthesizer)?;
        tracing::info!(
            image = image.name(),
            pdf = pdf.name(),
            retrieval = retriever.name(),
            synthesizer = synthesizer.name(),
            empty_turn = ?config.chat.empty_turn,
            "chat pipeline configured"
        );
        Ok(Self::new(
            transcription,
            image,
            pdf,
            Box::new(CannedResponder::new(retriever)),
            EmptyTurnPolicy::from_config(&config.chat),
        )
        .with_synthesizer(synthesizer))
    }

    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn empty_turn_policy(&self) -> &EmptyTurnPolicy {
        &self.empty_turn
    }

    /// Run one turn. On error nothing is appended and `history` stays valid.
    pub async fn handle_turn(
        &self,
        history: &ConversationHistory,
        input: &TurnInput,
    ) -> Result<TurnOutcome, ChatError> {
        let question = input.text.as_deref().unwrap_or("");

        let transcribed = self.transcription.transcribe(input.audio.as_deref()).await?;
        let image_summary = self.image.analyze(input.image.as_deref(), question).await?;
        let pdf_summary = self.pdf.analyze(input.pdf.as_deref(), question).await?;

        let assembled = assemble(question, &transcribed, &image_summary, &pdf_summary);
        tracing::debug!(extra_context = %assembled.extra_context, "assembled turn");

        let reply = self
            .responder
            .generate(
                &assembled.augmented_text,
                &assembled.retrieval_query,
                &assembled.extra_context,
            )
            .await?;
        if reply.trim().is_empty() {
            return Err(ChatError::Generation(format!(
                "{} backend returned an empty reply",
                self.responder.name()
            )));
        }
        let reply_audio = self
            .synthesizer
            .synthesize(&reply, &self.transcription.policy().fallback_language)
            .await?;

        let history = history.with_exchange(&assembled.augmented_text, &reply, &self.empty_turn);
        tracing::info!(turns = history.len(), "turn handled");

        Ok(TurnOutcome {
            history,
            resets: InputResets::all(),
            reply_audio,
        })
    }

    pub fn clear() -> TurnOutcome {
        TurnOutcome {
            history: ConversationHistory::new(),
            resets: InputResets::all(),
            reply_audio: None,
        }
    }
}
