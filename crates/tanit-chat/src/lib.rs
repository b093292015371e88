pub mod analysis;
pub mod assembler;
pub mod history;
pub mod pipeline;
pub mod responder;
pub mod retrieval;
pub mod synthesis;

pub use analysis::{MediaAnalyzer, MediaKind, PlaceholderAnalyzer};
pub use assembler::{assemble, AssembledInput};
pub use history::{ConversationHistory, EmptyTurnPolicy};
pub use pipeline::{ChatPipeline, TurnOutcome};
pub use responder::{CannedResponder, ResponseGenerator};
pub use retrieval::{KeywordRetriever, Retriever};
pub use synthesis::{build_synthesizer, SilentSynthesizer, SpeechSynthesizer};
