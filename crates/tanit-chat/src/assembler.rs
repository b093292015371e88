pub const VOICE_LABEL: &str = "Voice";
pub const IMAGE_LABEL: &str = "Image";
pub const PDF_LABEL: &str = "PDF";
pub const CONTEXT_SEPARATOR: &str = " | ";
pub const TRANSCRIPTION_MARKER: &str = "[+ Voice transcription]";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssembledInput {
    /// Typed text, plus the transcription block when there was speech.
    pub augmented_text: String,
    /// Labeled non-text summaries joined with [`CONTEXT_SEPARATOR`].
    pub extra_context: String,
    /// Typed text and raw transcription, without any of our own markers.
    pub retrieval_query: String,
}

/// Merge one interaction's inputs into the user message and the extra-context line.
pub fn assemble(
    user_text: &str,
    transcribed: &str,
    image_summary: &str,
    pdf_summary: &str,
) -> AssembledInput {
    let extra_context = [
        (VOICE_LABEL, transcribed),
        (IMAGE_LABEL, image_summary),
        (PDF_LABEL, pdf_summary),
    ]
    .iter()
    .filter(|(_, summary)| !summary.is_empty())
    .map(|(label, summary)| format!("{label}: {summary}"))
    .collect::<Vec<_>>()
    .join(CONTEXT_SEPARATOR);

    let mut augmented_text = user_text.to_string();
    if !transcribed.is_empty() {
        augmented_text.push_str(&format!("\n\n{TRANSCRIPTION_MARKER}: {transcribed}"));
    }

    let retrieval_query = [user_text.trim(), transcribed.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    AssembledInput {
        augmented_text,
        extra_context,
        retrieval_query,
    }
}
