use crate::retrieval::Retriever;
use async_trait::async_trait;
use tanit_core::ChatError;

pub const DISCLAIMER: &str = "⚕️ *I am an educational fertility assistant and I do not replace a doctor.*\n\
For any medical decision or treatment, always consult a healthcare professional.\n\n";

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    fn name(&self) -> &str;
    /// `question` is the user message as stored in history; `query` is what
    /// reference lookups should match against.
    async fn generate(
        &self,
        question: &str,
        query: &str,
        extra_context: &str,
    ) -> Result<String, ChatError>;
}

/// Simulated answer: disclaimer, echoed inputs and the retrieved paragraph.
pub struct CannedResponder {
    retriever: Box<dyn Retriever>,
}

impl CannedResponder {
    pub fn new(retriever: Box<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl ResponseGenerator for CannedResponder {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(
        &self,
        question: &str,
        query: &str,
        extra_context: &str,
    ) -> Result<String, ChatError> {
        let reference = self.retriever.retrieve(query).await?;
        let question = if question.is_empty() { "[empty]" } else { question };
        let extra_context = if extra_context.is_empty() {
            "[none]"
        } else {
            extra_context
        };

        Ok(format!(
            "{DISCLAIMER}Thank you for your question. Here is a simulated answer \
             (the retrieval and language-model back-end is not connected yet):\n\n\
             **Your question:** {question}\n\n\
             **Context received (audio/image/PDF):** {extra_context}\n\n\
             **Reference:** {reference}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::KeywordRetriever;

    fn responder() -> CannedResponder {
        CannedResponder::new(Box::new(KeywordRetriever::new()))
    }

    #[tokio::test]
    async fn test_reply_starts_with_disclaimer() {
        let reply = responder().generate("hello", "hello", "").await.unwrap();
        assert!(reply.starts_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn test_reply_echoes_question_and_context() {
        let reply = responder()
            .generate("Is my AMH low?", "Is my AMH low?", "Image: scan")
            .await
            .unwrap();
        assert!(reply.contains("**Your question:** Is my AMH low?"));
        assert!(reply.contains("**Context received (audio/image/PDF):** Image: scan"));
        assert!(reply.contains("ovarian reserve"));
    }

    #[tokio::test]
    async fn test_reply_marks_empty_inputs() {
        let reply = responder().generate("", "", "").await.unwrap();
        assert!(reply.contains("**Your question:** [empty]"));
        assert!(reply.contains("**Context received (audio/image/PDF):** [none]"));
    }

    #[tokio::test]
    async fn test_reference_follows_query_not_question() {
        let reply = responder()
            .generate("\n\n[+ Voice transcription]: hello doctor", "hello doctor", "")
            .await
            .unwrap();
        assert!(reply.contains("**Your question:** \n\n[+ Voice transcription]: hello doctor"));
        assert!(reply.contains("results are always interpreted as a whole"));
        assert!(!reply.contains("Age is a major"));
    }
}
