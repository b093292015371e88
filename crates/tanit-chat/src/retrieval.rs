use async_trait::async_trait;
use tanit_core::ChatError;

/// Source of background context for a user question.
///
/// The keyword table below is the only implementation today; an indexed
/// retriever can replace it without touching callers.
#[async_trait]
pub trait Retriever: Send + Sync {
    fn name(&self) -> &str;
    async fn retrieve(&self, question: &str) -> Result<String, ChatError>;
}

struct Topic {
    keywords: &'static [&'static str],
    paragraph: &'static str,
}

const TOPICS: &[Topic] = &[
    Topic {
        keywords: &["amh", "réserve", "reserve", "ovaire", "ovarienne", "ovarian"],
        paragraph: "Context (simulated): AMH is a marker of ovarian reserve. A low value \
                    suggests a more limited egg supply, but on its own it does not predict \
                    the ability to conceive. Medical guidelines stress interpreting it together \
                    with age, cycle history and other hormones.",
    },
    Topic {
        keywords: &["pcos", "sopk"],
        paragraph: "Context (simulated): PCOS is a common syndrome associated with irregular \
                    cycles, sometimes insulin resistance, and a higher number of follicles \
                    visible on ultrasound. Fertility can be affected, but many patients conceive \
                    with appropriate follow-up and lifestyle or treatment adjustments.",
    },
    Topic {
        keywords: &["âge", "age", "ans", "years"],
        paragraph: "Context (simulated): Age is a major fertility factor. Ovarian reserve and \
                    egg quality decline on average after 35, but individual variation is large. \
                    Medical decisions rely on the whole clinical profile.",
    },
];

const FALLBACK_PARAGRAPH: &str = "Context (simulated): In fertility care, results are always \
    interpreted as a whole (age, history, hormones, ultrasounds, symptoms). No single number is \
    enough to draw a conclusion. Guidelines encourage a personalised discussion with a specialist.";

/// Picks a fixed paragraph by substring match on the lower-cased question.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRetriever;

impl KeywordRetriever {
    pub fn new() -> Self {
        Self
    }

    /// Topics are checked in order; the first one with a matching keyword wins.
    pub fn lookup(&self, question: &str) -> &'static str {
        let question = question.to_lowercase();
        TOPICS
            .iter()
            .find(|topic| topic.keywords.iter().any(|kw| question.contains(kw)))
            .map(|topic| topic.paragraph)
            .unwrap_or(FALLBACK_PARAGRAPH)
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn retrieve(&self, question: &str) -> Result<String, ChatError> {
        Ok(self.lookup(question).to_string())
    }
}

pub fn build_retriever(backend: &str) -> Result<Box<dyn Retriever>, ChatError> {
    match backend {
        "keyword" => Ok(Box::new(KeywordRetriever::new())),
        other => Err(ChatError::BackendNotFound(format!("retrieval '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ovarian_reserve_terms() {
        let retriever = KeywordRetriever::new();
        assert!(retriever.lookup("My AMH came back at 0.9").contains("ovarian reserve"));
        assert!(retriever
            .lookup("Ma réserve ovarienne est faible")
            .contains("ovarian reserve"));
    }

    #[test]
    fn test_pcos_terms() {
        let retriever = KeywordRetriever::new();
        assert!(retriever.lookup("Do I have PCOS?").contains("PCOS"));
        assert!(retriever.lookup("diagnostic de SOPK").contains("PCOS"));
    }

    #[test]
    fn test_age_terms() {
        let retriever = KeywordRetriever::new();
        assert!(retriever.lookup("I am 38 years old").contains("Age is a major"));
        assert!(retriever.lookup("J'ai 38 ans").contains("Age is a major"));
    }

    #[test]
    fn test_reserve_wins_over_age() {
        let retriever = KeywordRetriever::new();
        let paragraph = retriever.lookup("AMH at 40 years");
        assert!(paragraph.contains("ovarian reserve"));
    }

    #[test]
    fn test_fallback_paragraph() {
        let retriever = KeywordRetriever::new();
        assert_eq!(retriever.lookup("hello"), FALLBACK_PARAGRAPH);
        assert_eq!(retriever.lookup(""), FALLBACK_PARAGRAPH);
    }

    #[tokio::test]
    async fn test_retrieve_matches_lookup() {
        let retriever = KeywordRetriever::new();
        let text = retriever.retrieve("sopk").await.unwrap();
        assert_eq!(text, retriever.lookup("sopk"));
    }

    #[test]
    fn test_build_retriever() {
        assert_eq!(build_retriever("keyword").unwrap().name(), "keyword");
        match build_retriever("faiss") {
            Err(ChatError::BackendNotFound(msg)) => assert!(msg.contains("faiss")),
            _ => panic!("expected BackendNotFound"),
        }
    }
}
