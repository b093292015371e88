use async_trait::async_trait;
use std::path::Path;
use tanit_core::ChatError;

/// Turns an optional uploaded file into a short textual summary.
#[async_trait]
pub trait MediaAnalyzer: Send + Sync {
    fn name(&self) -> &str;
    /// Returns an empty string when `path` is `None`.
    async fn analyze(&self, path: Option<&Path>, question: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Pdf => "pdf",
        }
    }
}

/// Stands in for a vision-language model: a fixed summary per media kind.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderAnalyzer {
    kind: MediaKind,
}

impl PlaceholderAnalyzer {
    pub fn new(kind: MediaKind) -> Self {
        Self { kind }
    }

    pub fn summary(&self) -> &'static str {
        match self.kind {
            MediaKind::Image => "[Simulated summary of the medical image]",
            MediaKind::Pdf => "[Simulated summary of the medical PDF]",
        }
    }
}

#[async_trait]
impl MediaAnalyzer for PlaceholderAnalyzer {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn analyze(&self, path: Option<&Path>, _question: &str) -> Result<String, ChatError> {
        let Some(path) = path else {
            return Ok(String::new());
        };
        tracing::debug!(kind = self.kind.as_str(), "placeholder analysis of {:?}", path);
        Ok(self.summary().to_string())
    }
}

pub fn build_analyzer(kind: MediaKind, backend: &str) -> Result<Box<dyn MediaAnalyzer>, ChatError> {
    match backend {
        "placeholder" => Ok(Box::new(PlaceholderAnalyzer::new(kind))),
        other => Err(ChatError::BackendNotFound(format!(
            "{} analysis '{other}'",
            kind.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_file_yields_empty_summary() {
        for kind in [MediaKind::Image, MediaKind::Pdf] {
            let analyzer = PlaceholderAnalyzer::new(kind);
            assert_eq!(analyzer.analyze(None, "question").await.unwrap(), "");
        }
    }

    #[tokio::test]
    async fn test_image_placeholder() {
        let analyzer = PlaceholderAnalyzer::new(MediaKind::Image);
        let summary = analyzer
            .analyze(Some(Path::new("/uploads/ultrasound.png")), "what do you see?")
            .await
            .unwrap();
        assert_eq!(summary, "[Simulated summary of the medical image]");
    }

    #[tokio::test]
    async fn test_pdf_placeholder() {
        let analyzer = PlaceholderAnalyzer::new(MediaKind::Pdf);
        let summary = analyzer
            .analyze(Some(Path::new("/uploads/bloodwork.pdf")), "")
            .await
            .unwrap();
        assert_eq!(summary, "[Simulated summary of the medical PDF]");
    }

    #[test]
    fn test_build_analyzer_unknown_backend() {
        match build_analyzer(MediaKind::Pdf, "qwen-vl") {
            Err(ChatError::BackendNotFound(msg)) => {
                assert!(msg.contains("pdf"));
                assert!(msg.contains("qwen-vl"));
            }
            _ => panic!("expected BackendNotFound"),
        }
    }

    #[test]
    fn test_build_analyzer_placeholder() {
        let analyzer = build_analyzer(MediaKind::Image, "placeholder").unwrap();
        assert_eq!(analyzer.name(), "placeholder");
    }
}
