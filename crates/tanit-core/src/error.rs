use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("failed to build engine config: {0}")]
    EngineConfig(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum AsrError {
    #[error("ASR initialization failed: {0}")]
    InitializationFailed(String),

    #[error("ASR processing failed: {0}")]
    ProcessingFailed(String),

    #[error("ASR engine not found: {0}")]
    EngineNotFound(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transcription failed: {0}")]
    Transcription(#[from] AsrError),

    #[error("{kind} analysis failed: {message}")]
    Analysis { kind: String, message: String },

    #[error("context retrieval failed: {0}")]
    Retrieval(String),

    #[error("response generation failed: {0}")]
    Generation(String),

    #[error("backend not found: {0}")]
    BackendNotFound(String),
}
