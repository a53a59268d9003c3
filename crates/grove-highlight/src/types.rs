//! Error types shared by the engine seam and the dispatcher.

/// Error reported by a highlighting engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    /// The engine has no grammar for the requested language.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The engine already knows a language by this name.
    #[error("language already registered: {0}")]
    AlreadyRegistered(String),

    /// The grammar could not be converted into the engine's format.
    #[error("invalid grammar definition for {language}: {message}")]
    InvalidDefinition { language: String, message: String },

    /// The engine itself failed (e.g. a JS exception).
    #[error("highlighting engine failed: {0}")]
    Engine(String),
}
