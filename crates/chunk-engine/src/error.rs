use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Fatal errors that abort chunking of a whole file
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// The tree is absent or carries syntax errors
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Offsets of a node do not fit the source text
    #[error("Span resolution error: bytes {start}..{end} outside source of length {len}")]
    SpanResolution { start: usize, end: usize, len: usize },

    /// Unsupported language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Chunk serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

impl ChunkerError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }

    /// Create a span resolution error for a byte range
    pub const fn span(start: usize, end: usize, len: usize) -> Self {
        Self::SpanResolution { start, end, len }
    }
}

/// Recoverable problems recorded while walking a file.
///
/// A warning drops one definition (and whatever it contains) from the output
/// but never the rest of the file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkWarning {
    /// A definition's offsets were inconsistent with the source text
    #[error("line {line}: skipped `{name}`: {detail}")]
    SpanResolution {
        line: usize,
        name: String,
        detail: String,
    },

    /// A definition-like node the classifier does not know
    #[error("line {line}: unsupported construct `{kind}`")]
    UnsupportedConstruct { line: usize, kind: String },
}

impl ChunkWarning {
    /// 1-based line the warning refers to
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::SpanResolution { line, .. } | Self::UnsupportedConstruct { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_error_message() {
        let err = ChunkerError::span(10, 40, 20);
        assert_eq!(
            err.to_string(),
            "Span resolution error: bytes 10..40 outside source of length 20"
        );
    }

    #[test]
    fn test_warning_line() {
        let warning = ChunkWarning::UnsupportedConstruct {
            line: 7,
            kind: "struct_definition".to_string(),
        };
        assert_eq!(warning.line(), 7);
        assert!(warning.to_string().contains("struct_definition"));
    }
}
