use crate::error::{ChunkerError, Result};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Source language recognised by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Unknown,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "py" | "pyw" | "pyi" => Language::Python,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Unknown => "unknown",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
            Language::Unknown => Err(ChunkerError::unsupported_language(self.as_str())),
        }
    }

    /// Build a parser for this language
    pub fn parser(self) -> Result<Parser> {
        let ts_language = self.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(parser)
    }

    /// Parse source into a syntax tree.
    ///
    /// Trees containing syntax errors are rejected: the engine only walks
    /// well-formed input.
    pub fn parse(self, source: &str) -> Result<Tree> {
        let mut parser = self.parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ChunkerError::parse("Failed to parse source code"))?;

        if tree.root_node().has_error() {
            return Err(ChunkerError::parse(format!(
                "{} source contains syntax errors",
                self.as_str()
            )));
        }

        Ok(tree)
    }
}
