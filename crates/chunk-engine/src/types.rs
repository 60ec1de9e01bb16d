use crate::error::{ChunkWarning, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A definition extracted from one source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Classification of the definition
    pub kind: ChunkKind,

    /// Own name of the definition
    pub name: String,

    /// Dot-joined ancestor path (e.g. "Calculator.add")
    pub qualified_name: String,

    /// Source range covered by the definition
    pub span: Span,

    /// Parameter list and return annotation; superclass list for classes
    pub signature: String,

    /// Normalized docstring if available
    pub docstring: Option<String>,

    /// Decorator expressions in source order, without the leading '@'
    pub decorators: Vec<String>,

    /// Kind of the immediately enclosing chunk
    pub parent_kind: Option<ChunkKind>,

    /// Base class expressions in declaration order
    pub bases: Vec<String>,

    /// Defined inside a routine body rather than a module or class body
    pub is_nested: bool,

    /// Body text with the docstring statement removed
    pub body: String,
}

impl Chunk {
    /// Whether any decorator is attached
    #[must_use]
    pub fn is_decorated(&self) -> bool {
        !self.decorators.is_empty()
    }

    /// Whether a docstring was found
    #[must_use]
    pub const fn has_docstring(&self) -> bool {
        self.docstring.is_some()
    }

    /// Number of enclosing definitions
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.kind == ChunkKind::Module {
            return 0;
        }
        self.qualified_name.matches('.').count()
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.span.line_count()
    }

    /// Slice the chunk's full text out of the source it was built from
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        self.span.text(source)
    }
}

/// Line and byte range of a chunk.
///
/// Lines are 1-indexed and inclusive; bytes are the half-open range
/// `start_byte..end_byte`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    /// Get the number of lines covered
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Check if span contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Check if `other` lies entirely within this span
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Check if the two byte ranges share no byte
    #[must_use]
    pub const fn is_disjoint(&self, other: &Self) -> bool {
        self.end_byte <= other.start_byte || other.end_byte <= self.start_byte
    }

    /// Slice the covered text
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start_byte..self.end_byte)
    }
}

/// Kind of definition a chunk represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub enum ChunkKind {
    /// Synthetic whole-file chunk
    Module,
    /// Class definition
    Class,
    /// Module-level or nested function
    Function,
    /// Plain function defined in a class body
    Method,
    /// `async def` with at least one suspension point
    AsyncFunction,
    /// Routine containing `yield`
    Generator,
    /// Property getter
    Property,
    /// Property setter or deleter
    PropertySetter,
    /// `@staticmethod`
    StaticMethod,
    /// `@classmethod`
    ClassMethod,
}

impl ChunkKind {
    /// Check if this kind is a callable routine (anything introduced by `def`)
    #[must_use]
    pub const fn is_routine(self) -> bool {
        !matches!(self, Self::Module | Self::Class)
    }

    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::AsyncFunction => "async_function",
            Self::Generator => "generator",
            Self::Property => "property",
            Self::PropertySetter => "property_setter",
            Self::StaticMethod => "static_method",
            Self::ClassMethod => "class_method",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of chunking one file: the chunks plus any recoverable warnings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub chunks: Vec<Chunk>,
    pub warnings: Vec<ChunkWarning>,
}

impl ChunkOutcome {
    /// True when no definition had to be dropped
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Find the chunks with a given qualified name, in emission order
    pub fn find<'a>(&'a self, qualified_name: &'a str) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.chunks
            .iter()
            .filter(move |chunk| chunk.qualified_name == qualified_name)
    }

    /// Render one JSON object per chunk, newline separated
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for chunk in &self.chunks {
            out.push_str(&serde_json::to_string(chunk)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Get statistics about the outcome
    #[must_use]
    pub fn stats(&self) -> ChunkingStats {
        let mut by_kind = BTreeMap::new();
        for chunk in &self.chunks {
            *by_kind.entry(chunk.kind).or_insert(0) += 1;
        }

        ChunkingStats {
            total_chunks: self.chunks.len(),
            total_lines: self.chunks.iter().map(Chunk::line_count).sum(),
            nested_chunks: self.chunks.iter().filter(|c| c.is_nested).count(),
            documented_chunks: self.chunks.iter().filter(|c| c.has_docstring()).count(),
            warnings: self.warnings.len(),
            by_kind,
        }
    }
}

/// Statistics about chunking results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingStats {
    pub total_chunks: usize,
    pub total_lines: usize,
    pub nested_chunks: usize,
    pub documented_chunks: usize,
    pub warnings: usize,
    pub by_kind: BTreeMap<ChunkKind, usize>,
}

impl std::fmt::Display for ChunkingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunks: {} | Lines: {} | Nested: {} | Documented: {} | Warnings: {}",
            self.total_chunks,
            self.total_lines,
            self.nested_chunks,
            self.documented_chunks,
            self.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span(start_line: usize, end_line: usize, start_byte: usize, end_byte: usize) -> Span {
        Span {
            start_line,
            end_line,
            start_byte,
            end_byte,
        }
    }

    fn chunk(kind: ChunkKind, qualified_name: &str) -> Chunk {
        Chunk {
            kind,
            name: qualified_name
                .rsplit('.')
                .next()
                .unwrap_or(qualified_name)
                .to_string(),
            qualified_name: qualified_name.to_string(),
            span: span(10, 15, 100, 200),
            signature: "(self)".to_string(),
            docstring: None,
            decorators: Vec::new(),
            parent_kind: None,
            bases: Vec::new(),
            is_nested: false,
            body: "pass".to_string(),
        }
    }

    #[test]
    fn test_span_line_count() {
        assert_eq!(span(10, 15, 0, 1).line_count(), 6);
        assert_eq!(span(3, 3, 0, 1).line_count(), 1);
    }

    #[test]
    fn test_span_contains_line() {
        let s = span(10, 15, 0, 1);
        assert!(s.contains_line(10));
        assert!(s.contains_line(12));
        assert!(s.contains_line(15));
        assert!(!s.contains_line(9));
        assert!(!s.contains_line(16));
    }

    #[test]
    fn test_span_containment_and_disjointness() {
        let outer = span(1, 10, 0, 100);
        let inner = span(2, 4, 10, 40);
        let after = span(12, 14, 120, 160);
        let touching = span(10, 11, 100, 110);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.is_disjoint(&after));
        assert!(outer.is_disjoint(&touching));
        assert!(!outer.is_disjoint(&inner));
    }

    #[test]
    fn test_span_text_out_of_bounds() {
        let source = "def f(): pass";
        assert_eq!(span(1, 1, 0, 3).text(source), Some("def"));
        assert_eq!(span(1, 1, 0, 99).text(source), None);
    }

    #[test]
    fn test_chunk_kind_is_routine() {
        assert!(ChunkKind::Function.is_routine());
        assert!(ChunkKind::PropertySetter.is_routine());
        assert!(ChunkKind::Generator.is_routine());
        assert!(!ChunkKind::Class.is_routine());
        assert!(!ChunkKind::Module.is_routine());
    }

    #[test]
    fn test_chunk_depth() {
        assert_eq!(chunk(ChunkKind::Function, "add").depth(), 0);
        assert_eq!(chunk(ChunkKind::Method, "Calculator.add").depth(), 1);
        assert_eq!(chunk(ChunkKind::Function, "outer.inner.leaf").depth(), 2);
    }

    #[test]
    fn test_chunk_serializes_camel_case() {
        let mut c = chunk(ChunkKind::Method, "Calculator.add");
        c.parent_kind = Some(ChunkKind::Class);
        let json: serde_json::Value = serde_json::to_value(&c).unwrap();

        assert_eq!(json["kind"], "Method");
        assert_eq!(json["qualifiedName"], "Calculator.add");
        assert_eq!(json["parentKind"], "Class");
        assert_eq!(json["isNested"], false);
        assert_eq!(json["span"]["startLine"], 10);
        assert!(json["docstring"].is_null());
    }

    #[test]
    fn test_outcome_json_lines_and_stats() {
        let mut documented = chunk(ChunkKind::Function, "add");
        documented.docstring = Some("Adds.".to_string());
        let outcome = ChunkOutcome {
            chunks: vec![documented, chunk(ChunkKind::Class, "Calculator")],
            warnings: Vec::new(),
        };

        let lines = outcome.to_json_lines().unwrap();
        assert_eq!(lines.lines().count(), 2);

        let stats = outcome.stats();
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.documented_chunks, 1);
        assert_eq!(stats.by_kind.get(&ChunkKind::Class), Some(&1));
        assert!(outcome.is_complete());
        assert_eq!(outcome.find("Calculator").count(), 1);
    }
}
