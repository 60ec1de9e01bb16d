use crate::error::Result;
use crate::hierarchy::ScopeStack;
use crate::span::text_of;
use crate::text::TextPatterns;
use crate::types::{Chunk, ChunkKind, Span};
use tree_sitter::Node;

/// Assembles an immutable [`Chunk`] from the pieces gathered for one definition
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    kind: ChunkKind,
    name: String,
    span: Span,
    qualified_name: String,
    parent_kind: Option<ChunkKind>,
    is_nested: bool,
    signature: String,
    docstring: Option<String>,
    decorators: Vec<String>,
    bases: Vec<String>,
    body: String,
}

impl ChunkBuilder {
    /// Start a chunk at module level
    pub fn new(kind: ChunkKind, name: impl Into<String>, span: Span) -> Self {
        let name = name.into();
        Self {
            kind,
            qualified_name: name.clone(),
            name,
            span,
            parent_kind: None,
            is_nested: false,
            signature: String::new(),
            docstring: None,
            decorators: Vec::new(),
            bases: Vec::new(),
            body: String::new(),
        }
    }

    /// Builder: place the chunk under the current ancestor chain
    #[must_use]
    pub fn within(mut self, scope: &ScopeStack) -> Self {
        self.qualified_name = scope.qualify(&self.name);
        self.parent_kind = scope.parent_kind();
        self.is_nested = scope.in_routine();
        self
    }

    /// Builder: set signature
    #[must_use]
    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Builder: set docstring
    #[must_use]
    pub fn docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring;
        self
    }

    /// Builder: set decorators
    #[must_use]
    pub fn decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    /// Builder: set base classes
    #[must_use]
    pub fn bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }

    /// Builder: set body text
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Chunk {
        Chunk {
            kind: self.kind,
            name: self.name,
            qualified_name: self.qualified_name,
            span: self.span,
            signature: self.signature,
            docstring: self.docstring,
            decorators: self.decorators,
            parent_kind: self.parent_kind,
            bases: self.bases,
            is_nested: self.is_nested,
            body: self.body,
        }
    }
}

/// Decorator expressions of a `decorated_definition`, without '@'
pub fn decorator_texts(decorated: Node, source: &str) -> Result<Vec<String>> {
    let mut decorators = Vec::new();
    let mut cursor = decorated.walk();
    for decorator in decorated.children(&mut cursor) {
        if decorator.kind() != "decorator" {
            continue;
        }

        let mut inner = decorator.walk();
        let expression = decorator
            .named_children(&mut inner)
            .find(|child| child.kind() != "comment");
        let text = match expression {
            Some(expression) => text_of(expression, source)?.trim().to_string(),
            None => text_of(decorator, source)?
                .trim()
                .trim_start_matches('@')
                .trim()
                .to_string(),
        };
        decorators.push(text);
    }
    Ok(decorators)
}

/// Normalized signature of a definition.
///
/// Functions: type parameters, parameter list and return annotation.
/// Classes: type parameters and superclass list.
pub fn signature_text(definition: Node, source: &str, patterns: &TextPatterns) -> Result<String> {
    let fields: &[&str] = match definition.kind() {
        "class_definition" => &["type_parameters", "superclasses"],
        _ => &["type_parameters", "parameters", "return_type"],
    };

    let parts: Vec<Node> = fields
        .iter()
        .filter_map(|field| definition.child_by_field_name(field))
        .collect();
    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return Ok(String::new());
    };

    let raw = text_without_comments(definition, first.start_byte(), last.end_byte(), source)?;
    Ok(patterns.normalize_signature(&raw))
}

/// Positional base class expressions of a class, in declaration order
pub fn base_names(class: Node, source: &str) -> Result<Vec<String>> {
    let Some(superclasses) = class.child_by_field_name("superclasses") else {
        return Ok(Vec::new());
    };

    let mut bases = Vec::new();
    let mut cursor = superclasses.walk();
    for argument in superclasses.named_children(&mut cursor) {
        match argument.kind() {
            "keyword_argument" | "dictionary_splat" | "comment" => continue,
            _ => bases.push(text_of(argument, source)?.trim().to_string()),
        }
    }
    Ok(bases)
}

/// Source text of `start..end` with every comment inside the range cut out
fn text_without_comments(root: Node, start: usize, end: usize, source: &str) -> Result<String> {
    let mut comments = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.end_byte() <= start || node.start_byte() >= end {
            continue;
        }
        if node.kind() == "comment" {
            comments.push((node.start_byte(), node.end_byte()));
            continue;
        }
        let mut cursor = node.walk();
        stack.extend(node.children(&mut cursor));
    }
    comments.sort_unstable();

    let mut out = String::new();
    let mut pos = start;
    for (comment_start, comment_end) in comments {
        if comment_start > pos {
            out.push_str(slice(source, pos, comment_start)?);
        }
        pos = pos.max(comment_end);
    }
    if pos < end {
        out.push_str(slice(source, pos, end)?);
    }
    Ok(out)
}

fn slice(source: &str, start: usize, end: usize) -> Result<&str> {
    source
        .get(start..end)
        .ok_or_else(|| crate::error::ChunkerError::span(start, end, source.len()))
}
