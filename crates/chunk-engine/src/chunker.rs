use crate::builder::{base_names, decorator_texts, signature_text, ChunkBuilder};
use crate::classify::{self, BodyMarkers, DecoratorMarker, DefinitionFacts, DefinitionShape};
use crate::config::ChunkerConfig;
use crate::docstring;
use crate::error::{ChunkWarning, ChunkerError, Result};
use crate::hierarchy::ScopeStack;
use crate::language::Language;
use crate::span::{self, text_of};
use crate::text::TextPatterns;
use crate::types::{Chunk, ChunkKind, ChunkOutcome};
use std::path::Path;
use tree_sitter::{Node, Tree};

/// Qualified name of the Module chunk when no other name is known
pub const DEFAULT_MODULE_NAME: &str = "<module>";

/// Statement kinds whose bodies are walked when conditional definitions are enabled
const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "else_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

const IMPORT_STATEMENTS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// Main chunker interface for processing Python source
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    patterns: TextPatterns,
}

impl Chunker {
    /// Create a new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self {
            config,
            patterns: TextPatterns::new(),
        })
    }

    /// Chunk Python source held in a string
    pub fn chunk_str(&self, source: &str) -> Result<ChunkOutcome> {
        let tree = Language::Python.parse(source)?;
        self.chunk_tree(&tree, source)
    }

    /// Chunk a Python file from disk
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<ChunkOutcome> {
        let path = path.as_ref();
        let language = Language::from_path(path);
        if language != Language::Python {
            return Err(ChunkerError::unsupported_language(format!(
                "{} ({})",
                language.as_str(),
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let tree = language.parse(&content)?;
        let module_name = self
            .config
            .module_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string());

        self.chunk_module(&tree, &content, &module_name)
    }

    /// Chunk an already parsed tree.
    ///
    /// `source` must be the exact text the tree was parsed from. Definitions
    /// whose offsets do not fit it are skipped and reported as warnings.
    pub fn chunk_tree(&self, tree: &Tree, source: &str) -> Result<ChunkOutcome> {
        let module_name = self
            .config
            .module_name
            .as_deref()
            .unwrap_or(DEFAULT_MODULE_NAME);
        self.chunk_module(tree, source, module_name)
    }

    fn chunk_module(&self, tree: &Tree, source: &str, module_name: &str) -> Result<ChunkOutcome> {
        let root = tree.root_node();
        if root.kind() != "module" {
            return Err(ChunkerError::parse(format!(
                "expected a module root, found `{}`",
                root.kind()
            )));
        }
        if root.has_error() {
            return Err(ChunkerError::parse("syntax tree contains errors"));
        }

        let mut walk = Walk::new(&self.config, &self.patterns, source);
        if self.config.emit_module_chunk {
            walk.emit_module(root, module_name);
        }
        walk.visit_block(root);

        let outcome = walk.finish();
        log::debug!(
            "Chunked {module_name}: {} chunks, {} warnings",
            outcome.chunks.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
            patterns: TextPatterns::new(),
        }
    }
}

/// State of one depth-first walk over a file
struct Walk<'a> {
    config: &'a ChunkerConfig,
    patterns: &'a TextPatterns,
    source: &'a str,
    scope: ScopeStack,
    chunks: Vec<Chunk>,
    warnings: Vec<ChunkWarning>,
}

impl<'a> Walk<'a> {
    fn new(config: &'a ChunkerConfig, patterns: &'a TextPatterns, source: &'a str) -> Self {
        Self {
            config,
            patterns,
            source,
            scope: ScopeStack::new(),
            chunks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn finish(self) -> ChunkOutcome {
        ChunkOutcome {
            chunks: self.chunks,
            warnings: self.warnings,
        }
    }

    fn emit_module(&mut self, root: Node, module_name: &str) {
        let span = match span::resolve(root, self.source) {
            Ok(span) => span,
            Err(e) => {
                self.span_warning(root, module_name, &e);
                return;
            }
        };

        let docstring = docstring::extract(root, self.source, self.patterns);

        let mut imports = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if IMPORT_STATEMENTS.contains(&child.kind()) {
                if let Ok(text) = text_of(child, self.source) {
                    imports.push(text.trim().to_string());
                }
            }
        }

        let chunk = ChunkBuilder::new(ChunkKind::Module, module_name, span)
            .docstring(docstring.map(|doc| doc.text))
            .body(imports.join("\n"))
            .build();
        self.chunks.push(chunk);
    }

    fn visit_block(&mut self, block: Node) {
        let mut cursor = block.walk();
        let statements: Vec<_> = block.named_children(&mut cursor).collect();
        for statement in statements {
            self.visit_statement(statement);
        }
    }

    fn visit_statement(&mut self, node: Node) {
        match node.kind() {
            "function_definition" | "class_definition" => {
                self.visit_definition(node, node, Vec::new());
            }
            "decorated_definition" => self.visit_decorated(node),
            kind if DefinitionShape::is_unsupported_definition(kind) => self.unsupported(node),
            kind if self.config.include_conditional_definitions
                && COMPOUND_STATEMENTS.contains(&kind) =>
            {
                self.visit_compound(node);
            }
            // Assignments (lambdas included), expressions, imports, control flow
            _ => {}
        }
    }

    fn visit_compound(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "block" => self.visit_block(child),
                kind if COMPOUND_STATEMENTS.contains(&kind) => self.visit_compound(child),
                _ => {}
            }
        }
    }

    fn visit_decorated(&mut self, node: Node) {
        let definition = match node.child_by_field_name("definition") {
            Some(definition) if DefinitionShape::from_node_kind(definition.kind()).is_some() => {
                definition
            }
            Some(other) => {
                self.unsupported(other);
                return;
            }
            None => {
                self.unsupported(node);
                return;
            }
        };

        match decorator_texts(node, self.source) {
            Ok(decorators) => self.visit_definition(node, definition, decorators),
            Err(e) => self.span_warning(node, "<decorated>", &e),
        }
    }

    /// Emit a chunk for `definition`, then walk its body.
    ///
    /// `outer` is where the definition's text begins: the decorated wrapper
    /// if there is one, the definition itself otherwise.
    fn visit_definition(&mut self, outer: Node, definition: Node, decorators: Vec<String>) {
        let Some(shape) = DefinitionShape::from_node_kind(definition.kind()) else {
            self.unsupported(definition);
            return;
        };

        let depth = self.scope.depth();
        if !self.config.allows_depth(depth) {
            log::trace!("Skipping definition at depth {depth} (line {})", line_of(outer));
            return;
        }

        let Some(name_node) = definition.child_by_field_name("name") else {
            self.unsupported(definition);
            return;
        };
        let name = match text_of(name_node, self.source) {
            Ok(name) => name.to_string(),
            Err(e) => {
                self.span_warning(outer, "<unnamed>", &e);
                return;
            }
        };

        if !self.config.include_private && is_private(&name) {
            log::trace!("Skipping private definition {}", self.scope.qualify(&name));
            return;
        }

        let chunk = match self.build_chunk(outer, definition, shape, &name, decorators) {
            Ok(chunk) => chunk,
            Err(e) => {
                let qualified = self.scope.qualify(&name);
                self.span_warning(outer, &qualified, &e);
                return;
            }
        };

        let kind = chunk.kind;
        log::trace!("{} {} at line {}", kind, chunk.qualified_name, chunk.span.start_line);
        if kind == ChunkKind::Property {
            self.scope.record_property(&name);
        }
        self.chunks.push(chunk);

        if let Some(body) = definition.child_by_field_name("body") {
            self.scope.push(name, kind);
            self.visit_block(body);
            self.scope.pop();
        }
    }

    fn build_chunk(
        &self,
        outer: Node,
        definition: Node,
        shape: DefinitionShape,
        name: &str,
        decorators: Vec<String>,
    ) -> Result<Chunk> {
        let span = span::resolve(outer, self.source)?;
        let body = definition.child_by_field_name("body");

        let markers: Vec<DecoratorMarker> = decorators
            .iter()
            .map(|decorator| DecoratorMarker::parse(decorator))
            .collect();
        let facts = DefinitionFacts {
            shape,
            is_async: classify::is_async_definition(definition),
            decorators: &markers,
            body: body.map(BodyMarkers::scan).unwrap_or_default(),
            parent: self.scope.parent_kind(),
            known_properties: self.scope.known_properties(),
        };
        let kind = classify::classify(&facts);

        let docstring = body.and_then(|body| docstring::extract(body, self.source, self.patterns));
        let body_text = body
            .map(|body| docstring::body_text(body, docstring.as_ref(), self.source))
            .unwrap_or_default();

        let bases = match shape {
            DefinitionShape::Class => base_names(definition, self.source)?,
            DefinitionShape::Function => Vec::new(),
        };
        let signature = signature_text(definition, self.source, self.patterns)?;

        Ok(ChunkBuilder::new(kind, name, span)
            .within(&self.scope)
            .signature(signature)
            .docstring(docstring.map(|doc| doc.text))
            .decorators(decorators)
            .bases(bases)
            .body(body_text)
            .build())
    }

    /// Record a definition-like node the classifier does not know, then
    /// keep looking for definitions in its body.
    fn unsupported(&mut self, node: Node) {
        let warning = ChunkWarning::UnsupportedConstruct {
            line: line_of(node),
            kind: node.kind().to_string(),
        };
        log::warn!("{warning}");
        self.warnings.push(warning);

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_block(body);
        }
    }

    fn span_warning(&mut self, node: Node, name: &str, error: &ChunkerError) {
        let warning = ChunkWarning::SpanResolution {
            line: line_of(node),
            name: name.to_string(),
            detail: error.to_string(),
        };
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// `_helper` and `__mangled` are private; `__init__`-style names are not
fn is_private(name: &str) -> bool {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    name.starts_with('_') && !dunder
}
