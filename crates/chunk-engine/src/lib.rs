//! # Context Chunk Engine
//!
//! Structural chunking of Python source for semantic search and AI context.
//!
//! ## Philosophy
//!
//! Every chunk is one definition (class, function, method, property…) that can
//! be embedded on its own:
//! - Boundaries come from the syntax tree, never from line counts
//! - Decorators belong to the definition they modify
//! - Nested definitions keep their ancestry (`Calculator.add`,
//!   `decorator_example.wrapper`)
//! - Lambdas and other anonymous callables are never chunked
//!
//! ## Architecture
//!
//! ```text
//! Source Code
//!     │
//!     ├──> Tree-sitter Parsing → AST   (rejected if it contains errors)
//!     │
//!     ├──> Traversal (depth-first, source order)
//!     │    ├─> Hierarchy: ancestor stack → qualified name, parent kind
//!     │    ├─> Classification: decorators + body scan → ChunkKind
//!     │    ├─> Span: decorators .. last non-comment token
//!     │    └─> Docstring: leading string literal, cleandoc-normalized
//!     │
//!     └──> Chunk Builder
//!          └─> ChunkOutcome { chunks (pre-order), warnings }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use context_chunk_engine::{ChunkKind, Chunker};
//!
//! let code = r#"
//! class Calculator:
//!     @property
//!     def total(self) -> int:
//!         """Number of calculations."""
//!         return 0
//! "#;
//!
//! let outcome = Chunker::default().chunk_str(code).unwrap();
//! let total = &outcome.chunks[1];
//! assert_eq!(total.qualified_name, "Calculator.total");
//! assert_eq!(total.kind, ChunkKind::Property);
//! assert_eq!(total.docstring.as_deref(), Some("Number of calculations."));
//! ```

mod builder;
mod chunker;
mod classify;
mod config;
mod docstring;
mod error;
mod hierarchy;
mod language;
mod span;
mod text;
mod types;

pub use chunker::{Chunker, DEFAULT_MODULE_NAME};
pub use config::ChunkerConfig;
pub use error::{ChunkWarning, ChunkerError, Result};
pub use language::Language;
pub use types::{Chunk, ChunkKind, ChunkOutcome, ChunkingStats, Span};
