//! Source ranges of definition nodes.

use crate::error::{ChunkerError, Result};
use crate::types::Span;
use tree_sitter::Node;

/// Resolve the span of a definition.
///
/// `outer` is the node the definition starts at: the `decorated_definition`
/// wrapper when decorators are present, otherwise the definition itself.
/// The end is the last non-comment token beneath `outer`, so trailing blank
/// and comment-only lines never widen the span.
pub fn resolve(outer: Node, source: &str) -> Result<Span> {
    let start_byte = outer.start_byte();
    let last = last_content_token(outer);
    let end_byte = last.end_byte().max(start_byte);

    check_range(start_byte, end_byte, source)?;

    let start_line = outer.start_position().row + 1;
    let end_pos = last.end_position();
    let mut end_line = end_pos.row + 1;
    // A token ending exactly at a line break reports the following row.
    if end_pos.column == 0 && end_line > start_line {
        end_line -= 1;
    }

    Ok(Span {
        start_line,
        end_line,
        start_byte,
        end_byte,
    })
}

/// Text of a node, if its range lies within `source`
pub fn text_of<'a>(node: Node, source: &'a str) -> Result<&'a str> {
    let (start, end) = (node.start_byte(), node.end_byte());
    check_range(start, end, source)?;
    source
        .get(start..end)
        .ok_or_else(|| ChunkerError::span(start, end, source.len()))
}

/// Byte offset where the content of `node` ends (comments excluded)
pub fn content_end(node: Node) -> usize {
    last_content_token(node).end_byte()
}

fn check_range(start: usize, end: usize, source: &str) -> Result<()> {
    if start > end
        || end > source.len()
        || !source.is_char_boundary(start)
        || !source.is_char_boundary(end)
    {
        return Err(ChunkerError::span(start, end, source.len()));
    }
    Ok(())
}

fn last_content_token(node: Node) -> Node {
    let mut current = node;
    loop {
        let mut cursor = current.walk();
        let last = current
            .children(&mut cursor)
            .filter(|child| child.kind() != "comment" && child.end_byte() > child.start_byte())
            .last();
        match last {
            Some(child) => current = child,
            None => return current,
        }
    }
}
