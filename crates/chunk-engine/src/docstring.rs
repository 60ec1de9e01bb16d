//! Leading documentation strings of modules, classes and functions.

use crate::span::{content_end, text_of};
use crate::text::{clean_doc, TextPatterns};
use tree_sitter::Node;

/// Docstring found at the top of a body
#[derive(Debug, Clone)]
pub struct Docstring<'tree> {
    /// Normalized documentation text
    pub text: String,
    /// The expression statement holding the literal
    pub statement: Node<'tree>,
}

/// Extract the docstring of a `block` (or of the `module` root).
///
/// Only the first non-comment statement qualifies, and only when it is a
/// bare string literal. Byte strings and f-strings are not documentation.
pub fn extract<'tree>(
    body: Node<'tree>,
    source: &str,
    patterns: &TextPatterns,
) -> Option<Docstring<'tree>> {
    let statement = first_statement(body)?;
    if statement.kind() != "expression_statement" {
        return None;
    }

    let mut cursor = statement.walk();
    let expressions: Vec<Node> = statement
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    let [literal] = expressions.as_slice() else {
        return None;
    };

    let raw = match literal.kind() {
        "string" => string_contents(*literal, source, patterns)?,
        "concatenated_string" => {
            let mut joined = String::new();
            let mut parts = literal.walk();
            for part in literal.named_children(&mut parts) {
                if part.kind() == "string" {
                    joined.push_str(&string_contents(part, source, patterns)?);
                }
            }
            joined
        }
        _ => return None,
    };

    Some(Docstring {
        text: clean_doc(&raw),
        statement,
    })
}

/// Body text of a definition with its docstring statement removed.
///
/// The text starts at the beginning of the first remaining line so that
/// indentation stays uniform, and stops at the last non-comment token.
pub fn body_text(body: Node, docstring: Option<&Docstring>, source: &str) -> String {
    let mut cursor = body.walk();
    let mut statements = body.named_children(&mut cursor);

    let first = match docstring {
        Some(doc) => statements.find(|child| child.start_byte() >= doc.statement.end_byte()),
        None => statements.next(),
    };
    let Some(first) = first else {
        return String::new();
    };

    let end = content_end(body);
    let start = line_start_if_indented(first.start_byte(), source);
    if start >= end {
        return String::new();
    }

    source.get(start..end).unwrap_or_default().to_string()
}

fn first_statement(body: Node) -> Option<Node> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

fn string_contents(node: Node, source: &str, patterns: &TextPatterns) -> Option<String> {
    let token = text_of(node, source).ok()?;
    let literal = patterns.parse_string(token)?;
    literal.is_plain().then(|| literal.contents.to_string())
}

fn line_start_if_indented(offset: usize, source: &str) -> usize {
    let Some(before) = source.get(..offset) else {
        return offset;
    };
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    if before[line_start..].trim().is_empty() {
        line_start
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use pretty_assertions::assert_eq;

    fn function_body<'t>(tree: &'t tree_sitter::Tree) -> Node<'t> {
        tree.root_node()
            .named_child(0)
            .and_then(|def| def.child_by_field_name("body"))
            .unwrap()
    }

    fn doc_of(code: &str) -> Option<String> {
        let tree = Language::Python.parse(code).unwrap();
        extract(function_body(&tree), code, &TextPatterns::new()).map(|doc| doc.text)
    }

    #[test]
    fn test_multiline_docstring_is_normalized() {
        let code = "def add(a, b):\n    \"\"\"Calculates the sum.\n\n    Args:\n        a: First number\n    \"\"\"\n    return a + b\n";
        assert_eq!(
            doc_of(code).as_deref(),
            Some("Calculates the sum.\n\nArgs:\n    a: First number")
        );
    }

    #[test]
    fn test_no_docstring_when_first_statement_is_code() {
        let code = "def f():\n    x = 1\n    \"\"\"not a docstring\"\"\"\n";
        assert_eq!(doc_of(code), None);
    }

    #[test]
    fn test_comment_before_docstring_is_skipped() {
        let code = "def f():\n    # leading comment\n    'Real doc.'\n    pass\n";
        assert_eq!(doc_of(code).as_deref(), Some("Real doc."));
    }

    #[test]
    fn test_fstring_and_bytes_are_not_docstrings() {
        assert_eq!(doc_of("def f():\n    f\"doc {1}\"\n"), None);
        assert_eq!(doc_of("def f():\n    b'doc'\n"), None);
    }

    #[test]
    fn test_concatenated_docstring() {
        let code = "def f():\n    \"first \" 'second'\n";
        assert_eq!(doc_of(code).as_deref(), Some("first second"));
    }

    #[test]
    fn test_module_docstring() {
        let code = "\"\"\"\nModule docs\n\"\"\"\n\nimport os\n";
        let tree = Language::Python.parse(code).unwrap();
        let doc = extract(tree.root_node(), code, &TextPatterns::new()).unwrap();
        assert_eq!(doc.text, "Module docs");
    }

    #[test]
    fn test_body_text_excludes_docstring() {
        let code = "def f(x):\n    \"\"\"Doc.\"\"\"\n    y = x * 2\n    return y\n";
        let tree = Language::Python.parse(code).unwrap();
        let body = function_body(&tree);
        let patterns = TextPatterns::new();
        let doc = extract(body, code, &patterns);

        assert_eq!(
            body_text(body, doc.as_ref(), code),
            "    y = x * 2\n    return y"
        );
        assert_eq!(
            body_text(body, None, code),
            "    \"\"\"Doc.\"\"\"\n    y = x * 2\n    return y"
        );
    }

    #[test]
    fn test_body_text_of_docstring_only_function() {
        let code = "def f():\n    \"\"\"Only docs.\"\"\"\n";
        let tree = Language::Python.parse(code).unwrap();
        let body = function_body(&tree);
        let doc = extract(body, code, &TextPatterns::new());
        assert_eq!(body_text(body, doc.as_ref(), code), "");
    }

    #[test]
    fn test_body_text_of_one_liner() {
        let code = "def f(): return 1\n";
        let tree = Language::Python.parse(code).unwrap();
        assert_eq!(body_text(function_body(&tree), None, code), "return 1");
    }
}
