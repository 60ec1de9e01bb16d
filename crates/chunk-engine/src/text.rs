//! Text normalization shared by the docstring extractor and the chunk builder.

use regex::Regex;

/// Pre-compiled patterns, built once per [`crate::Chunker`].
#[derive(Debug, Clone)]
pub struct TextPatterns {
    string_open: Regex,
    whitespace: Regex,
    after_open: Regex,
    before_close: Regex,
    trailing_comma: Regex,
}

/// Literal parsed out of a Python string token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLiteral<'a> {
    pub prefix: &'a str,
    pub contents: &'a str,
}

impl StringLiteral<'_> {
    /// Byte and f-strings are never documentation
    #[must_use]
    pub fn is_plain(&self) -> bool {
        !self
            .prefix
            .chars()
            .any(|c| matches!(c.to_ascii_lowercase(), 'b' | 'f' | 't'))
    }
}

impl TextPatterns {
    pub fn new() -> Self {
        Self {
            string_open: Regex::new(r#"^(?P<prefix>[A-Za-z]{0,3})(?P<quote>"""|'''|"|')"#)
                .expect("string_open regex must compile"),
            whitespace: Regex::new(r"\s+").expect("whitespace regex must compile"),
            after_open: Regex::new(r"([(\[])\s+").expect("after_open regex must compile"),
            before_close: Regex::new(r"\s+([)\]])").expect("before_close regex must compile"),
            trailing_comma: Regex::new(r",\s*([)\]])").expect("trailing_comma regex must compile"),
        }
    }

    /// Split a string token into prefix and contents, stripping its quotes
    pub fn parse_string<'a>(&self, token: &'a str) -> Option<StringLiteral<'a>> {
        let caps = self.string_open.captures(token)?;
        let prefix = caps.name("prefix")?.as_str();
        let quote = caps.name("quote")?.as_str();
        let open_len = prefix.len() + quote.len();

        if token.len() < open_len + quote.len() || !token.ends_with(quote) {
            return None;
        }

        let contents = token.get(open_len..token.len() - quote.len())?;
        Some(StringLiteral { prefix, contents })
    }

    /// Collapse a multi-line signature to a single canonical line
    pub fn normalize_signature(&self, raw: &str) -> String {
        let collapsed = self.whitespace.replace_all(raw.trim(), " ");
        let collapsed = self.after_open.replace_all(&collapsed, "$1");
        let collapsed = self.before_close.replace_all(&collapsed, "$1");
        self.trailing_comma.replace_all(&collapsed, "$1").into_owned()
    }
}

impl Default for TextPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize docstring indentation the way `inspect.cleandoc` does.
pub fn clean_doc(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim());
    for line in &lines[1..] {
        let stripped = line.get(margin..).unwrap_or_else(|| line.trim_start());
        cleaned.push(stripped.trim_end());
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}
