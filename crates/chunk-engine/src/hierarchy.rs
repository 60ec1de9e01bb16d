use crate::types::ChunkKind;

/// One enclosing definition
#[derive(Debug, Clone)]
struct Frame {
    name: String,
    kind: ChunkKind,
    /// Property getters declared so far (class frames only)
    properties: Vec<String>,
}

/// Ancestor chain of the definition currently being visited
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enclosing definitions
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Kind of the innermost enclosing definition
    pub fn parent_kind(&self) -> Option<ChunkKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    /// Whether a definition at this point sits inside a routine body
    pub fn in_routine(&self) -> bool {
        self.parent_kind().is_some_and(ChunkKind::is_routine)
    }

    /// Qualified name for a definition called `name` at this point
    pub fn qualify(&self, name: &str) -> String {
        let mut qualified = String::new();
        for frame in &self.frames {
            qualified.push_str(&frame.name);
            qualified.push('.');
        }
        qualified.push_str(name);
        qualified
    }

    /// Properties declared so far in the enclosing class
    pub fn known_properties(&self) -> &[String] {
        match self.frames.last() {
            Some(frame) if frame.kind == ChunkKind::Class => &frame.properties,
            _ => &[],
        }
    }

    /// Remember a property getter declared in the enclosing class
    pub fn record_property(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.kind == ChunkKind::Class && !frame.properties.iter().any(|p| p == name) {
                frame.properties.push(name.to_string());
            }
        }
    }

    pub fn push(&mut self, name: impl Into<String>, kind: ChunkKind) {
        self.frames.push(Frame {
            name: name.into(),
            kind,
            properties: Vec::new(),
        });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }
}
