use serde::{Deserialize, Serialize};

/// Configuration for the chunking engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkerConfig {
    /// Emit a synthetic Module chunk spanning the whole file
    pub emit_module_chunk: bool,

    /// Keep definitions whose name starts with an underscore
    pub include_private: bool,

    /// Maximum number of enclosing definitions a chunk may have (None = unbounded)
    pub max_nesting_depth: Option<usize>,

    /// Also discover definitions inside if/for/while/try/with/match bodies
    pub include_conditional_definitions: bool,

    /// Qualified name of the Module chunk
    pub module_name: Option<String>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            emit_module_chunk: false,
            include_private: true,
            max_nesting_depth: None,
            include_conditional_definitions: false,
            module_name: None,
        }
    }
}

impl ChunkerConfig {
    /// Create config for embedding pipelines (module context included)
    pub fn for_embeddings() -> Self {
        Self {
            emit_module_chunk: true,
            ..Default::default()
        }
    }

    /// Create config that only keeps the public surface of a file
    pub fn public_api() -> Self {
        Self {
            include_private: false,
            ..Default::default()
        }
    }

    /// Create config that never descends below module-level definitions
    pub fn top_level_only() -> Self {
        Self {
            max_nesting_depth: Some(0),
            ..Default::default()
        }
    }

    /// Parse configuration from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.module_name {
            if name.trim().is_empty() {
                return Err("module_name cannot be blank".to_string());
            }
            if name.contains('.') {
                return Err(format!("module_name ({name}) cannot contain '.'"));
            }
        }

        Ok(())
    }

    /// Whether a definition at `depth` enclosing frames may be chunked
    #[must_use]
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_nesting_depth.map_or(true, |max| depth <= max)
    }
}
