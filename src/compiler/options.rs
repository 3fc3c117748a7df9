use serde::{Deserialize, Serialize};

/// Prompt used when neither the caller nor a connected input node supplies one.
pub const DEFAULT_PROMPT: &str = "Hello! How can you help me today?";

/// How the top level of the workflow is turned into a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// `Graph` when top-level executables pass data to each other, `Linear` otherwise.
    #[default]
    Auto,
    /// A single execution root; other top-level nodes are only declared.
    Linear,
    /// A dependency graph over every top-level executable.
    Graph,
}

/// Settings that shape the generated program without changing the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    pub mode: GenerationMode,
    pub default_prompt: String,
    /// Emit the leading "generated file" comment.
    pub header: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Auto,
            default_prompt: DEFAULT_PROMPT.to_string(),
            header: true,
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
