use serde::{Deserialize, Serialize};
use std::fmt;

/// A named connection point on a node. Handles carry meaning: the same pair of
/// nodes can be linked as data flow, tool attachment or composition membership
/// depending on which handles the edge uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Handle {
    Output,
    UserInput,
    Tools,
    ToolOutput,
    SubAgents,
    OrchestratorInput,
    Input,
    Other(String),
}

impl Handle {
    pub fn as_str(&self) -> &str {
        match self {
            Handle::Output => "output",
            Handle::UserInput => "user-input",
            Handle::Tools => "tools",
            Handle::ToolOutput => "tool-output",
            Handle::SubAgents => "sub-agents",
            Handle::OrchestratorInput => "orchestrator-input",
            Handle::Input => "input",
            Handle::Other(name) => name,
        }
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        match value {
            "output" => Handle::Output,
            "user-input" | "userInput" => Handle::UserInput,
            "tools" | "tool-input" => Handle::Tools,
            "tool-output" | "toolOutput" => Handle::ToolOutput,
            "sub-agents" | "subAgents" => Handle::SubAgents,
            "orchestrator-input" | "orchestratorInput" => Handle::OrchestratorInput,
            "input" => Handle::Input,
            other => Handle::Other(other.to_string()),
        }
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Handle::from(value.as_str())
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
