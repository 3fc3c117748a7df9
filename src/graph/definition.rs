use super::config::*;
use super::handle::Handle;
use crate::error::ConversionError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a workflow graph, ready for compilation.
/// This is the target structure for any editor format conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub nodes: Vec<NodeDefinition>,
    pub edges: Vec<EdgeDefinition>,
}

impl GraphDefinition {
    /// Builds a graph, rejecting duplicate node ids.
    pub fn new(
        nodes: Vec<NodeDefinition>,
        edges: Vec<EdgeDefinition>,
    ) -> Result<Self, ConversionError> {
        let mut seen = AHashSet::new();
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ConversionError::DuplicateNodeId(node.id.clone()));
            }
        }
        Ok(Self { nodes, edges })
    }
}

/// A single typed unit of the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

/// Node kinds with their kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "kebab-case")]
pub enum NodeKind {
    Agent(AgentConfig),
    Orchestrator(OrchestratorConfig),
    Swarm(SwarmConfig),
    Graph(GraphConfig),
    BuiltinTool(BuiltinToolConfig),
    CustomTool(CustomToolConfig),
    McpServer(McpServerConfig),
    Input(InputConfig),
    Output(OutputConfig),
}

impl NodeKind {
    /// Short, user-facing name of the kind, used in diagnostics and fallback symbols.
    pub fn slug(&self) -> &'static str {
        match self {
            NodeKind::Agent(_) => "agent",
            NodeKind::Orchestrator(_) => "orchestrator",
            NodeKind::Swarm(_) => "swarm",
            NodeKind::Graph(_) => "graph",
            NodeKind::BuiltinTool(_) => "tool",
            NodeKind::CustomTool(_) => "custom_tool",
            NodeKind::McpServer(_) => "mcp_server",
            NodeKind::Input(_) => "input",
            NodeKind::Output(_) => "output",
        }
    }

    /// Agents, orchestrators, swarms and graph containers.
    pub fn is_executable(&self) -> bool {
        matches!(
            self,
            NodeKind::Agent(_) | NodeKind::Orchestrator(_) | NodeKind::Swarm(_) | NodeKind::Graph(_)
        )
    }

    /// Nodes that can own members through their `sub-agents` handle.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            NodeKind::Orchestrator(_) | NodeKind::Swarm(_) | NodeKind::Graph(_)
        )
    }

    pub fn is_tool(&self) -> bool {
        matches!(
            self,
            NodeKind::BuiltinTool(_) | NodeKind::CustomTool(_) | NodeKind::McpServer(_)
        )
    }

    /// The agent-level settings of agents and orchestrators.
    pub fn agent_config(&self) -> Option<&AgentConfig> {
        match self {
            NodeKind::Agent(config) => Some(config),
            NodeKind::Orchestrator(config) => Some(&config.agent),
            _ => None,
        }
    }
}

impl NodeDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }

    /// The label when one is set, otherwise the kind with a short id suffix.
    pub fn display_name(&self) -> String {
        let label = self.label.trim();
        if label.is_empty() {
            format!("{} …{}", self.kind.slug(), last4(&self.id))
        } else {
            label.to_string()
        }
    }
}

/// Defines a connection between two nodes of the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub source_handle: Handle,
    pub target: String,
    pub target_handle: Handle,
}

impl EdgeDefinition {
    pub fn new(
        source: impl Into<String>,
        source_handle: impl Into<Handle>,
        target: impl Into<String>,
        target_handle: impl Into<Handle>,
    ) -> Self {
        Self {
            source: source.into(),
            source_handle: source_handle.into(),
            target: target.into(),
            target_handle: target_handle.into(),
        }
    }
}

/// The last four characters of an id, the short form used in symbols and messages.
pub fn last4(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}
