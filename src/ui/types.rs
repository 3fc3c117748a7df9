use crate::error::ConversionError;
use crate::graph::*;
use ahash::AHashMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Canvas node as written by the editor: an id, a kind tag and a free-form data bag.
#[derive(Debug, Deserialize, Clone)]
pub struct UiNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Canvas edge connecting two node handles.
#[derive(Debug, Deserialize, Clone)]
pub struct UiEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    pub target: String,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: Option<String>,
}

/// The canvas graph.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UiGraph {
    #[serde(default)]
    pub nodes: Vec<UiNode>,
    #[serde(default)]
    pub edges: Vec<UiEdge>,
}

/// A stored document: either a bare canvas graph or a project that embeds one.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum UiDocument {
    Project {
        #[serde(alias = "flow")]
        graph: UiGraph,
        #[serde(default)]
        name: Option<String>,
    },
    Graph(UiGraph),
}

impl UiDocument {
    pub fn from_json(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| ConversionError::JsonParseError(e.to_string()))
    }

    pub fn graph(&self) -> &UiGraph {
        match self {
            UiDocument::Project { graph, .. } | UiDocument::Graph(graph) => graph,
        }
    }
}

impl IntoGraph for UiDocument {
    fn into_graph(self) -> Result<GraphDefinition, ConversionError> {
        match self {
            UiDocument::Project { graph, .. } | UiDocument::Graph(graph) => graph.into_graph(),
        }
    }
}

impl IntoGraph for UiGraph {
    fn into_graph(self) -> Result<GraphDefinition, ConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(convert_node)
            .collect::<Result<Vec<_>, _>>()?;

        let kinds: AHashMap<&str, &NodeKind> =
            nodes.iter().map(|n| (n.id.as_str(), &n.kind)).collect();

        let edges = self
            .edges
            .into_iter()
            .map(|edge| {
                let target_kind = kinds.get(edge.target.as_str()).copied();
                let source_handle = edge.source_handle.unwrap_or_else(|| "output".to_string());
                let target_handle = edge
                    .target_handle
                    .unwrap_or_else(|| default_target_handle(target_kind).to_string());
                EdgeDefinition::new(edge.source, source_handle, edge.target, target_handle)
            })
            .collect();

        GraphDefinition::new(nodes, edges)
    }
}

fn default_target_handle(kind: Option<&NodeKind>) -> &'static str {
    match kind {
        Some(NodeKind::Output(_)) => "input",
        _ => "user-input",
    }
}

fn convert_node(node: UiNode) -> Result<NodeDefinition, ConversionError> {
    let tag = node
        .node_type
        .clone()
        .or_else(|| {
            node.data
                .get("nodeType")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let label = node
        .data
        .get("label")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let kind = match tag.as_str() {
        "agent" | "agentNode" => NodeKind::Agent(parse_data(&node)?),
        "orchestrator" | "orchestrator-agent" | "orchestratorAgent" => {
            NodeKind::Orchestrator(parse_data(&node)?)
        }
        "swarm" | "swarmNode" => NodeKind::Swarm(parse_data(&node)?),
        "graph" | "graph-container" | "graphContainer" => NodeKind::Graph(parse_data(&node)?),
        "tool" | "built-in-tool" | "builtin-tool" | "builtinTool" => {
            NodeKind::BuiltinTool(parse_data(&node)?)
        }
        "custom-tool" | "customTool" => NodeKind::CustomTool(parse_data(&node)?),
        "mcp-tool" | "mcp-server" | "mcpTool" | "external-tool-server" => {
            NodeKind::McpServer(parse_data(&node)?)
        }
        "input" | "inputNode" => NodeKind::Input(parse_data(&node)?),
        "output" | "outputNode" => NodeKind::Output(parse_data(&node)?),
        _ => {
            return Err(ConversionError::UnknownNodeKind {
                node_id: node.id,
                kind: tag,
            });
        }
    };

    Ok(NodeDefinition {
        id: node.id,
        label,
        kind,
    })
}

fn parse_data<T: DeserializeOwned + Default>(node: &UiNode) -> Result<T, ConversionError> {
    if node.data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(node.data.clone()).map_err(|e| ConversionError::InvalidNodeData {
        node_id: node.id.clone(),
        message: e.to_string(),
    })
}
