//! Common test utilities for building workflow graphs.
use kousei::prelude::*;

#[allow(dead_code)]
pub fn agent(id: &str, label: &str) -> NodeDefinition {
    NodeDefinition::new(id, label, NodeKind::Agent(AgentConfig::default()))
}

#[allow(dead_code)]
pub fn agent_with(id: &str, label: &str, config: AgentConfig) -> NodeDefinition {
    NodeDefinition::new(id, label, NodeKind::Agent(config))
}

#[allow(dead_code)]
pub fn orchestrator(id: &str, label: &str) -> NodeDefinition {
    NodeDefinition::new(
        id,
        label,
        NodeKind::Orchestrator(OrchestratorConfig::default()),
    )
}

#[allow(dead_code)]
pub fn swarm(id: &str, label: &str, config: SwarmConfig) -> NodeDefinition {
    NodeDefinition::new(id, label, NodeKind::Swarm(config))
}

#[allow(dead_code)]
pub fn graph_container(id: &str, label: &str, config: GraphConfig) -> NodeDefinition {
    NodeDefinition::new(id, label, NodeKind::Graph(config))
}

#[allow(dead_code)]
pub fn builtin_tool(id: &str, tool_name: &str) -> NodeDefinition {
    NodeDefinition::new(
        id,
        tool_name,
        NodeKind::BuiltinTool(BuiltinToolConfig {
            tool_name: tool_name.to_string(),
        }),
    )
}

#[allow(dead_code)]
pub fn custom_tool(id: &str, label: &str, code: &str) -> NodeDefinition {
    NodeDefinition::new(
        id,
        label,
        NodeKind::CustomTool(CustomToolConfig {
            code: code.to_string(),
            description: None,
        }),
    )
}

#[allow(dead_code)]
pub fn stdio_server(id: &str, label: &str, command: &str, args: &[&str]) -> NodeDefinition {
    NodeDefinition::new(
        id,
        label,
        NodeKind::McpServer(McpServerConfig {
            transport: McpTransport::Stdio,
            command: Some(command.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn http_server(id: &str, label: &str, url: &str) -> NodeDefinition {
    NodeDefinition::new(
        id,
        label,
        NodeKind::McpServer(McpServerConfig {
            transport: McpTransport::StreamableHttp,
            url: Some(url.to_string()),
            ..Default::default()
        }),
    )
}

#[allow(dead_code)]
pub fn input(id: &str) -> NodeDefinition {
    NodeDefinition::new(id, "Input", NodeKind::Input(InputConfig::default()))
}

#[allow(dead_code)]
pub fn input_with_default(id: &str, content: &str) -> NodeDefinition {
    NodeDefinition::new(
        id,
        "Input",
        NodeKind::Input(InputConfig {
            default_content: Some(content.to_string()),
        }),
    )
}

#[allow(dead_code)]
pub fn output(id: &str) -> NodeDefinition {
    NodeDefinition::new(id, "Output", NodeKind::Output(OutputConfig::default()))
}

/// Executable output into executable input.
#[allow(dead_code)]
pub fn flow(from: &str, to: &str) -> EdgeDefinition {
    EdgeDefinition::new(from, "output", to, "user-input")
}

/// Input node into an executable.
#[allow(dead_code)]
pub fn feed(input: &str, to: &str) -> EdgeDefinition {
    EdgeDefinition::new(input, "output", to, "user-input")
}

/// Executable into an output node.
#[allow(dead_code)]
pub fn sink(from: &str, output: &str) -> EdgeDefinition {
    EdgeDefinition::new(from, "output", output, "input")
}

/// Tool, custom tool or server into an executable's tools handle.
#[allow(dead_code)]
pub fn attach(tool: &str, to: &str) -> EdgeDefinition {
    EdgeDefinition::new(tool, "tool-output", to, "tools")
}

/// Composite into a member.
#[allow(dead_code)]
pub fn member(parent: &str, child: &str) -> EdgeDefinition {
    EdgeDefinition::new(parent, "sub-agents", child, "orchestrator-input")
}

#[allow(dead_code)]
pub fn graph(nodes: Vec<NodeDefinition>, edges: Vec<EdgeDefinition>) -> GraphDefinition {
    GraphDefinition::new(nodes, edges).expect("test graphs have unique ids")
}

/// `input -> Assistant -> output`.
#[allow(dead_code)]
pub fn simple_workflow() -> GraphDefinition {
    graph(
        vec![input("in"), agent("agent-1", "Assistant"), output("out")],
        vec![feed("in", "agent-1"), sink("agent-1", "out")],
    )
}

/// Compiles with default options and no header comment.
#[allow(dead_code)]
pub fn compile(graph: GraphDefinition) -> CompileOutput {
    Compiler::builder(graph).with_header(false).build().compile()
}

/// Indentation width of a line.
#[allow(dead_code)]
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
