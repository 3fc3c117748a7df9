mod common;
use common::*;
use kousei::prelude::*;

fn research_team() -> GraphDefinition {
    graph(
        vec![
            input("in"),
            orchestrator("lead-0001", "Coordinator"),
            agent("agent-r001", "Researcher"),
            agent("agent-w001", "Writer"),
            stdio_server("srv-s001", "Search Server", "uvx", &["search-mcp"]),
            http_server("srv-d001", "Docs Server", "http://localhost:8000/mcp"),
            output("out"),
        ],
        vec![
            feed("in", "lead-0001"),
            member("lead-0001", "agent-r001"),
            member("lead-0001", "agent-w001"),
            attach("srv-s001", "agent-r001"),
            attach("srv-d001", "agent-w001"),
            sink("lead-0001", "out"),
        ],
    )
}

#[test]
fn test_single_agent_workflow() {
    let output = compile(simple_workflow());
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert_eq!(output.execution_root.as_deref(), Some("agent-1"));
    assert_eq!(output.mode, Some(GenerationMode::Linear));

    let source = &output.source_text;
    assert!(source.starts_with("import argparse\nimport asyncio\nimport json\n\nfrom strands import Agent\n"));
    assert!(source.contains("from strands.models import BedrockModel\n"));
    assert!(source.contains("assistant_model = BedrockModel("));
    assert!(source.contains("assistant_agent = Agent("));
    assert!(source.contains("name=\"assistant\""));
    assert!(source.contains("callback_handler=None"));
    assert!(source.contains("async def main(user_input=None, messages=None):"));
    assert!(source.contains("        prompt = \"Hello! How can you help me today?\"\n"));
    assert!(source.contains("    response = assistant_agent(prompt)\n"));
    assert!(source.contains("if __name__ == \"__main__\":\n"));
    assert!(source.contains("asyncio.run(main(user_input=args.user_input, messages=history))"));
    assert!(source.ends_with('\n'));
}

#[test]
fn test_unused_features_are_not_imported() {
    let output = compile(simple_workflow());
    let source = &output.source_text;
    for absent in [
        "import os",
        "MCPClient",
        "Swarm",
        "GraphBuilder",
        "strands_tools",
        "from strands import Agent, tool",
        "from mcp",
    ] {
        assert!(!source.contains(absent), "unexpected '{}' in output", absent);
    }
    assert!(!output.imports.iter().any(|line| line == "import os"));
}

#[test]
fn test_compile_is_deterministic() {
    let first = compile(research_team());
    let second = compile(research_team());
    assert!(first.is_success());
    assert_eq!(first.source_text, second.source_text);
    assert_eq!(first.warnings, second.warnings);

    let compiler = Compiler::builder(research_team()).build();
    assert_eq!(compiler.compile(), compiler.compile());
}

#[test]
fn test_header_comment_is_optional() {
    let with_header = Compiler::builder(simple_workflow()).build().compile();
    assert!(with_header.source_text.starts_with("# Generated by kousei"));

    let without = compile(simple_workflow());
    assert!(without.source_text.starts_with("import argparse"));
}

#[test]
fn test_invalid_graph_produces_no_source() {
    let g = graph(
        vec![input("in"), agent("a", "Assistant")],
        vec![feed("in", "a")],
    );
    let output = compile(g);
    assert!(!output.is_success());
    assert!(output.source_text.is_empty());
    assert!(output.execution_root.is_none());
    assert!(output.mode.is_none());
    assert!(!output.validation.valid);
    assert!(output.errors.iter().any(|e| e.contains("output node")));
}

#[test]
fn test_orchestrator_opens_one_scope_for_all_servers() {
    let output = compile(research_team());
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    let lines: Vec<&str> = source.lines().collect();

    let with_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.trim_start().starts_with("with "))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(with_lines.len(), 1);
    let scope_at = with_lines[0];
    assert_eq!(
        lines[scope_at],
        "    with search_server_client, docs_server_client:"
    );

    // Clients are declared at module level, before the entry function.
    let search_decl = lines
        .iter()
        .position(|line| line.starts_with("search_server_client = MCPClient("))
        .expect("search client declared");
    let docs_decl = lines
        .iter()
        .position(|line| line.starts_with("docs_server_client = MCPClient("))
        .expect("docs client declared");
    assert!(search_decl < scope_at && docs_decl < scope_at);

    // Tools are only listed while the scope is open.
    let listings: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(".list_tools_sync()"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(listings.len(), 2);
    for i in listings {
        assert!(i > scope_at);
        assert!(indent_of(lines[i]) > indent_of(lines[scope_at]));
    }

    assert!(source.contains("def researcher_tool(query: str) -> str:"));
    assert!(source.contains("def writer_tool(query: str) -> str:"));
    assert!(source.contains("tools=[researcher_tool, writer_tool]"));
    assert!(source.contains("response = coordinator_agent(prompt)"));
    assert!(source.contains("stdio_client(StdioServerParameters(command=\"uvx\", args=[\"search-mcp\"]))"));
    assert!(source.contains("streamablehttp_client(\"http://localhost:8000/mcp\")"));

    assert!(output.imports.contains(&"from strands import Agent, tool".to_string()));
    assert!(output.imports.contains(&"from strands.tools.mcp import MCPClient".to_string()));
    assert!(
        output
            .imports
            .contains(&"from mcp import StdioServerParameters, stdio_client".to_string())
    );
    assert!(output.imports.contains(
        &"from mcp.client.streamable_http import streamablehttp_client".to_string()
    ));
}

#[test]
fn test_stray_agent_with_server_scopes_itself() {
    let g = graph(
        vec![
            input("in"),
            agent("agent-main", "Main"),
            agent("agent-help", "Helper"),
            stdio_server("srv-file", "Files", "npx", &[]),
            output("out"),
        ],
        vec![
            feed("in", "agent-main"),
            sink("agent-main", "out"),
            attach("srv-file", "agent-help"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    assert!(source.contains("@tool\ndef helper_tool(query: str) -> str:\n"));
    assert!(source.contains("\n    with files_client:\n"));
    assert!(source.contains("*files_client.list_tools_sync()"));
    // The entry point itself needs no servers.
    assert!(source.contains("\n    response = main_agent(prompt)\n"));
}

#[test]
fn test_builtin_and_custom_tools() {
    let g = graph(
        vec![
            input("in"),
            agent("agent-1", "Assistant"),
            builtin_tool("t-calc", "Calculator"),
            custom_tool(
                "t-words",
                "Word Count",
                "@tool\ndef word_count(text: str) -> int:\n    return len(text.split())",
            ),
            custom_tool(
                "t-shout",
                "Shout",
                "def shout(text: str) -> str:\n    return text.upper()",
            ),
            output("out"),
        ],
        vec![
            feed("in", "agent-1"),
            attach("t-calc", "agent-1"),
            attach("t-words", "agent-1"),
            attach("t-shout", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    assert!(source.contains("from strands_tools import calculator\n"));
    assert!(source.contains("from strands import Agent, tool\n"));
    assert!(source.contains("@tool\ndef word_count(text: str) -> int:\n    return len(text.split())\n"));
    assert!(source.contains("shout = tool(shout)\n"));
    assert!(source.contains("tools=[calculator, word_count, shout]"));

    // Custom tool code precedes the agent that uses it.
    let tool_at = source.find("def word_count").unwrap();
    let agent_at = source.find("assistant_agent = Agent(").unwrap();
    assert!(tool_at < agent_at);
}

#[test]
fn test_unknown_builtin_falls_back_with_warning() {
    let g = graph(
        vec![
            input("in"),
            agent("agent-1", "Assistant"),
            builtin_tool("t-x", "teleport"),
            output("out"),
        ],
        vec![
            feed("in", "agent-1"),
            attach("t-x", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(output.source_text.contains("from strands_tools import current_time\n"));
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w.starts_with("Unknown built-in tool 'teleport'"))
    );
}

#[test]
fn test_custom_tool_without_function_gets_placeholder() {
    let g = graph(
        vec![
            input("in"),
            agent("agent-1", "Assistant"),
            custom_tool("tool-abcd", "Notes", "# nothing here yet"),
            output("out"),
        ],
        vec![
            feed("in", "agent-1"),
            attach("tool-abcd", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(output.source_text.contains("def notes_tool(query: str) -> str:"));
    assert!(output.source_text.contains("tools=[notes_tool]"));
    assert!(
        output
            .warnings
            .iter()
            .any(|w| w == "Custom tool 'Notes' defines no function; a placeholder was generated")
    );
}

#[test]
fn test_function_names_are_never_reused_by_nodes() {
    let g = graph(
        vec![
            input("in"),
            agent("agent-abcd", "Search"),
            custom_tool(
                "t-1",
                "Lookup",
                "@tool\ndef search_agent(q: str) -> str:\n    return q",
            ),
            output("out"),
        ],
        vec![
            feed("in", "agent-abcd"),
            attach("t-1", "agent-abcd"),
            sink("agent-abcd", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(output.source_text.contains("search_abcd_agent = Agent("));
    assert!(output.source_text.contains("tools=[search_agent]"));
}

#[test]
fn test_duplicate_labels_get_distinct_names() {
    let g = graph(
        vec![
            input("in"),
            agent("helper-aaaa1111", "Helper"),
            agent("helper-bbbb2222", "Helper"),
            output("out"),
        ],
        vec![feed("in", "helper-aaaa1111"), sink("helper-aaaa1111", "out")],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(output.source_text.contains("helper_agent = Agent("));
    assert!(output.source_text.contains("helper_2222_agent = Agent("));
    assert!(output.source_text.contains("response = helper_agent(prompt)"));
}

#[test]
fn test_swarm_workflow() {
    let config = SwarmConfig {
        entry_point: Some("Writer".to_string()),
        max_handoffs: 5,
        ..Default::default()
    };
    let g = graph(
        vec![
            input("in"),
            swarm("swarm-1", "Team", config),
            agent("agent-r", "Researcher"),
            agent("agent-w", "Writer"),
            output("out"),
        ],
        vec![
            feed("in", "swarm-1"),
            member("swarm-1", "agent-r"),
            member("swarm-1", "agent-w"),
            sink("swarm-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    assert!(source.contains("from strands.multiagent import Swarm\n"));
    assert!(source.contains("team_swarm = Swarm("));
    assert!(source.contains("[researcher_agent, writer_agent]"));
    assert!(source.contains("entry_point=writer_agent"));
    assert!(source.contains("max_handoffs=5"));
    assert!(source.contains("execution_timeout=900.0"));
    assert!(source.contains("result = team_swarm(prompt)"));
    assert!(source.contains("result.node_history"));

    // Members are declared before the swarm that holds them.
    let member_at = source.find("writer_agent = Agent(").unwrap();
    let swarm_at = source.find("team_swarm = Swarm(").unwrap();
    assert!(member_at < swarm_at);
}

#[test]
fn test_swarm_entry_point_must_be_a_member() {
    let config = SwarmConfig {
        entry_point: Some("Nobody".to_string()),
        ..Default::default()
    };
    let g = graph(
        vec![
            input("in"),
            swarm("swarm-1", "Team", config),
            agent("agent-r", "Researcher"),
            output("out"),
        ],
        vec![
            feed("in", "swarm-1"),
            member("swarm-1", "agent-r"),
            sink("swarm-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(!output.source_text.contains("entry_point="));
    assert!(output.warnings.iter().any(|w| w.contains("'Nobody'")));
}

#[test]
fn test_empty_swarm_is_a_composition_error() {
    let g = graph(
        vec![
            input("in"),
            swarm("swarm-1", "Team", SwarmConfig::default()),
            output("out"),
        ],
        vec![feed("in", "swarm-1"), sink("swarm-1", "out")],
    );
    let output = compile(g);
    assert!(!output.is_success());
    assert!(output.source_text.is_empty());
    assert_eq!(
        output.errors,
        vec!["'Team' cannot be composed this way: a swarm needs at least one member agent".to_string()]
    );
}

#[test]
fn test_wrapped_swarm_builds_its_members_per_call() {
    let g = graph(
        vec![
            input("in"),
            orchestrator("lead-0001", "Lead"),
            swarm("swarm-0002", "Team", SwarmConfig::default()),
            agent("x-0003", "X"),
            agent("y-0004", "Y"),
            output("out"),
        ],
        vec![
            feed("in", "lead-0001"),
            member("lead-0001", "swarm-0002"),
            member("swarm-0002", "x-0003"),
            member("swarm-0002", "y-0004"),
            sink("lead-0001", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    let lines: Vec<&str> = source.lines().collect();

    // No agent of the swarm is shared between calls.
    for line in &lines {
        assert!(!line.starts_with("x_agent = Agent("), "module-level member: {}", line);
        assert!(!line.starts_with("y_agent = Agent("), "module-level member: {}", line);
    }

    let def_at = lines
        .iter()
        .position(|line| *line == "def team_tool(query: str) -> str:")
        .expect("wrapper defined");
    let x_at = lines
        .iter()
        .position(|line| line.starts_with("    x_agent = Agent("))
        .expect("member built in the wrapper");
    let y_at = lines
        .iter()
        .position(|line| line.starts_with("    y_agent = Agent("))
        .expect("member built in the wrapper");
    let swarm_at = lines
        .iter()
        .position(|line| line.starts_with("    team_swarm = Swarm("))
        .expect("swarm built in the wrapper");
    assert!(def_at < x_at && x_at < y_at && y_at < swarm_at);
    assert!(lines[def_at + 1..swarm_at].iter().all(|line| line.is_empty() || indent_of(line) >= 4));

    assert!(source.contains("tools=[team_tool]"));
    assert!(source.contains("response = lead_agent(prompt)"));
}

#[test]
fn test_input_wired_to_a_member_runs_its_orchestrator() {
    let g = graph(
        vec![
            input_with_default("in", "Summarise the news"),
            orchestrator("lead-0001", "Lead"),
            agent("x-0003", "X"),
            agent("y-0004", "Y"),
            output("out"),
        ],
        vec![
            feed("in", "x-0003"),
            member("lead-0001", "x-0003"),
            member("lead-0001", "y-0004"),
            sink("lead-0001", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert_eq!(output.execution_root.as_deref(), Some("lead-0001"));

    let source = &output.source_text;
    assert!(source.contains("    response = lead_agent(prompt)\n"));
    assert!(!source.contains("response = x_agent(prompt)"));
    assert_eq!(source.matches("x_agent = Agent(").count(), 1);
    assert!(source.contains("def x_tool(query: str) -> str:"));
    assert!(source.contains("prompt = \"Summarise the news\""));
}

#[test]
fn test_chained_agents_compile_to_a_graph() {
    let g = graph(
        vec![
            input("in"),
            agent("a-1", "Planner"),
            agent("a-2", "Writer"),
            output("out"),
        ],
        vec![feed("in", "a-1"), flow("a-1", "a-2"), sink("a-2", "out")],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert_eq!(output.mode, Some(GenerationMode::Graph));
    assert_eq!(output.execution_root.as_deref(), Some("workflow_graph"));

    let source = &output.source_text;
    assert!(source.contains("from strands.multiagent import GraphBuilder\n"));
    assert!(source.contains("workflow_builder = GraphBuilder()\n"));
    assert!(source.contains("workflow_builder.add_node(planner_agent, \"planner\")\n"));
    assert!(source.contains("workflow_builder.add_node(writer_agent, \"writer\")\n"));
    assert!(source.contains("workflow_builder.add_edge(\"planner\", \"writer\")\n"));
    assert!(source.contains("workflow_builder.set_entry_point(\"planner\")\n"));
    assert!(!source.contains("set_entry_point(\"writer\")"));
    assert!(source.contains("workflow_graph = workflow_builder.build()\n"));
    assert!(source.contains("result = workflow_graph(prompt)"));
}

#[test]
fn test_unwired_graph_entry_is_not_reported_as_dead() {
    let g = graph(
        vec![
            input("in"),
            agent("a-0001", "A"),
            agent("b-0002", "B"),
            agent("c-0003", "C"),
            output("out"),
        ],
        vec![feed("in", "a-0001"), flow("a-0001", "b-0002"), sink("b-0002", "out")],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert_eq!(output.mode, Some(GenerationMode::Graph));
    assert_eq!(output.validation.disconnected, vec!["c-0003".to_string()]);
    assert!(output.source_text.contains("workflow_builder.set_entry_point(\"c\")\n"));

    assert!(output.warnings.iter().any(|w| w == "'C' is not reachable from any input node"));
    assert!(output.warnings.iter().all(|w| !w.contains("will not run")));
}

#[test]
fn test_compile_function_uses_default_options() {
    let output = kousei::compiler::compile(simple_workflow());
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert!(output.source_text.starts_with("# Generated by kousei"));
    assert_eq!(output, Compiler::builder(simple_workflow()).build().compile());
}

#[test]
fn test_forced_linear_mode_warns_about_skipped_edges() {
    let g = graph(
        vec![
            input("in"),
            agent("a-1", "Planner"),
            agent("a-2", "Writer"),
            output("out"),
        ],
        vec![feed("in", "a-1"), flow("a-1", "a-2"), sink("a-2", "out")],
    );
    let output = Compiler::builder(g)
        .with_mode(GenerationMode::Linear)
        .with_header(false)
        .build()
        .compile();
    assert!(output.is_success());
    assert_eq!(output.mode, Some(GenerationMode::Linear));
    assert!(!output.source_text.contains("GraphBuilder"));
    assert!(output.warnings.iter().any(|w| {
        w == "Linear mode runs a single node; the connection from 'Planner' to 'Writer' is not executed"
    }));
}

#[test]
fn test_graph_container_with_limits() {
    let config = GraphConfig {
        execution_timeout: Some(60.0),
        max_node_executions: Some(10),
        ..Default::default()
    };
    let g = graph(
        vec![
            input("in"),
            graph_container("g-1", "Pipeline", config),
            agent("a-1", "Drafter"),
            agent("a-2", "Editor"),
            output("out"),
        ],
        vec![
            feed("in", "g-1"),
            member("g-1", "a-1"),
            member("g-1", "a-2"),
            flow("a-1", "a-2"),
            sink("g-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    assert_eq!(output.mode, Some(GenerationMode::Linear));
    let source = &output.source_text;
    assert!(source.contains("pipeline_builder = GraphBuilder()\n"));
    assert!(source.contains("pipeline_builder.add_edge(\"drafter\", \"editor\")\n"));
    assert!(source.contains("pipeline_builder.set_entry_point(\"drafter\")\n"));
    assert!(source.contains("pipeline_builder.set_execution_timeout(60.0)\n"));
    assert!(source.contains("pipeline_builder.set_max_node_executions(10)\n"));
    assert!(source.contains("pipeline_graph = pipeline_builder.build()\n"));
    assert!(source.contains("result = pipeline_graph(prompt)"));
    assert!(source.contains("result.execution_order"));
}

#[test]
fn test_streaming_agent_streams_events() {
    let config = AgentConfig {
        streaming: true,
        ..Default::default()
    };
    let g = graph(
        vec![input("in"), agent_with("agent-1", "Assistant", config), output("out")],
        vec![feed("in", "agent-1"), sink("agent-1", "out")],
    );
    let output = compile(g);
    assert!(output.is_success());
    assert!(
        output
            .source_text
            .contains("async for event in assistant_agent.stream_async(prompt):")
    );
}

#[test]
fn test_input_default_content_becomes_fallback_prompt() {
    let g = graph(
        vec![
            input_with_default("in", "Plan my week"),
            agent("agent-1", "Assistant"),
            output("out"),
        ],
        vec![feed("in", "agent-1"), sink("agent-1", "out")],
    );
    let output = Compiler::builder(g)
        .with_default_prompt("unused")
        .with_header(false)
        .build()
        .compile();
    assert!(output.source_text.contains("prompt = \"Plan my week\""));
    assert!(!output.source_text.contains("unused"));
}

#[test]
fn test_openai_provider_reads_key_from_environment() {
    let config = AgentConfig {
        model: ModelConfig {
            provider: Provider::OpenAi,
            model_id: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let g = graph(
        vec![input("in"), agent_with("agent-1", "Assistant", config), output("out")],
        vec![feed("in", "agent-1"), sink("agent-1", "out")],
    );
    let output = compile(g);
    let source = &output.source_text;
    assert!(source.contains("import os\n"));
    assert!(source.contains("from strands.models.openai import OpenAIModel\n"));
    assert!(source.contains("os.environ.get(\"OPENAI_API_KEY\")"));
    assert!(source.contains("model_id=\"gpt-4o-mini\""));
}

#[test]
fn test_environment_references_in_server_headers() {
    let mut server = http_server("srv-1", "Api", "https://api.example.com/mcp");
    if let NodeKind::McpServer(config) = &mut server.kind {
        config
            .headers
            .insert("Authorization".to_string(), "Bearer ${API_TOKEN}".to_string());
    }
    let g = graph(
        vec![input("in"), agent("agent-1", "Assistant"), server, output("out")],
        vec![
            feed("in", "agent-1"),
            attach("srv-1", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.is_success(), "errors: {:?}", output.errors);
    let source = &output.source_text;
    assert!(source.contains("import os\n"));
    assert!(source.contains("\"Bearer \" + os.environ.get(\"API_TOKEN\", \"\")"));
    assert!(!source.contains("${API_TOKEN}"));
}

#[test]
fn test_missing_tool_is_a_resource_error() {
    let g = graph(
        vec![input("in"), agent("agent-1", "Assistant"), output("out")],
        vec![
            feed("in", "agent-1"),
            attach("ghost-tool-9999", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(output.validation.valid);
    assert!(!output.is_success());
    assert!(output.source_text.is_empty());
    assert_eq!(
        output.errors,
        vec!["Tool 'ghost-tool-9999' attached to 'Assistant' no longer exists in the workflow".to_string()]
    );
}

#[test]
fn test_server_without_command_is_misconfigured() {
    let server = NodeDefinition::new(
        "srv-1",
        "Broken",
        NodeKind::McpServer(McpServerConfig::default()),
    );
    let g = graph(
        vec![input("in"), agent("agent-1", "Assistant"), server, output("out")],
        vec![
            feed("in", "agent-1"),
            attach("srv-1", "agent-1"),
            sink("agent-1", "out"),
        ],
    );
    let output = compile(g);
    assert!(!output.is_success());
    assert!(output.errors[0].starts_with("Tool server 'Broken' is misconfigured"));
}

struct FactoryAgent;

impl PatternExpander for FactoryAgent {
    fn pattern(&self) -> Pattern {
        Pattern::Agent
    }

    fn expand(
        &self,
        node: &NodeDefinition,
        _site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> std::result::Result<Vec<kousei::codegen::Stmt>, CompileError> {
        let var = cx.instance_name(&node.id)?;
        Ok(vec![kousei::codegen::Stmt::Line(format!(
            "{} = make_agent({:?})",
            var, node.label
        ))])
    }
}

#[test]
fn test_custom_expander_replaces_default() {
    let output = Compiler::builder(simple_workflow())
        .with_expander(Box::new(FactoryAgent))
        .with_header(false)
        .build()
        .compile();
    assert!(output.is_success());
    assert!(
        output
            .source_text
            .contains("assistant_agent = make_agent(\"Assistant\")\n")
    );
    assert!(!output.source_text.contains("Agent("));
}

struct ExplodingAgent;

impl PatternExpander for ExplodingAgent {
    fn pattern(&self) -> Pattern {
        Pattern::Agent
    }

    fn expand(
        &self,
        _node: &NodeDefinition,
        _site: &Site,
        _cx: &mut GenContext<'_, '_>,
    ) -> std::result::Result<Vec<kousei::codegen::Stmt>, CompileError> {
        panic!("expander bug");
    }
}

#[test]
fn test_expander_panic_becomes_one_internal_error() {
    let output = Compiler::builder(simple_workflow())
        .with_expander(Box::new(ExplodingAgent))
        .build()
        .compile();
    assert!(!output.is_success());
    assert_eq!(
        output.errors,
        vec!["Code generation failed: unexpected failure while expanding the workflow".to_string()]
    );
    assert!(output.source_text.is_empty());
    assert!(output.imports.is_empty());
    assert!(output.execution_root.is_none());
    assert!(output.validation.valid);
}

#[test]
fn test_output_serializes_camel_case() {
    let output = compile(simple_workflow());
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["executionRoot"], serde_json::json!("agent-1"));
    assert_eq!(json["mode"], serde_json::json!("linear"));
    assert!(json["sourceText"].as_str().unwrap().contains("assistant_agent"));
    assert_eq!(json["validation"]["valid"], serde_json::json!(true));
}
