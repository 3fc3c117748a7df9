//! Resolution of tool attachments into the symbols the generated program uses.

use crate::diagnostics::{Diagnostics, name_of};
use crate::error::CompileError;
use crate::graph::{GraphIndex, McpServerConfig, McpTransport, NodeKind};
use crate::naming::{Role, SymbolTable};
use ahash::{AHashMap, AHashSet};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Symbols exported by the `strands_tools` package.
pub const BUILTIN_TOOLS: &[&str] = &[
    "agent_graph",
    "batch",
    "calculator",
    "cron",
    "current_time",
    "diagram",
    "editor",
    "environment",
    "file_read",
    "file_write",
    "generate_image",
    "http_request",
    "image_reader",
    "journal",
    "load_tool",
    "mem0_memory",
    "memory",
    "nova_reels",
    "python_repl",
    "retrieve",
    "shell",
    "sleep",
    "slack",
    "speak",
    "stop",
    "think",
    "use_aws",
    "use_llm",
];

/// Used when a built-in tool name is not recognised.
pub const FALLBACK_TOOL: &str = "current_time";

/// Names the generated program binds itself, outside of node symbols.
const PROGRAM_NAMES: &[&str] = &[
    "main", "prompt", "messages", "user_input", "history", "response", "result", "event",
    "query", "args", "parser", "last", "node", "node_id", "node_result", "argparse", "asyncio",
    "json", "os", "Agent", "tool", "Swarm", "GraphBuilder", "MCPClient",
];

static DECORATED_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*@(?:strands\.)?tool\b[^\n]*\n(?:[ \t]*@[^\n]*\n)*[ \t]*(?:async[ \t]+)?def[ \t]+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("valid pattern")
});

static PLAIN_FN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:async[ \t]+)?def[ \t]+([A-Za-z_][A-Za-z0-9_]*)").expect("valid pattern")
});

/// A tool server whose tools are listed when the program runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRef {
    pub server_id: String,
    pub client_symbol: String,
}

/// The tools attached to one executable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTools {
    /// Built-in symbols and custom tools, in attachment order.
    pub inline_tools: Vec<InlineTool>,
    pub server_backed: Vec<ServerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InlineTool {
    /// A `strands_tools` symbol.
    Builtin(&'static str),
    /// The id of a custom tool node.
    Custom(String),
}

/// What a custom tool's code declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomToolInfo {
    /// The function the code declares, if any.
    pub function: Option<String>,
    /// Whether the function already carries the `@tool` decorator.
    pub decorated: bool,
    /// The code, dedented.
    pub code: String,
}

/// Per-compile view of every tool node.
#[derive(Debug, Default)]
pub struct ToolResolver {
    builtins: AHashMap<String, &'static str>,
    custom: IndexMap<String, CustomToolInfo>,
}

impl ToolResolver {
    /// Scans every tool node once. Unknown built-ins and custom tools without a
    /// function are reported here, so each produces a single warning.
    pub fn new(index: &GraphIndex<'_>, diagnostics: &mut Diagnostics) -> Self {
        let mut builtins = AHashMap::new();
        let mut custom = IndexMap::new();
        let mut functions: AHashMap<String, String> = AHashMap::new();

        for node in index.nodes() {
            match &node.kind {
                NodeKind::BuiltinTool(config) => {
                    let requested = if config.tool_name.trim().is_empty() {
                        node.label.as_str()
                    } else {
                        config.tool_name.as_str()
                    };
                    let symbol = match builtin_symbol(requested) {
                        Some(symbol) => symbol,
                        None => {
                            warn!(node_id = %node.id, requested, "unknown built-in tool");
                            diagnostics.warning(format!(
                                "Unknown built-in tool '{}' on '{}'; using {} instead",
                                requested,
                                node.display_name(),
                                FALLBACK_TOOL
                            ));
                            FALLBACK_TOOL
                        }
                    };
                    builtins.insert(node.id.clone(), symbol);
                }
                NodeKind::CustomTool(config) => {
                    let info = scan_custom_tool(&config.code);
                    match &info.function {
                        Some(function) => {
                            if let Some(previous) =
                                functions.insert(function.clone(), node.display_name())
                            {
                                diagnostics.warning(format!(
                                    "Custom tools '{}' and '{}' both define '{}'; the later definition wins",
                                    previous,
                                    node.display_name(),
                                    function
                                ));
                            }
                        }
                        None => diagnostics.warning(format!(
                            "Custom tool '{}' defines no function; a placeholder was generated",
                            node.display_name()
                        )),
                    }
                    debug!(node_id = %node.id, function = ?info.function, "scanned custom tool");
                    custom.insert(node.id.clone(), info);
                }
                _ => {}
            }
        }

        Self { builtins, custom }
    }

    /// Names generated identifiers must not collide with, in any role.
    pub fn reserved_names(&self) -> AHashSet<String> {
        PROGRAM_NAMES
            .iter()
            .chain(BUILTIN_TOOLS)
            .map(|s| s.to_string())
            .chain(self.custom.values().filter_map(|info| info.function.clone()))
            .collect()
    }

    pub fn custom_tool(&self, node_id: &str) -> Option<&CustomToolInfo> {
        self.custom.get(node_id)
    }

    /// Resolves the tools attached to an executable.
    ///
    /// Fails when an attachment points at a node that no longer exists.
    pub fn resolve(
        &self,
        index: &GraphIndex<'_>,
        symbols: &SymbolTable,
        consumer: &str,
    ) -> Result<ResolvedTools, CompileError> {
        let mut inline: IndexSet<InlineTool> = IndexSet::new();
        let mut servers = Vec::new();

        for &tool_id in index.tools(consumer) {
            let Some(node) = index.node(tool_id) else {
                return Err(CompileError::MissingResource {
                    consumer: name_of(index, consumer),
                    missing_id: tool_id.to_string(),
                });
            };
            match &node.kind {
                NodeKind::BuiltinTool(_) => {
                    let symbol = self.builtins.get(tool_id).copied().unwrap_or(FALLBACK_TOOL);
                    inline.insert(InlineTool::Builtin(symbol));
                }
                NodeKind::CustomTool(_) => {
                    inline.insert(InlineTool::Custom(tool_id.to_string()));
                }
                NodeKind::McpServer(_) => {
                    let client_symbol = symbols.name(tool_id, Role::Client).ok_or_else(|| {
                        CompileError::Internal(format!("no identifier for server '{}'", tool_id))
                    })?;
                    servers.push(ServerRef {
                        server_id: tool_id.to_string(),
                        client_symbol,
                    });
                }
                _ => {}
            }
        }

        Ok(ResolvedTools {
            inline_tools: inline.into_iter().collect(),
            server_backed: servers,
        })
    }
}

/// Maps a user-written tool name onto a `strands_tools` symbol, ignoring case
/// and separators.
pub fn builtin_symbol(name: &str) -> Option<&'static str> {
    let last = name.trim().rsplit('.').next().unwrap_or_default();
    let normalized: String = last
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    if normalized.is_empty() {
        return None;
    }
    BUILTIN_TOOLS
        .iter()
        .copied()
        .find(|symbol| symbol.replace('_', "") == normalized)
}

/// Finds the function a custom tool declares: the decorated one first, then
/// the first top-level `def`.
pub fn scan_custom_tool(code: &str) -> CustomToolInfo {
    let code = dedent(code);
    if let Some(name) = DECORATED_FN.captures(&code).and_then(|c| c.get(1)) {
        return CustomToolInfo {
            function: Some(name.as_str().to_string()),
            decorated: true,
            code,
        };
    }
    let function = PLAIN_FN
        .captures(&code)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    CustomToolInfo {
        function,
        decorated: false,
        code,
    }
}

fn dedent(code: &str) -> String {
    let lines: Vec<&str> = code.lines().map(str::trim_end).collect();
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let body: Vec<&str> = lines
        .iter()
        .map(|l| if l.trim().is_empty() { "" } else { &l[margin..] })
        .collect();
    body.join("\n").trim_matches('\n').to_string()
}

/// Checks that a server has what its transport needs to start.
pub fn check_server(
    index: &GraphIndex<'_>,
    server_id: &str,
    config: &McpServerConfig,
) -> Result<(), CompileError> {
    let missing = match config.transport {
        McpTransport::Stdio => config
            .command
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
            .then_some("a stdio server needs a command"),
        McpTransport::StreamableHttp | McpTransport::Sse => config
            .url
            .as_deref()
            .is_none_or(|u| u.trim().is_empty())
            .then_some("an HTTP server needs a url"),
    };
    match missing {
        Some(message) => Err(CompileError::InvalidServerConfig {
            server: name_of(index, server_id),
            message: message.to_string(),
        }),
        None => Ok(()),
    }
}
