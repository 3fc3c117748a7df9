//! Shared state of one generation pass.
//!
//! Fragments are produced on demand: asking for a node's instance or wrapper
//! at a site expands it once, after everything it depends on, so each sink
//! holds its fragments in dependency order.

use super::expand::{ExpanderRegistry, Pattern, wrapper};
use super::options::CompileOptions;
use super::preamble::Imports;
use super::scope::Scoping;
use super::tools::{InlineTool, ResolvedTools, ToolResolver, check_server};
use crate::codegen::{Arg, Fragment, FragmentKind, Stmt};
use crate::codegen::literal::{has_env_reference, py_dict, py_env_value, py_list, py_str};
use crate::diagnostics::{Diagnostics, name_of};
use crate::error::CompileError;
use crate::graph::{GraphIndex, McpServerConfig, McpTransport, NodeDefinition, NodeKind};
use crate::naming::{Role, SymbolTable};
use ahash::AHashSet;
use indexmap::IndexMap;
use tracing::trace;

/// Where a fragment is placed in the generated program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Site {
    /// Module level, outside any open resource scope.
    TopLevel,
    /// Inside the entry function's resource scope.
    Root,
    /// Inside the body of a node's wrapper function, run on every call.
    /// `scoped` is set when the node's servers are open there.
    Wrapper { owner: String, scoped: bool },
}

impl Site {
    pub fn is_scoped(&self) -> bool {
        match self {
            Site::TopLevel => false,
            Site::Root => true,
            Site::Wrapper { scoped, .. } => *scoped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Unit {
    Instance,
    Wrapper,
    Client,
    CustomTool,
}

pub struct GenContext<'c, 'a> {
    pub index: &'c GraphIndex<'a>,
    pub symbols: &'c SymbolTable,
    pub tools: &'c ToolResolver,
    pub scoping: &'c Scoping<'a>,
    pub options: &'c CompileOptions,
    pub imports: Imports,
    pub diagnostics: Diagnostics,
    expanders: &'c ExpanderRegistry,
    sinks: IndexMap<Site, Vec<Fragment>>,
    done: AHashSet<(String, Site, Unit)>,
}

impl<'c, 'a> GenContext<'c, 'a> {
    pub(crate) fn new(
        index: &'c GraphIndex<'a>,
        symbols: &'c SymbolTable,
        tools: &'c ToolResolver,
        scoping: &'c Scoping<'a>,
        options: &'c CompileOptions,
        expanders: &'c ExpanderRegistry,
    ) -> Self {
        Self {
            index,
            symbols,
            tools,
            scoping,
            options,
            imports: Imports::default(),
            diagnostics: Diagnostics::default(),
            expanders,
            sinks: IndexMap::new(),
            done: AHashSet::new(),
        }
    }

    pub fn node(&self, id: &str) -> Result<&'a NodeDefinition, CompileError> {
        self.index
            .node(id)
            .ok_or_else(|| CompileError::Internal(format!("unknown node '{}'", id)))
    }

    /// The emitted name of a node in a role.
    pub fn name(&self, id: &str, role: Role) -> Result<String, CompileError> {
        self.symbols
            .name(id, role)
            .ok_or_else(|| CompileError::Internal(format!("no identifier for '{}'", id)))
    }

    pub fn ident(&self, id: &str) -> Result<&'c str, CompileError> {
        self.symbols
            .ident(id)
            .ok_or_else(|| CompileError::Internal(format!("no identifier for '{}'", id)))
    }

    /// The variable holding a node's constructed instance.
    pub fn instance_name(&self, id: &str) -> Result<String, CompileError> {
        let role = match self.node(id)?.kind {
            NodeKind::Swarm(_) => Role::Swarm,
            NodeKind::Graph(_) => Role::Graph,
            _ => Role::Agent,
        };
        self.name(id, role)
    }

    /// Where a dependency of something placed at `site` goes: into the same
    /// scope when it needs servers, at module level otherwise.
    pub fn site_for(&self, id: &str, site: &Site) -> Site {
        if site.is_scoped() && self.scoping.needs_scope(id) {
            site.clone()
        } else {
            Site::TopLevel
        }
    }

    /// Where the member instances of a composition placed at `site` go.
    /// Inside a wrapper body every member is built per call, next to its
    /// composition.
    pub fn instance_site_for(&self, id: &str, site: &Site) -> Site {
        match site {
            Site::Wrapper { .. } => site.clone(),
            _ => self.site_for(id, site),
        }
    }

    pub fn emit(&mut self, site: &Site, fragment: Fragment) {
        trace!(?site, kind = ?fragment.kind, node_id = ?fragment.node_id, "emit fragment");
        self.sinks.entry(site.clone()).or_default().push(fragment);
    }

    /// Removes and returns everything emitted into a site.
    pub fn take(&mut self, site: &Site) -> Vec<Fragment> {
        self.sinks.shift_remove(site).unwrap_or_default()
    }

    pub(crate) fn leftover_scopes(&self) -> Vec<&Site> {
        self.sinks
            .iter()
            .filter(|(site, fragments)| *site != &Site::TopLevel && !fragments.is_empty())
            .map(|(site, _)| site)
            .collect()
    }

    fn first_request(&mut self, id: &str, site: &Site, unit: Unit) -> bool {
        self.done.insert((id.to_string(), site.clone(), unit))
    }

    /// The statements constructing a node's instance, from the registered expander.
    pub fn instance_stmts(&mut self, id: &str, site: &Site) -> Result<Vec<Stmt>, CompileError> {
        let node = self.node(id)?;
        let pattern = Pattern::of(&node.kind).ok_or_else(|| {
            CompileError::Internal(format!("'{}' is not executable", node.display_name()))
        })?;
        let expanders = self.expanders;
        let expander = expanders.get(&pattern).ok_or_else(|| {
            CompileError::Internal(format!("no expander registered for {:?}", pattern))
        })?;
        expander.expand(node, site, self)
    }

    /// Declares a node's instance at `site` once and returns its variable.
    pub fn require_instance(&mut self, id: &str, site: &Site) -> Result<String, CompileError> {
        let var = self.instance_name(id)?;
        if !self.first_request(id, site, Unit::Instance) {
            return Ok(var);
        }
        let stmts = self.instance_stmts(id, site)?;
        let kind = match self.node(id)?.kind {
            NodeKind::Agent(_) => FragmentKind::Instance,
            _ => FragmentKind::Composition,
        };
        self.emit(site, Fragment::new(kind, Some(id), stmts));
        Ok(var)
    }

    /// Defines a node's agent-as-tool wrapper at `site` once and returns its name.
    pub fn require_wrapper(&mut self, id: &str, site: &Site) -> Result<String, CompileError> {
        let name = self.name(id, Role::Tool)?;
        if !self.first_request(id, site, Unit::Wrapper) {
            return Ok(name);
        }
        let stmts = wrapper::expand(self, id, site)?;
        self.imports.tool = true;
        self.emit(site, Fragment::new(FragmentKind::CallableWrapper, Some(id), stmts));
        Ok(name)
    }

    /// Declares the client of a tool server once, at module level.
    pub fn require_client(&mut self, server_id: &str) -> Result<String, CompileError> {
        let name = self.name(server_id, Role::Client)?;
        if !self.first_request(server_id, &Site::TopLevel, Unit::Client) {
            return Ok(name);
        }
        let NodeKind::McpServer(config) = &self.node(server_id)?.kind else {
            return Err(CompileError::Internal(format!(
                "'{}' is not a tool server",
                name_of(self.index, server_id)
            )));
        };
        check_server(self.index, server_id, config)?;
        let stmt = self.client_stmt(&name, config);
        self.emit(
            &Site::TopLevel,
            Fragment::new(FragmentKind::ResourceClient, Some(server_id), vec![stmt]),
        );
        Ok(name)
    }

    fn client_stmt(&mut self, name: &str, config: &McpServerConfig) -> Stmt {
        self.imports.transport(config.transport);
        let mut transport = match config.transport {
            McpTransport::Stdio => {
                let mut params = vec![format!(
                    "command={}",
                    self.env_value(config.command.as_deref().unwrap_or_default())
                )];
                let args: Vec<String> = config.args.iter().map(|a| self.env_value(a)).collect();
                params.push(format!("args={}", py_list(&args)));
                if !config.env.is_empty() {
                    params.push(format!("env={}", self.env_map(&config.env)));
                }
                format!(
                    "stdio_client(StdioServerParameters({}))",
                    params.join(", ")
                )
            }
            McpTransport::StreamableHttp | McpTransport::Sse => {
                let callee = match config.transport {
                    McpTransport::Sse => "sse_client",
                    _ => "streamablehttp_client",
                };
                let url = self.env_value(config.url.as_deref().unwrap_or_default());
                if config.headers.is_empty() {
                    format!("{}({})", callee, url)
                } else {
                    format!("{}({}, headers={})", callee, url, self.env_map(&config.headers))
                }
            }
        };
        transport.insert_str(0, "lambda: ");

        let mut args = vec![Arg::positional(transport)];
        if let Some(timeout) = config.startup_timeout {
            args.push(Arg::named("startup_timeout", timeout.to_string()));
        }
        Stmt::assign(name, "MCPClient", args)
    }

    fn env_value(&mut self, value: &str) -> String {
        if has_env_reference(value) {
            self.imports.os = true;
        }
        py_env_value(value)
    }

    fn env_map(&mut self, map: &IndexMap<String, String>) -> String {
        let entries: Vec<(String, String)> = map
            .iter()
            .map(|(key, value)| (py_str(key), self.env_value(value)))
            .collect();
        py_dict(&entries)
    }

    /// Declares a custom tool's code once, at module level, and returns the
    /// name of the tool function.
    pub fn require_custom_tool(&mut self, id: &str) -> Result<String, CompileError> {
        let tools = self.tools;
        let info = tools
            .custom_tool(id)
            .ok_or_else(|| CompileError::Internal(format!("unknown custom tool '{}'", id)))?;
        let function = match &info.function {
            Some(function) => function.clone(),
            None => self.name(id, Role::Tool)?,
        };
        if !self.first_request(id, &Site::TopLevel, Unit::CustomTool) {
            return Ok(function);
        }

        self.imports.tool = true;
        let stmts = if info.function.is_some() {
            let mut stmts = vec![Stmt::Line(info.code.clone())];
            if !info.decorated {
                stmts.push(Stmt::Line(format!("{0} = tool({0})", function)));
            }
            stmts
        } else {
            wrapper::custom_tool_stub(self.node(id)?, &function, &info.code)
        };
        self.emit(
            &Site::TopLevel,
            Fragment::new(FragmentKind::CustomTool, Some(id), stmts),
        );
        Ok(function)
    }

    /// Resolves a node's attached tools and declares everything they need.
    /// Returns the entries of its `tools=[...]` list and the tool resolution.
    pub fn tool_entries(&mut self, id: &str) -> Result<(Vec<String>, ResolvedTools), CompileError> {
        let resolved = self.tools.resolve(self.index, self.symbols, id)?;
        let mut entries = Vec::new();
        for tool in &resolved.inline_tools {
            match tool {
                InlineTool::Builtin(symbol) => {
                    self.imports.builtin(*symbol);
                    entries.push(symbol.to_string());
                }
                InlineTool::Custom(tool_id) => {
                    entries.push(self.require_custom_tool(tool_id)?);
                }
            }
        }
        for server in &resolved.server_backed {
            self.require_client(&server.server_id)?;
        }
        Ok((entries, resolved))
    }

    /// The client symbols of a node's resource closure, declaring each client.
    pub fn scope_clients<'s>(
        &mut self,
        servers: impl IntoIterator<Item = &'s str>,
    ) -> Result<Vec<String>, CompileError> {
        servers
            .into_iter()
            .map(|server| self.require_client(server))
            .collect()
    }
}
