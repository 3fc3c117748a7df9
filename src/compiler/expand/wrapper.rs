//! Agent-as-tool: exposes an executable node as a callable tool function.
//!
//! The wrapped node and every member it composes are constructed inside the
//! function body on every call, so calls never share state. A wrapper defined
//! at module level whose node needs tool servers opens those servers itself,
//! for the duration of the call.

use crate::codegen::literal::{py_docstring, py_str};
use crate::codegen::{Stmt, layout};
use crate::compiler::context::{GenContext, Site};
use crate::error::CompileError;
use crate::graph::{NodeDefinition, NodeKind};
use crate::naming::Role;

pub(crate) fn expand(
    cx: &mut GenContext<'_, '_>,
    id: &str,
    site: &Site,
) -> Result<Vec<Stmt>, CompileError> {
    let node = cx.node(id)?;
    let name = cx.name(id, Role::Tool)?;
    let needs_scope = cx.scoping.needs_scope(id);
    let self_scoped = !site.is_scoped() && needs_scope;
    let inner = Site::Wrapper {
        owner: id.to_string(),
        scoped: site.is_scoped() || needs_scope,
    };

    let own = cx.instance_stmts(id, &inner)?;
    let mut work = layout(cx.take(&inner));
    if !work.is_empty() {
        work.push(Stmt::Blank);
    }
    work.extend(own);
    work.extend(invocation(&node.kind, &cx.instance_name(id)?));

    let mut body = vec![Stmt::Line(py_docstring(&description(node)))];
    if self_scoped {
        let scoping = cx.scoping;
        let servers: Vec<&str> = scoping
            .closure(id)
            .map(|closure| closure.iter().copied().collect())
            .unwrap_or_default();
        let clients = cx.scope_clients(servers)?;
        body.push(Stmt::block(format!("with {}", clients.join(", ")), work));
    } else {
        body.extend(work);
    }

    Ok(vec![
        Stmt::line("@tool"),
        Stmt::block(format!("def {}(query: str) -> str", name), body),
    ])
}

/// Runs the wrapped instance on the query and returns its final text.
fn invocation(kind: &NodeKind, var: &str) -> Vec<Stmt> {
    let history = match kind {
        NodeKind::Swarm(_) => "node_history",
        NodeKind::Graph(_) => "execution_order",
        _ => {
            return vec![
                Stmt::Line(format!("response = {}(query)", var)),
                Stmt::line("return str(response)"),
            ];
        }
    };
    vec![
        Stmt::Line(format!("result = {}(query)", var)),
        Stmt::block(
            format!("if not result.{}", history),
            vec![Stmt::line("return str(result.status)")],
        ),
        Stmt::Line(format!("last = result.{}[-1].node_id", history)),
        Stmt::line("return str(result.results[last].result)"),
    ]
}

fn description(node: &NodeDefinition) -> String {
    let configured = match &node.kind {
        NodeKind::Agent(config) => config.description.as_deref(),
        NodeKind::Orchestrator(config) => config.agent.description.as_deref(),
        NodeKind::Swarm(config) => config.description.as_deref(),
        NodeKind::Graph(config) => config.description.as_deref(),
        _ => None,
    };
    match configured.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => description.to_string(),
        None => format!("Delegate a task to {}.", node.display_name()),
    }
}

/// Placeholder for a custom tool whose code declares no function.
pub(crate) fn custom_tool_stub(node: &NodeDefinition, function: &str, code: &str) -> Vec<Stmt> {
    let summary = match &node.kind {
        NodeKind::CustomTool(config) => config
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        _ => None,
    }
    .unwrap_or_else(|| format!("Custom tool {}.", node.display_name()));

    let mut body = vec![Stmt::Line(py_docstring(&summary))];
    if !code.trim().is_empty() {
        body.push(Stmt::Comment(code.to_string()));
    }
    body.push(Stmt::Line(format!(
        "return {}",
        py_str(&format!("{} has no implementation yet.", node.display_name()))
    )));

    vec![
        Stmt::line("@tool"),
        Stmt::block(format!("def {}(query: str) -> str", function), body),
    ]
}
