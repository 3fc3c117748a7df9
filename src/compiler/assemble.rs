//! One generation pass: root selection, expansion and final layout.

use super::context::{GenContext, Site};
use super::entry::{EntryPlan, Execution, entry_fragment};
use super::expand::ExpanderRegistry;
use super::expand::graph::build_graph;
use super::options::{CompileOptions, GenerationMode};
use super::scope::Scoping;
use super::tools::ToolResolver;
use crate::codegen::{Fragment, FragmentKind, Stmt, layout, render};
use crate::diagnostics::{Diagnostics, name_of};
use crate::error::CompileError;
use crate::graph::{GraphIndex, NodeKind};
use crate::naming::SymbolTable;
use ahash::AHashSet;
use indexmap::IndexSet;
use tracing::{debug, instrument};

/// Name of the synthetic root in graph mode.
pub const WORKFLOW_GRAPH: &str = "workflow_graph";
const WORKFLOW_BUILDER: &str = "workflow_builder";

pub(crate) struct Generated {
    pub source_text: String,
    pub imports: Vec<String>,
    pub warnings: Vec<String>,
    pub execution_root: String,
    pub mode: GenerationMode,
}

/// Resolves `Auto` against the graph: a dependency graph as soon as two
/// top-level executables are connected by data flow.
pub fn resolve_mode(index: &GraphIndex<'_>, requested: GenerationMode) -> GenerationMode {
    match requested {
        GenerationMode::Auto => {
            let chained = index.top_level_executables().iter().any(|node| {
                index
                    .data_successors(&node.id)
                    .iter()
                    .any(|next| !index.is_member(next))
            });
            if chained {
                GenerationMode::Graph
            } else {
                GenerationMode::Linear
            }
        }
        mode => mode,
    }
}

/// The node whose execution the entry function drives: the first top-level
/// executable fed by an input node, else the top-level composition of the first
/// fed member, else the first top-level executable, else the first executable.
pub fn select_root<'a>(index: &GraphIndex<'a>) -> Option<&'a str> {
    let fed = |id: &str| !index.input_feeds(id).is_empty();
    index
        .executables()
        .find(|n| !index.is_member(&n.id) && fed(&n.id))
        .map(|n| n.id.as_str())
        .or_else(|| {
            index
                .executables()
                .filter(|n| fed(&n.id))
                .find_map(|n| top_level_ancestor(index, &n.id))
        })
        .or_else(|| {
            index
                .executables()
                .find(|n| !index.is_member(&n.id))
                .map(|n| n.id.as_str())
        })
        .or_else(|| index.executables().next().map(|n| n.id.as_str()))
}

/// The first composition, following parents in declaration order, that is not
/// itself a member of another node.
fn top_level_ancestor<'a>(index: &GraphIndex<'a>, id: &str) -> Option<&'a str> {
    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut stack: Vec<&'a str> = index.parents(id).iter().rev().copied().collect();
    while let Some(parent) = stack.pop() {
        if !seen.insert(parent) {
            continue;
        }
        if !index.is_member(parent) {
            return Some(parent);
        }
        stack.extend(index.parents(parent).iter().rev().copied());
    }
    None
}

#[instrument(level = "debug", skip_all)]
pub(crate) fn generate(
    index: &GraphIndex<'_>,
    options: &CompileOptions,
    expanders: &ExpanderRegistry,
) -> Result<Generated, CompileError> {
    let mode = resolve_mode(index, options.mode);
    let mut diagnostics = Diagnostics::default();
    let tools = ToolResolver::new(index, &mut diagnostics);
    let scoping = Scoping::new(index);

    let root = match mode {
        GenerationMode::Graph => None,
        _ => Some(select_root(index).ok_or_else(|| {
            CompileError::Internal("workflow has no executable node".to_string())
        })?),
    };
    let symbols = SymbolTable::build(index, root, &tools.reserved_names());
    debug!(?mode, ?root, symbols = symbols.len(), "prepared generation");

    let mut cx = GenContext::new(index, &symbols, &tools, &scoping, options, expanders);
    let top_level: Vec<&str> = index
        .top_level_executables()
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();

    let (root_var, execution, servers, prompt_sources) = match root {
        Some(root_id) => {
            let site = if scoping.needs_scope(root_id) {
                Site::Root
            } else {
                Site::TopLevel
            };
            let var = cx.require_instance(root_id, &site)?;
            let execution = match &cx.node(root_id)?.kind {
                NodeKind::Swarm(_) => Execution::Swarm,
                NodeKind::Graph(_) => Execution::Graph,
                kind => match kind.agent_config() {
                    Some(config) if config.streaming => Execution::Streaming,
                    _ => Execution::Blocking,
                },
            };

            for &other in top_level.iter().filter(|&&id| id != root_id) {
                if scoping.needs_scope(other) {
                    cx.require_wrapper(other, &Site::TopLevel)?;
                } else {
                    cx.require_instance(other, &Site::TopLevel)?;
                }
            }
            if options.mode == GenerationMode::Linear {
                warn_unchained(&mut cx, &top_level);
            }

            // An input wired to a member of the root still supplies its prompt.
            let mut prompt_sources = vec![root_id];
            prompt_sources.extend(
                index
                    .executables()
                    .map(|n| n.id.as_str())
                    .filter(|&id| top_level_ancestor(index, id) == Some(root_id)),
            );
            let servers = scoping.union([root_id]);
            (var, execution, servers, prompt_sources)
        }
        None => {
            if top_level.is_empty() {
                return Err(CompileError::Internal(
                    "workflow has no top-level executable".to_string(),
                ));
            }
            let servers = scoping.union(top_level.iter().copied());
            let site = if servers.is_empty() {
                Site::TopLevel
            } else {
                Site::Root
            };
            let stmts = build_graph(
                &mut cx,
                WORKFLOW_BUILDER,
                WORKFLOW_GRAPH,
                &top_level,
                None,
                &site,
            )?;
            cx.emit(&site, Fragment::new(FragmentKind::Composition, None, stmts));
            (
                WORKFLOW_GRAPH.to_string(),
                Execution::Graph,
                servers,
                top_level.clone(),
            )
        }
    };

    let clients = cx.scope_clients(servers.iter().copied())?;
    let scoped = cx.take(&Site::Root);
    if let Some(site) = cx.leftover_scopes().first() {
        return Err(CompileError::Internal(format!(
            "fragments left outside their scope at {:?}",
            site
        )));
    }

    let default_prompt = connected_default(index, &prompt_sources)
        .unwrap_or_else(|| options.default_prompt.clone());
    let entry = entry_fragment(EntryPlan {
        root_var,
        execution,
        default_prompt,
        clients,
        scoped,
    });

    let mut fragments = cx.take(&Site::TopLevel);
    fragments.push(entry);

    let mut stmts = Vec::new();
    if options.header {
        stmts.push(Stmt::comment(
            "Generated by kousei from a workflow graph. Changes are overwritten on the next compile.",
        ));
        stmts.push(Stmt::Blank);
    }
    stmts.extend(cx.imports.stmts());
    stmts.push(Stmt::Blank);
    stmts.extend(layout(fragments));

    diagnostics.extend(cx.diagnostics);
    Ok(Generated {
        source_text: render(&stmts),
        imports: cx.imports.lines(),
        warnings: diagnostics.warnings,
        execution_root: root.unwrap_or(WORKFLOW_GRAPH).to_string(),
        mode,
    })
}

/// The default content of the first input node feeding one of `ids`.
fn connected_default(index: &GraphIndex<'_>, ids: &[&str]) -> Option<String> {
    let feeds: IndexSet<&str> = ids
        .iter()
        .flat_map(|id| index.input_feeds(id).iter().copied())
        .collect();
    feeds.into_iter().find_map(|feed| match &index.node(feed)?.kind {
        NodeKind::Input(config) => config
            .default_content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        _ => None,
    })
}

fn warn_unchained(cx: &mut GenContext<'_, '_>, top_level: &[&str]) {
    let index = cx.index;
    for &from in top_level {
        for &to in index.data_successors(from) {
            cx.diagnostics.warning(format!(
                "Linear mode runs a single node; the connection from '{}' to '{}' is not executed",
                name_of(index, from),
                name_of(index, to)
            ));
        }
    }
}
