use super::{Pattern, PatternExpander, unexpected};
use crate::codegen::literal::{py_float, py_str};
use crate::codegen::{Arg, Stmt};
use crate::compiler::context::{GenContext, Site};
use crate::error::CompileError;
use crate::graph::{GraphConfig, NodeDefinition, NodeKind};
use crate::naming::Role;
use indexmap::IndexSet;

/// An explicit dependency graph over the container's members.
pub struct GraphExpander;

impl PatternExpander for GraphExpander {
    fn pattern(&self) -> Pattern {
        Pattern::Graph
    }

    fn expand(
        &self,
        node: &NodeDefinition,
        site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> Result<Vec<Stmt>, CompileError> {
        let NodeKind::Graph(config) = &node.kind else {
            return Err(unexpected(node, Pattern::Graph));
        };

        let index = cx.index;
        let members = index.members(&node.id);
        if members.is_empty() {
            return Err(CompileError::InvalidComposition {
                node: node.display_name(),
                message: "a graph needs at least one member".to_string(),
            });
        }

        let builder = cx.name(&node.id, Role::Builder)?;
        let graph = cx.name(&node.id, Role::Graph)?;
        build_graph(cx, &builder, &graph, members, Some(config), site)
    }
}

/// Emits a `GraphBuilder` over `members`.
///
/// Edges mirror the data flow between members; every member without a
/// predecessor among them becomes an entry point.
pub fn build_graph(
    cx: &mut GenContext<'_, '_>,
    builder: &str,
    graph: &str,
    members: &[&str],
    config: Option<&GraphConfig>,
    site: &Site,
) -> Result<Vec<Stmt>, CompileError> {
    let index = cx.index;
    let in_graph: IndexSet<&str> = members.iter().copied().collect();

    let mut stmts = vec![Stmt::Line(format!("{} = GraphBuilder()", builder))];
    for &member in &in_graph {
        let member_site = cx.instance_site_for(member, site);
        let var = cx.require_instance(member, &member_site)?;
        stmts.push(Stmt::call(
            format!("{}.add_node", builder),
            vec![Arg::positional(var), Arg::positional(py_str(cx.ident(member)?))],
        ));
    }

    for &member in &in_graph {
        for &next in index.data_successors(member) {
            if in_graph.contains(next) {
                stmts.push(Stmt::call(
                    format!("{}.add_edge", builder),
                    vec![
                        Arg::positional(py_str(cx.ident(member)?)),
                        Arg::positional(py_str(cx.ident(next)?)),
                    ],
                ));
            }
        }
    }

    for &member in &in_graph {
        let has_predecessor = index
            .data_predecessors(member)
            .iter()
            .any(|pred| in_graph.contains(pred));
        if !has_predecessor {
            stmts.push(Stmt::call(
                format!("{}.set_entry_point", builder),
                vec![Arg::positional(py_str(cx.ident(member)?))],
            ));
        }
    }

    if let Some(config) = config {
        if let Some(timeout) = config.execution_timeout {
            stmts.push(Stmt::call(
                format!("{}.set_execution_timeout", builder),
                vec![Arg::positional(py_float(timeout))],
            ));
        }
        if let Some(timeout) = config.node_timeout {
            stmts.push(Stmt::call(
                format!("{}.set_node_timeout", builder),
                vec![Arg::positional(py_float(timeout))],
            ));
        }
        if let Some(limit) = config.max_node_executions {
            stmts.push(Stmt::call(
                format!("{}.set_max_node_executions", builder),
                vec![Arg::positional(limit.to_string())],
            ));
        }
        if config.reset_on_revisit {
            stmts.push(Stmt::call(
                format!("{}.reset_on_revisit", builder),
                vec![Arg::positional("True")],
            ));
        }
    }

    stmts.push(Stmt::Line(format!("{} = {}.build()", graph, builder)));
    cx.imports.graph_builder = true;
    Ok(stmts)
}
