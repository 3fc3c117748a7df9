use super::{Pattern, PatternExpander, unexpected};
use crate::codegen::literal::{py_float, py_list};
use crate::codegen::{Arg, Stmt};
use crate::compiler::context::{GenContext, Site};
use crate::diagnostics::name_of;
use crate::error::CompileError;
use crate::graph::{NodeDefinition, NodeKind, SwarmConfig};
use crate::naming::sanitize;

/// A team of agents that hand work to each other.
pub struct SwarmExpander;

impl PatternExpander for SwarmExpander {
    fn pattern(&self) -> Pattern {
        Pattern::Swarm
    }

    fn expand(
        &self,
        node: &NodeDefinition,
        site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> Result<Vec<Stmt>, CompileError> {
        let NodeKind::Swarm(config) = &node.kind else {
            return Err(unexpected(node, Pattern::Swarm));
        };

        let index = cx.index;
        let members = index.members(&node.id);
        if members.is_empty() {
            return Err(CompileError::InvalidComposition {
                node: node.display_name(),
                message: "a swarm needs at least one member agent".to_string(),
            });
        }

        let mut vars = Vec::with_capacity(members.len());
        for &member in members {
            let member_node = cx.node(member)?;
            if !matches!(
                member_node.kind,
                NodeKind::Agent(_) | NodeKind::Orchestrator(_)
            ) {
                return Err(CompileError::InvalidComposition {
                    node: node.display_name(),
                    message: format!(
                        "'{}' is a {}; swarm members must be agents or orchestrators",
                        name_of(index, member),
                        member_node.kind.slug()
                    ),
                });
            }
            let member_site = cx.instance_site_for(member, site);
            vars.push((member, cx.require_instance(member, &member_site)?));
        }

        let mut args = vec![Arg::positional(py_list(
            &vars.iter().map(|(_, var)| var.clone()).collect::<Vec<_>>(),
        ))];

        if let Some(requested) = config.entry_point.as_deref().filter(|e| !e.trim().is_empty()) {
            match find_entry(cx, &vars, requested) {
                Some(var) => args.push(Arg::named("entry_point", var)),
                None => cx.diagnostics.warning(format!(
                    "Swarm '{}' names entry point '{}', which is not one of its members; the first member starts instead",
                    node.display_name(),
                    requested
                )),
            }
        }

        args.extend(bounds(config));
        cx.imports.swarm = true;
        Ok(vec![Stmt::assign(cx.instance_name(&node.id)?, "Swarm", args)])
    }
}

/// Matches a configured entry point by member id, label or identifier.
fn find_entry(cx: &GenContext<'_, '_>, vars: &[(&str, String)], requested: &str) -> Option<String> {
    let wanted = requested.trim();
    vars.iter()
        .find(|(id, _)| {
            *id == wanted
                || cx.index.node(id).is_some_and(|n| n.label.trim() == wanted)
                || cx.symbols.ident(id) == Some(sanitize(wanted).as_str())
        })
        .map(|(_, var)| var.clone())
}

fn bounds(config: &SwarmConfig) -> Vec<Arg> {
    vec![
        Arg::named("max_handoffs", config.max_handoffs.to_string()),
        Arg::named("max_iterations", config.max_iterations.to_string()),
        Arg::named("execution_timeout", py_float(config.execution_timeout)),
        Arg::named("node_timeout", py_float(config.node_timeout)),
        Arg::named(
            "repetitive_handoff_detection_window",
            config.repetitive_handoff_detection_window.to_string(),
        ),
        Arg::named(
            "repetitive_handoff_min_unique_agents",
            config.repetitive_handoff_min_unique_agents.to_string(),
        ),
    ]
}
