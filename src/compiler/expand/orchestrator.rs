use super::agent::agent_stmts;
use super::{Pattern, PatternExpander, unexpected};
use crate::codegen::Stmt;
use crate::compiler::context::{GenContext, Site};
use crate::error::CompileError;
use crate::graph::{NodeDefinition, NodeKind};

/// An agent that delegates to its members, each exposed to it as a tool.
pub struct OrchestratorExpander;

impl PatternExpander for OrchestratorExpander {
    fn pattern(&self) -> Pattern {
        Pattern::Orchestrator
    }

    fn expand(
        &self,
        node: &NodeDefinition,
        site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> Result<Vec<Stmt>, CompileError> {
        let NodeKind::Orchestrator(config) = &node.kind else {
            return Err(unexpected(node, Pattern::Orchestrator));
        };

        let index = cx.index;
        let members = index.members(&node.id);
        if members.is_empty() {
            cx.diagnostics.warning(format!(
                "Orchestrator '{}' has no sub-agents and will run as a plain agent",
                node.display_name()
            ));
        }

        let mut delegates = Vec::with_capacity(members.len());
        for member in members {
            let member_site = cx.site_for(member, site);
            delegates.push(cx.require_wrapper(member, &member_site)?);
        }

        agent_stmts(
            cx,
            node,
            &config.agent,
            delegates,
            config.coordination_prompt.as_deref(),
        )
    }
}
