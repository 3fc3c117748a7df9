//! Pattern expanders: one per kind of executable node, each turning a node into
//! the statements that construct it.

pub mod agent;
pub mod graph;
pub mod orchestrator;
pub mod swarm;
pub mod wrapper;

use super::context::{GenContext, Site};
use crate::codegen::Stmt;
use crate::error::CompileError;
use crate::graph::{NodeDefinition, NodeKind};
use ahash::AHashMap;

pub use agent::AgentExpander;
pub use graph::GraphExpander;
pub use orchestrator::OrchestratorExpander;
pub use swarm::SwarmExpander;

/// The composition patterns the compiler knows how to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Agent,
    Orchestrator,
    Swarm,
    Graph,
}

impl Pattern {
    pub fn of(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Agent(_) => Some(Pattern::Agent),
            NodeKind::Orchestrator(_) => Some(Pattern::Orchestrator),
            NodeKind::Swarm(_) => Some(Pattern::Swarm),
            NodeKind::Graph(_) => Some(Pattern::Graph),
            _ => None,
        }
    }
}

/// Defines the contract for turning one executable node into statements.
///
/// `expand` returns the statements that bind the node's instance variable
/// (`GenContext::instance_name`). Anything the node depends on is requested
/// from the context, which places it at the right site before the node.
pub trait PatternExpander: Send + Sync {
    fn pattern(&self) -> Pattern;
    fn expand(
        &self,
        node: &NodeDefinition,
        site: &Site,
        cx: &mut GenContext<'_, '_>,
    ) -> Result<Vec<Stmt>, CompileError>;
}

pub type ExpanderRegistry = AHashMap<Pattern, Box<dyn PatternExpander>>;

pub(crate) fn register_default_expanders(registry: &mut ExpanderRegistry) {
    let defaults: [Box<dyn PatternExpander>; 4] = [
        Box::new(AgentExpander),
        Box::new(OrchestratorExpander),
        Box::new(SwarmExpander),
        Box::new(GraphExpander),
    ];
    for expander in defaults {
        registry.insert(expander.pattern(), expander);
    }
}

fn unexpected(node: &NodeDefinition, expected: Pattern) -> CompileError {
    CompileError::Internal(format!(
        "{:?} expander received '{}', a {}",
        expected,
        node.display_name(),
        node.kind.slug()
    ))
}
