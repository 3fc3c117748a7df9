//! Which tool servers each executable needs open while it runs.

use crate::graph::{GraphIndex, NodeKind};
use ahash::AHashSet;
use indexmap::{IndexMap, IndexSet};

/// Resource closures of every executable.
///
/// The closure of a node is the set of servers attached to it directly plus
/// the closures of all of its members, in first-use order.
#[derive(Debug, Default)]
pub struct Scoping<'a> {
    closures: IndexMap<&'a str, IndexSet<&'a str>>,
}

impl<'a> Scoping<'a> {
    pub fn new(index: &GraphIndex<'a>) -> Self {
        let mut scoping = Self::default();
        for node in index.executables() {
            let mut visiting = AHashSet::new();
            scoping.compute(index, node.id.as_str(), &mut visiting);
        }
        scoping
    }

    fn compute(
        &mut self,
        index: &GraphIndex<'a>,
        id: &'a str,
        visiting: &mut AHashSet<&'a str>,
    ) -> IndexSet<&'a str> {
        if let Some(done) = self.closures.get(id) {
            return done.clone();
        }
        if !visiting.insert(id) {
            return IndexSet::new();
        }

        let mut closure: IndexSet<&'a str> = index
            .tools(id)
            .iter()
            .copied()
            .filter(|tool| matches!(index.node(tool).map(|n| &n.kind), Some(NodeKind::McpServer(_))))
            .collect();
        for &member in index.members(id) {
            closure.extend(self.compute(index, member, visiting));
        }

        visiting.remove(id);
        self.closures.insert(id, closure.clone());
        closure
    }

    pub fn closure(&self, id: &str) -> Option<&IndexSet<&'a str>> {
        self.closures.get(id)
    }

    /// Whether a node needs any server open to run.
    pub fn needs_scope(&self, id: &str) -> bool {
        self.closure(id).is_some_and(|c| !c.is_empty())
    }

    /// The union of several closures, in the order given.
    pub fn union<'s>(&self, ids: impl IntoIterator<Item = &'s str>) -> IndexSet<&'a str> {
        let mut all = IndexSet::new();
        for id in ids {
            if let Some(closure) = self.closure(id) {
                all.extend(closure.iter().copied());
            }
        }
        all
    }
}
