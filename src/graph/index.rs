use super::definition::{EdgeDefinition, GraphDefinition, NodeDefinition, NodeKind};
use super::handle::Handle;
use ahash::AHashMap;
use indexmap::IndexMap;

/// What an edge means once its endpoint kinds and handles are taken into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRole {
    /// Executable `output` into executable `user-input`.
    DataFlow,
    /// Input node into an executable's `user-input`.
    InputFeed,
    /// Tool, custom tool or tool server into an executable's `tools`.
    ToolAttachment,
    /// Composite `sub-agents` into a member's `orchestrator-input`.
    Membership,
    /// Executable into an output node.
    OutputSink,
}

/// An edge that was excluded from analysis, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEdge {
    pub index: usize,
    pub reason: String,
}

/// Read-only lookup structure over a `GraphDefinition`.
///
/// Every list is kept in edge declaration order so that anything derived from
/// the index is deterministic.
pub struct GraphIndex<'a> {
    graph: &'a GraphDefinition,
    positions: AHashMap<&'a str, usize>,
    roles: Vec<Option<EdgeRole>>,
    data_out: IndexMap<&'a str, Vec<&'a str>>,
    data_in: IndexMap<&'a str, Vec<&'a str>>,
    input_feeds: IndexMap<&'a str, Vec<&'a str>>,
    tools: IndexMap<&'a str, Vec<&'a str>>,
    members: IndexMap<&'a str, Vec<&'a str>>,
    parents: IndexMap<&'a str, Vec<&'a str>>,
    outgoing: AHashMap<&'a str, usize>,
    incoming: AHashMap<&'a str, usize>,
    ill_typed: Vec<RejectedEdge>,
    dangling: Vec<RejectedEdge>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(graph: &'a GraphDefinition) -> Self {
        let positions = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut index = Self {
            graph,
            positions,
            roles: Vec::with_capacity(graph.edges.len()),
            data_out: IndexMap::new(),
            data_in: IndexMap::new(),
            input_feeds: IndexMap::new(),
            tools: IndexMap::new(),
            members: IndexMap::new(),
            parents: IndexMap::new(),
            outgoing: AHashMap::new(),
            incoming: AHashMap::new(),
            ill_typed: Vec::new(),
            dangling: Vec::new(),
        };

        for (i, edge) in graph.edges.iter().enumerate() {
            let role = index.index_edge(i, edge);
            index.roles.push(role);
        }
        index
    }

    fn index_edge(&mut self, i: usize, edge: &'a EdgeDefinition) -> Option<EdgeRole> {
        let source = self.node(&edge.source);
        let target = self.node(&edge.target);

        let (source, target) = match (source, target) {
            (Some(s), Some(t)) => (s, t),
            (None, Some(t)) if edge.target_handle == Handle::Tools && t.kind.is_executable() => {
                // A deleted tool is still recorded so generation can name it.
                push_unique(&mut self.tools, t.id.as_str(), edge.source.as_str());
                return Some(EdgeRole::ToolAttachment);
            }
            (s, _) => {
                let missing = if s.is_none() { &edge.source } else { &edge.target };
                self.dangling.push(RejectedEdge {
                    index: i,
                    reason: format!("references missing node '{}'", missing),
                });
                return None;
            }
        };

        *self.outgoing.entry(source.id.as_str()).or_default() += 1;
        *self.incoming.entry(target.id.as_str()).or_default() += 1;

        match classify(source, edge, target) {
            Ok(role) => {
                let (s, t) = (source.id.as_str(), target.id.as_str());
                match role {
                    EdgeRole::DataFlow => {
                        push_unique(&mut self.data_out, s, t);
                        push_unique(&mut self.data_in, t, s);
                    }
                    EdgeRole::InputFeed => push_unique(&mut self.input_feeds, t, s),
                    EdgeRole::ToolAttachment => push_unique(&mut self.tools, t, s),
                    EdgeRole::Membership => {
                        push_unique(&mut self.members, s, t);
                        push_unique(&mut self.parents, t, s);
                    }
                    EdgeRole::OutputSink => {}
                }
                Some(role)
            }
            Err(reason) => {
                self.ill_typed.push(RejectedEdge { index: i, reason });
                None
            }
        }
    }

    pub fn graph(&self) -> &'a GraphDefinition {
        self.graph
    }

    pub fn node(&self, id: &str) -> Option<&'a NodeDefinition> {
        self.positions.get(id).map(|&i| &self.graph.nodes[i])
    }

    /// Declaration position of a node, used to keep derived orders stable.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &'a NodeDefinition> + 'a {
        self.graph.nodes.iter()
    }

    pub fn executables(&self) -> impl Iterator<Item = &'a NodeDefinition> + 'a {
        self.graph.nodes.iter().filter(|n| n.kind.is_executable())
    }

    /// Executables that are not composed into another node.
    pub fn top_level_executables(&self) -> Vec<&'a NodeDefinition> {
        self.executables().filter(|n| !self.is_member(&n.id)).collect()
    }

    pub fn role(&self, edge_index: usize) -> Option<EdgeRole> {
        self.roles.get(edge_index).copied().flatten()
    }

    pub fn data_successors(&self, id: &str) -> &[&'a str] {
        self.data_out.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn data_predecessors(&self, id: &str) -> &[&'a str] {
        self.data_in.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn input_feeds(&self, id: &str) -> &[&'a str] {
        self.input_feeds.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of tool nodes attached to an executable. May include ids of deleted nodes.
    pub fn tools(&self, id: &str) -> &[&'a str] {
        self.tools.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn members(&self, id: &str) -> &[&'a str] {
        self.members.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents(&self, id: &str) -> &[&'a str] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_member(&self, id: &str) -> bool {
        !self.parents(id).is_empty()
    }

    pub fn outgoing_count(&self, id: &str) -> usize {
        self.outgoing.get(id).copied().unwrap_or(0)
    }

    pub fn incoming_count(&self, id: &str) -> usize {
        self.incoming.get(id).copied().unwrap_or(0)
    }

    pub fn ill_typed(&self) -> &[RejectedEdge] {
        &self.ill_typed
    }

    pub fn dangling(&self) -> &[RejectedEdge] {
        &self.dangling
    }
}

/// Decides the role of an edge from its endpoint kinds and handles.
fn classify(
    source: &NodeDefinition,
    edge: &EdgeDefinition,
    target: &NodeDefinition,
) -> Result<EdgeRole, String> {
    match (&source.kind, &target.kind) {
        (NodeKind::Output(_), _) => Err("output nodes cannot feed other nodes".to_string()),
        (NodeKind::Input(_), NodeKind::Output(_)) => {
            Err("an input cannot be wired straight to an output".to_string())
        }
        (NodeKind::Input(_), t) if t.is_executable() => match edge.target_handle {
            Handle::UserInput => Ok(EdgeRole::InputFeed),
            ref other => Err(format!("input nodes must feed a 'user-input' handle, not '{}'", other)),
        },
        (s, _) if s.is_tool() => {
            if !target.kind.is_executable() {
                return Err("tools can only be attached to agents".to_string());
            }
            match edge.target_handle {
                Handle::Tools => Ok(EdgeRole::ToolAttachment),
                ref other => Err(format!("tools must feed a 'tools' handle, not '{}'", other)),
            }
        }
        (s, NodeKind::Output(_)) if s.is_executable() => Ok(EdgeRole::OutputSink),
        (s, t) if s.is_executable() && t.is_executable() => {
            match (&edge.source_handle, &edge.target_handle) {
                (Handle::SubAgents, Handle::OrchestratorInput) if s.is_composite() => {
                    Ok(EdgeRole::Membership)
                }
                (Handle::SubAgents, _) | (_, Handle::OrchestratorInput) => Err(
                    "composition must link 'sub-agents' to 'orchestrator-input'".to_string(),
                ),
                (Handle::Tools | Handle::ToolOutput, _) => {
                    Err("agents cannot be used as tool nodes".to_string())
                }
                (_, Handle::UserInput) => Ok(EdgeRole::DataFlow),
                (_, other) => Err(format!("agents cannot receive data on '{}'", other)),
            }
        }
        _ => Err(format!(
            "a {} cannot be connected to a {}",
            source.kind.slug(),
            target.kind.slug()
        )),
    }
}

fn push_unique<'a>(map: &mut IndexMap<&'a str, Vec<&'a str>>, key: &'a str, value: &'a str) {
    let list = map.entry(key).or_default();
    if !list.contains(&value) {
        list.push(value);
    }
}
