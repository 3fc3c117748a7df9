//! Turns free-text labels into valid, collision-free identifiers.

use crate::graph::{GraphIndex, NodeDefinition, NodeKind, last4};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;
use tracing::debug;

const PYTHON_KEYWORDS: &[&str] = &[
    "false", "none", "true", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Bare identifiers the generated program already uses for its own purposes.
const RESERVED_IDENTS: &[&str] = &["workflow"];

/// The role a generated name plays. Every role has its own suffix, so two
/// distinct identifiers can never produce the same emitted name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Agent,
    Model,
    Tool,
    Client,
    Swarm,
    Graph,
    Builder,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Agent,
        Role::Model,
        Role::Tool,
        Role::Client,
        Role::Swarm,
        Role::Graph,
        Role::Builder,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Role::Agent => "_agent",
            Role::Model => "_model",
            Role::Tool => "_tool",
            Role::Client => "_client",
            Role::Swarm => "_swarm",
            Role::Graph => "_graph",
            Role::Builder => "_builder",
        }
    }
}

/// Resolves any string into a syntactically valid identifier.
///
/// Lowercases, replaces every character outside `[a-zA-Z0-9_]` with `_` and
/// collapses runs of underscores. Leading and trailing underscores are dropped,
/// a leading digit gets an `n_` prefix and keywords get a trailing underscore.
/// The function is total: the empty string resolves to `node`.
pub fn sanitize(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('_');
    let mut ident = if trimmed.is_empty() {
        "node".to_string()
    } else {
        trimmed.to_string()
    };
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident = format!("n_{}", ident);
    }
    if PYTHON_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// The short, identifier-safe suffix derived from a node id.
fn id_suffix(id: &str) -> String {
    let tail: String = last4(id)
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let tail = tail.trim_matches('_');
    if tail.is_empty() {
        "x".to_string()
    } else {
        tail.to_string()
    }
}

/// Mapping from node id to generated identifier, built fresh for every compile.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    idents: IndexMap<String, String>,
}

impl SymbolTable {
    /// Allocates identifiers for every node that needs one.
    ///
    /// `root` is allocated first and keeps its bare identifier whenever that
    /// is not reserved. Any other node whose identifier is shared or reserved
    /// gets the id suffix; remaining clashes get a counter.
    pub fn build(index: &GraphIndex<'_>, root: Option<&str>, reserved: &AHashSet<String>) -> Self {
        let needs_symbol = |n: &&NodeDefinition| {
            n.kind.is_executable()
                || matches!(n.kind, NodeKind::CustomTool(_) | NodeKind::McpServer(_))
        };

        let mut order: Vec<&NodeDefinition> = Vec::new();
        if let Some(root_node) = root.and_then(|id| index.node(id)) {
            order.push(root_node);
        }
        order.extend(
            index
                .nodes()
                .filter(needs_symbol)
                .filter(|n| Some(n.id.as_str()) != root),
        );

        let mut base_counts: AHashMap<String, usize> = AHashMap::new();
        for node in &order {
            *base_counts.entry(base_ident(node)).or_default() += 1;
        }

        let is_reserved = |ident: &str| {
            RESERVED_IDENTS.contains(&ident)
                || Role::ALL
                    .iter()
                    .any(|role| reserved.contains(&format!("{}{}", ident, role.suffix())))
        };

        let mut taken: AHashSet<String> = AHashSet::new();
        let mut idents = IndexMap::new();
        for node in order {
            let base = base_ident(node);
            let shared = base_counts.get(&base).copied().unwrap_or(0) > 1;
            let is_root = Some(node.id.as_str()) == root;
            let keep_bare = !is_reserved(&base) && (!shared || is_root) && !taken.contains(&base);

            let candidate = if keep_bare {
                base
            } else {
                format!("{}_{}", base, id_suffix(&node.id))
            };

            let mut ident = candidate.clone();
            let mut counter = 2;
            while taken.contains(&ident) || is_reserved(&ident) {
                ident = format!("{}_{}", candidate, counter);
                counter += 1;
            }

            debug!(node_id = %node.id, ident = %ident, "allocated identifier");
            taken.insert(ident.clone());
            idents.insert(node.id.clone(), ident);
        }

        Self { idents }
    }

    pub fn ident(&self, node_id: &str) -> Option<&str> {
        self.idents.get(node_id).map(String::as_str)
    }

    /// The emitted name of a node in a given role, e.g. `researcher_agent`.
    pub fn name(&self, node_id: &str, role: Role) -> Option<String> {
        self.ident(node_id)
            .map(|ident| format!("{}{}", ident, role.suffix()))
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }
}

fn base_ident(node: &NodeDefinition) -> String {
    if node.label.trim().is_empty() {
        node.kind.slug().to_string()
    } else {
        sanitize(&node.label)
    }
}
