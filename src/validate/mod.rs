//! Structural checks over a workflow graph.
//!
//! Every check runs on every call, so a single report lists all problems at
//! once. Only missing node kinds, missing connections and cycles make a graph
//! invalid; everything else is advisory.

mod cycles;

pub use cycles::find_cycles;

use crate::diagnostics::{Diagnostics, name_of};
use crate::graph::{GraphDefinition, GraphIndex, NodeKind};
use ahash::AHashSet;
use indexmap::IndexSet;
use itertools::Itertools;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// Outcome of validating a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Executables with no incoming data flow that are not composed into another node.
    pub entry_points: Vec<String>,
    /// Executables that cannot be reached from the entry points.
    pub disconnected: Vec<String>,
    /// Each cycle as a closed id path, e.g. `[a, b, c, a]`.
    pub cycles: Vec<Vec<String>>,
}

/// Validates a graph definition.
pub fn validate(graph: &GraphDefinition) -> ValidationReport {
    let index = GraphIndex::new(graph);
    Validator::new(&index).run()
}

/// Runs the checks against a prebuilt index.
pub struct Validator<'i, 'a> {
    index: &'i GraphIndex<'a>,
    diagnostics: Diagnostics,
    blocking: Diagnostics,
}

impl<'i, 'a> Validator<'i, 'a> {
    pub fn new(index: &'i GraphIndex<'a>) -> Self {
        Self {
            index,
            diagnostics: Diagnostics::default(),
            blocking: Diagnostics::default(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(mut self) -> ValidationReport {
        self.check_required_kinds();
        self.check_connectivity();
        let cycles = self.check_cycles();
        let entry_points = self.entry_points();
        let disconnected = self.check_reachability(&entry_points);
        self.check_entry_inputs(&entry_points);
        self.check_edges();

        let valid = !self.blocking.has_errors();
        let mut diagnostics = self.blocking;
        diagnostics.extend(self.diagnostics);

        debug!(
            valid,
            errors = diagnostics.errors.len(),
            warnings = diagnostics.warnings.len(),
            "validation finished"
        );

        ValidationReport {
            valid,
            errors: diagnostics.errors,
            warnings: diagnostics.warnings,
            entry_points: entry_points.into_iter().map(str::to_string).collect(),
            disconnected,
            cycles,
        }
    }

    fn check_required_kinds(&mut self) {
        let index = self.index;
        if index.executables().next().is_none() {
            self.blocking.error(
                "Workflow needs at least one agent, orchestrator, swarm or graph node",
            );
        }
        if !index.nodes().any(|n| matches!(n.kind, NodeKind::Input(_))) {
            self.blocking.error("Workflow needs at least one input node");
        }
        if !index.nodes().any(|n| matches!(n.kind, NodeKind::Output(_))) {
            self.blocking.error("Workflow needs at least one output node");
        }
    }

    fn check_connectivity(&mut self) {
        let index = self.index;
        for node in index.nodes() {
            match node.kind {
                NodeKind::Input(_) if index.outgoing_count(&node.id) == 0 => {
                    self.blocking.error(format!(
                        "Input node '{}' is not connected to any node",
                        node.display_name()
                    ));
                }
                NodeKind::Output(_) if index.incoming_count(&node.id) == 0 => {
                    self.blocking.error(format!(
                        "Output node '{}' has no incoming connection",
                        node.display_name()
                    ));
                }
                _ => {}
            }
        }
    }

    fn check_cycles(&mut self) -> Vec<Vec<String>> {
        let index = self.index;
        let executables: Vec<&str> = index.executables().map(|n| n.id.as_str()).collect();

        let data_cycles = find_cycles(&executables, |id| index.data_successors(id));
        for cycle in &data_cycles {
            self.blocking
                .error(format!("Cycle detected: {}", describe(index, cycle)));
        }

        let composition_cycles = find_cycles(&executables, |id| index.members(id));
        for cycle in &composition_cycles {
            self.blocking.error(format!(
                "Composition cycle detected: {}",
                describe(index, cycle)
            ));
        }

        data_cycles.into_iter().chain(composition_cycles).collect()
    }

    /// Executables that start the flow: not composed into another node and with
    /// no incoming data flow.
    pub fn entry_points(&self) -> Vec<&'a str> {
        let index = self.index;
        index
            .executables()
            .filter(|n| !index.is_member(&n.id) && index.data_predecessors(&n.id).is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }

    fn check_reachability(&mut self, entry_points: &[&'a str]) -> Vec<String> {
        let index = self.index;
        if entry_points.is_empty() {
            if index.executables().next().is_some() {
                self.diagnostics.warning(
                    "No entry point found: every executable node receives input from another node",
                );
            }
            return Vec::new();
        }

        let wired: Vec<&str> = entry_points
            .iter()
            .copied()
            .filter(|id| !index.input_feeds(id).is_empty())
            .collect();
        let seeds = if wired.is_empty() {
            entry_points.to_vec()
        } else {
            wired
        };

        let mut visited: IndexSet<&str> = IndexSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        for seed in seeds {
            if visited.insert(seed) {
                queue.push_back(seed);
            }
        }
        while let Some(id) = queue.pop_front() {
            for &next in index.data_successors(id).iter().chain(index.members(id)) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let disconnected: Vec<String> = index
            .executables()
            .filter(|n| !visited.contains(n.id.as_str()))
            .map(|n| n.id.clone())
            .collect();
        for id in &disconnected {
            self.diagnostics.warning(format!(
                "'{}' is not reachable from any input node",
                name_of(index, id)
            ));
        }
        disconnected
    }

    fn check_entry_inputs(&mut self, entry_points: &[&'a str]) {
        let index = self.index;
        for id in entry_points {
            if index.input_feeds(id).is_empty() {
                self.diagnostics.warning(format!(
                    "Entry point '{}' has no input node connected; it will receive the default prompt",
                    name_of(index, id)
                ));
            }
        }
    }

    fn check_edges(&mut self) {
        let index = self.index;
        let edges = &index.graph().edges;
        let mut reported: AHashSet<usize> = AHashSet::new();

        for rejected in index.ill_typed().iter().chain(index.dangling()) {
            if !reported.insert(rejected.index) {
                continue;
            }
            let Some(edge) = edges.get(rejected.index) else {
                continue;
            };
            self.diagnostics.warning(format!(
                "Ignored connection from '{}' to '{}': {}",
                name_of(index, &edge.source),
                name_of(index, &edge.target),
                rejected.reason
            ));
        }
    }
}

fn describe(index: &GraphIndex<'_>, cycle: &[String]) -> String {
    cycle.iter().map(|id| name_of(index, id)).join(" → ")
}
