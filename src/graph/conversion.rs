use super::definition::GraphDefinition;
use crate::error::ConversionError;

/// A trait for editor or storage formats that can be converted into a Kousei `GraphDefinition`.
///
/// This is the seam that keeps the compiler format-agnostic: the canvas document,
/// a stored project, or a hand-built test fixture all enter through it.
///
/// # Example
///
/// ```rust,no_run
/// use kousei::prelude::*;
///
/// struct Pipeline { steps: Vec<String> }
///
/// impl IntoGraph for Pipeline {
///     fn into_graph(self) -> std::result::Result<GraphDefinition, ConversionError> {
///         let mut nodes = vec![NodeDefinition::new("in", "Input", NodeKind::Input(Default::default()))];
///         let mut edges = Vec::new();
///         let mut previous = ("in".to_string(), NodeKind::Input(Default::default()));
///         for (i, step) in self.steps.into_iter().enumerate() {
///             let id = format!("step-{}", i);
///             nodes.push(NodeDefinition::new(&id, step, NodeKind::Agent(Default::default())));
///             edges.push(EdgeDefinition::new(&previous.0, "output", &id, "user-input"));
///             previous = (id, NodeKind::Agent(Default::default()));
///         }
///         nodes.push(NodeDefinition::new("out", "Output", NodeKind::Output(Default::default())));
///         edges.push(EdgeDefinition::new(&previous.0, "output", "out", "input"));
///         GraphDefinition::new(nodes, edges)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a Kousei workflow graph.
    fn into_graph(self) -> Result<GraphDefinition, ConversionError>;
}

impl IntoGraph for GraphDefinition {
    fn into_graph(self) -> Result<GraphDefinition, ConversionError> {
        GraphDefinition::new(self.nodes, self.edges)
    }
}
