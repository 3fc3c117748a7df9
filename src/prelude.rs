//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kousei crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kousei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/workflow.json")?;
//! let graph = UiDocument::from_json(&json)?.into_graph()?;
//!
//! let report = validate(&graph);
//! println!("valid: {}, entry points: {:?}", report.valid, report.entry_points);
//!
//! let output = Compiler::builder(graph).build().compile();
//! println!("{}", output.source_text);
//! # Ok(())
//! # }
//! ```

// Compilation
pub use crate::compiler::{
    CompileOptions, CompileOutput, Compiler, CompilerBuilder, GenContext, GenerationMode,
    Pattern, PatternExpander, Site,
};

// Graph model
pub use crate::graph::{
    AgentConfig, BuiltinToolConfig, CustomToolConfig, EdgeDefinition, GraphConfig,
    GraphDefinition, GraphIndex, Handle, InputConfig, IntoGraph, McpServerConfig, McpTransport,
    ModelConfig, NodeDefinition, NodeKind, OrchestratorConfig, OutputConfig, Provider,
    SwarmConfig,
};

// Editor documents
pub use crate::ui::{UiDocument, UiGraph};

// Validation
pub use crate::validate::{ValidationReport, Validator, validate};

// Error types
pub use crate::error::{CompileError, ConversionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
