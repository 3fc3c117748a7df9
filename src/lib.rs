//! # Kousei - Multi-Agent Workflow Compiler
//!
//! **Kousei** turns a visually assembled multi-agent workflow into a linear,
//! human-readable program for the Strands Agents runtime. The workflow is a
//! graph of typed nodes (agents, orchestrators, swarms, graph containers,
//! tools, tool servers, inputs and outputs) joined by handle-typed edges.
//!
//! ## Core Workflow
//!
//! The compiler is format-agnostic. It operates on a canonical graph model, and
//! the primary workflow is:
//!
//! 1.  **Load Your Graph**: Parse the editor document (see [`ui::UiDocument`]) or your own format.
//! 2.  **Convert to Kousei's Model**: Implement [`graph::IntoGraph`] to translate it into a `GraphDefinition`.
//! 3.  **Compile**: Use `Compiler::builder` to configure a compiler and call `compile`. The graph is
//!     validated first; a valid graph is expanded into source text, an invalid one yields diagnostics only.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kousei::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("workflow.json")?;
//!     let graph = UiDocument::from_json(&json)?.into_graph()?;
//!
//!     let output = Compiler::builder(graph)
//!         .with_mode(GenerationMode::Auto)
//!         .with_default_prompt("Summarise today's news")
//!         .build()
//!         .compile();
//!
//!     for warning in &output.warnings {
//!         eprintln!("warning: {}", warning);
//!     }
//!     if output.is_success() {
//!         std::fs::write("workflow.py", &output.source_text)?;
//!     } else {
//!         for error in &output.errors {
//!             eprintln!("error: {}", error);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod codegen;
pub mod compiler;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod naming;
pub mod prelude;
pub mod ui;
pub mod validate;
