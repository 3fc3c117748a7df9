use crate::error::CompileError;
use crate::graph::{GraphDefinition, GraphIndex};
use crate::validate::{ValidationReport, Validator};
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{error, info, instrument, warn};

mod assemble;
pub mod context;
mod entry;
pub mod expand;
pub mod options;
pub mod preamble;
pub mod scope;
pub mod tools;

pub use assemble::{WORKFLOW_GRAPH, resolve_mode, select_root};
pub use context::{GenContext, Site};
pub use expand::{ExpanderRegistry, Pattern, PatternExpander};
pub use options::{CompileOptions, DEFAULT_PROMPT, GenerationMode};

use expand::register_default_expanders;

/// Everything a compile call produces. On any error `source_text` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub source_text: String,
    /// The import lines of the generated program.
    pub imports: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// The id of the node the entry function runs, or `workflow_graph` in graph mode.
    pub execution_root: Option<String>,
    /// The mode actually used, with `Auto` resolved.
    pub mode: Option<GenerationMode>,
    pub validation: ValidationReport,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn failed(validation: ValidationReport, errors: Vec<String>) -> Self {
        Self {
            warnings: validation.warnings.clone(),
            errors,
            validation,
            ..Default::default()
        }
    }
}

pub struct Compiler {
    graph: GraphDefinition,
    options: CompileOptions,
    expanders: ExpanderRegistry,
}

pub struct CompilerBuilder {
    graph: GraphDefinition,
    options: CompileOptions,
    expanders: ExpanderRegistry,
}

impl CompilerBuilder {
    pub fn new(graph: GraphDefinition) -> Self {
        let mut expanders = ExpanderRegistry::default();
        register_default_expanders(&mut expanders);
        Self {
            graph,
            options: CompileOptions::default(),
            expanders,
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn with_default_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.options.default_prompt = prompt.into();
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.options.header = header;
        self
    }

    /// Replaces the expander registered for the expander's pattern.
    pub fn with_expander(mut self, expander: Box<dyn PatternExpander>) -> Self {
        self.expanders.insert(expander.pattern(), expander);
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            options: self.options,
            expanders: self.expanders,
        }
    }
}

impl Compiler {
    pub fn builder(graph: GraphDefinition) -> CompilerBuilder {
        CompilerBuilder::new(graph)
    }

    pub fn graph(&self) -> &GraphDefinition {
        &self.graph
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn validate(&self) -> ValidationReport {
        let index = GraphIndex::new(&self.graph);
        Validator::new(&index).run()
    }

    /// Validates the graph and, when it is valid, generates the program.
    ///
    /// Every derived structure is rebuilt on each call, so compiling the same
    /// graph twice yields byte-identical output.
    #[instrument(level = "debug", skip(self), fields(nodes = self.graph.nodes.len(), edges = self.graph.edges.len()))]
    pub fn compile(&self) -> CompileOutput {
        let index = GraphIndex::new(&self.graph);
        let validation = Validator::new(&index).run();
        if !validation.valid {
            warn!(errors = validation.errors.len(), "graph failed validation");
            let errors = validation.errors.clone();
            return CompileOutput::failed(validation, errors);
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            assemble::generate(&index, &self.options, &self.expanders)
        }));
        let generated = match outcome {
            Ok(Ok(generated)) => generated,
            Ok(Err(e)) => {
                warn!(error = %e, "code generation failed");
                return CompileOutput::failed(validation, vec![e.to_string()]);
            }
            Err(_) => {
                error!("code generation panicked");
                let e = CompileError::Internal("unexpected failure while expanding the workflow".into());
                return CompileOutput::failed(validation, vec![e.to_string()]);
            }
        };

        info!(
            root = %generated.execution_root,
            mode = ?generated.mode,
            warnings = generated.warnings.len(),
            "compiled workflow"
        );

        let mut warnings = validation.warnings.clone();
        warnings.extend(generated.warnings);
        CompileOutput {
            source_text: generated.source_text,
            imports: generated.imports,
            errors: Vec::new(),
            warnings,
            execution_root: Some(generated.execution_root),
            mode: Some(generated.mode),
            validation,
        }
    }
}

/// Compiles a graph with default options.
pub fn compile(graph: GraphDefinition) -> CompileOutput {
    Compiler::builder(graph).build().compile()
}
