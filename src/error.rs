use thiserror::Error;

/// Errors that stop code generation after the graph has passed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Tool '{missing_id}' attached to '{consumer}' no longer exists in the workflow")]
    MissingResource { consumer: String, missing_id: String },

    #[error("Tool server '{server}' is misconfigured: {message}")]
    InvalidServerConfig { server: String, message: String },

    #[error("'{node}' cannot be composed this way: {message}")]
    InvalidComposition { node: String, message: String },

    #[error("Code generation failed: {0}")]
    Internal(String),
}

/// Errors that can occur when converting a graph document into a Kousei `GraphDefinition`.
#[derive(Error, Debug, Clone)]
pub enum ConversionError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' has an unknown kind: '{kind}'")]
    UnknownNodeKind { node_id: String, kind: String },

    #[error("Node id '{0}' is used by more than one node")]
    DuplicateNodeId(String),

    #[error("Node '{node_id}' has invalid data: {message}")]
    InvalidNodeData { node_id: String, message: String },
}
