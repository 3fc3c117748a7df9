//! Deserialization of the canvas editor's document format.

pub mod types;

pub use types::*;
