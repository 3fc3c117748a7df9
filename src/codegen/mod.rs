//! Typed output fragments and their deterministic rendering.

pub mod fragment;
pub mod literal;
pub mod printer;

pub use fragment::{Arg, Fragment, FragmentKind, Stmt, layout};
pub use printer::{Printer, render};
