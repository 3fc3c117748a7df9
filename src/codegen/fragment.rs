/// Where a fragment sits in the emitted program. The derived order is the
/// emission order, both at top level and inside a resource scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentKind {
    CustomTool,
    ResourceClient,
    CallableWrapper,
    Instance,
    Composition,
    EntryPoint,
}

/// A single argument of a call, positional when `name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: String,
}

impl Arg {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

/// A statement of the generated program.
///
/// Expressions inside statements are already rendered literals; the printer
/// only decides layout and indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Line(String),
    Blank,
    Comment(String),
    /// `header:` followed by an indented body.
    Block { header: String, body: Vec<Stmt> },
    /// `target = callee(args)`, laid out on one line when it fits.
    Call {
        target: Option<String>,
        callee: String,
        args: Vec<Arg>,
    },
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Self {
        Stmt::Line(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment(text.into())
    }

    pub fn block(header: impl Into<String>, body: Vec<Stmt>) -> Self {
        Stmt::Block {
            header: header.into(),
            body,
        }
    }

    pub fn assign(target: impl Into<String>, callee: impl Into<String>, args: Vec<Arg>) -> Self {
        Stmt::Call {
            target: Some(target.into()),
            callee: callee.into(),
            args,
        }
    }

    pub fn call(callee: impl Into<String>, args: Vec<Arg>) -> Self {
        Stmt::Call {
            target: None,
            callee: callee.into(),
            args,
        }
    }
}

/// A self-contained piece of the output, produced by one expander for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub node_id: Option<String>,
    pub stmts: Vec<Stmt>,
}

impl Fragment {
    pub fn new(kind: FragmentKind, node_id: Option<&str>, stmts: Vec<Stmt>) -> Self {
        Self {
            kind,
            node_id: node_id.map(str::to_string),
            stmts,
        }
    }
}

/// Orders fragments by kind, keeping production order within a kind, and
/// flattens them with a blank line between fragments.
pub fn layout(mut fragments: Vec<Fragment>) -> Vec<Stmt> {
    fragments.sort_by_key(|f| f.kind);
    let mut out = Vec::new();
    for fragment in fragments {
        if !out.is_empty() {
            out.push(Stmt::Blank);
        }
        out.extend(fragment.stmts);
    }
    out
}
