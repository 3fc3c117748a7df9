use super::fragment::{Arg, Stmt};

const INDENT: &str = "    ";
const MAX_WIDTH: usize = 88;

/// Deterministic pretty printer for `Stmt` trees.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(mut self, stmts: &[Stmt]) -> String {
        self.stmts(stmts);
        self.out
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Line(text) => self.write_line(text),
            Stmt::Blank => {
                // Never more than one blank line in a row, never one right after a header.
                if !self.out.is_empty() && !self.out.ends_with("\n\n") && !self.out.ends_with(":\n")
                {
                    self.out.push('\n');
                }
            }
            Stmt::Comment(text) => {
                for line in text.lines() {
                    self.write_line(&format!("# {}", line).trim_end().to_string());
                }
            }
            Stmt::Block { header, body } => {
                self.write_line(&format!("{}:", header));
                self.depth += 1;
                if body.iter().all(|s| matches!(s, Stmt::Blank | Stmt::Comment(_))) {
                    self.stmts(body);
                    self.write_line("pass");
                } else {
                    self.stmts(body);
                }
                self.depth -= 1;
            }
            Stmt::Call {
                target,
                callee,
                args,
            } => self.call(target.as_deref(), callee, args),
        }
    }

    fn call(&mut self, target: Option<&str>, callee: &str, args: &[Arg]) {
        let prefix = match target {
            Some(target) => format!("{} = {}(", target, callee),
            None => format!("{}(", callee),
        };
        let rendered: Vec<String> = args.iter().map(render_arg).collect();

        let flat = format!("{}{})", prefix, rendered.join(", "));
        let fits = self.depth * INDENT.len() + flat.len() <= MAX_WIDTH;
        if args.is_empty() || (fits && !flat.contains('\n')) {
            self.write_line(&flat);
            return;
        }

        self.write_line(&prefix);
        self.depth += 1;
        for arg in rendered {
            self.write_line(&format!("{},", arg));
        }
        self.depth -= 1;
        self.write_line(")");
    }

    /// Writes one logical line. Embedded newlines belong to multi-line string
    /// literals, so only the first physical line is indented.
    fn write_line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

fn render_arg(arg: &Arg) -> String {
    match &arg.name {
        Some(name) => format!("{}={}", name, arg.value),
        None => arg.value.clone(),
    }
}

/// Renders statements into program text.
pub fn render(stmts: &[Stmt]) -> String {
    Printer::new().print(stmts)
}
