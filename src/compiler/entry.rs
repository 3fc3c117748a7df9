//! The entry function and the command-line guard of the generated program.

use crate::codegen::literal::{py_docstring, py_text};
use crate::codegen::{Fragment, FragmentKind, Stmt, layout};

/// How the execution root is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Execution {
    /// An agent whose output is streamed as it is produced.
    Streaming,
    /// An agent called once, printing its final answer.
    Blocking,
    /// A swarm; its result is walked node by node.
    Swarm,
    /// A dependency graph; its result is walked node by node.
    Graph,
}

pub(crate) struct EntryPlan {
    pub root_var: String,
    pub execution: Execution,
    pub default_prompt: String,
    /// Clients opened around the whole run; empty when the root needs no servers.
    pub clients: Vec<String>,
    /// Fragments that must live inside the root's scope.
    pub scoped: Vec<Fragment>,
}

pub(crate) fn entry_fragment(plan: EntryPlan) -> Fragment {
    let mut body = vec![Stmt::Line(py_docstring(
        "Run the workflow once and print its result.",
    ))];
    body.extend(prompt_selection(&plan.default_prompt));
    body.push(Stmt::Blank);

    let run = execution(plan.execution, &plan.root_var);
    if plan.clients.is_empty() {
        body.extend(run);
    } else {
        let mut inside = layout(plan.scoped);
        if !inside.is_empty() {
            inside.push(Stmt::Blank);
        }
        inside.extend(run);
        body.push(Stmt::block(format!("with {}", plan.clients.join(", ")), inside));
    }

    let mut stmts = vec![Stmt::block(
        "async def main(user_input=None, messages=None)",
        body,
    )];
    stmts.push(Stmt::Blank);
    stmts.push(main_guard());
    Fragment::new(FragmentKind::EntryPoint, None, stmts)
}

/// History first, then the caller's prompt, then the configured default.
fn prompt_selection(default_prompt: &str) -> Vec<Stmt> {
    vec![
        Stmt::block("if messages", vec![Stmt::line("prompt = messages")]),
        Stmt::block("elif user_input", vec![Stmt::line("prompt = user_input")]),
        Stmt::block(
            "else",
            vec![Stmt::Line(format!("prompt = {}", py_text(default_prompt)))],
        ),
    ]
}

fn execution(execution: Execution, var: &str) -> Vec<Stmt> {
    match execution {
        Execution::Streaming => vec![
            Stmt::block(
                format!("async for event in {}.stream_async(prompt)", var),
                vec![Stmt::block(
                    "if \"data\" in event",
                    vec![Stmt::line("print(event[\"data\"], end=\"\", flush=True)")],
                )],
            ),
            Stmt::line("print()"),
        ],
        Execution::Blocking => vec![
            Stmt::Line(format!("response = {}(prompt)", var)),
            Stmt::line("print(response)"),
            Stmt::line("return response"),
        ],
        Execution::Swarm | Execution::Graph => {
            let history = if execution == Execution::Swarm {
                "node_history"
            } else {
                "execution_order"
            };
            vec![
                Stmt::Line(format!("result = {}(prompt)", var)),
                Stmt::line("print(f\"Status: {result.status}\")"),
                Stmt::Line(format!(
                    "print(\"Execution order: \" + \" -> \".join(node.node_id for node in result.{}))",
                    history
                )),
                Stmt::block(
                    "for node_id, node_result in result.results.items()",
                    vec![
                        Stmt::line("print(f\"\\n[{node_id}]\")"),
                        Stmt::line("print(node_result.result)"),
                    ],
                ),
                Stmt::line("return result"),
            ]
        }
    }
}

fn main_guard() -> Stmt {
    Stmt::block(
        "if __name__ == \"__main__\"",
        vec![
            Stmt::line("parser = argparse.ArgumentParser(description=\"Run the generated workflow.\")"),
            Stmt::line(
                "parser.add_argument(\"--user-input\", default=None, help=\"Prompt sent to the workflow\")",
            ),
            Stmt::line(
                "parser.add_argument(\"--messages\", default=None, help=\"Conversation history as a JSON list\")",
            ),
            Stmt::line("args = parser.parse_args()"),
            Stmt::line("history = json.loads(args.messages) if args.messages else None"),
            Stmt::line("asyncio.run(main(user_input=args.user_input, messages=history))"),
        ],
    )
}
