use clap::{Args, Parser, Subcommand, ValueEnum};
use kousei::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// CLI-side mirror of `GenerationMode` for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeCli {
    Auto,
    Linear,
    Graph,
}

impl From<ModeCli> for GenerationMode {
    fn from(mode: ModeCli) -> Self {
        match mode {
            ModeCli::Auto => GenerationMode::Auto,
            ModeCli::Linear => GenerationMode::Linear,
            ModeCli::Graph => GenerationMode::Graph,
        }
    }
}

/// Compiles visually assembled multi-agent workflows into runnable programs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a workflow graph and generate its program
    Compile(CompileArgs),
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// Path to the workflow graph or project JSON file
    graph_path: PathBuf,

    /// How the top level of the workflow is generated
    #[arg(short, long, value_enum)]
    mode: Option<ModeCli>,

    /// JSON file with compile options; flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Prompt used when no input node supplies one
    #[arg(long)]
    default_prompt: Option<String>,

    /// Write the generated program here instead of printing it
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the full compile output as JSON
    #[arg(long)]
    json: bool,

    /// Only run validation and print the report
    #[arg(long)]
    validate_only: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compile(args) => run_compile(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kousei={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_compile(args: CompileArgs) {
    let total_start = Instant::now();

    // --- 1. Loading and conversion ---
    let json = fs::read_to_string(&args.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read graph file '{}': {}",
            args.graph_path.display(),
            e
        ))
    });
    let graph = UiDocument::from_json(&json)
        .and_then(|document| document.into_graph())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load workflow: {}", e)));

    let mut options = match &args.options {
        Some(path) => {
            let raw = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!(
                    "Failed to read options file '{}': {}",
                    path.display(),
                    e
                ))
            });
            CompileOptions::from_json(&raw)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse options: {}", e)))
        }
        None => CompileOptions::default(),
    };
    if let Some(mode) = args.mode {
        options.mode = mode.into();
    }
    if let Some(prompt) = args.default_prompt {
        options.default_prompt = prompt;
    }

    let compiler = Compiler::builder(graph).with_options(options).build();

    // --- 2. Validation only ---
    if args.validate_only {
        let report = compiler.validate();
        if args.json {
            print_json(&report);
        } else {
            print_diagnostics(&report.errors, &report.warnings);
            println!(
                "{} ({} entry point(s), {} disconnected, {} cycle(s))",
                if report.valid { "Valid" } else { "Invalid" },
                report.entry_points.len(),
                report.disconnected.len(),
                report.cycles.len()
            );
        }
        if !report.valid {
            std::process::exit(1);
        }
        return;
    }

    // --- 3. Compilation ---
    let compile_start = Instant::now();
    let output = compiler.compile();
    let compile_duration = compile_start.elapsed();

    if args.json {
        print_json(&output);
    } else {
        print_diagnostics(&output.errors, &output.warnings);
        if output.is_success() {
            match &args.out {
                Some(path) => {
                    fs::write(path, &output.source_text).unwrap_or_else(|e| {
                        exit_with_error(&format!(
                            "Failed to write '{}': {}",
                            path.display(),
                            e
                        ))
                    });
                    eprintln!(
                        "Wrote {} (root: {}, compiled in {:?}, total {:?})",
                        path.display(),
                        output.execution_root.as_deref().unwrap_or("-"),
                        compile_duration,
                        total_start.elapsed()
                    );
                }
                None => print!("{}", output.source_text),
            }
        }
    }

    if !output.is_success() {
        std::process::exit(1);
    }
}

fn print_diagnostics(errors: &[String], warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    for error in errors {
        eprintln!("error: {}", error);
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to serialize output: {}", e)),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
