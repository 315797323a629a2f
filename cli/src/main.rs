use std::io::{BufRead, Write};
use std::path::PathBuf;

use argspec_core::Bindings;
use argspec_scenarios::{ScenarioBook, ScenarioError};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Line that ends a `repl` session.
const EXIT_SENTINEL: &str = "exit";

/// Output format for parsed bindings.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "argspec")]
#[command(about = "Parse argument lines against declared scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read lines from stdin and parse each one until `exit`.
    Repl(ReplArgs),
    /// Parse a single line such as `sub --right=2.0`.
    Parse(ParseArgs),
    /// Print usage for one scenario, or for all of them.
    Describe(DescribeArgs),
    /// Load a scenario file and report whether every scenario is valid.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ScenarioArgs {
    /// Scenario YAML file (default: built-in scenarios).
    #[arg(long)]
    scenarios: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ReplArgs {
    #[command(flatten)]
    source: ScenarioArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    source: ScenarioArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Command word followed by its arguments. Words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    line: Vec<String>,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[command(flatten)]
    source: ScenarioArgs,
    /// Scenario to describe (default: all).
    command: Option<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Scenario YAML file.
    file: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Repl(args) => run_repl(args),
        Command::Parse(args) => run_parse(args),
        Command::Describe(args) => run_describe(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_book(args: &ScenarioArgs) -> Result<ScenarioBook, String> {
    match &args.scenarios {
        Some(path) => ScenarioBook::from_file(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display())),
        None => ScenarioBook::builtin().map_err(|err| err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// repl command
// ---------------------------------------------------------------------------

fn run_repl(args: ReplArgs) -> Result<(), String> {
    let book = load_book(&args.source)?;
    info!(scenarios = book.len(), "Starting repl");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
        let line = line.trim();
        if line == EXIT_SENTINEL {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let output = match book.parse(line) {
            Ok(bindings) => render(&bindings, args.format)?,
            Err(err) => format!("error: {}", describe_error(&err)),
        };
        writeln!(stdout, "{output}").map_err(|err| format!("Failed to write output: {err}"))?;
    }
    debug!("Repl finished");
    Ok(())
}

// ---------------------------------------------------------------------------
// parse command
// ---------------------------------------------------------------------------

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let book = load_book(&args.source)?;
    let line = args.line.join(" ");
    let bindings = book.parse(&line).map_err(|err| describe_error(&err))?;
    println!("{}", render(&bindings, args.format)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// describe / check commands
// ---------------------------------------------------------------------------

fn run_describe(args: DescribeArgs) -> Result<(), String> {
    let book = load_book(&args.source)?;
    let commands: Vec<String> = match args.command {
        Some(command) => vec![command],
        None => book.commands().map(str::to_string).collect(),
    };

    let mut sections = Vec::with_capacity(commands.len());
    for command in &commands {
        sections.push(book.describe(command).map_err(|err| err.to_string())?);
    }
    print!("{}", sections.join("\n"));
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let book = ScenarioBook::from_file(&args.file)
        .map_err(|err| format!("Failed to load '{}': {err}", args.file.display()))?;
    let commands: Vec<&str> = book.commands().collect();
    println!(
        "ok: {} scenario(s) in {}: {}",
        commands.len(),
        args.file.display(),
        commands.join(", ")
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn render(bindings: &Bindings, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string(bindings)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        OutputFormat::Yaml => serde_yaml::to_string(bindings)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| format!("Failed to serialize output: {e}")),
        OutputFormat::Text => {
            let lines: Vec<String> = bindings
                .iter()
                .map(|(reference, values)| {
                    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                    format!("{reference} = [{}]", values.join(" "))
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

/// Message plus the stable error code for parse failures.
fn describe_error(err: &ScenarioError) -> String {
    match err {
        ScenarioError::Parse(parse) => format!("{parse} ({})", parse.code()),
        other => other.to_string(),
    }
}
