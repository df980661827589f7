//! CLI command definitions for codeloop.
//!
//! `solve` drives the synthesis workflow over one or more problem
//! directories; `check` loads a problem directory and reports whether it
//! is usable.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::execution::{SandboxClient, DEFAULT_SANDBOX_URL};
use crate::llm::{ChatCompletionsClient, DEFAULT_MODEL};
use crate::problem::ProblemSpecification;
use crate::workflow::{
    AttemptLimits, CodegenWorkflow, StageLabel, WorkflowConfig, WorkflowOutcome, WorkflowRun,
};

/// Default output directory for session artifacts.
const DEFAULT_OUTPUT_DIR: &str = "./codeloop-out";

/// Self-correcting code synthesis against an execution sandbox.
#[derive(Parser)]
#[command(name = "codeloop")]
#[command(about = "Solve coding problems with self-correcting LLM synthesis")]
#[command(version)]
#[command(
    long_about = "codeloop drives an LLM through a test-first synthesis loop: it writes an AI test suite for the problem, reviews it, writes a candidate solution, and runs both the provided example tests and the AI suite in an external sandbox until the candidate passes or the attempt caps are spent.\n\nExample usage:\n  codeloop solve ./problems/two-sum --model gpt-4o-mini --json"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the synthesis workflow on problem directories.
    Solve(SolveArgs),

    /// Load a problem directory and report its fields.
    Check(CheckArgs),
}

/// Arguments for `codeloop solve`.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// Problem directories, each containing DESCRIPTION, EXAMPLE,
    /// INTERFACE and TEST files.
    #[arg(required = true)]
    pub problems: Vec<PathBuf>,

    /// Model for all three agent roles (defaults to the provider's
    /// default model).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[arg(
        long,
        env = "OPENAI_API_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    pub api_base: String,

    /// API key (can also be set via OPENAI_API_KEY).
    #[arg(long, env = "OPENAI_API_KEY")]
    pub api_key: Option<String>,

    /// Base URL of the execution sandbox.
    #[arg(long, env = "SANDBOX_URL", default_value = DEFAULT_SANDBOX_URL)]
    pub sandbox_url: String,

    /// Directory for session artifacts (solution.py, ai_tests.py,
    /// session.json per problem).
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Cap on AI test suite syntheses per session.
    #[arg(long, default_value = "5")]
    pub max_test_attempts: u32,

    /// Cap on candidate solution syntheses per session.
    #[arg(long, default_value = "8")]
    pub max_solution_attempts: u32,

    /// Cap on AI suite executions per session.
    #[arg(long, default_value = "4")]
    pub max_ai_test_rounds: u32,

    /// After each terminal state, read a human comment from stdin and
    /// resume the session with it. Only valid with a single problem.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Print a JSON summary instead of text.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `codeloop check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Problem directory to inspect.
    pub problem: PathBuf,

    /// Print the report as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments without executing any command.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// This is a convenience function that parses CLI args and runs the command.
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the codeloop CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Solve(args) => run_solve_command(args).await,
        Commands::Check(args) => run_check_command(args),
    }
}

// ============================================================================
// Solve Command Implementation
// ============================================================================

/// JSON output structure for one solved problem.
#[derive(Debug, Clone, Serialize)]
struct SolveEntry {
    problem: String,
    session_id: String,
    outcome: WorkflowOutcome,
    stages_run: usize,
    test_syntheses: u32,
    solution_syntheses: u32,
    ai_test_rounds: u32,
    main_code: Option<String>,
    ai_test_code: Option<String>,
    saved_path: Option<String>,
}

/// JSON output structure for a solve invocation.
#[derive(Debug, Clone, Serialize)]
struct SolveOutput {
    status: String,
    accepted: usize,
    gave_up: usize,
    results: Vec<SolveEntry>,
}

async fn run_solve_command(args: SolveArgs) -> anyhow::Result<()> {
    if args.interactive && args.problems.len() > 1 {
        anyhow::bail!("--interactive works on a single problem directory");
    }

    // Any unusable problem directory fails the whole invocation before a
    // single model call is made.
    let mut problems = Vec::new();
    for dir in &args.problems {
        let problem = ProblemSpecification::from_dir(dir).map_err(|e| {
            anyhow::anyhow!("Failed to load problem from {}: {}", dir.display(), e)
        })?;
        problems.push((dir.clone(), problem));
    }

    let llm_client = build_llm_client(args.api_key.clone(), args.api_base.clone())?;
    let executor = Arc::new(SandboxClient::new(args.sandbox_url.clone()));

    let limits = AttemptLimits::default()
        .with_max_test_syntheses(args.max_test_attempts)
        .with_max_solution_syntheses(args.max_solution_attempts)
        .with_max_ai_test_rounds(args.max_ai_test_rounds);
    let mut config = WorkflowConfig::default().with_limits(limits);
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }

    let workflow = CodegenWorkflow::new(llm_client, executor, config);

    // Sessions share nothing, so they can run concurrently.
    let futures: Vec<_> = problems
        .into_iter()
        .map(|(dir, problem)| {
            let workflow = &workflow;
            async move { (dir, workflow.run_session(problem).await) }
        })
        .collect();
    let mut runs = futures::future::join_all(futures).await;

    if args.interactive {
        let (dir, mut run) = runs.pop().expect("one problem in interactive mode");
        loop {
            let Some(comment) = read_feedback()? else {
                break;
            };
            let mut state = run.state;
            state.human_feedback = Some(comment);
            run = workflow
                .resume_session(state, StageLabel::GenerateSolution)
                .await;
        }
        runs.push((dir, run));
    }

    let output_dir = Path::new(&args.output_dir);
    let mut used_names = HashSet::new();
    let mut entries = Vec::new();
    for (dir, run) in &runs {
        let saved_path = save_session_artifacts(dir, run, output_dir, &mut used_names)?;
        entries.push(SolveEntry {
            problem: dir.display().to_string(),
            session_id: run.state.session_id.to_string(),
            outcome: run.outcome,
            stages_run: run.path.len(),
            test_syntheses: run.state.test_syntheses,
            solution_syntheses: run.state.solution_syntheses,
            ai_test_rounds: run.state.ai_test_rounds,
            main_code: run.state.main_code.clone(),
            ai_test_code: run.state.ai_test_code.clone(),
            saved_path,
        });
    }

    let accepted = entries
        .iter()
        .filter(|e| e.outcome == WorkflowOutcome::Accepted)
        .count();
    let output = SolveOutput {
        status: if accepted == entries.len() {
            "success".to_string()
        } else {
            "failed".to_string()
        },
        accepted,
        gave_up: entries.len() - accepted,
        results: entries,
    };

    if args.json {
        let json_output = serde_json::to_string_pretty(&output)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON output: {}", e))?;
        println!("{}", json_output);
        return Ok(());
    }

    for entry in &output.results {
        print_solve_entry(entry);
    }
    println!(
        "{} accepted, {} gave up",
        output.accepted, output.gave_up
    );
    Ok(())
}

fn print_solve_entry(entry: &SolveEntry) {
    println!();
    println!("Problem: {}", entry.problem);
    println!("Session: {}", entry.session_id);
    match entry.outcome {
        WorkflowOutcome::Accepted => {
            println!("Outcome: accepted after {} stages", entry.stages_run);
            if let Some(code) = &entry.main_code {
                println!();
                println!("{}", code);
            }
        }
        WorkflowOutcome::GaveUp => {
            println!(
                "Outcome: gave up ({} test syntheses, {} solution syntheses, {} AI test rounds)",
                entry.test_syntheses, entry.solution_syntheses, entry.ai_test_rounds
            );
        }
    }
    if let Some(path) = &entry.saved_path {
        println!("Artifacts: {}", path);
    }
}

/// Write the session's artifacts under `<output_dir>/<problem name>/`.
///
/// `session.json` is always written so a session can be inspected or
/// resumed later; the code files only exist when their artifact does.
/// When two problem directories in one invocation share a basename, the
/// later sessions get a session-id suffix instead of overwriting.
fn save_session_artifacts(
    problem_dir: &Path,
    run: &WorkflowRun,
    output_dir: &Path,
    used_names: &mut HashSet<String>,
) -> anyhow::Result<Option<String>> {
    let mut name = problem_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| run.state.session_id.to_string());
    if !used_names.insert(name.clone()) {
        name = format!("{}-{}", name, run.state.session_id);
        tracing::warn!(name = %name, "duplicate problem name, keying artifacts on the session id");
        used_names.insert(name.clone());
    }
    let session_dir = output_dir.join(name);
    fs::create_dir_all(&session_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", session_dir.display(), e))?;

    let state_json = serde_json::to_string_pretty(&run.state)
        .map_err(|e| anyhow::anyhow!("Failed to serialize session state: {}", e))?;
    fs::write(session_dir.join("session.json"), state_json)?;

    if let Some(code) = &run.state.main_code {
        fs::write(session_dir.join("solution.py"), code)?;
    }
    if let Some(tests) = &run.state.ai_test_code {
        fs::write(session_dir.join("ai_tests.py"), tests)?;
    }

    info!(path = %session_dir.display(), "Saved session artifacts");
    Ok(Some(session_dir.display().to_string()))
}

/// Read a multiline feedback comment from stdin.
///
/// Input ends after two consecutive blank lines or EOF. Returns `None`
/// when the comment is empty, which ends the interactive loop.
fn read_feedback() -> anyhow::Result<Option<String>> {
    println!();
    println!("Feedback for the solution (two blank lines to finish, empty to stop):");

    let stdin = io::stdin();
    let mut lines: Vec<String> = Vec::new();
    let mut blank_streak = 0u32;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            blank_streak += 1;
            if blank_streak >= 2 {
                break;
            }
        } else {
            blank_streak = 0;
        }
        lines.push(line);
    }

    while lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    let comment = lines.join("\n");
    if comment.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(comment))
    }
}

fn build_llm_client(
    api_key: Option<String>,
    api_base: String,
) -> anyhow::Result<Arc<ChatCompletionsClient>> {
    if let Some(key) = api_key {
        // Requests that name no model fall back to the client default,
        // so it must never be empty.
        let default_model = std::env::var("OPENAI_DEFAULT_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        info!(
            api_base = %api_base,
            model = %default_model,
            "Using chat-completions endpoint with provided API key"
        );
        Ok(Arc::new(ChatCompletionsClient::new(
            api_base,
            Some(key),
            default_model,
        )))
    } else {
        info!("Using LLM client from environment");
        Ok(Arc::new(ChatCompletionsClient::from_env().map_err(|e| {
            anyhow::anyhow!(
                "Failed to initialize LLM client: {}. Provide --api-key or set OPENAI_API_KEY.",
                e
            )
        })?))
    }
}

// ============================================================================
// Check Command Implementation
// ============================================================================

/// JSON output structure for a problem check.
#[derive(Debug, Clone, Serialize)]
struct CheckOutput {
    status: String,
    problem: String,
    description_bytes: usize,
    example_bytes: usize,
    interface_bytes: usize,
    test_bytes: usize,
}

fn run_check_command(args: CheckArgs) -> anyhow::Result<()> {
    let problem = ProblemSpecification::from_dir(&args.problem).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load problem from {}: {}",
            args.problem.display(),
            e
        )
    })?;

    let output = CheckOutput {
        status: "ok".to_string(),
        problem: args.problem.display().to_string(),
        description_bytes: problem.problem_description.len(),
        example_bytes: problem.example_description.len(),
        interface_bytes: problem.solution_interface.len(),
        test_bytes: problem.example_test_code.len(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Problem OK: {}", output.problem);
    println!("  DESCRIPTION: {} bytes", output.description_bytes);
    println!("  EXAMPLE:     {} bytes", output.example_bytes);
    println!("  INTERFACE:   {} bytes", output.interface_bytes);
    println!("  TEST:        {} bytes", output.test_bytes);
    Ok(())
}
