//! Dynonto CLI
//!
//! Command-line interface for:
//! - Inspecting the operation catalog and the bundled sample ontologies
//! - Validating ontology JSON and projecting it to Turtle
//! - Previewing and executing collaborator-backed ontology operations
//!
//! Documents go to stdout; logs and status lines go to stderr.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use dynonto_llm::{
    CollaboratorConfig, GenerationOptions, OperationDispatcher, OperationKind, OperationRequest,
    Provider,
};
use dynonto_model::{samples, to_turtle, validate_value, Ontology};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dynonto")]
#[command(author, version, about = "Dynonto: algebraic operations over dynamic ontologies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available ontology operations.
    Operations {
        #[arg(long)]
        json: bool,
    },

    /// Print a bundled sample ontology (person, factory, ghg).
    Sample {
        name: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print an empty ontology template stamped with the current time.
    New {
        id: String,
        name: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check an ontology's structure. Exits 1 when invalid.
    Validate {
        /// Ontology JSON file (`-` for stdin)
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Project an ontology to Turtle.
    Turtle {
        /// Ontology JSON file (`-` for stdin)
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Render the collaborator prompt for an operation without executing it.
    Prompt {
        #[command(flatten)]
        operands: OperandArgs,
        /// Emit the contract and input summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Execute an operation through the configured collaborator.
    ///
    /// Without `LLM_API_KEY` the deterministic offline responses are used.
    Execute {
        #[command(flatten)]
        operands: OperandArgs,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Write the result document here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Check that the configured collaborator answers.
    CheckLlm {
        #[command(flatten)]
        llm: LlmArgs,
    },
}

#[derive(Args)]
struct OperandArgs {
    /// addition | subtraction | merge | composition | division | transformation
    operation: String,
    /// First operand (A, or the full ontology for division)
    #[arg(long = "a")]
    a: PathBuf,
    /// Second operand (B, or the known component for division)
    #[arg(long = "b")]
    b: PathBuf,
    /// Interface spec (composition) or mapping rules (transformation)
    #[arg(long)]
    aux: Option<PathBuf>,
}

#[derive(Args)]
struct LlmArgs {
    /// openai | anthropic (overrides LLM_PROVIDER)
    #[arg(long)]
    provider: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl LlmArgs {
    /// Environment first, then flags. The credential only comes from the environment.
    fn config(&self) -> Result<CollaboratorConfig> {
        let mut config = CollaboratorConfig::from_env().context("reading LLM configuration")?;
        if let Some(provider) = &self.provider {
            let provider: Provider = provider.parse()?;
            if provider != config.provider {
                let api_key = config.api_key.take();
                config = CollaboratorConfig::for_provider(provider);
                config.api_key = api_key;
            }
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.as_str());
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Operations { json } => cmd_operations(json),
        Commands::Sample { name, out } => cmd_sample(&name, out.as_deref()),
        Commands::New { id, name, out } => {
            write_output(out.as_deref(), &pretty(&Ontology::empty(id, name).to_value()))
        }
        Commands::Validate { input, json } => cmd_validate(&input, json),
        Commands::Turtle { input, out } => cmd_turtle(&input, out.as_deref()),
        Commands::Prompt { operands, json } => cmd_prompt(&operands, json),
        Commands::Execute {
            operands,
            temperature,
            max_tokens,
            out,
            llm,
        } => {
            let options = GenerationOptions {
                temperature,
                max_tokens,
            };
            runtime()?.block_on(cmd_execute(&operands, options, out.as_deref(), &llm))
        }
        Commands::CheckLlm { llm } => runtime()?.block_on(cmd_check_llm(&llm)),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

// ============================================================================
// I/O helpers
// ============================================================================

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("parsing JSON from {}", path.display()))
}

fn read_ontology(path: &Path) -> Result<Ontology> {
    let text = read_input(path)?;
    Ontology::from_json_str(&text).with_context(|| format!("loading ontology {}", path.display()))
}

fn pretty(value: &Value) -> String {
    format!("{value:#}")
}

fn write_output(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => println!("{text}"),
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_operations(json: bool) -> Result<()> {
    let catalog = OperationKind::catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }
    for op in catalog {
        println!("{:<16} {}", op.id.as_str().cyan().bold(), op.name.bold());
        println!("{:<16} {}", "", op.description.dimmed());
    }
    Ok(())
}

fn cmd_sample(name: &str, out: Option<&Path>) -> Result<()> {
    let ontology = samples::by_name(name).ok_or_else(|| {
        anyhow!(
            "unknown sample `{name}` (available: {})",
            samples::SAMPLE_NAMES.join(", ")
        )
    })?;
    write_output(out, &pretty(&ontology.to_value()))
}

fn cmd_validate(input: &Path, json: bool) -> Result<()> {
    let value = read_json(input)?;
    let report = validate_value(&value);

    if json {
        println!("{}", pretty(&report.to_value()));
    } else if report.valid {
        eprintln!("{} {}", "ok".green().bold(), input.display());
    } else {
        eprintln!(
            "{} {} ({} error{})",
            "invalid".red().bold(),
            input.display(),
            report.errors.len(),
            if report.errors.len() == 1 { "" } else { "s" }
        );
        for error in &report.errors {
            eprintln!("  - {error}");
        }
    }

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_turtle(input: &Path, out: Option<&Path>) -> Result<()> {
    let ontology = read_ontology(input)?;
    let text = to_turtle(&ontology);
    write_output(out, text.trim_end())
}

fn build_request(operands: &OperandArgs) -> Result<OperationRequest> {
    let kind: OperationKind = operands.operation.parse()?;
    let a = read_ontology(&operands.a)?;
    let b = read_ontology(&operands.b)?;
    let mut request = OperationRequest::new(kind, a, b);

    if let Some(path) = &operands.aux {
        if kind.auxiliary().is_none() {
            bail!("--aux is only accepted by composition and transformation, not {kind}");
        }
        request = request.with_auxiliary(read_json(path)?);
    }
    Ok(request)
}

fn cmd_prompt(operands: &OperandArgs, json: bool) -> Result<()> {
    let request = build_request(operands)?;
    let rendered = OperationDispatcher::offline().render(&request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        print!("{}", rendered.contract.prompt);
        eprintln!("{} {}", "digest".dimmed(), rendered.contract.digest);
    }
    Ok(())
}

async fn cmd_execute(
    operands: &OperandArgs,
    options: GenerationOptions,
    out: Option<&Path>,
    llm: &LlmArgs,
) -> Result<()> {
    let request = build_request(operands)?.with_options(options);
    let config = llm.config()?;
    tracing::debug!(?config, "collaborator configuration");
    let dispatcher = OperationDispatcher::from_config(&config)?;

    if dispatcher.is_offline() {
        eprintln!(
            "{} no LLM_API_KEY set, using offline responses",
            "note".yellow().bold()
        );
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    eprintln!(
        "{} {} via {}",
        "Executing".green().bold(),
        request.kind.display_name(),
        dispatcher.info().provider
    );
    let outcome = dispatcher
        .dispatch_with_cancellation(&request, &cancel)
        .await
        .with_context(|| format!("{} failed", request.kind))?;

    if let Some(report) = &outcome.validation {
        eprintln!(
            "{} result ontology has {} structural error(s)",
            "warning".yellow().bold(),
            report.errors.len()
        );
        for error in &report.errors {
            eprintln!("  - {error}");
        }
    }
    for gap in &outcome.contract_gaps {
        eprintln!("{} {gap}", "gap".yellow());
    }

    write_output(out, &pretty(&outcome.payload))
}

async fn cmd_check_llm(llm: &LlmArgs) -> Result<()> {
    let dispatcher = OperationDispatcher::from_config(&llm.config()?)?;
    let status = dispatcher.connection_status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    if !status.connected {
        eprintln!(
            "{} could not reach {} ({})",
            "failed".red().bold(),
            status.provider,
            status.model
        );
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn execute_accepts_operands_and_overrides() {
        let cli = Cli::try_parse_from([
            "dynonto", "execute", "merge", "--a", "a.json", "--b", "b.json", "--temperature",
            "0.5", "--provider", "anthropic",
        ])
        .unwrap();
        match cli.command {
            Commands::Execute {
                operands,
                temperature,
                llm,
                ..
            } => {
                assert_eq!(operands.operation, "merge");
                assert_eq!(operands.a, PathBuf::from("a.json"));
                assert_eq!(temperature, Some(0.5));
                assert_eq!(llm.provider.as_deref(), Some("anthropic"));
            }
            _ => panic!("expected execute"),
        }
    }

    #[test]
    fn prompt_requires_both_operands() {
        assert!(Cli::try_parse_from(["dynonto", "prompt", "merge", "--a", "a.json"]).is_err());
    }
}
