//! `sa` — command-line host for the analysis framework.
//!
//! `sa list` prints the registered procedures; `sa run` drives one
//! invocation from a CSV file to a Markdown report. Prompts that the
//! validator cannot resolve from `--col` hints are asked on stdin.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sa_core::harness::{run_analysis, PromptChannel, RunStatus};
use sa_core::registry;
use sa_core::report::{MarkdownSink, NullBackend, PlotBackend, SvgBackend};
use sa_core::schema::{ParamValue, Role};

#[derive(Parser)]
#[command(name = "sa", version, about = "Statistical analysis report generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered procedures.
    List {
        /// Locale for the procedure titles.
        #[arg(long, default_value = "en-US")]
        locale: String,
        /// Emit the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run one procedure and write its report.
    Run {
        /// Registered procedure id, e.g. `descriptive`.
        procedure: String,
        /// Input CSV file.
        #[arg(short, long)]
        input: PathBuf,
        /// Output report path; the extension follows the sink.
        #[arg(short, long)]
        output: PathBuf,
        /// Column binding as `role=name[,name...]`; repeatable.
        #[arg(long = "col", value_name = "ROLE=NAME")]
        cols: Vec<String>,
        /// Parameter as `name=value`; repeatable.
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
        /// Report locale.
        #[arg(long, default_value = "en-US")]
        locale: String,
        /// Skip figure rendering; sections keep their captions.
        #[arg(long)]
        no_figures: bool,
        /// Cancel instead of prompting for unresolved columns.
        #[arg(long)]
        no_input: bool,
        /// Emit the run report as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Asks column questions on stderr and reads comma-separated names
/// from stdin. An empty line cancels the run.
struct StdinPrompt;

impl PromptChannel for StdinPrompt {
    fn ask(&mut self, role: Role, prompt: &str) -> Option<Vec<String>> {
        eprint!("{prompt} [{}]: ", role.as_str());
        let _ = io::stderr().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return None;
        }
        let names: Vec<String> = line
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names)
        }
    }
}

/// A prompt channel that always cancels, for non-interactive runs.
struct CancelPrompt;

impl PromptChannel for CancelPrompt {
    fn ask(&mut self, _role: Role, _prompt: &str) -> Option<Vec<String>> {
        None
    }
}

fn parse_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))
}

fn parse_cols(raw: &[String]) -> Result<BTreeMap<String, Vec<String>>> {
    let mut hints: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for item in raw {
        let (role, names) = parse_pair(item)?;
        if Role::parse(role).is_none() {
            return Err(anyhow!("unknown role '{role}' in --col {item}"));
        }
        let entry = hints.entry(role.to_string()).or_default();
        entry.extend(names.split(',').map(|s| s.trim().to_string()));
    }
    Ok(hints)
}

fn parse_params(raw: &[String]) -> Result<BTreeMap<String, ParamValue>> {
    let mut params = BTreeMap::new();
    for item in raw {
        let (name, value) = parse_pair(item)?;
        // Numbers and booleans parse as themselves; anything else is an
        // enum-valued parameter.
        let value = serde_json::from_str::<ParamValue>(value)
            .unwrap_or_else(|_| ParamValue::Enum(value.to_string()));
        params.insert(name.to_string(), value);
    }
    Ok(params)
}

fn list(locale: &str, json: bool) -> Result<()> {
    let mut entries = Vec::new();
    for descriptor in registry::global().values() {
        let title = descriptor.bundle.lookup(locale, "title");
        entries.push((descriptor.id, title));
    }
    if json {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|(id, title)| serde_json::json!({ "id": id, "title": title }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (id, title) in entries {
            println!("{id:<24} {title}");
        }
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List { locale, json } => {
            list(&locale, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            procedure,
            input,
            output,
            cols,
            params,
            locale,
            no_figures,
            no_input,
            json,
        } => {
            let hints = parse_cols(&cols).context("parsing --col bindings")?;
            let params = parse_params(&params).context("parsing --param values")?;
            debug!(procedure = %procedure, input = %input.display(), "invoking");

            let backend: Box<dyn PlotBackend> = if no_figures {
                Box::new(NullBackend)
            } else {
                Box::new(SvgBackend::default())
            };
            let mut stdin_prompt = StdinPrompt;
            let mut cancel_prompt = CancelPrompt;
            let prompts: &mut dyn PromptChannel = if no_input {
                &mut cancel_prompt
            } else {
                &mut stdin_prompt
            };

            let report = run_analysis(
                &procedure,
                Some(&input),
                &output,
                hints,
                params,
                &locale,
                prompts,
                &MarkdownSink,
                backend.as_ref(),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match report.status {
                    RunStatus::Ok => {
                        if let Some(path) = &report.artifact_path {
                            println!("wrote {path}");
                        }
                    }
                    RunStatus::Cancelled => eprintln!("cancelled"),
                    RunStatus::Fault => {
                        let message = report.message.as_deref().unwrap_or("run failed");
                        eprintln!("error: {message}");
                    }
                }
            }
            Ok(match report.status {
                RunStatus::Ok => ExitCode::SUCCESS,
                RunStatus::Cancelled => ExitCode::from(2),
                RunStatus::Fault => ExitCode::FAILURE,
            })
        }
    }
}
