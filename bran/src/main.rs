//! Autonomous document agent.
//!
//! Plans an objective with a chat model, investigates the reference corpus
//! named by `DATA_PATH`, and writes `{title}.md` documents. Paths of written
//! documents are printed on stdout; progress goes to stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use bran::core::language::Language;
use bran::exit_codes;
use bran::io::config::load_config;
use bran::io::model::OpenAiChatModel;
use bran::logging;
use bran::orchestrate::Orchestrator;

#[derive(Parser, Debug)]
#[command(name = "bran", version, about = "Autonomous document agent")]
struct Cli {
    /// Language for plans and documents (English or Russian).
    #[arg(long, default_value = "English")]
    lang: String,
    /// Objective to work on; read interactively when omitted.
    #[arg(long)]
    prompt: Option<String>,
    /// TOML configuration file; defaults apply when it does not exist.
    #[arg(long, default_value = "bran.toml")]
    config: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::FAILED);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let language: Language = cli.lang.parse()?;
    logging::init();

    let cfg = load_config(&cli.config)?;
    let model = OpenAiChatModel::from_config(&cfg.model)?;
    let orchestrator = Orchestrator::from_config(model, &cfg, language)?;

    let objective = match cli.prompt {
        Some(prompt) => prompt,
        None => {
            eprintln!("Describe your objective. Finish with an empty line:");
            read_objective(io::stdin().lock())?
        }
    };
    if objective.trim().is_empty() {
        bail!("no objective given");
    }

    let outcome = orchestrator.execute(&objective)?;
    let mut stdout = io::stdout().lock();
    for path in &outcome.documents {
        writeln!(stdout, "{}", path.display()).context("write document path")?;
    }
    Ok(())
}

/// Read lines until the first empty line (or end of input) and join them.
fn read_objective<R: BufRead>(reader: R) -> Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("read objective")?;
        if line.trim().is_empty() {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}
