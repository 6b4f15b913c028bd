//! seshat CLI: forward-chaining knowledge base with truth maintenance.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use seshat::error::KbError;
use seshat::kb::{KbConfig, KnowledgeBase};
use seshat::parse;

#[derive(Parser)]
#[command(
    name = "seshat",
    version,
    about = "Forward-chaining knowledge base with truth maintenance"
)]
struct Cli {
    /// Emit a debug event for every derivation and cascade removal.
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a knowledge base file, chain to a fixpoint, and print statistics.
    Ingest {
        /// Path to a file of 'fact:' and 'rule:' lines.
        #[arg(long)]
        file: PathBuf,
    },

    /// Load a knowledge base file and query it.
    Ask {
        #[arg(long)]
        file: PathBuf,

        /// Query statement, e.g. "(isa ?x Dog)".
        #[arg(long)]
        query: String,
    },

    /// Load a knowledge base file, retract a fact, and print the survivors.
    Retract {
        #[arg(long)]
        file: PathBuf,

        /// Statement of the fact to retract, e.g. "(isa Fido Dog)".
        #[arg(long)]
        statement: String,
    },

    /// Load a knowledge base file and dump the chained contents as JSON.
    Export {
        #[arg(long)]
        file: PathBuf,
    },
}

fn load_kb(path: &Path, trace: bool) -> Result<KnowledgeBase> {
    let text = std::fs::read_to_string(path).map_err(|source| KbError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = parse::parse_kb(&text).map_err(KbError::from)?;

    let mut kb = KnowledgeBase::new(KbConfig {
        trace_derivations: trace,
    });
    for entry in entries {
        kb.assert(entry);
    }
    Ok(kb)
}

fn print_stats(kb: &KnowledgeBase) {
    let (fact_total, fact_asserted) = kb
        .facts()
        .fold((0usize, 0usize), |(total, asserted), fact| {
            (total + 1, asserted + usize::from(fact.asserted))
        });
    let (rule_total, rule_asserted) = kb
        .rules()
        .fold((0usize, 0usize), |(total, asserted), rule| {
            (total + 1, asserted + usize::from(rule.asserted))
        });
    println!(
        "facts: {fact_total} ({fact_asserted} asserted, {} derived)",
        fact_total - fact_asserted
    );
    println!(
        "rules: {rule_total} ({rule_asserted} asserted, {} specialized)",
        rule_total - rule_asserted
    );
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest { file } => {
            let kb = load_kb(&file, cli.trace)?;
            println!("ingested {}", file.display());
            print_stats(&kb);
        }

        Commands::Ask { file, query } => {
            let kb = load_kb(&file, cli.trace)?;
            let query = parse::parse_term(&query).map_err(KbError::from)?;
            let answers = kb.ask(&query);
            if answers.is_empty() {
                println!("no matches");
            }
            for answer in &answers {
                if answer.bindings.is_empty() {
                    println!("true");
                } else {
                    println!("{}", answer.bindings);
                }
            }
        }

        Commands::Retract { file, statement } => {
            let mut kb = load_kb(&file, cli.trace)?;
            let statement = parse::parse_term(&statement).map_err(KbError::from)?;
            kb.retract_fact(&statement);
            println!("facts after retraction:");
            for fact in kb.facts() {
                println!("  {fact}");
            }
        }

        Commands::Export { file } => {
            let kb = load_kb(&file, cli.trace)?;
            let json = serde_json::to_string_pretty(&kb.snapshot()).into_diagnostic()?;
            println!("{json}");
        }
    }

    Ok(())
}
