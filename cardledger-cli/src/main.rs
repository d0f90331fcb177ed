use anyhow::{Context, Result, bail};
use cardledger_core::{Statement, write_import_file};
use cardledger_ingest::{
    PdfToText, PlainTextFile, ScratchDir, StatementMatcher, StatementParser, TextSource,
    discover_statements, import_path_for,
};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "cardledger",
    version,
    about = "Convert Apple Card statement PDFs into import-ready CSV"
)]
struct Cli {
    /// Config file (default: ~/.cardledger/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every matching statement in a folder
    Scan {
        /// Folder to scan (default: scan.folder from config)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Write CSV files here instead of next to each statement
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// List matching statements without converting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert the given statement PDFs
    Convert {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Parse one statement and print what was found (nothing is written)
    Inspect {
        file: PathBuf,

        /// FILE is already-extracted text (pdftotext -layout output)
        #[arg(long)]
        text: bool,

        /// Print the parsed statement as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::InitConfig = cli.command {
        return config::init_config(cli.config.as_deref());
    }

    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Scan {
            dir,
            out_dir,
            dry_run,
        } => {
            let dir = dir.unwrap_or_else(|| cfg.scan.folder.clone());
            let matcher = StatementMatcher::new(&cfg.scan.filename_pattern)
                .context("scan.filename_pattern")?;
            let docs = discover_statements(&dir, &matcher)
                .with_context(|| format!("scanning {}", dir.display()))?;

            if docs.is_empty() {
                println!("No statements found in {}", dir.display());
                return Ok(());
            }

            if dry_run {
                println!("{} statements in {}:", docs.len(), dir.display());
                for doc in &docs {
                    let out = import_path_for(doc, &cfg.output.suffix, out_dir.as_deref());
                    println!("- {} -> {}", doc.display(), out.display());
                }
                return Ok(());
            }

            convert_documents(&docs, &cfg, out_dir.as_deref())?;
        }

        Command::Convert { files, out_dir } => {
            convert_documents(&files, &cfg, out_dir.as_deref())?;
        }

        Command::Inspect { file, text, json } => {
            inspect(&file, text, json, &cfg)?;
        }

        Command::InitConfig => unreachable!("handled before config load"),
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Convert each document independently; a failure is reported and the rest
/// still run. The scratch directory lives exactly as long as this call.
fn convert_documents(docs: &[PathBuf], cfg: &Config, out_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    let scratch = ScratchDir::new()?;
    let source = PdfToText::new(&scratch)
        .with_command(&cfg.extract.command)
        .with_timeout(cfg.extract.timeout());
    let parser = StatementParser::new()?;

    let mut failed = 0usize;
    for doc in docs {
        match convert_one(&parser, &source, doc, &cfg.output.suffix, out_dir) {
            Ok((statement, out)) => {
                println!("{}", summary_line(doc, &statement));
                println!("  -> {}", out.display());
            }
            Err(e) => {
                eprintln!("error: {}: {e:#}", doc.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} statements failed", docs.len());
    }
    Ok(())
}

fn convert_one(
    parser: &StatementParser,
    source: &dyn TextSource,
    doc: &Path,
    suffix: &str,
    out_dir: Option<&Path>,
) -> Result<(Statement, PathBuf)> {
    if !doc.is_file() {
        bail!("statement not found");
    }

    let lines = source.extract(doc);
    let statement = parser.parse_lines(&lines);

    let out = import_path_for(doc, suffix, out_dir);
    write_import_file(&out, &statement).with_context(|| format!("writing {}", out.display()))?;
    Ok((statement, out))
}

fn inspect(file: &Path, text: bool, json: bool, cfg: &Config) -> Result<()> {
    if !file.is_file() {
        bail!("file not found: {}", file.display());
    }

    let parser = StatementParser::new()?;
    let statement = if text {
        parser.parse_lines(PlainTextFile.extract(file))
    } else {
        let scratch = ScratchDir::new()?;
        let source = PdfToText::new(&scratch)
            .with_command(&cfg.extract.command)
            .with_timeout(cfg.extract.timeout());
        parser.parse_lines(source.extract(file))
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    println!("{}\n", summary_line(file, &statement));
    for t in &statement.transactions {
        println!(
            "{} | {:>10} | {}",
            t.date.format("%m/%d/%Y"),
            t.import_amount(),
            t.description
        );
    }
    println!("\nNet charges: ${}", statement.net_amount());

    Ok(())
}

fn summary_line(doc: &Path, statement: &Statement) -> String {
    let meta = &statement.metadata;
    let balance = meta
        .statement_balance
        .map(|b| format!("${b}"))
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{} | transactions={} | statement date={} | balance={} | earliest={}",
        doc.display(),
        statement.transactions.len(),
        fmt_date(meta.statement_date),
        balance,
        fmt_date(meta.earliest_date),
    )
}

fn fmt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
