//! tinyc — the command-line driver (§6 "Command-line surface").
//!
//! A thin `clap`-derived shell over [`tinyc_drv::Pipeline`]: read the
//! one positional source file, run the pipeline once, print the
//! diagnostics-then-primary-artifact contract to stdout, and translate
//! the result into the exit codes §6 specifies. Logging is ambient and
//! goes to stderr via `tracing`, entirely separate from the stdout
//! contract — the same split `faxt`'s CLI keeps between its
//! `--verbose` log lines and its command output.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tinyc_drv::{CancellationToken, Pipeline, PipelineConfig};
use tinyc_sem::SemanticAnalyzerConfig;

/// Which stage's primary artifact to print, narrowing `faxc_drv::Config`'s
/// `EmitType` down to what this pipeline actually produces. `Ir` (the
/// default) is §6's minimal contract: diagnostics, then the IR textual
/// form.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EmitKind {
    Tokens,
    Ast,
    Symbols,
    Ir,
}

/// tinyc — compiles one source file through lex, parse, semantic
/// analysis, and IR generation, printing diagnostics and the
/// resulting three-address IR.
#[derive(ClapParser, Debug)]
#[command(name = "tinyc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Teaching-grade compiler frontend pipeline", long_about = None)]
struct Cli {
    /// Path to the source file to compile
    path: PathBuf,

    /// Which stage's primary artifact to print after the diagnostics
    #[arg(long, value_enum, default_value = "ir")]
    emit: EmitKind,

    /// Enable verbose (debug-level) logging on stderr
    #[arg(short, long, env = "TINYC_VERBOSE")]
    verbose: bool,

    /// Emit IR generator region-naming comments (§4.10)
    #[arg(long)]
    emit_comments: bool,

    /// Use the strict semantic-analyzer preset (warnings become errors)
    #[arg(long)]
    strict: bool,

    /// Use the permissive semantic-analyzer preset
    #[arg(long, conflicts_with = "strict")]
    permissive: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn read_source(path: &PathBuf) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = match read_source(&cli.path) {
        Ok(source) => source,
        Err(err) => {
            tracing::error!(path = %cli.path.display(), error = %err, "failed to read source file");
            eprintln!("tinyc: {err:#}");
            return ExitCode::from(2);
        }
    };

    let semantic = if cli.strict {
        SemanticAnalyzerConfig::strict()
    } else if cli.permissive {
        SemanticAnalyzerConfig::permissive()
    } else {
        SemanticAnalyzerConfig::standard()
    };

    let pipeline = Pipeline::new(PipelineConfig {
        semantic,
        ir_comments: cli.emit_comments,
    });
    let token = CancellationToken::new();

    tracing::debug!(path = %cli.path.display(), emit = ?cli.emit, "starting pipeline");
    let report = pipeline.run(&source, &token);

    for diag in report.diagnostics() {
        println!("{diag}");
    }

    match cli.emit {
        EmitKind::Tokens => {
            for tok in &report.lexical.tokens {
                println!("{:?} {:?}", tok.kind, tok.lexeme.as_str());
            }
        }
        EmitKind::Ast => {
            if let Some(parse) = &report.parse {
                if let Some(ast) = &parse.ast {
                    println!("{ast:#?}");
                }
            }
        }
        EmitKind::Symbols => {
            if let Some(sem) = &report.semantic {
                println!(
                    "{} symbols across {} scopes",
                    sem.total_symbols, sem.total_scopes
                );
            }
        }
        EmitKind::Ir => {
            if let Some(codegen) = &report.codegen {
                for instr in &codegen.ir.instructions {
                    println!("{instr}");
                }
            }
        }
    }

    if report.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}
