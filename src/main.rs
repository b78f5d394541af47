use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use mic::config::{self, AnalyzerConfig};
use mic::diagnostics::{self, CompileError};
use mic::native::HostRegistry;
use mic::prelude::STDLIB_SOURCE;

#[derive(Parser)]
#[command(name = "mic", version, about = "Semantic analyzer for the Mi language")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). MI_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a .mi source file and report diagnostics
    Check {
        /// Source file path
        file: PathBuf,
        /// Do not inject the standard library
        #[arg(long)]
        no_stdlib: bool,
        /// Fail when warnings are reported
        #[arg(long)]
        deny_warnings: bool,
        /// Print the annotated AST as JSON on success
        #[arg(long)]
        dump_ast: bool,
        /// Use this mi.toml instead of discovering one
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the token stream of a .mi source file
    Tokens {
        /// Source file path
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "mic=debug",
        _ => "mic=trace",
    };
    let filter = EnvFilter::try_from_env("MI_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_source(file: &Path) -> Result<String, CompileError> {
    std::fs::read_to_string(file)
        .map_err(|e| CompileError::io(format!("failed to read '{}': {e}", file.display())))
}

fn load_config(file: &Path, explicit: Option<&Path>) -> Result<AnalyzerConfig, CompileError> {
    match explicit {
        Some(path) => config::load_config(path),
        None => config::config_for_file(file),
    }
}

fn fail(file: &Path, source: &str, err: &CompileError) -> ! {
    diagnostics::render_error(source, STDLIB_SOURCE, err);
    eprintln!("error [{}]: {err}", file.display());
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { file, no_stdlib, deny_warnings, dump_ast, config } => {
            let source = read_source(&file).unwrap_or_else(|err| fail(&file, "", &err));
            let mut config = load_config(&file, config.as_deref()).unwrap_or_else(|err| fail(&file, &source, &err));
            if no_stdlib {
                config.stdlib = false;
            }
            if deny_warnings {
                config.deny_warnings = true;
            }
            tracing::debug!(?config, file = %file.display(), "checking");

            let host = HostRegistry::standard();
            match mic::check_with(&source, &config, &host) {
                Ok(analysis) => {
                    diagnostics::render_diagnostics(&source, STDLIB_SOURCE, &analysis.diagnostics);
                    if dump_ast {
                        match serde_json::to_string_pretty(&analysis.root) {
                            Ok(json) => println!("{json}"),
                            Err(e) => fail(&file, &source, &CompileError::io(format!("failed to serialize AST: {e}"))),
                        }
                    }
                    let warnings = analysis.diagnostics.warnings().count();
                    eprintln!("{}: ok ({warnings} warning(s))", file.display());
                }
                Err(err) => fail(&file, &source, &err),
            }
        }
        Commands::Tokens { file } => {
            let source = read_source(&file).unwrap_or_else(|err| fail(&file, "", &err));
            match mic::lexer::lex(&source) {
                Ok(tokens) => {
                    for token in tokens {
                        println!("{}:{}\t{}\t{}", token.line, token.column, token.kind, token.lexeme);
                    }
                }
                Err(err) => fail(&file, &source, &err),
            }
        }
    }
}
