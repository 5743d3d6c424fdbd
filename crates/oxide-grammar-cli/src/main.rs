//! oxide-grammar CLI.
//!
//! Compiles JSON query states into dialect SQL.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use oxide_grammar::{DialectKind, GrammarConfig};
use oxide_grammar_cli::{CompileRequest, Compiler, OutputFormat};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "oxide-grammar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQL dialect (generic, mysql, postgres, sqlite, sqlserver).
    #[arg(short, long, env = "OXIDE_GRAMMAR_DIALECT", default_value = "generic")]
    dialect: DialectKind,

    /// Grammar configuration file (JSON).
    #[arg(short, long, env = "OXIDE_GRAMMAR_CONFIG")]
    config: Option<PathBuf>,

    /// Table prefix, overriding the configuration file.
    #[arg(long)]
    table_prefix: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a request file, or stdin when no file is given.
    Compile {
        /// Request file.
        input: Option<PathBuf>,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Substitute bindings into the SQL (for reading only).
        #[arg(long)]
        raw: bool,
    },

    /// List the available dialects.
    Dialects,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so compiled SQL can be piped.
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Compile { input, format, raw } => {
            let mut config = match &cli.config {
                Some(path) => GrammarConfig::from_file(path)?,
                None => GrammarConfig::default(),
            };
            if let Some(prefix) = cli.table_prefix {
                config = config.with_table_prefix(prefix);
            }

            let request = match &input {
                Some(path) => {
                    info!("Reading request from {}", path.display());
                    CompileRequest::from_file(path)?
                }
                None => CompileRequest::from_reader(std::io::stdin().lock())?,
            };

            let compiler = Compiler::new(cli.dialect, config);
            let statements = compiler.compile(&request)?;
            println!("{}", compiler.render(&statements, format, raw)?);
        }

        Commands::Dialects => {
            for kind in DialectKind::ALL {
                println!("{kind}");
            }
        }
    }

    Ok(())
}
