//! errchain CLI — inspect and produce serialized error chains.
//!
//! # Commands
//! ```
//! errchain render [FILE] [--stack]
//! errchain strip  [FILE] [--pretty]
//! errchain run [--no-stack] [--max-lazy-depth N] -- <PROGRAM> [ARGS..]
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use errchain_core::{SerializeOptions, DEFAULT_MAX_LAZY_DEPTH};

mod cmd_record;
mod cmd_run;
mod logging;

#[derive(Parser)]
#[command(
    name = "errchain",
    about = "Render, strip and capture serialized error chains",
    long_about = "
errchain: work with JSON error records of the form
  { name?, message?, code?, signal?, stack?, cause? }
where `cause` nests another record or carries an arbitrary JSON value.

ENVIRONMENT VARIABLES:
  ERRCHAIN_LOG      Log filter (overrides --log-level), e.g. debug
  RUST_BACKTRACE    Set to 1 to capture stacks in `run` failures
",
    version
)]
struct Cli {
    /// Log level: trace | debug | info | warn | error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a serialized record as a human-readable chain
    Render {
        /// Record file (stdin when omitted or `-`)
        file: Option<PathBuf>,
        /// Include captured stacks
        #[arg(long)]
        stack: bool,
    },

    /// Remove every `stack` field from a serialized record
    Strip {
        /// Record file (stdin when omitted or `-`)
        file: Option<PathBuf>,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Run a command; on failure print its error chain as JSON and exit with
    /// the child's exit code (1 when it was killed or never started)
    Run {
        /// Omit stacks from the emitted record
        #[arg(long)]
        no_stack: bool,
        /// Maximum number of lazy causes resolved in the emitted chain
        #[arg(long, default_value_t = DEFAULT_MAX_LAZY_DEPTH)]
        max_lazy_depth: usize,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
        /// Program to run
        program: String,
        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_tracing(&logging::LogConfig {
        level: cli.log_level,
        json: cli.log_json,
    });

    match cli.command {
        Commands::Render { file, stack } => {
            let text = cmd_record::read_input(file.as_deref())?;
            println!("{}", cmd_record::render(&text, stack)?);
            Ok(())
        }

        Commands::Strip { file, pretty } => {
            let text = cmd_record::read_input(file.as_deref())?;
            println!("{}", cmd_record::strip(&text, pretty)?);
            Ok(())
        }

        Commands::Run { no_stack, max_lazy_depth, pretty, program, args } => {
            let opts = SerializeOptions::new()
                .include_stack(!no_stack)
                .max_lazy_depth(max_lazy_depth);
            let code = cmd_run::run(&program, &args, opts, pretty)?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
    }
}
