use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ma_lines::commands::{
    analyze_command, primitives_command, registration_command, AnalyzeOptions,
};
use ma_lines::init_tracing;

/// Lists source locations where memory accesses may happen.
///
/// This CLI is a thin wrapper around `ma-lines-core` (exposed in code as
/// `ma_lines_core`).
#[derive(Parser, Debug)]
#[command(name = "ma-lines", version, about = "Memory access location lister", long_about = None)]
struct Cli {
    /// Log per-function decisions to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct PassArgs {
    /// Output list to append to. Overrides `--plugin-arg file=...`.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Plugin argument as `key=value` (e.g. `file=out.list`). Repeatable.
    #[arg(long = "plugin-arg", value_name = "KEY=VALUE")]
    plugin_args: Vec<String>,

    /// Interprocedural points-to analysis ran for this compilation.
    #[arg(long, default_value_t = false)]
    ipa_pta: bool,

    /// Give up on a record after waiting this long for the file lock.
    #[arg(long)]
    lock_timeout_ms: Option<u64>,
}

impl PassArgs {
    fn into_options(self, json: bool) -> AnalyzeOptions {
        AnalyzeOptions {
            file: self.file,
            plugin_args: self.plugin_args,
            ipa_pta: self.ipa_pta,
            lock_timeout_ms: self.lock_timeout_ms,
            json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze translation units (JSON or YAML) and append their accesses.
    Analyze {
        #[command(flatten)]
        pass: PassArgs,

        /// Emit the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Translation unit files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List the string/memory functions whose calls are always reported.
    Primitives {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show where the pass is registered and the effective configuration.
    Registration {
        #[command(flatten)]
        pass: PassArgs,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Analyze { pass, json, inputs } => {
            analyze_command(&inputs, &pass.into_options(json))?
        }
        Command::Primitives { json } => primitives_command(json)?,
        Command::Registration { pass, json } => {
            registration_command(&pass.into_options(json), json)?
        }
    }

    Ok(())
}
