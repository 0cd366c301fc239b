//! cardctl CLI - trading card collection inventory
//!
//! Front end for `cardctl-store`:
//! - Schema setup and verification (`init`, `verify`)
//! - Adding cards and looking them up (`add`, `find`, `show`, `search`)
//! - Adjusting held quantities (`incr`, `decr`)
//!
//! Exit codes: 0 success, 1 card missing or too few copies,
//! 2 database unreachable or failed, 3 invalid input or configuration.

use std::path::PathBuf;
use std::process::ExitCode;

use cardctl_store::CardStore;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

mod commands;
mod config;
mod error;
mod tracing_setup;

use commands::cards::{AddArgs, AdjustArgs, FindArgs, SearchArgs, ShowArgs};
use commands::CardCommand;
use error::AppError;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "cardctl",
    author,
    version,
    about = "Track a trading card collection in PostgreSQL",
    long_about = "Keep one row per card printing (name, foil, proxy) with its formats, \
                  edition and the number of copies held. Quantity changes are atomic and \
                  never leave a negative total."
)]
struct Cli {
    /// Config file (default: ~/.cardctl/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces to an OTLP endpoint (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the cards, deck and location tables
    Init,
    /// Check that the cards table has the columns cardctl reads
    Verify,
    /// Add a card and print its ID
    Add(AddArgs),
    /// Print the ID of a card by name, foil and proxy flags
    Find(FindArgs),
    /// Show one card by ID
    Show(ShowArgs),
    /// List every card with this name
    Search(SearchArgs),
    /// Add copies to a card and print the new total
    Incr(AdjustArgs),
    /// Remove copies from a card and print the new total
    Decr(AdjustArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// A command with validated arguments, ready to run against the store
enum Planned {
    Init,
    Verify,
    Card(CardCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // Usage errors are invalid input; --help and --version are not errors
            return if err.use_stderr() {
                ExitCode::from(3)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let code = match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(kind = ?err.kind, "command failed");
            eprintln!("Error: {}", err);
            err.exit_code()
        }
    };

    tracing_setup::shutdown_otel();
    code
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let planned = match cli.command {
        Commands::Completions(args) => {
            run_completions(args);
            return Ok(());
        }
        Commands::Init => Planned::Init,
        Commands::Verify => Planned::Verify,
        Commands::Add(args) => Planned::Card(args.validate()?),
        Commands::Find(args) => Planned::Card(args.validate()?),
        Commands::Show(args) => Planned::Card(args.validate()),
        Commands::Search(args) => Planned::Card(args.validate()),
        Commands::Incr(args) => Planned::Card(args.increment()),
        Commands::Decr(args) => Planned::Card(args.decrement()),
    };

    let config = config::load(cli.config.as_deref()).map_err(AppError::config)?;
    let store = CardStore::connect(&config).await?;

    let result = match planned {
        Planned::Init => commands::run_init(&store).await,
        Planned::Verify => commands::run_verify(&store).await,
        Planned::Card(command) => commands::run_card_command(&store, command).await,
    };

    store.close().await;
    result
}

fn run_completions(args: CompletionsArgs) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
