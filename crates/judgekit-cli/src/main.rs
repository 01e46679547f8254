use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "judgekit", version, about = "Tournament judge toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Round timer control and display
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Table-judge turn ledger
    Table {
        #[command(subcommand)]
        action: commands::table::TableAction,
    },
    /// Deck check counter
    Deck {
        #[command(subcommand)]
        action: commands::deck::DeckAction,
    },
    /// Time extensions per round
    Extension {
        #[command(subcommand)]
        action: commands::extension::ExtensionAction,
    },
    /// Locale, theme and navigation preferences
    Context {
        #[command(subcommand)]
        action: commands::context::ContextAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Log to stderr so JSON on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("JUDGEKIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Table { action } => commands::table::run(action),
        Commands::Deck { action } => commands::deck::run(action),
        Commands::Extension { action } => commands::extension::run(action),
        Commands::Context { action } => commands::context::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "judgekit", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
