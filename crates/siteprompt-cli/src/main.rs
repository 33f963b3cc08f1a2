use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "siteprompt", version, about = "SitePrompt CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Inspect or clear stored popup suppression state
    Suppression {
        #[command(subcommand)]
        action: commands::suppression::SuppressionAction,
    },
    /// Would a popup arm on this path right now?
    Check(commands::check::CheckArgs),
    /// Replay a scripted page session against a popup
    Simulate(commands::simulate::SimulateArgs),
    /// Preview generated social-proof notifications
    Notify(commands::notify::NotifyArgs),
    /// Rank related blog posts
    Related(commands::related::RelatedArgs),
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SITEPROMPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Suppression { action } => commands::suppression::run(action),
        Commands::Check(args) => commands::check::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
        Commands::Notify(args) => commands::notify::run(args),
        Commands::Related(args) => commands::related::run(args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "siteprompt", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
