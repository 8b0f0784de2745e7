use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "shadowlantern", version, about = "Shadow Lantern CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit tracking and reward-habituation tests
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Archived habit monsters
    Collection {
        #[command(subcommand)]
        action: commands::collection::CollectionAction,
    },
    /// The value spirit
    Spirit {
        #[command(subcommand)]
        action: commands::spirit::SpiritAction,
    },
    /// Run a value diagnosis
    Diagnose {
        #[command(subcommand)]
        action: commands::diagnose::DiagnoseAction,
    },
    /// The value lantern
    Lantern {
        #[command(subcommand)]
        action: commands::lantern::LanternAction,
    },
    /// Daily and weekly reflection
    Reflect {
        #[command(subcommand)]
        action: commands::reflect::ReflectAction,
    },
    /// Today's value-aligned goal
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// API key management for the analysis service
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Collection { action } => commands::collection::run(action),
        Commands::Spirit { action } => commands::spirit::run(action),
        Commands::Diagnose { action } => commands::diagnose::run(action),
        Commands::Lantern { action } => commands::lantern::run(action),
        Commands::Reflect { action } => commands::reflect::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "shadowlantern",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
