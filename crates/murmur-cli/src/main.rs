//! CLI frontend for the murmur chat-fiction engine.

mod commands;
mod presenter;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "murmur",
    about = "murmur: interactive chat fiction in your terminal",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding saves and settings
    #[arg(long, global = true, default_value = ".murmur")]
    saves: PathBuf,

    /// Save slot to use
    #[arg(long, global = true, default_value = "default")]
    slot: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a story, resuming the saved game if there is one
    Play {
        /// Story file (.json)
        story: PathBuf,

        /// Replace every wait with a short fixed pause
        #[arg(long, conflicts_with = "real_time")]
        compressed: bool,

        /// Follow the wall clock for waits
        #[arg(long)]
        real_time: bool,

        /// Speed multiplier for real-time waits
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Pause used by compressed time, in milliseconds
        #[arg(long, default_value_t = 500)]
        pause_ms: u64,

        /// Pick the first offered choice until the story ends
        #[arg(long)]
        auto: bool,
    },

    /// Validate a story file
    Check {
        /// Story file (.json)
        story: PathBuf,
    },

    /// Show the saved game of the selected slot
    Status,

    /// Export the selected slot as a JSON bundle
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the selected slot with an exported bundle
    Import {
        /// Bundle file produced by `export`
        file: PathBuf,
    },

    /// Delete the saved game of the selected slot
    Reset,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Set one setting (an empty value clears text settings)
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MURMUR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let saves = commands::SaveTarget::new(&cli.saves, &cli.slot);

    let result = match cli.command {
        Commands::Play {
            story,
            compressed,
            real_time,
            speed,
            pause_ms,
            auto,
        } => commands::play::run(
            &saves,
            &story,
            &commands::play::PlayOptions {
                compressed,
                real_time,
                speed,
                pause_ms,
                auto,
            },
        ),
        Commands::Check { story } => commands::check::run(&story),
        Commands::Status => commands::status::run(&saves),
        Commands::Export { output } => commands::export::run(&saves, output.as_deref()),
        Commands::Import { file } => commands::import::run(&saves, &file),
        Commands::Reset => commands::reset::run(&saves),
        Commands::Settings { action } => match action {
            None => commands::settings::show(&saves),
            Some(SettingsAction::Set { key, value }) => {
                commands::settings::set(&saves, &key, &value)
            }
        },
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
