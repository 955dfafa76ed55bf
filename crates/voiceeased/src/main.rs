//! VoiceEase Daemon - agent request intake, accounts and admin API
//!
//! Serves the JSON API, seeds the admin/demo accounts on start-up, and
//! offers offline helpers for classification and password hashing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;
use voiceease_shared::{classify, ClassifierInput};
use voiceeased::config::Config;
use voiceeased::password::hash_password;
use voiceeased::seed;
use voiceeased::server::{self, AppState};
use voiceeased::store::Store;

/// VoiceEase daemon
#[derive(Parser)]
#[command(name = "voiceeased")]
#[command(about = "VoiceEase - voice agent intake and admin API", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults to /etc/voiceease/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand (if not provided, serves the API)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed accounts, then serve the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Create the admin/demo accounts if missing, then exit
    Seed,

    /// Print the plan recommendation for an intake as JSON
    Classify {
        #[arg(long)]
        industry: String,

        #[arg(long, default_value = "Your Business")]
        business_name: String,

        #[arg(long)]
        services: Option<String>,

        #[arg(long)]
        appointment_types: Option<String>,

        #[arg(long)]
        calendar: Option<String>,
    },

    /// Read a password from stdin and print its stored hash
    HashPassword,

    /// Write a config file with every default filled in
    InitConfig {
        #[arg(long, default_value = voiceeased::config::CONFIG_PATH)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            serve(config).await
        }
        Commands::Seed => {
            let config = Config::load(cli.config.as_deref())?;
            let store = Store::open(&config.database.path)?;
            let report = seed::bootstrap(&store, &config.seed, config.auth.pbkdf2_iterations)?;
            info!("[SEED] {:?}", report);
            Ok(())
        }
        Commands::Classify {
            industry,
            business_name,
            services,
            appointment_types,
            calendar,
        } => {
            let classification = classify(&ClassifierInput {
                business_name: &business_name,
                industry: &industry,
                services_offered: services.as_deref(),
                appointment_types: appointment_types.as_deref(),
                calendar_used: calendar.as_deref(),
            });
            println!("{}", serde_json::to_string_pretty(&classification)?);
            Ok(())
        }
        Commands::HashPassword => {
            let config = Config::load(cli.config.as_deref())?;
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            let password = line.trim_end_matches(['\r', '\n']);
            println!("{}", hash_password(password, config.auth.pbkdf2_iterations));
            Ok(())
        }
        Commands::InitConfig { path } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            Config::save_default(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("[BOOT] VoiceEase daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let store = Store::open(&config.database.path)
        .context("Failed to open database")?;
    info!("[BOOT] Database ready at {}", config.database.path.display());

    if config.seed.enabled {
        let (seed_store, seed_config) = (store.clone(), config.seed.clone());
        let iterations = config.auth.pbkdf2_iterations;
        let report = tokio::task::spawn_blocking(move || {
            seed::bootstrap(&seed_store, &seed_config, iterations)
        })
        .await?
        .context("Failed to seed accounts")?;
        info!(
            admin_created = report.admin_created,
            demo_created = report.demo_created,
            "[BOOT] Seed complete"
        );
    }

    server::run(AppState::new(store, config)).await
}
