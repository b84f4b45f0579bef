mod pipeline;
mod profiles;
mod runner;
mod sync;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "avsync")]
#[command(about = "Sync Avito seller profiles, ad statistics and reviews into Google Sheets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the sync for every profile row in the profiles worksheet
    Sync {
        /// Restrict the run to one profile (by profile id or label)
        #[arg(long)]
        profile: Option<String>,

        /// Do not fetch or answer reviews
        #[arg(long)]
        skip_reviews: bool,

        /// Compute rollups and log them without writing to the spreadsheet
        #[arg(long)]
        dry_run: bool,
    },
    /// List profile rows with their status markers
    Profiles,
    /// Print the loaded configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = avsync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Sync {
            profile,
            skip_reviews,
            dry_run,
        }) => {
            let options = runner::RunOptions {
                profile_filter: profile,
                skip_reviews,
                dry_run,
                halt_on_failure: config.halt_on_failure,
                run_date: chrono::Local::now().date_naive(),
            };
            sync::run_sync(&config, &options).await?;
        }
        Some(Commands::Profiles) => profiles::run_list_profiles(&config).await?,
        Some(Commands::Config) => println!("{config:#?}"),
        None => Cli::command().print_help()?,
    }

    Ok(())
}
