use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use triparchive::TripArchive;
use triparchive::cli::{Cli, Command};
use triparchive::config::Config;

fn setup_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let archive_path = cli.archive.unwrap_or(config.archive_path);

    info!(path = %archive_path.display(), "triparchive starting");
    let archive = TripArchive::open(&archive_path).context("Failed to open trip archive")?;

    match cli.command {
        Command::List { limit } => {
            let trips = archive.list(limit);
            if trips.is_empty() {
                println!("No trips found");
            } else {
                for trip in trips {
                    println!(
                        "{}  {} → {}  {} days, {} ({})  {}",
                        trip.id.yellow(),
                        trip.from_city,
                        trip.to_city.cyan(),
                        trip.days,
                        trip.people,
                        trip.group_type,
                        trip.created_at.dimmed()
                    );
                }
            }
        }
        Command::Show { id } => {
            let trip = archive.get(&id).ok_or_else(|| eyre::eyre!("Trip not found: {}", id))?;
            println!("{}", triparchive::render_text(&trip));
        }
        Command::Delete { id } => {
            if !archive.delete(&id) {
                return Err(eyre::eyre!("Trip not found or could not be deleted: {}", id));
            }
            println!("{} Deleted trip: {}", "✓".green(), id);
        }
        Command::Clear { yes } => {
            if !yes {
                return Err(eyre::eyre!("Refusing to clear history without --yes"));
            }
            if !archive.clear() {
                return Err(eyre::eyre!("Failed to clear {}", archive.path().display()));
            }
            println!("{} Cleared all trips", "✓".green());
        }
        Command::Export { id, output } => {
            if !archive.export_to_text(&id, &output) {
                return Err(eyre::eyre!("Failed to export trip {} to {}", id, output.display()));
            }
            println!("{} Exported {} to {}", "✓".green(), id.cyan(), output.display());
        }
    }

    Ok(())
}
