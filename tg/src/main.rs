//! TripGenie - travel planning assistant
//!
//! CLI entry point for validating trip input, looking up places and
//! generating plans.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use tripgenie::cli::{Cli, Command, PreferenceArgs, TripArgs, get_log_path};
use tripgenie::config::Config;
use tripgenie::events::{ApiCallLogger, Telemetry};
use tripgenie::geocoder::Geocoder;
use tripgenie::llm::{ChatMessage, create_client};
use tripgenie::planner::TripPlanner;
use tripgenie::prompts::PromptLoader;
use tripgenie::request::TripRequest;
use tripgenie::tools::ToolExecutor;
use tripgenie::validation::validate_complete_trip_input;
use triparchive::TripArchive;

/// Longest tool output echoed while streaming
const TOOL_PREVIEW_CHARS: usize = 160;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = match level_str.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config comes first so its log-level can seed the subscriber
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!(provider = %config.llm.provider, model = %config.llm.model, "TripGenie loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Validate { trip } => {
            debug!("main: matched Validate command");
            cmd_validate(&trip)
        }
        Command::Locate { query, best } => {
            debug!(%query, best, "main: matched Locate command");
            cmd_locate(&config, &query, best).await
        }
        Command::Plan {
            trip,
            preferences,
            stream,
            save,
        } => {
            debug!(stream, save, "main: matched Plan command");
            cmd_plan(&config, &trip, &preferences, stream, save).await
        }
    }
}

/// Validate the trip and return the request with sanitized fields
fn validated_request(request: TripRequest) -> Result<TripRequest> {
    match validate_complete_trip_input(request.trip_input()) {
        Ok(input) => Ok(request.with_validated(input)),
        Err(e) => {
            for message in e.messages() {
                eprintln!("{} {}", "✗".red(), message);
            }
            Err(eyre::eyre!("Trip input is invalid"))
        }
    }
}

fn cmd_validate(trip: &TripArgs) -> Result<()> {
    let request = validated_request(trip.to_request())?;
    println!(
        "{} {} → {}, {} day(s), {} traveler(s)",
        "✓".green(),
        request.from_city,
        request.to_city.cyan(),
        request.days,
        request.people
    );
    Ok(())
}

async fn cmd_locate(config: &Config, query: &str, best: bool) -> Result<()> {
    let geocoder = Geocoder::from_config(&config.location).context("Failed to create geocoder")?;

    if best {
        let location = geocoder
            .get_location_details(query)
            .await
            .ok_or_else(|| eyre::eyre!("No location found for '{}'", query))?;
        let (lat, lon) = location.coordinates();
        println!("{}", location.to_string().cyan());
        println!("  {}", location.label.dimmed());
        println!("  {:.5}, {:.5}", lat, lon);
        return Ok(());
    }

    let locations = geocoder.search(query).await;
    if locations.is_empty() {
        println!("No locations found");
        return Ok(());
    }
    for (i, location) in locations.iter().enumerate() {
        println!(
            "{}. {}  ({:.4}, {:.4})",
            i + 1,
            location.label,
            location.latitude,
            location.longitude
        );
    }
    Ok(())
}

async fn cmd_plan(config: &Config, trip: &TripArgs, preferences: &PreferenceArgs, stream: bool, save: bool) -> Result<()> {
    let request = validated_request(preferences.apply(trip.to_request()))?;
    config.validate().context("Configuration is incomplete")?;

    // Services are built once and shared by Arc
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let tools = Arc::new(ToolExecutor::from_config(&config.search).context("Failed to create search tools")?);
    let telemetry: Arc<dyn Telemetry> = match &config.storage.api_call_log {
        Some(path) => Arc::new(ApiCallLogger::with_file(path)),
        None => Arc::new(ApiCallLogger::new()),
    };
    let loader = PromptLoader::from_default_dir();
    let mut planner = TripPlanner::new(llm, tools, telemetry, &config.planner);
    match loader.system_prompt() {
        Ok(system) => planner = planner.with_system_prompt(system),
        Err(e) => warn!(error = %e, "Failed to load system prompt, using embedded persona"),
    }

    let prompt = request.to_prompt(&loader).context("Failed to render trip request")?;
    println!(
        "{} Planning {} day(s) from {} to {}...",
        "→".cyan(),
        request.days,
        request.from_city,
        request.to_city.cyan()
    );

    let (plan, completed) = if stream {
        let mut run = planner.start(&prompt);
        while let Some(message) = run.step().await {
            print_streamed(&message);
        }
        let plan = run
            .conversation()
            .last()
            .and_then(ChatMessage::text)
            .unwrap_or_default()
            .to_string();
        let completed = run.finish_reason().is_some_and(|reason| !reason.is_synthetic());
        (plan, completed)
    } else {
        let outcome = planner.generate_outcome(&prompt).await;
        println!("\n{}", outcome.content);
        (outcome.content, !outcome.finish.is_synthetic())
    };

    if save {
        if !completed {
            warn!("Plan did not complete, not saving");
            eprintln!("{} Plan did not complete; nothing saved", "✗".red());
            return Ok(());
        }
        let archive = TripArchive::open(&config.storage.archive_path).context("Failed to open trip archive")?;
        let id = archive
            .save(
                &request.from_city,
                &request.to_city,
                request.days,
                request.people,
                &request.group_type,
                &plan,
            )
            .ok_or_else(|| eyre::eyre!("Failed to save trip to {}", archive.path().display()))?;
        println!("{} Saved trip {}", "✓".green(), id.yellow());
    }

    Ok(())
}

fn print_streamed(message: &ChatMessage) {
    match message {
        ChatMessage::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
            for call in tool_calls {
                let query = call.input.get("query").and_then(|q| q.as_str()).unwrap_or_default();
                println!("{} {} {}", "🔍".cyan(), call.name.dimmed(), query);
            }
        }
        ChatMessage::ToolResult { content, is_error, .. } => {
            let preview: String = content.chars().take(TOOL_PREVIEW_CHARS).collect();
            let preview = preview.replace('\n', " ");
            if *is_error {
                println!("   {}", preview.red());
            } else {
                println!("   {}", preview.dimmed());
            }
        }
        other => {
            println!("\n{}", other.text().unwrap_or_default());
        }
    }
}
