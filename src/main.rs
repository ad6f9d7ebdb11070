use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use travel_planner::input::{InquirePrompter, resolve_trip_request};
use travel_planner::{
    Credentials, OpenAiCompatibleClient, PlannerConfig, PlannerError, ToolRegistry, TravelAgent,
    TripPlanner, telemetry,
};

/// Plan a trip: weather, points of interest and a day-by-day itinerary
#[derive(Debug, Parser)]
#[command(name = "travel-planner", version, about)]
struct Cli {
    /// Destination: a place name or "lat,lon"
    #[arg(long)]
    city: Option<String>,

    /// First day of the trip (YYYY-MM-DD), defaults to today
    #[arg(long)]
    start: Option<String>,

    /// Last day of the trip (YYYY-MM-DD), defaults to the start date
    #[arg(long)]
    end: Option<String>,

    /// Run the tools directly without the language model
    #[arg(long)]
    direct: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: Cli) -> Result<String> {
    let config = PlannerConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    let credentials = Credentials::from_env();
    let _telemetry = telemetry::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", config);
    debug!("Credentials: {:?}", credentials);

    // Fail on a missing key before prompting or touching the network
    let llm_key = if cli.direct {
        None
    } else {
        Some(credentials.require_llm_key()?.to_string())
    };

    let request = resolve_trip_request(
        cli.city,
        cli.start,
        cli.end,
        Local::now().date_naive(),
        &InquirePrompter,
    )?;

    let planner = TripPlanner::from_config(&config, &credentials)?;

    let Some(llm_key) = llm_key else {
        info!("Planning {} without the language model", request.place);
        return Ok(planner.direct_plan(&request).await?);
    };

    let model = OpenAiCompatibleClient::new(&config.llm, llm_key)?;
    info!("Invoking supervisor agent with model {}", model.model());

    let tools = ToolRegistry::for_planner(Arc::new(planner));
    let agent = TravelAgent::new(model, tools, config.llm.max_tool_rounds);
    Ok(agent.run(&request.user_query()).await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("\n=== AGENT OUTPUT ===\n");
            println!("{output}");
            println!("\n=== END ===\n");
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<PlannerError>() {
                Some(error) => eprintln!("Error: {}", error.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            debug!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
