mod analysis;
mod cache;
mod data_loader;
mod error;
mod filter;
mod matrix;
mod model;
mod rating_context;
mod ratings;
mod report;
mod solver;
mod util;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use cache::JsonCache;
use data_loader::*;
use filter::*;
use model::TeamRegistry;
use rating_context::RatingContext;
use ratings::process_events;
use report::output_report;

/*
    Reads a downloaded season, keeps the events our teams of interest went to, rates every one of them
    (OPR, CCWM, DPR) and writes one CSV row per team of interest.
*/
#[derive(Parser)]
#[command(name = "opr_calc", version, about = "Per-event OPR, DPR and CCWM from final alliance scores")]
struct Args {
    /// Season dump with events, teams and matches (JSON)
    #[arg(short, long, value_name = "FILE")]
    season: PathBuf,

    /// Teams of interest, one team number per line
    #[arg(short, long, value_name = "FILE")]
    teams: PathBuf,

    #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
    output: PathBuf,

    /// Rating settings (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Memoize solved ratings per event in this directory
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Also rate events not marked official
    #[arg(long)]
    include_unofficial: bool,

    /// trace, debug, info, warn or error. RUST_LOG wins when set.
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut ctx = match &args.config {
        Some(path) => RatingContext::load(path)?,
        None => RatingContext::default(),
    };
    if args.cache_dir.is_some() {
        ctx.cache_dir = args.cache_dir.clone();
    }
    if args.include_unofficial {
        ctx.official_only = false;
    }
    ctx.validate()?;

    let mut registry = TeamRegistry::new();
    let season = load_season(&args.season, &mut registry)?;
    if registry.is_empty() {
        warn!(season = %args.season.display(), "season data lists no teams");
    }

    let teams_important = load_teams_of_interest(&args.teams)?;
    for &number in &teams_important {
        if registry.get(number).is_none() {
            warn!(team = number, "team of interest not found in season data");
        }
        registry.get_or_create(number);
    }

    let mut events = season.events;
    if ctx.official_only {
        events = official_only(events);
    }
    let events = filter_events(events, &registry.resolve(&teams_important));
    info!(events = events.len(), teams = teams_important.len(), "events attended by teams of interest");

    let cache = ctx.cache_dir.as_ref().map(JsonCache::new).transpose()?;
    if let Some(cache) = &cache {
        info!(dir = %cache.dir().display(), "caching ratings");
    }

    let processed = process_events(events, &mut registry, &ctx, cache.as_ref());

    output_report(&args.output, &processed, &teams_important)
        .with_context(|| format!("report for {} events", processed.len()))?;
    info!(output = %args.output.display(), events = processed.len(), "wrote report");

    Ok(())
}
