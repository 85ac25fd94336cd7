pub mod category;
pub mod categorize;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod html;
pub mod io_utils;
pub mod preview;
pub mod prefs;
pub mod render;
pub mod source;
pub mod table;
pub mod ticker;

use std::{env, sync::OnceLock, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, SourceArgs},
    source::{Base, Loader, Source},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("opsboard", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Categorize(args) => categorize::execute(&args),
        Commands::Ticker(args) => handle_ticker(&args),
    }
}

/// Resolves the location named on the command line and builds a loader for it.
pub(crate) fn open_source(args: &SourceArgs) -> Result<(Loader, Source)> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let loader = Loader::new(Duration::from_secs(args.timeout))?.with_encoding(encoding);
    let base = args.base.as_deref().map(Base::parse).transpose()?;
    let source = Source::resolve(&args.source, base.as_ref())
        .with_context(|| format!("Resolving location '{}'", args.source))?;
    Ok((loader, source))
}

fn handle_ticker(args: &cli::TickerArgs) -> Result<()> {
    let (loader, source) = open_source(&args.source)?;
    let dataset = loader
        .load(&source)
        .with_context(|| format!("Loading {source}"))?;
    let mode = match args.steps {
        Some(_) => ticker::Mode::Cycle,
        None => ticker::Mode::Once,
    };
    let mut ticker = ticker::Ticker::from_records(dataset.records(), mode);
    let limit = args.steps.unwrap_or(usize::MAX);
    let mut printed = 0usize;
    while printed < limit {
        let Some(frame) = ticker.step() else {
            break;
        };
        println!("{}\t{}", frame.visible_for.as_millis(), frame.text);
        printed += 1;
    }
    info!("Printed {printed} ticker frame(s) from {source}");
    Ok(())
}
