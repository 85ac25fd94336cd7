use std::{fs, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use crate::{
    cli::RenderArgs,
    config::DashboardConfig,
    dashboard, html,
    prefs::{JsonFileStore, KeyValueStore, MemoryStore, Preferences},
    source::{Base, Loader},
};

pub fn execute(args: &RenderArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    let mut store: Box<dyn KeyValueStore> = match &args.prefs {
        Some(path) => Box::new(JsonFileStore::open(path)?),
        None => Box::new(MemoryStore::default()),
    };
    let mut prefs = Preferences::load(&*store)?;
    if let Some(theme) = args.theme.or(config.theme) {
        prefs.theme = theme;
    }
    if args.theme.is_some() {
        prefs.save(&mut *store)?;
    }

    let base = args
        .base
        .as_deref()
        .or(config.base.as_deref())
        .map(Base::parse)
        .transpose()?;
    let loader = Loader::new(Duration::from_secs(config.timeout_secs))?;
    let board = dashboard::build(&config, &loader, base.as_ref(), Local::now().date_naive());

    let page = html::render_page(&board, &prefs)?;
    fs::write(&args.output, page)
        .with_context(|| format!("Writing dashboard to {:?}", args.output))?;
    if let Some(path) = &args.chart_json {
        fs::write(path, html::chart_json(&board.charts)?)
            .with_context(|| format!("Writing chart data to {path:?}"))?;
    }
    info!(
        "Dashboard with {} slot(s) and {} chart(s) written to {:?}",
        board.page.slots().len(),
        board.charts.len(),
        args.output
    );
    Ok(())
}
