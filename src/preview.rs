use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use crate::{cli::PreviewArgs, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let (loader, source) = crate::open_source(&args.source)?;
    let dataset = loader
        .load(&source)
        .with_context(|| format!("Loading {source}"))?;
    let mut view = table::TableView::build(&dataset, Local::now().date_naive());
    view.rows.truncate(args.rows);

    table::print_table(&view, args.full);
    info!("Displayed {} row(s) from {source}", view.rows.len());
    Ok(())
}
