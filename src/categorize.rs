use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info};

use crate::{
    category::{self, Aggregation, DEFAULT_FALLBACK_LABEL, RuleSet},
    cli::CategorizeArgs,
    table,
};

pub fn execute(args: &CategorizeArgs) -> Result<()> {
    let (loader, source) = crate::open_source(&args.source)?;
    let dataset = loader
        .load(&source)
        .with_context(|| format!("Loading {source}"))?;

    let aggregation = if let Some(field) = &args.count_field {
        category::count_by_value(dataset.records(), field, DEFAULT_FALLBACK_LABEL)
    } else {
        let rules = resolve_rules(args)?;
        debug!(
            "Classifying field(s) {:?} with {} rule(s)",
            rules.fields,
            rules.rules.len()
        );
        rules.aggregate(dataset.records())
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&aggregation)?);
    } else {
        print_aggregation(&aggregation);
    }
    info!(
        "Bucketed {} of {} record(s) from {source}",
        aggregation.total(),
        dataset.row_count()
    );
    Ok(())
}

fn resolve_rules(args: &CategorizeArgs) -> Result<RuleSet> {
    if let Some(path) = &args.rules_file {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening rules file {path:?}"))?;
        return serde_yaml::from_str(&raw).with_context(|| format!("Parsing rules file {path:?}"));
    }
    match args.rules.as_deref() {
        Some(name) => RuleSet::preset(name).ok_or_else(|| anyhow!("Unknown rule preset '{name}'")),
        None => bail!("One of --rules, --rules-file or --count-field is required"),
    }
}

fn print_aggregation(aggregation: &Aggregation) {
    let headers = vec!["label".to_string(), "count".to_string()];
    let rows = aggregation
        .buckets
        .iter()
        .map(|bucket| vec![bucket.label.clone(), bucket.count.to_string()])
        .collect::<Vec<_>>();
    print!("{}", table::render_rows(&headers, &rows));
    if !aggregation.unclassified.is_empty() {
        println!();
        println!("unclassified:");
        for value in &aggregation.unclassified {
            println!("  {value}");
        }
    }
}
