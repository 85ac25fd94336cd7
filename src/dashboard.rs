//! Assembles every configured table, ticker and chart into a [`Page`].
//!
//! Each distinct location is loaded once, in parallel. A failed load only
//! affects the slots fed by that location: they receive an error placeholder
//! while the rest of the page renders normally.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    category::{self, Aggregation},
    config::{Bucketing, ChartConfig, ChartKind, DashboardConfig, SourceConfig, SourceKind},
    dataset::Dataset,
    error::LoadError,
    source::{Base, Loader, Source},
    table::TableView,
    ticker,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub kind: ChartKind,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
    pub unclassified: Vec<String>,
}

impl ChartData {
    fn new(config: &ChartConfig, aggregation: Aggregation) -> Self {
        Self {
            id: config.id.clone(),
            kind: config.kind,
            title: config.title.clone(),
            labels: aggregation.labels(),
            counts: aggregation.counts(),
            unclassified: aggregation.unclassified,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    Table {
        title: Option<String>,
        view: TableView,
    },
    Ticker {
        rows: Vec<String>,
    },
    Chart(ChartData),
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Placeholder { reason: String },
    NotRendered { target: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub content: Option<SlotContent>,
}

/// The set of slots a dashboard can fill, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    slots: Vec<Slot>,
}

impl Page {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots: Vec<Slot> = Vec::new();
        for id in ids {
            let id = id.into();
            if !slots.iter().any(|slot| slot.id == id) {
                slots.push(Slot { id, content: None });
            }
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, id: &str) -> Option<&SlotContent> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.content.as_ref())
    }

    /// Places `content` into slot `target`. Unknown targets are reported, not
    /// created. A later render into the same slot replaces the earlier one.
    pub fn render(&mut self, target: &str, content: SlotContent) -> RenderOutcome {
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == target) else {
            return RenderOutcome::NotRendered {
                target: target.to_string(),
            };
        };
        let outcome = match &content {
            SlotContent::Error { message } => RenderOutcome::Placeholder {
                reason: message.clone(),
            },
            _ => RenderOutcome::Rendered,
        };
        slot.content = Some(content);
        outcome
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub title: String,
    pub page: Page,
    pub charts: Vec<ChartData>,
    pub outcomes: Vec<(String, RenderOutcome)>,
}

impl Dashboard {
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !matches!(outcome, RenderOutcome::Rendered))
            .count()
    }
}

pub fn build(
    config: &DashboardConfig,
    loader: &Loader,
    base: Option<&Base>,
    today: NaiveDate,
) -> Dashboard {
    let locations = config.locations();
    let loads = locations
        .par_iter()
        .map(|location| {
            let result = Source::resolve(location, base).and_then(|source| loader.load(&source));
            (*location, result)
        })
        .collect::<HashMap<&str, Result<Dataset, LoadError>>>();

    let mut page = Page::new(config.slot_ids());
    let mut charts = Vec::new();
    let mut outcomes = Vec::new();

    for source in &config.sources {
        let content = match &loads[source.location.as_str()] {
            Ok(dataset) => source_content(source, dataset, today),
            Err(err) => placeholder(config, &source.target, err),
        };
        let outcome = page.render(&source.target, content);
        log_outcome(&source.target, &outcome);
        outcomes.push((source.target.clone(), outcome));
    }

    for chart in &config.charts {
        let content = match &loads[chart.location.as_str()] {
            Ok(dataset) => match chart_data(chart, dataset) {
                Ok(data) => {
                    charts.push(data.clone());
                    SlotContent::Chart(data)
                }
                Err(reason) => {
                    warn!("Chart '{}' skipped: {reason}", chart.id);
                    SlotContent::Error {
                        message: config.error_message.clone(),
                    }
                }
            },
            Err(err) => placeholder(config, &chart.target, err),
        };
        let outcome = page.render(&chart.target, content);
        log_outcome(&chart.target, &outcome);
        outcomes.push((chart.target.clone(), outcome));
    }

    let dashboard = Dashboard {
        title: config.title.clone(),
        page,
        charts,
        outcomes,
    };
    info!(
        "Built dashboard from {} location(s): {} slot(s) filled, {} degraded",
        locations.len(),
        dashboard.outcomes.len() - dashboard.failures(),
        dashboard.failures()
    );
    dashboard
}

fn source_content(source: &SourceConfig, dataset: &Dataset, today: NaiveDate) -> SlotContent {
    match source.kind {
        SourceKind::Table => SlotContent::Table {
            title: source.title.clone(),
            view: TableView::build(dataset, today),
        },
        SourceKind::Ticker => SlotContent::Ticker {
            rows: dataset.records().iter().map(ticker::row_text).collect(),
        },
    }
}

pub fn chart_data(chart: &ChartConfig, dataset: &Dataset) -> Result<ChartData, String> {
    let aggregation = match &chart.bucketing {
        Bucketing::CountField { field, empty_label } => {
            category::count_by_value(dataset.records(), field, empty_label)
        }
        other => match other.rule_set() {
            Ok(Some(rules)) => rules.aggregate(dataset.records()),
            Ok(None) => Aggregation::default(),
            Err(err) => return Err(format!("{err:#}")),
        },
    };
    debug!(
        "Chart '{}': {} record(s) bucketed, {} unclassified value(s)",
        chart.id,
        aggregation.total(),
        aggregation.unclassified.len()
    );
    Ok(ChartData::new(chart, aggregation))
}

fn placeholder(config: &DashboardConfig, target: &str, err: &LoadError) -> SlotContent {
    warn!("Target '{target}' degraded: {err}");
    SlotContent::Error {
        message: config.error_message.clone(),
    }
}

fn log_outcome(target: &str, outcome: &RenderOutcome) {
    if let RenderOutcome::NotRendered { .. } = outcome {
        warn!("Target '{target}' is not a slot on this page; content dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_target_is_not_rendered() {
        let mut page = Page::new(["a"]);
        let outcome = page.render("missing", SlotContent::Ticker { rows: Vec::new() });
        assert_eq!(
            outcome,
            RenderOutcome::NotRendered {
                target: "missing".to_string()
            }
        );
        assert!(page.get("a").is_none());
    }

    #[test]
    fn error_content_reports_placeholder() {
        let mut page = Page::new(["a", "a", "b"]);
        assert_eq!(page.slots().len(), 2);
        let outcome = page.render(
            "b",
            SlotContent::Error {
                message: "failed".to_string(),
            },
        );
        assert!(matches!(outcome, RenderOutcome::Placeholder { .. }));
    }

    #[test]
    fn later_render_replaces_slot_content() {
        let mut page = Page::new(["t"]);
        let empty = TableView {
            headers: Vec::new(),
            rows: Vec::new(),
        };
        page.render(
            "t",
            SlotContent::Error {
                message: "x".to_string(),
            },
        );
        page.render(
            "t",
            SlotContent::Table {
                title: None,
                view: empty.clone(),
            },
        );
        assert_eq!(
            page.get("t"),
            Some(&SlotContent::Table {
                title: None,
                view: empty
            })
        );
    }
}
