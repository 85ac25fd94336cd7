//! Dashboard layout: which CSV feeds go where and which charts they drive.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{category::RuleSet, prefs::Theme};

pub const DEFAULT_ERROR_MESSAGE: &str = "خطا در بارگذاری داده‌ها.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Table,
    Ticker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub location: String,
    pub target: String,
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

/// How a chart turns records into counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucketing {
    /// Named preset, see [`RuleSet::preset`].
    Preset(String),
    Rules(RuleSet),
    /// Plain frequency count of one field.
    CountField { field: String, empty_label: String },
}

impl Bucketing {
    pub fn rule_set(&self) -> Result<Option<RuleSet>> {
        match self {
            Bucketing::Preset(name) => match RuleSet::preset(name) {
                Some(rules) => Ok(Some(rules)),
                None => bail!("Unknown rule preset '{name}'"),
            },
            Bucketing::Rules(rules) => Ok(Some(rules.clone())),
            Bucketing::CountField { .. } => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub id: String,
    pub location: String,
    pub target: String,
    pub kind: ChartKind,
    pub bucketing: Bucketing,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    /// Base directory or URL for relative locations.
    pub base: Option<String>,
    /// Page slots that content may be rendered into. Every configured target
    /// is a slot when this is omitted.
    pub slots: Option<Vec<String>>,
    pub sources: Vec<SourceConfig>,
    pub charts: Vec<ChartConfig>,
    pub error_message: String,
    pub theme: Option<Theme>,
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let table = |location: &str, target: &str| SourceConfig {
            location: location.to_string(),
            target: target.to_string(),
            kind: SourceKind::Table,
            title: None,
        };
        let chart = |id: &str, kind: ChartKind, bucketing: Bucketing| ChartConfig {
            id: id.to_string(),
            location: "data/projects_curr.csv".to_string(),
            target: id.to_string(),
            kind,
            bucketing,
            title: None,
        };
        let sources = vec![
            table("data/projects_curr.csv", "current-projects-table"),
            table("data/projects_Future.csv", "future-projects-table"),
            table("data/service_equipments.csv", "service-equipment-table"),
            table("data/calib_equipments.csv", "calibration-equipment-table"),
            SourceConfig {
                location: "data/Res_Dev_projects.csv".to_string(),
                target: "rd-info".to_string(),
                kind: SourceKind::Ticker,
                title: None,
            },
        ];
        let charts = vec![
            chart(
                "statusChart",
                ChartKind::Pie,
                Bucketing::Preset("status".to_string()),
            ),
            chart(
                "sowChart",
                ChartKind::Pie,
                Bucketing::Preset("scope-of-work".to_string()),
            ),
            chart(
                "clientChart",
                ChartKind::Bar,
                Bucketing::CountField {
                    field: "Client".to_string(),
                    empty_label: "Other".to_string(),
                },
            ),
            chart(
                "applicantChart",
                ChartKind::Pie,
                Bucketing::Preset("applicant".to_string()),
            ),
        ];
        Self {
            title: "Operations Dashboard".to_string(),
            base: None,
            slots: None,
            sources,
            charts,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            theme: None,
            timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("Parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for chart in &self.charts {
            chart
                .bucketing
                .rule_set()
                .with_context(|| format!("Chart '{}'", chart.id))?;
        }
        Ok(())
    }

    pub fn slot_ids(&self) -> Vec<String> {
        match &self.slots {
            Some(slots) => slots.clone(),
            None => self
                .sources
                .iter()
                .map(|s| s.target.clone())
                .chain(self.charts.iter().map(|c| c.target.clone()))
                .collect(),
        }
    }

    /// Distinct locations in first-seen order.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let all = self
            .sources
            .iter()
            .map(|s| s.location.as_str())
            .chain(self.charts.iter().map(|c| c.location.as_str()));
        for location in all {
            if !seen.contains(&location) {
                seen.push(location);
            }
        }
        seen
    }
}
