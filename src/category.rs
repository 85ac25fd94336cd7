//! Keyword bucketing of records into chart categories.
//!
//! A [`RuleSet`] maps every record to exactly one label. Rules are checked in
//! order and the first match wins; records that match nothing fall into the
//! fallback bucket and their value is kept for review.

use serde::{Deserialize, Serialize};

use crate::dataset::Record;

pub const DEFAULT_FALLBACK_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Case-insensitive substring.
    Contains(String),
    /// Case-insensitive comparison against the trimmed value.
    Equals(String),
}

impl Matcher {
    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Contains(needle) => value.to_lowercase().contains(&needle.to_lowercase()),
            Matcher::Equals(expected) => value.trim().to_lowercase() == expected.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub any: Vec<Matcher>,
}

impl CategoryRule {
    pub fn contains(label: &str, needles: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            any: needles
                .iter()
                .map(|needle| Matcher::Contains(needle.to_string()))
                .collect(),
        }
    }

    pub fn equals(label: &str, expected: &str) -> Self {
        Self {
            label: label.to_string(),
            any: vec![Matcher::Equals(expected.to_string())],
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.any.iter().any(|matcher| matcher.matches(value))
    }
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK_LABEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Candidate field names; the first one present with a non-empty value
    /// is classified.
    pub fields: Vec<String>,
    pub rules: Vec<CategoryRule>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub buckets: Vec<CategoryBucket>,
    /// Distinct values that matched no rule, in first-seen order.
    pub unclassified: Vec<String>,
}

impl Aggregation {
    pub fn count(&self, label: &str) -> Option<usize> {
        self.buckets
            .iter()
            .find(|bucket| bucket.label == label)
            .map(|bucket| bucket.count)
    }

    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.label.clone()).collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

impl RuleSet {
    pub fn new(fields: &[&str], rules: Vec<CategoryRule>) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rules,
            fallback: default_fallback(),
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "applicant" => Some(Self::applicant()),
            "scope-of-work" | "sow" => Some(Self::scope_of_work()),
            "status" => Some(Self::status()),
            _ => None,
        }
    }

    pub fn applicant() -> Self {
        Self::new(
            &["Applicant", "متقاضی"],
            vec![
                CategoryRule::contains("Design Office", &["design"]),
                CategoryRule::contains("Engine Shop", &["engine shop"]),
                CategoryRule::contains("QC", &["qc"]),
                CategoryRule::contains("Business Department", &["کسب و کار", "بازرگانی"]),
                CategoryRule::contains("Equipment Department", &["تجهیزات", "equipment"]),
                CategoryRule::contains("GT-21", &["21"]),
                CategoryRule::contains("GT-25", &["25"]),
                CategoryRule::contains("GT-31", &["31"]),
                CategoryRule::contains("GT-22", &["22"]),
            ],
        )
    }

    pub fn scope_of_work() -> Self {
        Self::new(
            &["sow", "SOW"],
            vec![
                CategoryRule::contains("Repair", &["repair", "coating", "heat"]),
                CategoryRule::contains("Inspection", &["inspect", "fpi"]),
                CategoryRule::contains("Cleaning", &["clean", "sand"]),
            ],
        )
    }

    pub fn status() -> Self {
        Self::new(
            &["status", "Status"],
            vec![
                CategoryRule::equals("Completed", "completed"),
                CategoryRule::equals("Repair", "repair"),
            ],
        )
    }

    /// Extracts the value this rule set classifies, or `None` when every
    /// candidate field is absent or blank.
    pub fn extract<'r>(&self, record: &'r Record) -> Option<&'r str> {
        self.fields
            .iter()
            .filter_map(|field| record.get(field))
            .find(|value| !value.trim().is_empty())
    }

    pub fn classify(&self, value: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(value))
            .map(|rule| rule.label.as_str())
    }

    pub fn aggregate(&self, records: &[Record]) -> Aggregation {
        let mut buckets = self
            .rules
            .iter()
            .map(|rule| CategoryBucket {
                label: rule.label.clone(),
                count: 0,
            })
            .collect::<Vec<_>>();
        buckets.push(CategoryBucket {
            label: self.fallback.clone(),
            count: 0,
        });
        let fallback_idx = buckets.len() - 1;
        let mut unclassified: Vec<String> = Vec::new();

        for record in records {
            let Some(value) = self.extract(record) else {
                continue;
            };
            let idx = match self.rules.iter().position(|rule| rule.matches(value)) {
                Some(idx) => idx,
                None => {
                    if !unclassified.iter().any(|seen| seen == value) {
                        unclassified.push(value.to_string());
                    }
                    fallback_idx
                }
            };
            buckets[idx].count += 1;
        }

        Aggregation {
            buckets,
            unclassified,
        }
    }
}

/// Counts records per distinct raw value of `field`. Values are compared
/// exactly as stored; only an empty or missing value is counted under
/// `empty_label`. Labels keep first-seen order.
pub fn count_by_value(records: &[Record], field: &str, empty_label: &str) -> Aggregation {
    let mut buckets: Vec<CategoryBucket> = Vec::new();
    for record in records {
        let label = match record.get(field) {
            Some(value) if !value.is_empty() => value,
            _ => empty_label,
        };
        match buckets.iter_mut().find(|bucket| bucket.label == label) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(CategoryBucket {
                label: label.to_string(),
                count: 1,
            }),
        }
    }
    Aggregation {
        buckets,
        unclassified: Vec::new(),
    }
}
