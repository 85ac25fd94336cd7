//! Dashboard presentation preferences and their persistence.
//!
//! Preferences travel as an explicit value into rendering; storage goes
//! through the [`KeyValueStore`] trait so callers pick where they live.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

const THEME_KEY: &str = "theme";
const FONT_SCALE_KEY: &str = "font_scale";
const PANE_SPLIT_KEY: &str = "pane_split";
const SCROLL_KEY: &str = "scroll_offsets";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Reading preferences {path:?}"))?;
            serde_json::from_str(&raw).with_context(|| format!("Parsing preferences {path:?}"))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        let serialized = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Writing preferences {:?}", self.path))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Light => "light-mode",
            Theme::Dark => "dark-mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub font_scale: f64,
    /// Fraction of the width given to the left pane, if the user moved it.
    pub pane_split: Option<f64>,
    pub scroll_offsets: BTreeMap<String, u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_scale: 1.0,
            pane_split: None,
            scroll_offsets: BTreeMap::new(),
        }
    }
}

impl Preferences {
    /// Reads every known key, keeping defaults for keys that are missing.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            theme: read_key(store, THEME_KEY)?.unwrap_or(defaults.theme),
            font_scale: read_key(store, FONT_SCALE_KEY)?.unwrap_or(defaults.font_scale),
            pane_split: read_key(store, PANE_SPLIT_KEY)?.unwrap_or(defaults.pane_split),
            scroll_offsets: read_key(store, SCROLL_KEY)?.unwrap_or(defaults.scroll_offsets),
        })
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, serde_json::to_string(&self.theme)?)?;
        store.set(FONT_SCALE_KEY, serde_json::to_string(&self.font_scale)?)?;
        store.set(PANE_SPLIT_KEY, serde_json::to_string(&self.pane_split)?)?;
        store.set(SCROLL_KEY, serde_json::to_string(&self.scroll_offsets)?)?;
        Ok(())
    }
}

fn read_key<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(
            serde_json::from_str(&raw).with_context(|| format!("Preference '{key}'"))?,
        )),
        None => Ok(None),
    }
}
