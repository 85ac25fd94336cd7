//! Row-by-row ticker for the R&D panel.
//!
//! The panel shows one row at a time: each character flips in, the row
//! holds, then fades out before the next one. [`Ticker::step`] advances one
//! row and reports how long it stays on screen; a driver loop sleeps for
//! that long and steps again until `None`.

use std::{collections::VecDeque, time::Duration};

use itertools::Itertools;

use crate::dataset::Record;

const PER_CHAR: Duration = Duration::from_millis(50);
const FLIP: Duration = Duration::from_millis(500);
const HOLD: Duration = Duration::from_millis(500);
const FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub text: String,
    pub visible_for: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cycle,
    Once,
}

#[derive(Debug, Clone)]
pub struct Ticker {
    original: Vec<String>,
    queue: VecDeque<String>,
    mode: Mode,
}

impl Ticker {
    pub fn new(rows: Vec<String>, mode: Mode) -> Self {
        Self {
            queue: rows.iter().cloned().collect(),
            original: rows,
            mode,
        }
    }

    pub fn from_records(records: &[Record], mode: Mode) -> Self {
        Self::new(records.iter().map(row_text).collect(), mode)
    }

    pub fn step(&mut self) -> Option<Frame> {
        if self.queue.is_empty() && self.mode == Mode::Cycle {
            self.queue.extend(self.original.iter().cloned());
        }
        let text = self.queue.pop_front()?;
        let visible_for = frame_duration(&text);
        Some(Frame { text, visible_for })
    }
}

/// The `description` field when present, otherwise every value joined.
pub fn row_text(record: &Record) -> String {
    match record.get("description") {
        Some(description) if !description.is_empty() => description.to_string(),
        _ => record.values().iter().join(" | "),
    }
}

pub fn frame_duration(text: &str) -> Duration {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    PER_CHAR.saturating_mul(chars) + FLIP + HOLD + FADE
}
