//! Per-level progress and the level unlock rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::StageCode;
use crate::stages::{next_stage, NextStage};

/// Progress (percent) a level needs before the next one opens.
pub const UNLOCK_THRESHOLD: f64 = 80.0;

/// Highest difficulty level of the multiple-choice quiz.
pub const MAX_LEVEL: u8 = 3;

/// Backend view of one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub mastery_score: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub questions_attempted: u32,
}

impl LevelProgress {
    pub fn is_mastered(&self) -> bool {
        self.progress >= 100.0
    }

    pub fn meets_threshold(&self) -> bool {
        self.progress >= UNLOCK_THRESHOLD
    }

    /// Percentage of attempted questions answered correctly.
    pub fn success_rate(&self) -> Option<f64> {
        if self.questions_attempted == 0 {
            return None;
        }
        Some(self.total_correct as f64 / self.questions_attempted as f64 * 100.0)
    }
}

/// Progress for every level of a stage, keyed by level number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, LevelProgress>", into = "BTreeMap<String, LevelProgress>")]
pub struct ProgressTable {
    levels: BTreeMap<u8, LevelProgress>,
}

impl TryFrom<BTreeMap<String, LevelProgress>> for ProgressTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, LevelProgress>) -> Result<Self, Self::Error> {
        let mut levels = BTreeMap::new();
        for (key, value) in raw {
            let level = key
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("invalid level key: '{key}'"))?;
            levels.insert(level, value);
        }
        Ok(Self { levels })
    }
}

impl From<ProgressTable> for BTreeMap<String, LevelProgress> {
    fn from(table: ProgressTable) -> Self {
        table
            .levels
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }
}

impl ProgressTable {
    /// A table with every level at zero, shown before the first fetch.
    pub fn empty_levels() -> Self {
        Self {
            levels: (1..=MAX_LEVEL).map(|l| (l, LevelProgress::default())).collect(),
        }
    }

    pub fn from_levels(levels: impl IntoIterator<Item = (u8, LevelProgress)>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    pub fn get(&self, level: u8) -> Option<&LevelProgress> {
        self.levels.get(&level)
    }

    /// Levels in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &LevelProgress)> {
        self.levels.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level 1 is always open; level k opens once level k-1 reaches the threshold.
    ///
    /// A missing predecessor keeps the level locked.
    pub fn is_level_unlocked(&self, level: u8) -> bool {
        if level <= 1 {
            return true;
        }
        self.levels
            .get(&(level - 1))
            .is_some_and(LevelProgress::meets_threshold)
    }

    pub fn all_levels_complete(&self) -> bool {
        !self.levels.is_empty() && self.levels.values().all(LevelProgress::meets_threshold)
    }
}

/// `{"progress": {...}}` returned by the progress endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StageProgressResponse {
    #[serde(default)]
    pub progress: ProgressTable,
}

/// One row of the reports page: `[correct, incorrect, "NN%"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStat(pub u32, pub u32, pub String);

impl LevelStat {
    pub fn correct(&self) -> u32 {
        self.0
    }

    pub fn incorrect(&self) -> u32 {
        self.1
    }

    /// Accuracy as formatted by the backend.
    pub fn accuracy(&self) -> &str {
        &self.2
    }
}

/// Per-stage, per-level statistics keyed by stage code then level label.
pub type DetailedStats = BTreeMap<StageCode, BTreeMap<String, LevelStat>>;

#[derive(Debug, Clone, Deserialize)]
pub struct DetailedStatsResponse {
    #[serde(default)]
    pub statistics: DetailedStats,
}

/// The quiz-levels page: a progress table plus the one-time stage advancement offer.
#[derive(Debug, Clone)]
pub struct LevelsBoard {
    table: ProgressTable,
    offer_made: bool,
}

impl LevelsBoard {
    pub fn new(table: ProgressTable) -> Self {
        Self {
            table,
            offer_made: false,
        }
    }

    pub fn table(&self) -> &ProgressTable {
        &self.table
    }

    /// Replace the table after a reload; the offer stays spent.
    pub fn reload(&mut self, table: ProgressTable) {
        self.table = table;
    }

    /// Offer the successor of `current_stage` the first time every level is complete.
    pub fn advancement_offer(&mut self, current_stage: &str) -> Option<NextStage> {
        if self.offer_made || !self.table.all_levels_complete() {
            return None;
        }
        let next = next_stage(current_stage)?;
        self.offer_made = true;
        Some(next)
    }
}
