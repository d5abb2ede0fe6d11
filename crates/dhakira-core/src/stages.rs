//! Educational stage catalog and the curriculum successor mapping.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::StageCode;

const BUNDLED_STAGES: &str = include_str!("stages.toml");

/// The single stage where the curriculum splits into two tracks.
pub const BRANCH_STAGE: &str = "JS4";

/// One row of the stage catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub code: StageCode,
    /// Arabic display name.
    pub name: String,
    /// Whether the date/event and historical-figures quizzes are offered.
    #[serde(default)]
    pub extended_quizzes: bool,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    stages: Vec<Stage>,
}

/// Immutable lookup table of known stages, in curriculum order.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("unknown educational stage: {0}")]
    Unknown(String),
    #[error("stage {current} cannot advance to {requested}")]
    NotASuccessor { current: String, requested: String },
    #[error("stage {0} is the last one")]
    Terminal(String),
}

impl StageCatalog {
    /// Parse a catalog from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(content)?;
        Ok(Self { stages: file.stages })
    }

    /// The catalog shipped with the binary.
    pub fn bundled() -> &'static StageCatalog {
        static CATALOG: OnceLock<StageCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            StageCatalog::from_toml(BUNDLED_STAGES).expect("bundled stages.toml must parse")
        })
    }

    pub fn get(&self, code: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.code == code)
    }

    /// Display name for `code`, or an empty string when unknown.
    pub fn display_name(&self, code: &str) -> &str {
        self.get(code).map(|s| s.name.as_str()).unwrap_or("")
    }

    pub fn has_extended_quizzes(&self, code: &str) -> bool {
        self.get(code).is_some_and(|s| s.extended_quizzes)
    }

    /// Resolve a user-supplied code, rejecting unknown ones.
    pub fn resolve(&self, code: &str) -> Result<&Stage, StageError> {
        self.get(code)
            .ok_or_else(|| StageError::Unknown(code.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// What follows a stage once all its levels are complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStage {
    Single(StageCode),
    /// The general track splits; the student picks one.
    Choice([StageCode; 2]),
}

impl NextStage {
    /// Codes offered to the student, in presentation order.
    pub fn options(&self) -> Vec<&StageCode> {
        match self {
            NextStage::Single(code) => vec![code],
            NextStage::Choice(codes) => codes.iter().collect(),
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        self.options().iter().any(|c| *c == code)
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, NextStage::Choice(_))
    }
}

/// Successor lookup over the fixed curriculum.
pub fn next_stage(current: &str) -> Option<NextStage> {
    let single = |c: &str| Some(NextStage::Single(StageCode::from(c)));
    match current {
        "PS1" => single("PS2"),
        "PS2" => single("PS3"),
        "PS3" => single("PS4"),
        "PS4" => single("PS5"),
        "PS5" => single("JS1"),
        "JS1" => single("JS2"),
        "JS2" => single("JS3"),
        "JS3" => single("JS4"),
        "JS4" => Some(NextStage::Choice(["HSS1".into(), "HSL1".into()])),
        "HSS1" => single("HSS2"),
        "HSS2" => single("HSS3"),
        "HSL1" => single("HSL2"),
        "HSL2" => single("HSL3"),
        "HSS3" | "HSL3" => single("UNI"),
        _ => None,
    }
}

pub fn is_branch_stage(current: &str) -> bool {
    current == BRANCH_STAGE
}

/// Validate that `requested` is a legal advancement from `current`.
pub fn confirm_advance(current: &str, requested: &str) -> Result<StageCode, StageError> {
    let next = next_stage(current).ok_or_else(|| StageError::Terminal(current.to_string()))?;
    if next.accepts(requested) {
        Ok(StageCode::from(requested))
    } else {
        Err(StageError::NotASuccessor {
            current: current.to_string(),
            requested: requested.to_string(),
        })
    }
}
