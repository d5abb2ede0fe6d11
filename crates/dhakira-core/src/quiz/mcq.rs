//! Multiple-choice quiz attempt.
//!
//! One question is shown at a time. Answering gives instant local feedback
//! from the question's marked option and schedules an auto-advance; after
//! the last question every recorded answer goes to the backend in a single
//! submit call.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::{GradedItem, QuizError, SubmitGate};
use crate::model::{StageCode, UserProfile};

/// Questions requested per attempt.
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

/// Body of `POST /quiz/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct McqGenerateRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub level: u8,
    pub num_questions: u32,
    pub use_cache: bool,
}

impl McqGenerateRequest {
    /// A request that always gets a freshly generated set.
    pub fn fresh(profile: &UserProfile, level: u8, num_questions: u32) -> Self {
        Self {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            level,
            num_questions,
            use_cache: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct McqGenerateResponse {
    #[serde(default)]
    pub quiz: Vec<McqQuestion>,
    #[serde(default)]
    pub total_questions: usize,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqQuestion {
    pub id: i64,
    pub question: String,
    pub answers: Vec<McqOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqOption {
    #[serde(rename = "optionLabel")]
    pub label: String,
    #[serde(
        rename = "isCorrect",
        default,
        deserialize_with = "flag_from_int_or_bool",
        serialize_with = "flag_as_int"
    )]
    pub is_correct: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
}

fn flag_from_int_or_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match RawFlag::deserialize(d)? {
        RawFlag::Bool(b) => b,
        RawFlag::Int(i) => i == 1,
    })
}

fn flag_as_int<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*flag))
}

impl McqQuestion {
    /// Index of the first option flagged correct.
    pub fn correct_index(&self) -> Option<usize> {
        self.answers.iter().position(|a| a.is_correct)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.answers.iter().map(|a| a.label.as_str())
    }
}

/// Body of `POST /quiz/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct McqSubmitRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub level: u8,
    /// Question id → selected option index.
    pub answers: BTreeMap<i64, usize>,
    pub quiz_data: Vec<McqQuestion>,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqSummary {
    #[serde(default)]
    pub total_questions: u32,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub incorrect_answers: u32,
    #[serde(default)]
    pub accuracy: f64,
    #[serde(default)]
    pub time_taken: Option<f64>,
    #[serde(default)]
    pub final_progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryStats {
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub questions_attempted: u32,
    #[serde(default)]
    pub mastery_score: u32,
}

/// Graded attempt as returned by the backend. Displayed verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McqSubmitResponse {
    #[serde(default)]
    pub results: Vec<GradedItem>,
    #[serde(default)]
    pub summary: McqSummary,
    #[serde(default)]
    pub level_progress: f64,
    #[serde(default)]
    pub mastery_stats: MasteryStats,
}

/// Where the attempt goes once the countdown finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Summary,
}

/// Instant feedback for one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub correct: bool,
    pub correct_option: Option<usize>,
    pub advance: Advance,
}

/// A single attempt at a multiple-choice level.
#[derive(Debug, Clone)]
pub struct McqSession {
    attempt_id: Uuid,
    level: u8,
    questions: Vec<McqQuestion>,
    answers: Vec<Option<usize>>,
    cursor: usize,
    pending_advance: bool,
    in_summary: bool,
    local_score: u32,
    started_at: DateTime<Utc>,
    results: Option<McqSubmitResponse>,
}

impl McqSession {
    pub fn new(level: u8, questions: Vec<McqQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            attempt_id: Uuid::new_v4(),
            level,
            questions,
            answers,
            cursor: 0,
            pending_advance: false,
            in_summary: false,
            local_score: 0,
            started_at: Utc::now(),
            results: None,
        })
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Zero-based index of the question on screen.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &McqQuestion {
        &self.questions[self.cursor]
    }

    pub fn questions(&self) -> &[McqQuestion] {
        &self.questions
    }

    pub fn answer_at(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    pub fn is_current_answered(&self) -> bool {
        self.answers[self.cursor].is_some()
    }

    pub fn in_summary(&self) -> bool {
        self.in_summary
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance
    }

    /// Correct answers according to the local flags. Feedback only.
    pub fn local_score(&self) -> u32 {
        self.local_score
    }

    /// Record an answer for the current question.
    pub fn answer(&mut self, option: usize) -> Result<Feedback, QuizError> {
        if self.results.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.answers[self.cursor].is_some() {
            return Err(QuizError::AlreadyAnswered(self.cursor));
        }
        let question = &self.questions[self.cursor];
        if option >= question.answers.len() {
            return Err(QuizError::OptionOutOfRange {
                index: option,
                available: question.answers.len(),
            });
        }

        let correct_option = question.correct_index();
        let correct = correct_option == Some(option);
        if correct {
            self.local_score += 1;
        }
        self.answers[self.cursor] = Some(option);
        self.pending_advance = true;

        let advance = if self.cursor + 1 == self.questions.len() {
            Advance::Summary
        } else {
            Advance::Next
        };
        tracing::debug!(
            attempt = %self.attempt_id,
            question = question.id,
            option,
            correct,
            "answer recorded"
        );
        Ok(Feedback {
            correct,
            correct_option,
            advance,
        })
    }

    /// Complete the auto-advance scheduled by the last answer.
    pub fn advance(&mut self) {
        if !self.pending_advance {
            return;
        }
        self.pending_advance = false;
        self.step_forward();
    }

    pub fn next(&mut self) {
        self.pending_advance = false;
        self.step_forward();
    }

    pub fn previous(&mut self) {
        self.pending_advance = false;
        self.in_summary = false;
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn step_forward(&mut self) {
        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
        } else {
            self.in_summary = true;
        }
    }

    pub fn first_unanswered(&self) -> Option<usize> {
        self.answers.iter().position(Option::is_none)
    }

    pub fn all_answered(&self) -> bool {
        self.first_unanswered().is_none()
    }

    /// Submit is enabled exactly when every question has an answer and nothing was sent yet.
    pub fn can_submit(&self) -> bool {
        self.results.is_none() && self.all_answered()
    }

    /// Build the batch submission.
    ///
    /// With unanswered questions left, the attempt leaves the summary and the
    /// cursor returns to the first of them.
    pub fn submission(&mut self, profile: &UserProfile) -> Result<McqSubmitRequest, SubmitGate> {
        if self.results.is_some() {
            return Err(SubmitGate::AlreadySubmitted);
        }
        if let Some(index) = self.first_unanswered() {
            self.in_summary = false;
            self.pending_advance = false;
            self.cursor = index;
            return Err(SubmitGate::Unanswered(index));
        }

        let answers = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter_map(|(q, a)| a.map(|opt| (q.id, opt)))
            .collect();

        Ok(McqSubmitRequest {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            level: self.level,
            answers,
            quiz_data: self.questions.clone(),
            start_time: self.started_at.timestamp(),
            end_time: Utc::now().timestamp(),
        })
    }

    pub fn apply_results(&mut self, results: McqSubmitResponse) {
        self.in_summary = true;
        self.results = Some(results);
    }

    pub fn results(&self) -> Option<&McqSubmitResponse> {
        self.results.as_ref()
    }
}
