//! Date/event quiz attempt.
//!
//! Each question either shows a date and asks for the event, or shows an
//! event and asks for its date. All questions are answered on one screen and
//! submitted together once none is blank.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{GradedItem, QuizError};
use crate::model::{StageCode, UserProfile};

/// Questions requested per attempt.
pub const DEFAULT_QUESTION_COUNT: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct EventsGenerateRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub num_questions: u32,
}

impl EventsGenerateRequest {
    pub fn for_profile(profile: &UserProfile, num_questions: u32) -> Self {
        Self {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            num_questions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsGenerateResponse {
    #[serde(default)]
    pub quiz: Vec<EventQuestion>,
}

/// Which half of the date/event pair the student supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum EventQuestionKind {
    /// Date shown, event expected.
    NameTheEvent,
    /// Event shown, date expected.
    DateTheEvent,
}

impl From<u8> for EventQuestionKind {
    fn from(v: u8) -> Self {
        if v == 0 {
            EventQuestionKind::NameTheEvent
        } else {
            EventQuestionKind::DateTheEvent
        }
    }
}

impl From<EventQuestionKind> for u8 {
    fn from(kind: EventQuestionKind) -> Self {
        match kind {
            EventQuestionKind::NameTheEvent => 0,
            EventQuestionKind::DateTheEvent => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQuestion {
    pub id: i64,
    pub date: String,
    pub event: String,
    #[serde(rename = "type")]
    pub kind: EventQuestionKind,
}

impl EventQuestion {
    /// The prompt shown to the student.
    pub fn prompt(&self) -> &str {
        match self.kind {
            EventQuestionKind::NameTheEvent => &self.date,
            EventQuestionKind::DateTheEvent => &self.event,
        }
    }

    /// Shape of the date the student must enter, for date questions.
    pub fn expected_shape(&self) -> Option<DateShape> {
        match self.kind {
            EventQuestionKind::DateTheEvent => Some(DateShape::of(&self.date)),
            EventQuestionKind::NameTheEvent => None,
        }
    }
}

/// Input layout implied by a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    /// `YYYY-YYYY`.
    YearRange,
    /// `Y/M[/D]-Y/M[/D]`.
    Interval { with_day: bool },
    /// `Y/M[/D]`.
    Single { with_day: bool },
}

impl DateShape {
    pub fn of(date: &str) -> Self {
        if let Some((start, end)) = date.split_once('-') {
            let year_only = |s: &str| s.trim().len() == 4 && s.trim().chars().all(|c| c.is_ascii_digit());
            if year_only(start) && year_only(end) {
                return DateShape::YearRange;
            }
            return DateShape::Interval {
                with_day: start.split('/').count() == 3,
            };
        }
        DateShape::Single {
            with_day: date.split('/').count() == 3,
        }
    }
}

/// A calendar date typed field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub year: u16,
    pub month: u8,
    pub day: Option<u8>,
}

impl fmt::Display for DateParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.year, self.month)?;
        if let Some(day) = self.day {
            write!(f, "/{day:02}")?;
        }
        Ok(())
    }
}

/// Answer text for an interval of two dates.
pub fn format_interval(start: DateParts, end: DateParts) -> String {
    format!("{start}-{end}")
}

/// Answer text for a year range.
pub fn format_year_range(start: u16, end: u16) -> String {
    format!("{start}-{end}")
}

/// Body of `POST /events/quiz/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct EventsSubmitRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub answers: Vec<EventAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAnswer {
    pub question_id: i64,
    #[serde(rename = "type")]
    pub kind: EventQuestionKind,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsSubmitResponse {
    #[serde(default)]
    pub results: Vec<GradedItem>,
}

impl EventsSubmitResponse {
    /// Items the backend graded correct.
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }
}

/// `GET /events/progress` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsProgress {
    #[serde(default)]
    pub solved_questions: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_events: u32,
    #[serde(default)]
    pub mastery_percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsProgressResponse {
    #[serde(default)]
    pub progress: EventsProgress,
}

/// One attempt at the date/event quiz.
#[derive(Debug, Clone)]
pub struct EventsSession {
    questions: Vec<EventQuestion>,
    answers: BTreeMap<i64, String>,
    results: Option<EventsSubmitResponse>,
}

impl EventsSession {
    pub fn new(questions: Vec<EventQuestion>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        let answers = questions.iter().map(|q| (q.id, String::new())).collect();
        Ok(Self {
            questions,
            answers,
            results: None,
        })
    }

    pub fn questions(&self) -> &[EventQuestion] {
        &self.questions
    }

    pub fn answer(&self, id: i64) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    pub fn set_answer(&mut self, id: i64, text: impl Into<String>) -> Result<(), QuizError> {
        if self.results.is_some() {
            return Err(QuizError::AlreadySubmitted);
        }
        let slot = self
            .answers
            .get_mut(&id)
            .ok_or(QuizError::UnknownQuestion(id))?;
        *slot = text.into();
        Ok(())
    }

    /// True exactly when every answer is non-blank.
    pub fn can_submit(&self) -> bool {
        self.results.is_none() && self.answers.values().all(|a| !a.trim().is_empty())
    }

    pub fn submission(&self, profile: &UserProfile) -> Option<EventsSubmitRequest> {
        if !self.can_submit() {
            return None;
        }
        let answers = self
            .questions
            .iter()
            .map(|q| EventAnswer {
                question_id: q.id,
                kind: q.kind,
                answer: self.answers[&q.id].trim().to_string(),
            })
            .collect();
        Some(EventsSubmitRequest {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            answers,
        })
    }

    pub fn apply_results(&mut self, results: EventsSubmitResponse) {
        self.results = Some(results);
    }

    pub fn results(&self) -> Option<&EventsSubmitResponse> {
        self.results.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(id: i64, date: &str, kind: u8) -> EventQuestion {
        EventQuestion {
            id,
            date: date.into(),
            event: format!("event {id}"),
            kind: kind.into(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            email: "s@dz".into(),
            firstname: "Sara".into(),
            educational_level: "HSL2".into(),
        }
    }

    #[test]
    fn date_shapes() {
        assert_eq!(DateShape::of("1830-1847"), DateShape::YearRange);
        assert_eq!(
            DateShape::of("1954/11/01-1962/07/05"),
            DateShape::Interval { with_day: true }
        );
        assert_eq!(
            DateShape::of("1954/11-1962/07"),
            DateShape::Interval { with_day: false }
        );
        assert_eq!(DateShape::of("1962/07/05"), DateShape::Single { with_day: true });
        assert_eq!(DateShape::of("1962/07"), DateShape::Single { with_day: false });
    }

    #[test]
    fn date_parts_are_zero_padded() {
        let start = DateParts {
            year: 1954,
            month: 11,
            day: Some(1),
        };
        let end = DateParts {
            year: 1962,
            month: 7,
            day: None,
        };
        assert_eq!(start.to_string(), "1954/11/01");
        assert_eq!(end.to_string(), "1962/07");
        assert_eq!(format_interval(start, start), "1954/11/01-1954/11/01");
        assert_eq!(format_year_range(1830, 1847), "1830-1847");
    }

    #[test]
    fn submit_gated_on_blank_answers() {
        let mut s = EventsSession::new(vec![q(4, "1962/07/05", 1), q(9, "1830-1847", 0)]).unwrap();
        assert!(!s.can_submit());
        s.set_answer(4, "1962/07/05").unwrap();
        assert!(!s.can_submit());
        s.set_answer(9, "   ").unwrap();
        assert!(!s.can_submit());
        assert!(s.submission(&profile()).is_none());
        s.set_answer(9, " احتلال الجزائر ").unwrap();
        assert!(s.can_submit());

        let req = s.submission(&profile()).unwrap();
        assert_eq!(req.answers[1].answer, "احتلال الجزائر");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["answers"][0]["type"], 1);
        assert_eq!(body["answers"][1]["type"], 0);
    }

    #[test]
    fn unknown_question_is_an_error() {
        let mut s = EventsSession::new(vec![q(1, "1962", 1)]).unwrap();
        assert_eq!(s.set_answer(2, "x"), Err(QuizError::UnknownQuestion(2)));
    }

    #[test]
    fn prompts_follow_kind() {
        let by_date = q(1, "1945/05/08", 0);
        assert_eq!(by_date.prompt(), "1945/05/08");
        assert_eq!(by_date.expected_shape(), None);
        let by_event = q(2, "1945/05/08", 1);
        assert_eq!(by_event.prompt(), "event 2");
        assert_eq!(
            by_event.expected_shape(),
            Some(DateShape::Single { with_day: true })
        );
    }

    #[test]
    fn correct_count_comes_from_backend_flags() {
        let resp: EventsSubmitResponse = serde_json::from_str(
            r#"{"results": [{"question_id": 1, "correct": true, "progress": {}},
                            {"question_id": 2, "correct": false}]}"#,
        )
        .unwrap();
        assert_eq!(resp.correct_count(), 1);
    }
}
