//! Historical-figures matching quiz.

use serde::{Deserialize, Serialize};

use super::QuizError;
use crate::model::{StageCode, UserProfile};

/// Personalities requested per board.
pub const DEFAULT_QUESTION_COUNT: u32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct PersonalityGenerateRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub num_questions: u32,
}

impl PersonalityGenerateRequest {
    pub fn for_profile(profile: &UserProfile, num_questions: u32) -> Self {
        Self {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            num_questions,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonalityQuiz {
    #[serde(default)]
    pub personalities: Vec<Personality>,
    #[serde(default)]
    pub descriptions: Vec<Description>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalityGenerateResponse {
    pub quiz: PersonalityQuiz,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub id: i64,
    pub text: String,
}

/// One placed pair as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub personality_id: i64,
    pub description_id: i64,
    pub personality_name: String,
    pub description: String,
    pub image_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalitySubmitRequest {
    pub email: String,
    pub educational_stage: StageCode,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchResult {
    pub personality_id: i64,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalitySubmitResponse {
    #[serde(default)]
    pub results: Vec<MatchResult>,
}

/// Outcome shown on a slot once the board is graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotVerdict {
    Correct,
    Incorrect,
}

/// Description slots and the personality placed in each.
#[derive(Debug, Clone)]
pub struct MatchBoard {
    quiz: PersonalityQuiz,
    placed: Vec<Option<usize>>,
    verdicts: Vec<Option<SlotVerdict>>,
    submitted: bool,
}

impl MatchBoard {
    pub fn new(quiz: PersonalityQuiz) -> Result<Self, QuizError> {
        if quiz.descriptions.is_empty() {
            return Err(QuizError::Empty);
        }
        let slots = quiz.descriptions.len();
        Ok(Self {
            quiz,
            placed: vec![None; slots],
            verdicts: vec![None; slots],
            submitted: false,
        })
    }

    pub fn personalities(&self) -> &[Personality] {
        &self.quiz.personalities
    }

    pub fn descriptions(&self) -> &[Description] {
        &self.quiz.descriptions
    }

    pub fn slot_count(&self) -> usize {
        self.placed.len()
    }

    /// Personality currently in `slot`, if any.
    pub fn placed(&self, slot: usize) -> Option<&Personality> {
        self.placed
            .get(slot)
            .copied()
            .flatten()
            .map(|i| &self.quiz.personalities[i])
    }

    pub fn is_placed(&self, personality_id: i64) -> bool {
        self.placed
            .iter()
            .flatten()
            .any(|&i| self.quiz.personalities[i].id == personality_id)
    }

    pub fn verdict(&self, slot: usize) -> Option<SlotVerdict> {
        self.verdicts.get(slot).copied().flatten()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Drop `personality_id` into `slot`, vacating whichever slot held it before.
    pub fn place(&mut self, slot: usize, personality_id: i64) -> Result<(), QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        self.check_slot(slot)?;
        let index = self
            .quiz
            .personalities
            .iter()
            .position(|p| p.id == personality_id)
            .ok_or(QuizError::UnknownPersonality(personality_id))?;

        for held in self.placed.iter_mut() {
            if *held == Some(index) {
                *held = None;
            }
        }
        self.placed[slot] = Some(index);
        Ok(())
    }

    pub fn clear(&mut self, slot: usize) -> Result<(), QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        self.check_slot(slot)?;
        self.placed[slot] = None;
        Ok(())
    }

    /// True exactly when every slot holds a personality.
    pub fn can_submit(&self) -> bool {
        !self.submitted && self.placed.iter().all(Option::is_some)
    }

    /// Placed pairs in slot order; empty slots are skipped.
    pub fn matches(&self) -> Vec<Match> {
        self.placed
            .iter()
            .zip(&self.quiz.descriptions)
            .filter_map(|(held, description)| {
                let p = &self.quiz.personalities[(*held)?];
                Some(Match {
                    personality_id: p.id,
                    description_id: description.id,
                    personality_name: p.name.clone(),
                    description: description.text.clone(),
                    image_link: p.image_link.clone(),
                })
            })
            .collect()
    }

    pub fn submission(&self, profile: &UserProfile) -> Option<PersonalitySubmitRequest> {
        if !self.can_submit() {
            return None;
        }
        Some(PersonalitySubmitRequest {
            email: profile.email.clone(),
            educational_stage: profile.educational_level.clone(),
            matches: self.matches(),
        })
    }

    /// Mark each filled slot from the result at the same index, then freeze the board.
    pub fn apply_results(&mut self, response: &PersonalitySubmitResponse) {
        for (slot, held) in self.placed.iter().enumerate() {
            if held.is_none() {
                continue;
            }
            self.verdicts[slot] = response.results.get(slot).map(|r| {
                if r.correct {
                    SlotVerdict::Correct
                } else {
                    SlotVerdict::Incorrect
                }
            });
        }
        self.submitted = true;
    }

    pub fn correct_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| **v == Some(SlotVerdict::Correct))
            .count()
    }

    fn check_slot(&self, slot: usize) -> Result<(), QuizError> {
        if slot >= self.placed.len() {
            return Err(QuizError::SlotOutOfRange {
                index: slot,
                available: self.placed.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> MatchBoard {
        let quiz: PersonalityQuiz = serde_json::from_value(serde_json::json!({
            "personalities": [
                {"id": 1, "name": "الأمير عبد القادر", "image_link": "https://img/1.png"},
                {"id": 2, "name": "العربي بن مهيدي", "image_link": null},
                {"id": 3, "name": "لالة فاطمة نسومر"}
            ],
            "descriptions": [
                {"id": 2, "text": "قائد في الثورة التحريرية"},
                {"id": 1, "text": "مؤسس الدولة الجزائرية الحديثة"},
                {"id": 3, "text": "قادت المقاومة في جرجرة"}
            ]
        }))
        .unwrap();
        MatchBoard::new(quiz).unwrap()
    }

    #[test]
    fn placing_moves_out_of_previous_slot() {
        let mut b = board();
        b.place(0, 1).unwrap();
        assert_eq!(b.placed(0).unwrap().id, 1);
        b.place(2, 1).unwrap();
        assert!(b.placed(0).is_none());
        assert_eq!(b.placed(2).unwrap().id, 1);
        assert!(b.is_placed(1));
        assert!(!b.is_placed(2));
    }

    #[test]
    fn submit_requires_every_slot() {
        let mut b = board();
        b.place(0, 2).unwrap();
        b.place(1, 1).unwrap();
        assert!(!b.can_submit());
        b.place(2, 3).unwrap();
        assert!(b.can_submit());
        b.clear(1).unwrap();
        assert!(!b.can_submit());
        assert_eq!(b.matches().len(), 2);
    }

    #[test]
    fn matches_carry_both_sides() {
        let mut b = board();
        b.place(1, 1).unwrap();
        let m = &b.matches()[0];
        assert_eq!(m.personality_id, 1);
        assert_eq!(m.description_id, 1);
        assert_eq!(m.description, "مؤسس الدولة الجزائرية الحديثة");
        assert_eq!(m.image_link.as_deref(), Some("https://img/1.png"));
    }

    #[test]
    fn results_mark_slots_and_freeze() {
        let mut b = board();
        b.place(0, 2).unwrap();
        b.place(1, 3).unwrap();
        b.place(2, 1).unwrap();
        let resp: PersonalitySubmitResponse = serde_json::from_str(
            r#"{"results": [{"personality_id": 2, "correct": true},
                            {"personality_id": 3, "correct": false},
                            {"personality_id": 1, "correct": false}], "progress": []}"#,
        )
        .unwrap();
        b.apply_results(&resp);

        assert_eq!(b.verdict(0), Some(SlotVerdict::Correct));
        assert_eq!(b.verdict(1), Some(SlotVerdict::Incorrect));
        assert_eq!(b.correct_count(), 1);
        assert!(b.is_submitted());
        assert!(!b.can_submit());
        assert_eq!(b.place(0, 1), Err(QuizError::AlreadySubmitted));
        assert_eq!(b.clear(0), Err(QuizError::AlreadySubmitted));
    }

    #[test]
    fn bad_slot_or_personality() {
        let mut b = board();
        assert_eq!(
            b.place(5, 1),
            Err(QuizError::SlotOutOfRange {
                index: 5,
                available: 3
            })
        );
        assert_eq!(b.place(0, 42), Err(QuizError::UnknownPersonality(42)));
    }

    #[test]
    fn empty_board_is_rejected() {
        assert_eq!(
            MatchBoard::new(PersonalityQuiz::default()).err(),
            Some(QuizError::Empty)
        );
    }
}
