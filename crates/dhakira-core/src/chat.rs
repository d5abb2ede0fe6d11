//! Conversation state for the general chat and per-topic chat.

use serde::{Deserialize, Serialize};

use crate::model::{SessionNonce, StageCode, UserProfile};

/// Shown in place of an answer when the request fails or returns nothing.
pub const APOLOGY: &str = "عذراً، حدث خطأ في معالجة طلبك.";

/// Header shown above the general chat.
pub const DEFAULT_TITLE: &str = "مرحبًا بك في ذاكرة: دعنا نستكشف تاريخ الجزائر معًا!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
}

/// One stored exchange from `/session-content`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionContentResponse {
    #[serde(default)]
    pub content: Vec<HistoryEntry>,
}

/// Ordered messages with duplicate-text suppression.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a transcript from stored exchanges, skipping empty fields.
    pub fn from_history(entries: &[HistoryEntry]) -> Self {
        let mut transcript = Self::new();
        for entry in entries {
            if !entry.question.is_empty() {
                transcript.append(Sender::User, entry.question.clone());
            }
            if !entry.answer.is_empty() {
                transcript.append(Sender::Bot, entry.answer.clone());
            }
        }
        transcript
    }

    /// Append unless a message with the same text already exists.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.contains_text(&text) {
            return false;
        }
        self.append(sender, text);
        true
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.text == text)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn append(&mut self, sender: Sender, text: String) {
        self.next_id += 1;
        self.messages.push(Message {
            id: self.next_id,
            sender,
            text,
        });
    }
}

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub email: String,
    pub question: String,
    pub educational_stage: StageCode,
    pub historical_era: Option<String>,
    pub session_nonce: Option<SessionNonce>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub session_nonce: Option<SessionNonce>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl AskResponse {
    /// The answer text, or the apology when the backend sent none.
    pub fn answer_or_apology(&self) -> &str {
        match self.answer.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => APOLOGY,
        }
    }
}

/// A chat screen: transcript, session correlation, optional topic and input lock.
#[derive(Debug, Clone, Default)]
pub struct ChatView {
    transcript: Transcript,
    nonce: Option<SessionNonce>,
    topic: Option<String>,
    locked: bool,
}

impl ChatView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chat scoped to a lesson topic.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    /// Resume a stored conversation.
    pub fn resume(nonce: SessionNonce, history: &[HistoryEntry]) -> Self {
        Self {
            transcript: Transcript::from_history(history),
            nonce: Some(nonce),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn nonce(&self) -> Option<&SessionNonce> {
        self.nonce.as_ref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn title(&self) -> &str {
        self.topic.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Start a new conversation, dropping the nonce and the messages.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.nonce = None;
        self.locked = false;
    }

    /// Append the user's message and lock input; `None` for blank input or a busy view.
    pub fn begin_send(&mut self, input: &str, profile: &UserProfile) -> Option<AskRequest> {
        let question = input.trim();
        if question.is_empty() || self.locked {
            return None;
        }
        self.transcript.push(Sender::User, question);
        self.locked = true;
        Some(AskRequest {
            email: profile.email.clone(),
            question: question.to_string(),
            educational_stage: profile.educational_level.clone(),
            historical_era: None,
            session_nonce: self.nonce.clone(),
            topic: self.topic.clone(),
        })
    }

    /// Settle an in-flight request. Returns the answer text to reveal, if any.
    ///
    /// An answer keeps input locked until [`complete_reveal`](Self::complete_reveal).
    /// Failures append the apology directly, unlock and return `None`.
    pub fn finish<E>(&mut self, outcome: Result<AskResponse, E>) -> Option<String> {
        match outcome {
            Ok(response) => {
                if let Some(nonce) = response.session_nonce.clone() {
                    self.nonce = Some(nonce);
                }
                Some(response.answer_or_apology().to_string())
            }
            Err(_) => {
                self.locked = false;
                self.transcript.push(Sender::Bot, APOLOGY);
                None
            }
        }
    }

    /// Commit the fully revealed answer and unlock input.
    pub fn complete_reveal(&mut self, text: impl Into<String>) -> bool {
        self.locked = false;
        self.transcript.push(Sender::Bot, text)
    }
}
