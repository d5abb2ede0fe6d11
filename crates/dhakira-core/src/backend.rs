//! The backend contract.
//!
//! One method per endpoint the client calls. Implemented over HTTP by
//! `dhakira-client`, and by an in-memory mock for tests. Failures come back
//! as `anyhow::Error` wrapping a [`ClientError`](crate::error::ClientError).

use async_trait::async_trait;

use crate::chat::{AskRequest, AskResponse, HistoryEntry};
use crate::lessons::{Topic, TopicContent};
use crate::model::{Credentials, ProfileUpdate, Registration, SessionNonce, StageCode, UserProfile};
use crate::progress::{DetailedStats, ProgressTable};
use crate::quiz::events::{
    EventQuestion, EventsGenerateRequest, EventsProgress, EventsSubmitRequest,
    EventsSubmitResponse,
};
use crate::quiz::mcq::{
    McqGenerateRequest, McqGenerateResponse, McqSubmitRequest, McqSubmitResponse,
};
use crate::quiz::personalities::{
    PersonalityGenerateRequest, PersonalityQuiz, PersonalitySubmitRequest,
    PersonalitySubmitResponse,
};
use crate::sessions::ChatSessionSummary;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Remote service that owns content, grading and persistence.
#[async_trait]
pub trait Backend: Send + Sync {
    // -- account --

    /// `POST /login`.
    async fn login(&self, credentials: &Credentials) -> anyhow::Result<UserProfile>;

    /// `POST /signup`; returns the backend's confirmation message.
    async fn signup(&self, registration: &Registration) -> anyhow::Result<String>;

    /// `POST /update_profile`.
    async fn update_profile(&self, update: &ProfileUpdate) -> anyhow::Result<UserProfile>;

    // -- multiple-choice quiz --

    async fn generate_mcq(&self, request: &McqGenerateRequest)
        -> anyhow::Result<McqGenerateResponse>;

    async fn submit_mcq(&self, request: &McqSubmitRequest) -> anyhow::Result<McqSubmitResponse>;

    async fn stage_progress(&self, email: &str, stage: &StageCode)
        -> anyhow::Result<ProgressTable>;

    async fn detailed_stats(&self, email: &str) -> anyhow::Result<DetailedStats>;

    // -- date/event quiz --

    async fn generate_events(
        &self,
        request: &EventsGenerateRequest,
    ) -> anyhow::Result<Vec<EventQuestion>>;

    async fn submit_events(
        &self,
        request: &EventsSubmitRequest,
    ) -> anyhow::Result<EventsSubmitResponse>;

    async fn events_progress(&self, email: &str, stage: &StageCode)
        -> anyhow::Result<EventsProgress>;

    // -- historical-figures quiz --

    async fn generate_personalities(
        &self,
        request: &PersonalityGenerateRequest,
    ) -> anyhow::Result<PersonalityQuiz>;

    async fn submit_personalities(
        &self,
        request: &PersonalitySubmitRequest,
    ) -> anyhow::Result<PersonalitySubmitResponse>;

    // -- lessons --

    async fn topics(&self, stage: &StageCode) -> anyhow::Result<Vec<Topic>>;

    async fn topic_content(&self, stage: &StageCode, topic: &str)
        -> anyhow::Result<TopicContent>;

    // -- chat --

    async fn session_content(
        &self,
        email: &str,
        nonce: &SessionNonce,
    ) -> anyhow::Result<Vec<HistoryEntry>>;

    async fn ask(&self, request: &AskRequest) -> anyhow::Result<AskResponse>;

    async fn sessions(&self, email: &str) -> anyhow::Result<Vec<ChatSessionSummary>>;
}
