//! In-memory backend for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use dhakira_core::backend::Backend;
use dhakira_core::chat::{AskRequest, AskResponse, HistoryEntry};
use dhakira_core::error::ClientError;
use dhakira_core::lessons::{Topic, TopicContent};
use dhakira_core::model::{
    Credentials, ProfileUpdate, Registration, SessionNonce, StageCode, UserProfile,
};
use dhakira_core::progress::{DetailedStats, ProgressTable};
use dhakira_core::quiz::events::{
    EventQuestion, EventsGenerateRequest, EventsProgress, EventsSubmitRequest,
    EventsSubmitResponse,
};
use dhakira_core::quiz::mcq::{
    McqGenerateRequest, McqGenerateResponse, McqSubmitRequest, McqSubmitResponse,
};
use dhakira_core::quiz::personalities::{
    PersonalityGenerateRequest, PersonalityQuiz, PersonalitySubmitRequest,
    PersonalitySubmitResponse,
};
use dhakira_core::sessions::ChatSessionSummary;

/// A canned reply: a JSON body, or a backend error status and message.
type Canned = Result<Value, (u16, String)>;

/// A backend that answers each method from canned JSON.
///
/// Responses are keyed by method name (`"login"`, `"generate_mcq"`, ...).
/// A method with nothing canned fails with HTTP 404.
pub struct MockBackend {
    responses: Mutex<HashMap<String, Canned>>,
    call_count: AtomicU32,
    calls: Mutex<Vec<(String, Value)>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            call_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `method` with `body`.
    pub fn with(self, method: &str, body: Value) -> Self {
        self.set(method, Ok(body));
        self
    }

    /// Fail `method` with a backend error.
    pub fn failing(self, method: &str, status: u16, message: &str) -> Self {
        self.set(method, Err((status, message.to_string())));
        self
    }

    pub fn set(&self, method: &str, reply: Canned) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(method.to_string(), reply);
    }

    /// Get the number of calls made to this backend.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Method names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    /// The last request body sent to `method`, as JSON.
    pub fn last_request(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v.clone())
    }

    fn reply<R: Serialize, T: DeserializeOwned>(&self, method: &str, request: &R) -> anyhow::Result<T> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let recorded = serde_json::to_value(request).unwrap_or(Value::Null);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((method.to_string(), recorded));

        let canned = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(method)
            .cloned();
        match canned {
            Some(Ok(body)) => serde_json::from_value(body).map_err(|e| {
                ClientError::InvalidResponse(format!("canned {method} response: {e}")).into()
            }),
            Some(Err((401, message))) => Err(ClientError::AuthenticationFailed(message).into()),
            Some(Err((status, message))) => Err(ClientError::Api { status, message }.into()),
            None => Err(ClientError::Api {
                status: 404,
                message: format!("no canned response for {method}"),
            }
            .into()),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> anyhow::Result<UserProfile> {
        self.reply("login", credentials)
    }

    async fn signup(&self, registration: &Registration) -> anyhow::Result<String> {
        self.reply("signup", registration)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> anyhow::Result<UserProfile> {
        self.reply("update_profile", update)
    }

    async fn generate_mcq(
        &self,
        request: &McqGenerateRequest,
    ) -> anyhow::Result<McqGenerateResponse> {
        self.reply("generate_mcq", request)
    }

    async fn submit_mcq(&self, request: &McqSubmitRequest) -> anyhow::Result<McqSubmitResponse> {
        self.reply("submit_mcq", request)
    }

    async fn stage_progress(
        &self,
        email: &str,
        stage: &StageCode,
    ) -> anyhow::Result<ProgressTable> {
        self.reply(
            "stage_progress",
            &json!({"email": email, "educational_stage": stage}),
        )
    }

    async fn detailed_stats(&self, email: &str) -> anyhow::Result<DetailedStats> {
        self.reply("detailed_stats", &json!({"email": email}))
    }

    async fn generate_events(
        &self,
        request: &EventsGenerateRequest,
    ) -> anyhow::Result<Vec<EventQuestion>> {
        self.reply("generate_events", request)
    }

    async fn submit_events(
        &self,
        request: &EventsSubmitRequest,
    ) -> anyhow::Result<EventsSubmitResponse> {
        self.reply("submit_events", request)
    }

    async fn events_progress(
        &self,
        email: &str,
        stage: &StageCode,
    ) -> anyhow::Result<EventsProgress> {
        self.reply(
            "events_progress",
            &json!({"email": email, "educational_stage": stage}),
        )
    }

    async fn generate_personalities(
        &self,
        request: &PersonalityGenerateRequest,
    ) -> anyhow::Result<PersonalityQuiz> {
        self.reply("generate_personalities", request)
    }

    async fn submit_personalities(
        &self,
        request: &PersonalitySubmitRequest,
    ) -> anyhow::Result<PersonalitySubmitResponse> {
        self.reply("submit_personalities", request)
    }

    async fn topics(&self, stage: &StageCode) -> anyhow::Result<Vec<Topic>> {
        self.reply("topics", &json!({"educational_stage": stage}))
    }

    async fn topic_content(
        &self,
        stage: &StageCode,
        topic: &str,
    ) -> anyhow::Result<TopicContent> {
        self.reply(
            "topic_content",
            &json!({"educational_stage": stage, "topic": topic}),
        )
    }

    async fn session_content(
        &self,
        email: &str,
        nonce: &SessionNonce,
    ) -> anyhow::Result<Vec<HistoryEntry>> {
        self.reply(
            "session_content",
            &json!({"email": email, "session_nonce": nonce}),
        )
    }

    async fn ask(&self, request: &AskRequest) -> anyhow::Result<AskResponse> {
        self.reply("ask", request)
    }

    async fn sessions(&self, email: &str) -> anyhow::Result<Vec<ChatSessionSummary>> {
        self.reply("sessions", &json!({"email": email}))
    }
}
