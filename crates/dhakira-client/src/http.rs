//! reqwest implementation of [`Backend`].

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use dhakira_core::backend::Backend;
use dhakira_core::chat::{AskRequest, AskResponse, HistoryEntry, SessionContentResponse};
use dhakira_core::error::ClientError;
use dhakira_core::lessons::{Topic, TopicContent, TopicsResponse};
use dhakira_core::model::{
    Credentials, MessageEnvelope, ProfileUpdate, Registration, SessionNonce, StageCode,
    UserEnvelope, UserProfile,
};
use dhakira_core::progress::{DetailedStats, DetailedStatsResponse, ProgressTable, StageProgressResponse};
use dhakira_core::quiz::events::{
    EventQuestion, EventsGenerateRequest, EventsGenerateResponse, EventsProgress,
    EventsProgressResponse, EventsSubmitRequest, EventsSubmitResponse,
};
use dhakira_core::quiz::mcq::{
    McqGenerateRequest, McqGenerateResponse, McqSubmitRequest, McqSubmitResponse,
};
use dhakira_core::quiz::personalities::{
    PersonalityGenerateRequest, PersonalityGenerateResponse, PersonalityQuiz,
    PersonalitySubmitRequest, PersonalitySubmitResponse,
};
use dhakira_core::sessions::{ChatSessionSummary, SessionsResponse};

use crate::config::DhakiraConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Client for the dhakira REST backend.
pub struct HttpBackend {
    base_url: String,
    timeout_secs: Option<u64>,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Build a client. Without a timeout, requests wait as long as the backend does.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        let base_url: String = base_url.into();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: timeout.map(|t| t.as_secs()),
            client,
        })
    }

    pub fn from_config(config: &DhakiraConfig) -> anyhow::Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> anyhow::Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        decode(response).await
    }

    async fn get<T>(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        decode(response).await
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => ClientError::Timeout(secs),
            _ => ClientError::Network(e.to_string()),
        }
    }
}

/// Map the status to a [`ClientError`] or decode the body.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        let code = status.as_u16();
        if code == 401 {
            return Err(ClientError::AuthenticationFailed(message).into());
        }
        return Err(ClientError::Api {
            status: code,
            message,
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to parse response: {e}")).into())
}

/// The backend's `error` field, or the raw body when it is not JSON.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => json
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> anyhow::Result<UserProfile> {
        let envelope: UserEnvelope = self.post("/login", credentials).await?;
        Ok(envelope.user)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn signup(&self, registration: &Registration) -> anyhow::Result<String> {
        let envelope: MessageEnvelope = self.post("/signup", registration).await?;
        Ok(envelope.message)
    }

    #[instrument(skip(self, update), fields(email = %update.email))]
    async fn update_profile(&self, update: &ProfileUpdate) -> anyhow::Result<UserProfile> {
        let envelope: UserEnvelope = self.post("/update_profile", update).await?;
        Ok(envelope.user)
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage, level = request.level))]
    async fn generate_mcq(
        &self,
        request: &McqGenerateRequest,
    ) -> anyhow::Result<McqGenerateResponse> {
        self.post("/quiz/generate", request).await
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage, level = request.level))]
    async fn submit_mcq(&self, request: &McqSubmitRequest) -> anyhow::Result<McqSubmitResponse> {
        self.post("/quiz/submit", request).await
    }

    #[instrument(skip(self))]
    async fn stage_progress(
        &self,
        email: &str,
        stage: &StageCode,
    ) -> anyhow::Result<ProgressTable> {
        let resp: StageProgressResponse = self
            .get(
                "/quiz/progress",
                &[("email", email), ("educational_stage", stage.as_str())],
            )
            .await?;
        Ok(resp.progress)
    }

    #[instrument(skip(self))]
    async fn detailed_stats(&self, email: &str) -> anyhow::Result<DetailedStats> {
        let resp: DetailedStatsResponse =
            self.get("/quiz/detailed-stats", &[("email", email)]).await?;
        Ok(resp.statistics)
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage))]
    async fn generate_events(
        &self,
        request: &EventsGenerateRequest,
    ) -> anyhow::Result<Vec<EventQuestion>> {
        let resp: EventsGenerateResponse = self.post("/events/quiz/generate", request).await?;
        Ok(resp.quiz)
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage))]
    async fn submit_events(
        &self,
        request: &EventsSubmitRequest,
    ) -> anyhow::Result<EventsSubmitResponse> {
        self.post("/events/quiz/submit", request).await
    }

    #[instrument(skip(self))]
    async fn events_progress(
        &self,
        email: &str,
        stage: &StageCode,
    ) -> anyhow::Result<EventsProgress> {
        let resp: EventsProgressResponse = self
            .get(
                "/events/progress",
                &[("email", email), ("educational_stage", stage.as_str())],
            )
            .await?;
        Ok(resp.progress)
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage))]
    async fn generate_personalities(
        &self,
        request: &PersonalityGenerateRequest,
    ) -> anyhow::Result<PersonalityQuiz> {
        let resp: PersonalityGenerateResponse =
            self.post("/personality/quiz/generate", request).await?;
        Ok(resp.quiz)
    }

    #[instrument(skip(self, request), fields(stage = %request.educational_stage))]
    async fn submit_personalities(
        &self,
        request: &PersonalitySubmitRequest,
    ) -> anyhow::Result<PersonalitySubmitResponse> {
        self.post("/personality/quiz/submit", request).await
    }

    #[instrument(skip(self))]
    async fn topics(&self, stage: &StageCode) -> anyhow::Result<Vec<Topic>> {
        let resp: TopicsResponse = self
            .get("/topics", &[("educational_stage", stage.as_str())])
            .await?;
        Ok(resp.topics)
    }

    #[instrument(skip(self))]
    async fn topic_content(
        &self,
        stage: &StageCode,
        topic: &str,
    ) -> anyhow::Result<TopicContent> {
        self.get(
            "/topic-content",
            &[("educational_stage", stage.as_str()), ("topic", topic)],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn session_content(
        &self,
        email: &str,
        nonce: &SessionNonce,
    ) -> anyhow::Result<Vec<HistoryEntry>> {
        let resp: SessionContentResponse = self
            .get(
                "/session-content",
                &[("email", email), ("session_nonce", nonce.as_str())],
            )
            .await?;
        Ok(resp.content)
    }

    #[instrument(skip(self, request), fields(nonce = ?request.session_nonce))]
    async fn ask(&self, request: &AskRequest) -> anyhow::Result<AskResponse> {
        self.post("/ask", request).await
    }

    #[instrument(skip(self))]
    async fn sessions(&self, email: &str) -> anyhow::Result<Vec<ChatSessionSummary>> {
        let resp: SessionsResponse = self.get("/sessions", &[("email", email)]).await?;
        Ok(resp.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile() -> UserProfile {
        UserProfile {
            email: "amina@dz".into(),
            firstname: "Amina".into(),
            educational_level: "HSS3".into(),
        }
    }

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(server.uri(), None).unwrap()
    }

    fn client_error(err: &anyhow::Error) -> &ClientError {
        err.downcast_ref::<ClientError>().expect("a ClientError")
    }

    #[tokio::test]
    async fn login_returns_user() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_partial_json(serde_json::json!({"email": "amina@dz"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "user": {"email": "amina@dz", "firstname": "Amina", "educational_level": "HSS3"}
            })))
            .mount(&server)
            .await;

        let user = backend(&server)
            .login(&Credentials {
                email: "amina@dz".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(user, profile());
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid password"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server)
            .login(&Credentials {
                email: "amina@dz".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            client_error(&err),
            ClientError::AuthenticationFailed(m) if m == "Invalid password"
        ));
    }

    #[tokio::test]
    async fn error_field_becomes_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/events/quiz/generate"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "No more available questions"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server)
            .generate_events(&EventsGenerateRequest::for_profile(&profile(), 3))
            .await
            .unwrap_err();
        match client_error(&err) {
            ClientError::Api { status, message } => {
                assert_eq!(*status, 404);
                assert_eq!(message, "No more available questions");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_is_kept() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sessions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = backend(&server).sessions("amina@dz").await.unwrap_err();
        assert_eq!(client_error(&err).status(), Some(502));
        assert_eq!(client_error(&err).user_message(), "Bad Gateway");
    }

    #[tokio::test]
    async fn undecodable_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/quiz/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = backend(&server)
            .generate_mcq(&McqGenerateRequest::fresh(&profile(), 1, 5))
            .await
            .unwrap_err();
        assert!(matches!(client_error(&err), ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn progress_sends_query_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/quiz/progress"))
            .and(query_param("email", "amina@dz"))
            .and(query_param("educational_stage", "HSS3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "progress": {
                    "1": {"progress": 85, "mastery_score": 120},
                    "2": {"progress": 10, "mastery_score": 10},
                    "3": {"progress": 0, "mastery_score": 0}
                }
            })))
            .mount(&server)
            .await;

        let table = backend(&server)
            .stage_progress("amina@dz", &"HSS3".into())
            .await
            .unwrap();
        assert!(table.is_level_unlocked(2));
        assert!(!table.is_level_unlocked(3));
    }

    #[tokio::test]
    async fn mcq_generate_decodes_quiz() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/quiz/generate"))
            .and(body_partial_json(serde_json::json!({"level": 2, "use_cache": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "quiz": [{
                    "id": 11,
                    "question": "متى اندلعت الثورة التحريرية؟",
                    "answers": [
                        {"optionLabel": "1945", "isCorrect": 0},
                        {"optionLabel": "1954", "isCorrect": 1}
                    ]
                }],
                "total_questions": 1,
                "cached": false
            })))
            .mount(&server)
            .await;

        let resp = backend(&server)
            .generate_mcq(&McqGenerateRequest::fresh(&profile(), 2, 5))
            .await
            .unwrap();
        assert_eq!(resp.quiz.len(), 1);
        assert_eq!(resp.quiz[0].correct_index(), Some(1));
    }

    #[tokio::test]
    async fn topic_content_encodes_title() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/topic-content"))
            .and(query_param("topic", "مؤتمر الصومام"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "مؤتمر الصومام",
                "content": "انعقد سنة 1956"
            })))
            .mount(&server)
            .await;

        let content = backend(&server)
            .topic_content(&"HSS3".into(), "مؤتمر الصومام")
            .await
            .unwrap();
        assert_eq!(content.content, "انعقد سنة 1956");
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9", None).unwrap();
        let err = backend.sessions("amina@dz").await.unwrap_err();
        assert!(matches!(client_error(&err), ClientError::Network(_)));
    }

    #[tokio::test]
    async fn configured_timeout_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sessions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"sessions": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(server.uri(), Some(Duration::from_secs(1))).unwrap();
        let err = backend.sessions("amina@dz").await.unwrap_err();
        assert!(matches!(client_error(&err), ClientError::Timeout(1)));
    }
}
