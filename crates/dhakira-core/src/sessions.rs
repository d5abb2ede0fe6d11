//! Chat session sidebar and its background refresh.
//!
//! The list is fetched on start, on a fixed interval, and whenever the
//! front end signals focus. Subscribers are only notified when the fetched
//! list differs from the one already held.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::backend::Backend;
use crate::model::{SessionNonce, StageCode};

/// Default refresh period.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Label the backend gives a session with no messages yet.
pub const UNTITLED: &str = "New Chat";

/// Backend timestamp format, e.g. `2024-11-01 09:30:00`.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

fn untitled() -> String {
    UNTITLED.to_string()
}

/// One entry of `GET /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionSummary {
    pub stage: StageCode,
    pub session_nonce: SessionNonce,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub last_activity: NaiveDateTime,
    #[serde(default)]
    pub questions_count: u32,
    #[serde(default = "untitled")]
    pub first_question: String,
}

impl ChatSessionSummary {
    /// Sidebar label: the topic when set, else the first question.
    pub fn label(&self) -> &str {
        self.topic
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.first_question)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<ChatSessionSummary>,
}

/// Sessions as shown in the sidebar, newest activity first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionList {
    sessions: Vec<ChatSessionSummary>,
}

impl SessionList {
    pub fn sessions(&self) -> &[ChatSessionSummary] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn find(&self, nonce: &str) -> Option<&ChatSessionSummary> {
        self.sessions.iter().find(|s| s.session_nonce.as_str() == nonce)
    }

    /// Sort `fetched` and swap it in if it differs from the held list.
    pub fn replace_if_changed(&mut self, mut fetched: Vec<ChatSessionSummary>) -> bool {
        fetched.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        let unchanged = match (
            serde_json::to_value(&fetched),
            serde_json::to_value(&self.sessions),
        ) {
            (Ok(new), Ok(old)) => new == old,
            _ => false,
        };
        if unchanged {
            return false;
        }
        self.sessions = fetched;
        true
    }
}

/// Anything that can list a user's chat sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn fetch_sessions(&self, email: &str) -> anyhow::Result<Vec<ChatSessionSummary>>;
}

#[async_trait]
impl<B: Backend + ?Sized> SessionSource for B {
    async fn fetch_sessions(&self, email: &str) -> anyhow::Result<Vec<ChatSessionSummary>> {
        self.sessions(email).await
    }
}

/// Background refresher for a [`SessionList`].
pub struct SessionPoller<S: ?Sized> {
    source: Arc<S>,
    email: String,
    interval: Duration,
    list: SessionList,
}

impl<S: SessionSource + ?Sized + 'static> SessionPoller<S> {
    pub fn new(source: Arc<S>, email: impl Into<String>, interval: Duration) -> Self {
        Self {
            source,
            email: email.into(),
            interval,
            list: SessionList::default(),
        }
    }

    /// Fetch once; `Some` with the new list when it changed.
    pub async fn refresh(&mut self) -> Option<&SessionList> {
        match self.source.fetch_sessions(&self.email).await {
            Ok(fetched) => {
                if self.list.replace_if_changed(fetched) {
                    Some(&self.list)
                } else {
                    None
                }
            }
            Err(e) => {
                tracing::warn!("session refresh failed, keeping previous list: {e:#}");
                None
            }
        }
    }

    /// Drive refreshes until `shutdown` fires or every focus sender is gone.
    pub async fn run<F>(
        mut self,
        mut focus: mpsc::Receiver<()>,
        mut shutdown: oneshot::Receiver<()>,
        mut on_change: F,
    ) -> SessionList
    where
        F: FnMut(&SessionList),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
                signal = focus.recv() => {
                    if signal.is_none() {
                        break;
                    }
                }
            }
            if let Some(list) = self.refresh().await {
                on_change(list);
            }
        }
        tracing::debug!("session poller for {} stopped", self.email);
        self.list
    }

    /// Run on a spawned task.
    pub fn spawn<F>(self, on_change: F) -> PollerHandle
    where
        S: Send + Sync,
        F: FnMut(&SessionList) + Send + 'static,
    {
        let (focus_tx, focus_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(self.run(focus_rx, shutdown_rx, on_change));
        PollerHandle {
            focus: focus_tx,
            shutdown: Some(shutdown_tx),
            join,
        }
    }
}

/// Owner side of a spawned [`SessionPoller`].
pub struct PollerHandle {
    focus: mpsc::Sender<()>,
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<SessionList>,
}

impl PollerHandle {
    /// Ask for an immediate refresh. Coalesced when one is already queued.
    pub fn focus(&self) {
        let _ = self.focus.try_send(());
    }

    /// Stop the poller and return the last list it held.
    pub async fn stop(mut self) -> anyhow::Result<SessionList> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        Ok((&mut self.join).await?)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct ScriptedSource {
        responses: Mutex<VecDeque<anyhow::Result<Vec<ChatSessionSummary>>>>,
        calls: AtomicU32,
    }

    impl ScriptedSource {
        fn new(responses: Vec<anyhow::Result<Vec<ChatSessionSummary>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionSource for ScriptedSource {
        async fn fetch_sessions(&self, _email: &str) -> anyhow::Result<Vec<ChatSessionSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .map_err(|_| anyhow::anyhow!("scripted source poisoned"))?
                .pop_front();
            next.unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn summary(nonce: &str, last: &str) -> ChatSessionSummary {
        serde_json::from_value(serde_json::json!({
            "stage": "HSS1",
            "session_nonce": nonce,
            "topic": null,
            "created_at": "2024-10-01 08:00:00",
            "last_activity": last,
            "questions_count": 2,
            "first_question": format!("q-{nonce}"),
        }))
        .unwrap()
    }

    #[test]
    fn parses_backend_timestamps() {
        let s = summary("a", "2024-11-01 09:30:00");
        assert_eq!(s.last_activity.to_string(), "2024-11-01 09:30:00");
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back["created_at"], "2024-10-01 08:00:00");
    }

    #[test]
    fn missing_first_question_is_untitled() {
        let s: ChatSessionSummary = serde_json::from_str(
            r#"{"stage":"PS1","session_nonce":"n","created_at":"2024-01-01 00:00:00",
                "last_activity":"2024-01-01 00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(s.first_question, UNTITLED);
        assert_eq!(s.label(), UNTITLED);
    }

    #[test]
    fn empty_topic_falls_back_to_first_question() {
        let mut s = summary("a", "2024-11-01 09:30:00");
        s.topic = Some(String::new());
        assert_eq!(s.label(), "q-a");
        s.topic = Some("الثورة التحريرية".into());
        assert_eq!(s.label(), "الثورة التحريرية");
    }

    #[test]
    fn sorted_newest_first_and_replaced_only_on_change() {
        let mut list = SessionList::default();
        let fetched = vec![
            summary("old", "2024-10-02 10:00:00"),
            summary("new", "2024-10-05 10:00:00"),
        ];
        assert!(list.replace_if_changed(fetched.clone()));
        assert_eq!(list.sessions()[0].session_nonce.as_str(), "new");

        // Same content in a different order is not a change.
        let reversed: Vec<_> = fetched.into_iter().rev().collect();
        assert!(!list.replace_if_changed(reversed));

        let mut touched = list.sessions().to_vec();
        touched[1].questions_count = 3;
        assert!(list.replace_if_changed(touched));
        assert!(list.find("old").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_on_start_interval_and_focus() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![summary("a", "2024-10-01 10:00:00")]),
            Ok(vec![
                summary("a", "2024-10-01 10:00:00"),
                summary("b", "2024-10-01 11:00:00"),
            ]),
            Ok(vec![summary("c", "2024-10-02 10:00:00")]),
        ]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tokio::time::Instant::now();
        let handle = SessionPoller::new(source.clone(), "s@dz", POLL_INTERVAL)
            .spawn(move |list| {
                let _ = tx.send(list.len());
            });

        assert_eq!(rx.recv().await, Some(1));
        assert!(start.elapsed() < POLL_INTERVAL);

        handle.focus();
        assert_eq!(rx.recv().await, Some(2));
        assert!(start.elapsed() < POLL_INTERVAL);

        assert_eq!(rx.recv().await, Some(1));
        assert!(start.elapsed() >= POLL_INTERVAL);
        assert_eq!(source.calls(), 3);

        let last = handle.stop().await.unwrap();
        assert_eq!(last.sessions()[0].session_nonce.as_str(), "c");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_previous_list() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![summary("a", "2024-10-01 10:00:00")]),
            Err(anyhow::anyhow!("connection refused")),
        ]));
        let mut poller = SessionPoller::new(source.clone(), "s@dz", POLL_INTERVAL);
        assert!(poller.refresh().await.is_some());
        assert!(poller.refresh().await.is_none());
        assert_eq!(poller.list.len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_focus_sender_dropped() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let poller = SessionPoller::new(source, "s@dz", POLL_INTERVAL);
        let (focus_tx, focus_rx) = mpsc::channel(1);
        let (_shutdown_tx, shutdown_rx) = oneshot::channel();
        drop(focus_tx);
        let list = poller.run(focus_rx, shutdown_rx, |_| {}).await;
        assert!(list.is_empty());
    }
}
