//! Page flows driven end to end through the mock backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tempfile::TempDir;

use dhakira_client::MockBackend;
use dhakira_core::backend::Backend;
use dhakira_core::chat::{ChatView, Sender};
use dhakira_core::model::{Credentials, ProfileUpdate, UserProfile};
use dhakira_core::notice::{Notice, Toast, ToastQueue, PROFILE_UPDATED};
use dhakira_core::quiz::mcq::{McqGenerateRequest, McqSession};
use dhakira_core::router::Route;
use dhakira_core::sessions::SessionPoller;
use dhakira_core::store::ProfileStore;
use dhakira_core::{Action, AppContext};

fn context(dir: &TempDir) -> AppContext {
    AppContext::open(ProfileStore::new(dir.path().join("profile.json"))).unwrap()
}

fn mcq_quiz() -> serde_json::Value {
    json!({
        "quiz": [
            {"id": 1, "question": "متى اندلعت الثورة؟", "answers": [
                {"optionLabel": "1954", "isCorrect": 1},
                {"optionLabel": "1962", "isCorrect": 0}
            ]},
            {"id": 2, "question": "متى استقلت الجزائر؟", "answers": [
                {"optionLabel": "1954", "isCorrect": 0},
                {"optionLabel": "1962", "isCorrect": 1}
            ]}
        ],
        "total_questions": 2,
        "cached": false
    })
}

#[tokio::test]
async fn login_then_mcq_attempt() {
    let backend = MockBackend::new()
        .with(
            "login",
            json!({"email": "amina@dz", "firstname": "Amina", "educational_level": "PS5"}),
        )
        .with("stage_progress", json!({"1": {"progress": 90}, "2": {"progress": 10}}))
        .with("generate_mcq", mcq_quiz())
        .with(
            "submit_mcq",
            json!({
                "results": [{"question_id": 1, "correct": true}, {"question_id": 2, "correct": false}],
                "summary": {"total_questions": 2, "correct_answers": 1, "incorrect_answers": 1,
                            "accuracy": 62.5, "final_progress": 55.0},
                "level_progress": 55.0
            }),
        );
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    assert_eq!(ctx.route(Route::QuizLevels), Route::Login);

    let user = backend
        .login(&Credentials {
            email: "amina@dz".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    ctx.dispatch(Action::LoggedIn(user)).unwrap();
    assert_eq!(ctx.route(Route::QuizLevels), Route::QuizLevels);
    let profile = ctx.require_profile().unwrap().clone();

    let table = backend
        .stage_progress(&profile.email, &profile.educational_level)
        .await
        .unwrap();
    assert!(table.is_level_unlocked(2));
    assert!(!table.is_level_unlocked(3));

    let generated = backend
        .generate_mcq(&McqGenerateRequest::fresh(&profile, 2, 5))
        .await
        .unwrap();
    let mut session = McqSession::new(2, generated.quiz).unwrap();
    assert!(session.answer(0).unwrap().correct);
    session.advance();
    assert!(!session.answer(0).unwrap().correct);
    session.advance();
    assert!(session.in_summary());

    let request = session.submission(&profile).unwrap();
    let results = backend.submit_mcq(&request).await.unwrap();
    session.apply_results(results);

    // Accuracy comes from the backend, not the local score.
    assert_eq!(session.local_score(), 1);
    assert_eq!(session.results().unwrap().summary.accuracy, 62.5);

    let sent = backend.last_request("submit_mcq").unwrap();
    assert_eq!(sent["level"], 2);
    assert_eq!(sent["answers"], json!({"1": 0, "2": 0}));
    assert_eq!(
        backend.calls(),
        vec!["login", "stage_progress", "generate_mcq", "submit_mcq"]
    );
}

#[tokio::test]
async fn profile_edit_shows_a_toast() {
    let backend = MockBackend::new().with(
        "update_profile",
        json!({"email": "amina@dz", "firstname": "Amina", "educational_level": "JS1"}),
    );
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&dir);
    ctx.dispatch(Action::LoggedIn(
        serde_json::from_value(
            json!({"email": "amina@dz", "firstname": "Amina", "educational_level": "PS5"}),
        )
        .unwrap(),
    ))
    .unwrap();
    let mut watcher = ctx.subscribe();

    let profile = ctx.require_profile().unwrap().clone();
    let user = backend
        .update_profile(&ProfileUpdate {
            email: profile.email.clone(),
            firstname: profile.firstname.clone(),
            educational_level: "JS1".into(),
        })
        .await
        .unwrap();
    ctx.dispatch(Action::StageAdvanced(user.educational_level))
        .unwrap();

    assert!(watcher.has_changed().unwrap());
    assert_eq!(
        watcher.borrow_and_update().as_ref().unwrap().educational_level,
        "JS1"
    );

    let mut toasts = ToastQueue::default();
    toasts.push(Toast::success(PROFILE_UPDATED));
    let now = Instant::now();
    assert_eq!(toasts.visible(now).len(), 1);
    assert!(toasts.visible(now + Duration::from_secs(4)).is_empty());
}

#[tokio::test]
async fn failed_submit_becomes_inline_notice() {
    let backend = MockBackend::new()
        .with("generate_mcq", mcq_quiz())
        .failing("submit_mcq", 400, "Missing required fields");
    let profile: UserProfile = serde_json::from_value(
        json!({"email": "amina@dz", "firstname": "Amina", "educational_level": "PS5"}),
    )
    .unwrap();

    let generated = backend
        .generate_mcq(&McqGenerateRequest::fresh(&profile, 1, 5))
        .await
        .unwrap();
    let mut session = McqSession::new(1, generated.quiz).unwrap();
    session.answer(0).unwrap();
    session.advance();
    session.answer(1).unwrap();
    session.advance();

    let request = session.submission(&profile).unwrap();
    let err = backend.submit_mcq(&request).await.unwrap_err();
    assert_eq!(
        Notice::from_error(&err),
        Notice::Inline("Missing required fields".into())
    );
    assert!(session.results().is_none());
    assert!(session.can_submit());
}

#[tokio::test]
async fn chat_turns_keep_order_and_nonce() {
    let backend = MockBackend::new().with(
        "ask",
        json!({"session_nonce": "n-7", "answer": "في الفاتح من نوفمبر 1954."}),
    );
    let profile: UserProfile = serde_json::from_value(
        json!({"email": "amina@dz", "firstname": "Amina", "educational_level": "HSL1"}),
    )
    .unwrap();
    let mut view = ChatView::new();

    let request = view.begin_send("متى اندلعت الثورة؟", &profile).unwrap();
    let answer = view.finish(backend.ask(&request).await).unwrap();
    assert!(view.begin_send("سؤال آخر", &profile).is_none());
    view.complete_reveal(answer);

    let request = view.begin_send("وماذا بعد؟", &profile).unwrap();
    assert_eq!(request.session_nonce.as_ref().unwrap().as_str(), "n-7");
    assert_eq!(
        backend.last_request("ask").unwrap()["session_nonce"],
        serde_json::Value::Null
    );

    backend.set("ask", Err((500, "db down".into())));
    assert!(view.finish(backend.ask(&request).await).is_none());
    let senders: Vec<Sender> = view.transcript().messages().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        [Sender::User, Sender::Bot, Sender::User, Sender::Bot]
    );
    assert!(!view.is_locked());
}

#[tokio::test]
async fn poller_reads_sessions_from_backend() {
    let backend = Arc::new(MockBackend::new().with(
        "sessions",
        json!([{
            "stage": "HSL1",
            "session_nonce": "n-7",
            "topic": "",
            "created_at": "2024-10-01 08:00:00",
            "last_activity": "2024-10-01 08:05:00",
            "questions_count": 1,
            "first_question": "متى اندلعت الثورة؟"
        }]),
    ));
    let mut poller = SessionPoller::new(backend.clone(), "amina@dz", Duration::from_secs(30));

    let list = poller.refresh().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.sessions()[0].label(), "متى اندلعت الثورة؟");
    assert!(poller.refresh().await.is_none());
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.last_request("sessions").unwrap()["email"], "amina@dz");
}
