//! Path table for the application's pages.
//!
//! Every page the front end can show is a [`Route`]. Routes parse from and
//! print to the same paths the web client used, so links and history entries
//! stay stable. [`guard`] applies the single access rule: pages that need a
//! signed-in student send everyone else to `/login`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::UserProfile;
use crate::stages::StageCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    SignUp,
    Chat,
    ProfileSettings,
    QuizMenu,
    QuizLevels,
    MultipleChoiceQuiz,
    EventsQuiz,
    PersonalitiesQuiz,
    Lessons,
    Summaries,
    Reports,
    /// Lesson page for a topic title.
    Topic(String),
    /// Chat scoped to a topic title.
    TopicChat(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no page at '{0}'")]
    Unknown(String),
}

impl Route {
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Landing | Route::Login | Route::SignUp)
    }

    /// Arabic page title.
    pub fn title(&self) -> &str {
        match self {
            Route::Landing => "ذاكرة",
            Route::Login => "تسجيل الدخول",
            Route::SignUp => "إنشاء حساب",
            Route::Chat => "المحادثة",
            Route::ProfileSettings => "الملف الشخصي",
            Route::QuizMenu => "اختبارات",
            Route::QuizLevels => "اختبار 1: أسئلة متعددة الخيارات",
            Route::MultipleChoiceQuiz => "أسئلة متعددة الخيارات",
            Route::EventsQuiz => "اختبار 2: حدث وتاريخ",
            Route::PersonalitiesQuiz => "اختبار 3: شخصيات تاريخية",
            Route::Lessons => "دروس",
            Route::Summaries => "ملخصات",
            Route::Reports => "تقارير",
            Route::Topic(title) | Route::TopicChat(title) => title,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Landing => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::SignUp => f.write_str("/signup"),
            Route::Chat => f.write_str("/chat"),
            Route::ProfileSettings => f.write_str("/profilesettings"),
            Route::QuizMenu => f.write_str("/ikhtibar"),
            Route::QuizLevels => f.write_str("/quiz1levels"),
            Route::MultipleChoiceQuiz => f.write_str("/quiz1"),
            Route::EventsQuiz => f.write_str("/quiz2"),
            Route::PersonalitiesQuiz => f.write_str("/quiz3"),
            Route::Lessons => f.write_str("/doros"),
            Route::Summaries => f.write_str("/molakhas"),
            Route::Reports => f.write_str("/taqarir"),
            Route::Topic(id) => write!(f, "/topic/{}", urlencoding::encode(id)),
            Route::TopicChat(id) => write!(f, "/topicchat/{}", urlencoding::encode(id)),
        }
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let unknown = || RouteError::Unknown(path.to_string());
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        let route = match trimmed {
            "/" => Route::Landing,
            "/login" => Route::Login,
            "/signup" => Route::SignUp,
            "/chat" => Route::Chat,
            "/profilesettings" => Route::ProfileSettings,
            "/ikhtibar" => Route::QuizMenu,
            "/quiz1levels" => Route::QuizLevels,
            "/quiz1" => Route::MultipleChoiceQuiz,
            "/quiz2" => Route::EventsQuiz,
            "/quiz3" => Route::PersonalitiesQuiz,
            "/doros" => Route::Lessons,
            "/molakhas" => Route::Summaries,
            "/taqarir" => Route::Reports,
            other => {
                let (prefix, raw) = other
                    .strip_prefix('/')
                    .and_then(|p| p.split_once('/'))
                    .ok_or_else(unknown)?;
                if raw.is_empty() || raw.contains('/') {
                    return Err(unknown());
                }
                let id = urlencoding::decode(raw).map_err(|_| unknown())?.into_owned();
                match prefix {
                    "topic" => Route::Topic(id),
                    "topicchat" => Route::TopicChat(id),
                    _ => return Err(unknown()),
                }
            }
        };
        Ok(route)
    }
}

/// Where a navigation to `route` actually lands.
pub fn guard(route: Route, profile: Option<&UserProfile>) -> Route {
    if route.requires_session() && profile.is_none() {
        tracing::debug!("redirecting {route} to /login");
        return Route::Login;
    }
    route
}

/// Entries of the quiz menu for a stage.
pub fn quiz_menu(catalog: &StageCatalog, stage: &str) -> Vec<Route> {
    let mut entries = vec![Route::QuizLevels];
    if catalog.has_extended_quizzes(stage) {
        entries.push(Route::EventsQuiz);
        entries.push(Route::PersonalitiesQuiz);
    }
    entries
}

/// Sidebar shortcuts.
pub const SIDEBAR: [Route; 3] = [Route::Lessons, Route::QuizMenu, Route::Reports];
