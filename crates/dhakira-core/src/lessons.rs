//! Lesson topics for a stage and their generated content.

use serde::{Deserialize, Serialize};

use crate::router::Route;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
}

impl Topic {
    /// The lesson page for this topic. Topics are addressed by title.
    pub fn route(&self) -> Route {
        Route::Topic(self.title.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicsResponse {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// `GET /topic-content` payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicContent {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl TopicContent {
    /// Paragraphs of the lesson body, blank lines dropped.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
