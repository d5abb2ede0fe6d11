//! The `dhakira lessons`, `topic` and `summaries` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use dhakira_core::backend::Backend;
use dhakira_core::router::Route;

use super::Env;

pub async fn list(env: Env) -> Result<()> {
    let profile = env.enter(&Route::Lessons)?;
    let topics = env.backend.topics(&profile.educational_level).await?;

    if topics.is_empty() {
        println!("No lessons for stage {}.", profile.educational_level);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Topic", "Page"]);
    for (i, topic) in topics.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&topic.title),
            Cell::new(topic.route()),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn topic(env: Env, title: String) -> Result<()> {
    let profile = env.enter(&Route::Topic(title.clone()))?;
    let content = env
        .backend
        .topic_content(&profile.educational_level, &title)
        .await?;

    for paragraph in content.paragraphs() {
        println!("{paragraph}\n");
    }
    println!("-> {}", Route::TopicChat(title));
    Ok(())
}

pub fn summaries(env: Env) -> Result<()> {
    env.enter(&Route::Summaries)?;
    println!("No summaries yet.");
    Ok(())
}
