//! The `dhakira chat` and `dhakira sessions` commands.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{Cell, Table};
use futures::StreamExt;

use dhakira_core::backend::Backend;
use dhakira_core::chat::{ChatView, Sender};
use dhakira_core::model::SessionNonce;
use dhakira_core::reveal::reveal;
use dhakira_core::router::Route;
use dhakira_core::sessions::{timestamp, SessionList, SessionPoller};

use super::{read_line, Env};

pub async fn execute(
    env: Env,
    session: Option<String>,
    topic: Option<String>,
    message: Vec<String>,
) -> Result<()> {
    let route = match &topic {
        Some(t) => Route::TopicChat(t.clone()),
        None => Route::Chat,
    };
    let profile = env.enter(&route)?;

    let mut view = match (session, topic) {
        (Some(nonce), _) => {
            let nonce = SessionNonce::new(nonce);
            let history = env
                .backend
                .session_content(&profile.email, &nonce)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("failed to load session {nonce}: {e:#}");
                    Vec::new()
                });
            ChatView::resume(nonce, &history)
        }
        (None, Some(topic)) => ChatView::for_topic(topic),
        (None, None) => ChatView::new(),
    };

    println!("{}\n", view.title());
    for m in view.transcript().messages() {
        print_message(m.sender, &m.text);
    }

    let single = message.join(" ");
    let mut pending = (!single.trim().is_empty()).then_some(single);
    loop {
        let input = match pending.take() {
            Some(q) => q,
            None if message.is_empty() => match read_line("> ")? {
                Some(line) => line,
                None => break,
            },
            None => break,
        };

        let Some(request) = view.begin_send(&input, &profile) else {
            continue;
        };
        let outcome = env.backend.ask(&request).await;
        if let Err(e) = &outcome {
            tracing::warn!("ask failed: {e:#}");
        }

        match view.finish(outcome) {
            Some(answer) => {
                print_revealed(&answer, env.config.reveal_interval()).await?;
                view.complete_reveal(answer);
            }
            None => {
                if let Some(last) = view.transcript().messages().last() {
                    print_message(last.sender, &last.text);
                }
            }
        }
    }

    if let Some(nonce) = view.nonce() {
        println!("\nsession: {nonce}");
    }
    Ok(())
}

fn print_message(sender: Sender, text: &str) {
    match sender {
        Sender::User => println!("> {text}"),
        Sender::Bot => println!("{text}\n"),
    }
}

async fn print_revealed(answer: &str, interval: std::time::Duration) -> Result<()> {
    let mut frames = std::pin::pin!(reveal(answer, interval));
    let mut shown = 0;
    let mut stdout = io::stdout();
    while let Some(frame) = frames.next().await {
        let fresh: String = frame.chars().skip(shown).collect();
        shown += fresh.chars().count();
        write!(stdout, "{fresh}")?;
        stdout.flush()?;
    }
    writeln!(stdout, "\n")?;
    Ok(())
}

pub async fn sessions(env: Env, watch: bool) -> Result<()> {
    let profile = env.enter(&Route::Chat)?;

    if !watch {
        let mut list = SessionList::default();
        list.replace_if_changed(env.backend.sessions(&profile.email).await?);
        print_sessions(&list);
        return Ok(());
    }

    let poller = SessionPoller::new(
        env.backend.clone(),
        profile.email.clone(),
        env.config.poll_interval(),
    );
    let handle = poller.spawn(print_sessions);

    println!("Press Enter to refresh, Ctrl-D to stop.");
    while tokio::task::spawn_blocking(|| read_line(""))
        .await??
        .is_some()
    {
        handle.focus();
    }

    let last = handle.stop().await?;
    tracing::debug!("stopped watching with {} sessions", last.len());
    Ok(())
}

fn print_sessions(list: &SessionList) {
    if list.is_empty() {
        println!("No chat sessions yet.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Last activity", "Session", "Questions", "Resume with"]);
    for s in list.sessions() {
        table.add_row(vec![
            Cell::new(s.last_activity.format(timestamp::FORMAT)),
            Cell::new(s.label()),
            Cell::new(s.questions_count),
            Cell::new(format!("dhakira chat --session {}", s.session_nonce)),
        ]);
    }
    println!("{table}");
}
