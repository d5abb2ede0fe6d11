//! The `dhakira levels` command.

use anyhow::{bail, Result};
use comfy_table::{Cell, Table};

use dhakira_core::backend::Backend;
use dhakira_core::context::Action;
use dhakira_core::model::ProfileUpdate;
use dhakira_core::notice::{Notice, Toast, CONNECTION_FAILED, PROFILE_UPDATED};
use dhakira_core::progress::{LevelsBoard, ProgressTable, MAX_LEVEL};
use dhakira_core::router::Route;
use dhakira_core::stages::{confirm_advance, StageCatalog};

use super::Env;

pub async fn execute(mut env: Env, advance: Option<String>) -> Result<()> {
    let profile = env.enter(&Route::QuizLevels)?;
    let stage = profile.educational_level.clone();

    let table = match env.backend.stage_progress(&profile.email, &stage).await {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!("failed to load progress, showing empty levels: {e:#}");
            println!("{}", Notice::from_error(&e).text());
            env.toast(Toast::error(CONNECTION_FAILED));
            ProgressTable::empty_levels()
        }
    };
    print_table(&table);
    env.flush_toasts();

    let mut board = LevelsBoard::new(table);
    let offer = board.advancement_offer(stage.as_str());

    let Some(requested) = advance else {
        if let Some(next) = offer {
            let catalog = StageCatalog::bundled();
            println!("\nAll levels complete. Move on to:");
            for code in next.options() {
                println!(
                    "  {} ({code}): dhakira levels --advance {code}",
                    catalog.display_name(code.as_str())
                );
            }
        }
        return Ok(());
    };

    if offer.is_none() {
        bail!("complete every level of {stage} before advancing");
    }
    let next = confirm_advance(stage.as_str(), &requested)?;

    let user = env
        .backend
        .update_profile(&ProfileUpdate::stage_of(&profile, next))
        .await?;
    env.ctx.dispatch(Action::StageAdvanced(user.educational_level.clone()))?;

    println!();
    env.toast(Toast::success(PROFILE_UPDATED));
    env.flush_toasts();
    println!(
        "Stage: {}",
        StageCatalog::bundled().display_name(user.educational_level.as_str())
    );
    Ok(())
}

fn print_table(table: &ProgressTable) {
    let mut out = Table::new();
    out.set_header(vec!["Level", "Progress", "Answered", "Status", "Command"]);
    for level in 1..=MAX_LEVEL {
        let progress = table.get(level).cloned().unwrap_or_default();
        let unlocked = table.is_level_unlocked(level);
        let status = if progress.is_mastered() {
            "complete"
        } else if unlocked {
            "open"
        } else {
            "locked"
        };
        out.add_row(vec![
            Cell::new(level),
            Cell::new(format!("{:.0}%", progress.progress)),
            Cell::new(format!(
                "{}/{}",
                progress.total_correct, progress.questions_attempted
            )),
            Cell::new(status),
            Cell::new(if unlocked {
                format!("dhakira quiz mcq --level {level}")
            } else {
                String::new()
            }),
        ]);
    }
    println!("{out}");
}
