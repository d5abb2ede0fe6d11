//! The `dhakira report` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use dhakira_core::backend::Backend;
use dhakira_core::progress::DetailedStats;
use dhakira_core::router::Route;
use dhakira_core::stages::StageCatalog;

use super::Env;

pub async fn execute(env: Env) -> Result<()> {
    let profile = env.enter(&Route::Reports)?;
    let stats = env.backend.detailed_stats(&profile.email).await?;

    if stats.is_empty() {
        println!("No quiz results yet.");
        return Ok(());
    }
    println!("{}", render(&stats));
    Ok(())
}

fn render(stats: &DetailedStats) -> Table {
    let catalog = StageCatalog::bundled();
    let mut table = Table::new();
    table.set_header(vec!["Stage", "Level", "Correct", "Incorrect", "Accuracy"]);
    for (stage, levels) in stats {
        let name = match catalog.display_name(stage.as_str()) {
            "" => stage.as_str(),
            name => name,
        };
        for (level, stat) in levels {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(level),
                Cell::new(stat.correct()),
                Cell::new(stat.incorrect()),
                Cell::new(stat.accuracy()),
            ]);
        }
    }
    table
}
