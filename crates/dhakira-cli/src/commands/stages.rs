//! The `dhakira stages` and `dhakira quizzes` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use dhakira_core::router::{quiz_menu, Route, SIDEBAR};
use dhakira_core::stages::{next_stage, StageCatalog};

use super::Env;

pub fn list() -> Result<()> {
    let catalog = StageCatalog::bundled();

    let mut table = Table::new();
    table.set_header(vec!["Code", "Stage", "Extended quizzes", "Next"]);
    for stage in catalog.iter() {
        let next = next_stage(stage.code.as_str())
            .map(|n| {
                n.options()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ")
            })
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&stage.code),
            Cell::new(&stage.name),
            Cell::new(if stage.extended_quizzes { "yes" } else { "no" }),
            Cell::new(next),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// The quiz menu for the signed-in student's stage.
pub fn menu(env: Env) -> Result<()> {
    let profile = env.enter(&Route::QuizMenu)?;
    let catalog = StageCatalog::bundled();

    let mut table = Table::new();
    table.set_header(vec!["Quiz", "Page", "Command"]);
    for route in quiz_menu(catalog, profile.educational_level.as_str()) {
        let command = match route {
            Route::QuizLevels => "dhakira levels",
            Route::EventsQuiz => "dhakira quiz events",
            Route::PersonalitiesQuiz => "dhakira quiz match",
            _ => "",
        };
        table.add_row(vec![
            Cell::new(route.title()),
            Cell::new(&route),
            Cell::new(command),
        ]);
    }
    println!("{table}");

    let shortcuts: Vec<String> = SIDEBAR.iter().map(|r| r.to_string()).collect();
    println!("\n{}", shortcuts.join("  "));
    Ok(())
}
