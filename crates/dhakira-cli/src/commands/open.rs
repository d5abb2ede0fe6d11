//! The `dhakira open` command: navigate by path.

use anyhow::Result;

use dhakira_core::router::Route;

use super::{account, chat, lessons, levels, quiz, report, stages, Env};

pub async fn execute(env: Env, path: String) -> Result<()> {
    let route: Route = path.parse()?;
    tracing::debug!("opening {route}");

    match route {
        Route::Landing | Route::Login | Route::SignUp => {
            let landed = env.ctx.route(route.clone());
            println!("{}", landed.title());
            match landed {
                Route::Login => println!("dhakira login --email <email>"),
                Route::SignUp => println!(
                    "dhakira signup --email <email> --firstname <name> --stage <code>"
                ),
                _ => println!("dhakira --help"),
            }
            Ok(())
        }
        Route::Chat => chat::execute(env, None, None, Vec::new()).await,
        Route::TopicChat(topic) => chat::execute(env, None, Some(topic), Vec::new()).await,
        Route::ProfileSettings => account::show(env),
        Route::QuizMenu => stages::menu(env),
        Route::QuizLevels => levels::execute(env, None).await,
        Route::MultipleChoiceQuiz => quiz::mcq(env, 1).await,
        Route::EventsQuiz => quiz::events(env).await,
        Route::PersonalitiesQuiz => quiz::matching(env).await,
        Route::Lessons => lessons::list(env).await,
        Route::Summaries => lessons::summaries(env),
        Route::Reports => report::execute(env).await,
        Route::Topic(title) => lessons::topic(env, title).await,
    }
}
