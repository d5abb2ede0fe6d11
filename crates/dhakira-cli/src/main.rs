//! dhakira CLI: the student-facing front end, one subcommand per page.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "dhakira",
    version,
    about = "Algerian history lessons, quizzes and chat"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter dhakira.toml
    Init,

    /// Log in and store the profile
    Login {
        #[arg(long)]
        email: Option<String>,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        firstname: String,

        /// Educational stage code (e.g. PS5, JS4, HSL1)
        #[arg(long)]
        stage: String,

        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,

        /// Read from stdin when omitted
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Forget the stored profile
    Logout,

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// List educational stages
    Stages,

    /// Quizzes available at the current stage
    Quizzes,

    /// Multiple-choice level progress
    Levels {
        /// Move to the given next stage once every level is complete
        #[arg(long)]
        advance: Option<String>,
    },

    /// Take a quiz
    Quiz {
        #[command(subcommand)]
        kind: QuizKind,
    },

    /// List lesson topics for the current stage
    Lessons,

    /// Read a lesson
    Topic {
        /// Topic title
        title: String,
    },

    /// Lesson summaries
    Summaries,

    /// Ask a question about Algerian history
    Chat {
        /// Resume a stored session
        #[arg(long)]
        session: Option<String>,

        /// Scope the conversation to a lesson topic
        #[arg(long)]
        topic: Option<String>,

        /// Question to ask; reads questions from stdin when omitted
        message: Vec<String>,
    },

    /// List chat sessions
    Sessions {
        /// Keep refreshing until stdin closes
        #[arg(long)]
        watch: bool,
    },

    /// Per-level quiz statistics
    Report,

    /// Open a page by path (e.g. /taqarir, /topic/<title>)
    Open {
        path: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Change first name or stage
    Update {
        #[arg(long)]
        firstname: Option<String>,

        #[arg(long)]
        stage: Option<String>,
    },
}

#[derive(Subcommand)]
enum QuizKind {
    /// Multiple-choice questions
    Mcq {
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
    },
    /// Date and event questions
    Events,
    /// Match historical figures to descriptions
    Match,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dhakira=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    use commands::Env;

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Login { email, password } => {
            commands::account::login(Env::load(config)?, email, password).await
        }
        Commands::Signup {
            email,
            firstname,
            stage,
            password,
            confirm_password,
        } => {
            commands::account::signup(
                Env::load(config)?,
                email,
                firstname,
                stage,
                password,
                confirm_password,
            )
            .await
        }
        Commands::Logout => commands::account::logout(Env::load(config)?),
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::show(Env::load(config)?),
            ProfileAction::Update { firstname, stage } => {
                commands::account::update(Env::load(config)?, firstname, stage).await
            }
        },
        Commands::Stages => commands::stages::list(),
        Commands::Quizzes => commands::stages::menu(Env::load(config)?),
        Commands::Levels { advance } => commands::levels::execute(Env::load(config)?, advance).await,
        Commands::Quiz { kind } => {
            let env = Env::load(config)?;
            match kind {
                QuizKind::Mcq { level } => commands::quiz::mcq(env, level).await,
                QuizKind::Events => commands::quiz::events(env).await,
                QuizKind::Match => commands::quiz::matching(env).await,
            }
        }
        Commands::Lessons => commands::lessons::list(Env::load(config)?).await,
        Commands::Topic { title } => commands::lessons::topic(Env::load(config)?, title).await,
        Commands::Summaries => commands::lessons::summaries(Env::load(config)?),
        Commands::Chat {
            session,
            topic,
            message,
        } => commands::chat::execute(Env::load(config)?, session, topic, message).await,
        Commands::Sessions { watch } => commands::chat::sessions(Env::load(config)?, watch).await,
        Commands::Report => commands::report::execute(Env::load(config)?).await,
        Commands::Open { path } => commands::open::execute(Env::load(config)?, path).await,
    }
}
