//! The `dhakira init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("dhakira.toml").exists() {
        println!("dhakira.toml already exists, skipping.");
    } else {
        std::fs::write("dhakira.toml", SAMPLE_CONFIG)?;
        println!("Created dhakira.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point api_base_url at your dhakira backend");
    println!("  2. Run: dhakira signup --email <email> --firstname <name> --stage PS5");
    println!("  3. Run: dhakira chat \"<your question>\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# dhakira configuration

api_base_url = "http://localhost:5000"
# profile_path = "${HOME}/.config/dhakira/profile.json"
# request_timeout_secs = 30

questions_per_quiz = 5
events_questions = 3
personality_questions = 4

auto_advance_ms = 2000
reveal_interval_ms = 30
poll_interval_secs = 30
"#;
