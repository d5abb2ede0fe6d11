//! The `dhakira quiz` commands: multiple choice, date/event and figure matching.

use std::io::Write;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use tokio::time::Instant;

use dhakira_core::backend::Backend;
use dhakira_core::model::UserProfile;
use dhakira_core::notice::{Notice, SUBMIT_FAILED};
use dhakira_core::quiz::events::{
    format_interval, format_year_range, DateParts, DateShape, EventQuestionKind,
    EventsGenerateRequest, EventsSession,
};
use dhakira_core::quiz::mcq::{McqGenerateRequest, McqSession};
use dhakira_core::quiz::personalities::{MatchBoard, PersonalityGenerateRequest, SlotVerdict};
use dhakira_core::quiz::{Countdown, SubmitGate};
use dhakira_core::router::Route;
use dhakira_core::stages::StageCatalog;

use super::{read_line, Env};

const COUNTDOWN_TICK: Duration = Duration::from_millis(250);
const COUNTDOWN_WIDTH: usize = 20;

pub async fn mcq(env: Env, level: u8) -> Result<()> {
    let profile = env.enter(&Route::MultipleChoiceQuiz)?;

    let progress = env
        .backend
        .stage_progress(&profile.email, &profile.educational_level)
        .await?;
    if !progress.is_level_unlocked(level) {
        bail!(
            "level {level} is locked, reach 80% on level {} first",
            level.saturating_sub(1)
        );
    }

    let generated = env
        .backend
        .generate_mcq(&McqGenerateRequest::fresh(
            &profile,
            level,
            env.config.questions_per_quiz,
        ))
        .await?;
    let mut session = McqSession::new(level, generated.quiz)?;
    let countdown = Countdown::new(env.config.auto_advance());

    while !session.in_summary() {
        let position = session.position();
        let question = session.current().clone();
        println!("\n[{}/{}] {}", position + 1, session.len(), question.question);
        let labels: Vec<&str> = question.labels().collect();
        for (i, label) in labels.iter().enumerate() {
            println!("  {}. {label}", i + 1);
        }

        let line = read_line("> ")?.ok_or_else(|| anyhow!("quiz abandoned"))?;
        let Some(choice) = parse_choice(&line, labels.len()) else {
            println!("Enter a number between 1 and {}.", labels.len());
            continue;
        };

        let feedback = match session.answer(choice) {
            Ok(f) => f,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if feedback.correct {
            println!("Correct!");
        } else {
            let right = feedback
                .correct_option
                .and_then(|i| labels.get(i).copied())
                .unwrap_or("?");
            println!("Wrong. The answer is: {right}");
        }

        run_countdown(countdown, &mut std::io::stdout()).await?;
        session.advance();
    }

    let request = match session.submission(&profile) {
        Ok(request) => request,
        Err(SubmitGate::Unanswered(i)) => bail!("question {} has no answer", i + 1),
        Err(SubmitGate::AlreadySubmitted) => bail!("the attempt was already submitted"),
    };
    let results = match env.backend.submit_mcq(&request).await {
        Ok(results) => results,
        Err(e) => {
            println!("{}", Notice::Alert(SUBMIT_FAILED.to_string()).text());
            return Err(e);
        }
    };
    session.apply_results(results);

    let Some(results) = session.results() else {
        return Ok(());
    };
    let summary = &results.summary;
    println!("\nLevel {} results", session.level());
    println!(
        "  Correct:   {}/{}",
        summary.correct_answers, summary.total_questions
    );
    println!("  Incorrect: {}", summary.incorrect_answers);
    println!("  Accuracy:  {:.0}%", summary.accuracy);
    if let Some(secs) = summary.time_taken {
        println!("  Time:      {secs:.0}s");
    }
    println!("  Level progress: {:.0}%", results.level_progress);
    println!("\n-> {}", Route::QuizLevels);
    Ok(())
}

pub async fn events(env: Env) -> Result<()> {
    let profile = env.enter(&Route::EventsQuiz)?;
    require_extended(&profile)?;

    let questions = env
        .backend
        .generate_events(&EventsGenerateRequest::for_profile(
            &profile,
            env.config.events_questions,
        ))
        .await?;
    let mut session = EventsSession::new(questions)?;

    let pending: Vec<_> = session.questions().to_vec();
    for (i, question) in pending.iter().enumerate() {
        let (label, hint) = match question.kind {
            EventQuestionKind::NameTheEvent => ("What happened on", String::new()),
            EventQuestionKind::DateTheEvent => (
                "When did this happen",
                question
                    .expected_shape()
                    .map(|s| format!(" [{}]", shape_hint(s)))
                    .unwrap_or_default(),
            ),
        };
        println!("\n{}. {label}: {}{hint}", i + 1, question.prompt());

        loop {
            let line = read_line("> ")?.ok_or_else(|| anyhow!("quiz abandoned"))?;
            if line.trim().is_empty() {
                println!("An answer is required.");
                continue;
            }
            let answer = match question.expected_shape() {
                Some(shape) => normalize_date(shape, &line).unwrap_or(line),
                None => line,
            };
            session.set_answer(question.id, answer)?;
            break;
        }
    }

    let Some(request) = session.submission(&profile) else {
        bail!("every question needs an answer");
    };
    let results = match env.backend.submit_events(&request).await {
        Ok(results) => results,
        Err(e) => {
            println!("{}", Notice::Alert(SUBMIT_FAILED.to_string()).text());
            return Err(e);
        }
    };
    session.apply_results(results);

    if let Some(results) = session.results() {
        println!();
        for question in session.questions() {
            let correct = results
                .results
                .iter()
                .find(|r| r.question_id == question.id)
                .map(|r| r.correct);
            let mark = match correct {
                Some(true) => "correct",
                Some(false) => "wrong",
                None => "not graded",
            };
            println!("  {} | {}: {mark}", question.date, question.event);
        }
        println!(
            "\nScore: {}/{}",
            results.correct_count(),
            session.questions().len()
        );
    }

    match env
        .backend
        .events_progress(&profile.email, &profile.educational_level)
        .await
    {
        Ok(progress) => println!(
            "Mastery: {:.0}% of {} events",
            progress.mastery_percentage, progress.total_events
        ),
        Err(e) => tracing::warn!("failed to load events progress: {e:#}"),
    }
    Ok(())
}

pub async fn matching(env: Env) -> Result<()> {
    let profile = env.enter(&Route::PersonalitiesQuiz)?;
    require_extended(&profile)?;

    let quiz = env
        .backend
        .generate_personalities(&PersonalityGenerateRequest::for_profile(
            &profile,
            env.config.personality_questions,
        ))
        .await?;
    let mut board = MatchBoard::new(quiz)?;

    println!("Figures:");
    for (i, p) in board.personalities().iter().enumerate() {
        println!("  {}. {}", i + 1, p.name);
    }

    while !board.can_submit() {
        let Some(slot) = (0..board.slot_count()).find(|s| board.placed(*s).is_none()) else {
            break;
        };
        let description = board.descriptions()[slot].text.clone();
        println!("\n{}. {description}", slot + 1);

        let line = read_line("figure> ")?.ok_or_else(|| anyhow!("quiz abandoned"))?;
        let count = board.personalities().len();
        let Some(choice) = parse_choice(&line, count) else {
            println!("Enter a number between 1 and {count}.");
            continue;
        };
        let id = board.personalities()[choice].id;
        if board.is_placed(id) {
            println!("{} moved here.", board.personalities()[choice].name);
        }
        board.place(slot, id)?;
    }

    let Some(request) = board.submission(&profile) else {
        bail!("every description needs a figure");
    };
    let results = match env.backend.submit_personalities(&request).await {
        Ok(results) => results,
        Err(e) => {
            println!("{}", Notice::Alert(SUBMIT_FAILED.to_string()).text());
            return Err(e);
        }
    };
    board.apply_results(&results);

    println!();
    for slot in 0..board.slot_count() {
        let name = board.placed(slot).map(|p| p.name.as_str()).unwrap_or("-");
        let mark = match board.verdict(slot) {
            Some(SlotVerdict::Correct) => "correct",
            Some(SlotVerdict::Incorrect) => "wrong",
            None => "not graded",
        };
        println!("  {}. {name}: {mark}", slot + 1);
    }
    println!("\nScore: {}/{}", board.correct_count(), board.slot_count());
    Ok(())
}

/// Redraw the countdown bar on one line until it drains.
async fn run_countdown(countdown: Countdown, out: &mut impl Write) -> Result<()> {
    let start = Instant::now();
    let mut ticker = tokio::time::interval(COUNTDOWN_TICK);
    loop {
        ticker.tick().await;
        let elapsed = start.elapsed();
        write!(out, "\r{}", countdown_bar(countdown.remaining_percent(elapsed)))?;
        out.flush()?;
        if countdown.is_done(elapsed) {
            break;
        }
    }
    writeln!(out)?;
    Ok(())
}

fn countdown_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * COUNTDOWN_WIDTH as f64).round() as usize;
    let filled = filled.min(COUNTDOWN_WIDTH);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        " ".repeat(COUNTDOWN_WIDTH - filled),
        percent
    )
}

fn require_extended(profile: &UserProfile) -> Result<()> {
    let stage = profile.educational_level.as_str();
    if !StageCatalog::bundled().has_extended_quizzes(stage) {
        bail!("this quiz is not offered at stage {stage}");
    }
    Ok(())
}

/// One-based menu choice to a zero-based index.
fn parse_choice(input: &str, count: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}

fn shape_hint(shape: DateShape) -> &'static str {
    match shape {
        DateShape::YearRange => "YYYY-YYYY",
        DateShape::Interval { with_day: true } => "YYYY/MM/DD-YYYY/MM/DD",
        DateShape::Interval { with_day: false } => "YYYY/MM-YYYY/MM",
        DateShape::Single { with_day: true } => "YYYY/MM/DD",
        DateShape::Single { with_day: false } => "YYYY/MM",
    }
}

fn parse_date(text: &str, with_day: bool) -> Option<DateParts> {
    let parts: Vec<&str> = text.trim().split('/').map(str::trim).collect();
    let expected = if with_day { 3 } else { 2 };
    if parts.len() != expected {
        return None;
    }
    let month: u8 = parts[1].parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let day = match parts.get(2) {
        Some(d) => Some(d.parse::<u8>().ok().filter(|d| (1..=31).contains(d))?),
        None => None,
    };
    Some(DateParts {
        year: parts[0].parse().ok()?,
        month,
        day,
    })
}

/// Canonical answer text for a typed date, or `None` when it does not fit the shape.
fn normalize_date(shape: DateShape, text: &str) -> Option<String> {
    match shape {
        DateShape::YearRange => {
            let (start, end) = text.split_once('-')?;
            Some(format_year_range(
                start.trim().parse().ok()?,
                end.trim().parse().ok()?,
            ))
        }
        DateShape::Interval { with_day } => {
            let (start, end) = text.split_once('-')?;
            Some(format_interval(
                parse_date(start, with_day)?,
                parse_date(end, with_day)?,
            ))
        }
        DateShape::Single { with_day } => parse_date(text, with_day).map(|d| d.to_string()),
    }
}
