// A single questionnaire session on the terminal: intake, the question
// sequence, then the breakdown.

use snafu::prelude::*;

use std::io::{self, BufRead, Write};

use chrono::Utc;

use persona_scoring::{
    AnswerValue, Questionnaire, QuizResult, Session, SessionPhase, UserInfo, USER_ID_DIGITS,
};

use crate::quiz::config_reader::{persona_display, QuizConfig};
use crate::quiz::export::RowSink;
use crate::quiz::{QuizCliResult, ReadingInputSnafu, ScoringSnafu};

pub fn run_session(
    questionnaire: &Questionnaire,
    config: &QuizConfig,
    mut sink: Option<&mut dyn RowSink>,
) -> QuizCliResult<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{}", config.title);
    println!();

    let mut session = Session::new(questionnaire);

    // Intake: keep asking until the identity record validates.
    while session.phase() == SessionPhase::Intake {
        let id = prompt(
            &mut lines,
            &format!("Identifier ({} digits): ", USER_ID_DIGITS),
        )?;
        let name = prompt(&mut lines, "Name: ")?;
        let teams = questionnaire.teams();
        if !teams.is_empty() {
            println!("Teams:");
            for (idx, team) in teams.iter().enumerate() {
                println!("  {}. {}", idx + 1, team);
            }
        }
        let team_raw = prompt(&mut lines, "Team (number or name): ")?;
        let team = teams
            .iter()
            .enumerate()
            .find(|(idx, t)| team_raw == format!("{}", idx + 1) || **t == team_raw)
            .map(|(_, t)| t.clone())
            .unwrap_or(team_raw);
        if let Err(e) = session.begin(UserInfo { id, name, team }) {
            println!("{}", e);
            println!();
        }
    }

    // One prompt per question, re-asking on out-of-scale input.
    while session.phase() == SessionPhase::Questioning {
        let text = session
            .current_question()
            .map(|q| q.text.clone())
            .unwrap_or_default();
        println!();
        println!(
            "Question {}/{} ({}%)",
            session.cursor() + 1,
            questionnaire.len(),
            session.progress_percentage()
        );
        println!("{}", text);
        println!("  2 strongly agree, 1 agree, 0 neutral, -1 disagree, -2 strongly disagree");
        let raw = prompt(&mut lines, "> ")?;
        match raw.parse::<i64>().ok().and_then(AnswerValue::from_value) {
            Some(answer) => {
                session.submit(answer).context(ScoringSnafu)?;
            }
            None => println!("Please answer with a value between -2 and 2."),
        }
    }

    let result = session.finish(Utc::now()).context(ScoringSnafu)?;
    print_breakdown(config, &result);

    if let Some(sink) = sink.as_mut() {
        sink.append_row(&result)?;
        println!();
        println!("Result exported.");
    }
    Ok(())
}

fn print_breakdown(config: &QuizConfig, result: &QuizResult) {
    println!();
    println!(
        "Leader {}% / Player {}%",
        result.leader_percentage, result.player_percentage
    );
    println!();
    for (key, score) in result.category_scores.iter() {
        let pct = result.category_percentages.get(key).copied().unwrap_or(0);
        println!(
            "  {:>3}% {:>4}  {}",
            pct,
            score,
            persona_display(config, key)
        );
    }
    println!();
    println!("Strongest traits:");
    for (key, score) in result.top_categories(3) {
        println!("  {} ({})", persona_display(config, &key), score);
    }
}

fn prompt<I>(lines: &mut I, message: &str) -> QuizCliResult<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{}", message);
    let _ = io::stdout().flush();
    match lines.next() {
        Some(line) => Ok(line.context(ReadingInputSnafu {})?.trim().to_string()),
        None => whatever!("The input stream closed before the session completed"),
    }
}
