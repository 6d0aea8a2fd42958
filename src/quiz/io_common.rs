// Primitives shared by the response readers.

use log::debug;
use snafu::prelude::*;

use chrono::{DateTime, Utc};

use persona_scoring::AnswerValue;

use crate::quiz::config_reader::SourceSettings;
use crate::quiz::{
    InvalidAnswerSnafu, InvalidTimestampSnafu, LineTooShortSnafu, ParsedResponse, QuizCliResult,
};

/// Decodes one answer cell: either a raw scale value or one of the
/// configured labels, listed from "strongly agree" (2) down to
/// "strongly disagree" (-2).
pub fn parse_answer(
    content: &str,
    labels: Option<&[String]>,
    lineno: usize,
) -> QuizCliResult<AnswerValue> {
    let trimmed = content.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return AnswerValue::from_value(value).context(InvalidAnswerSnafu {
            lineno,
            content: trimmed,
        });
    }
    if let Some(labels) = labels {
        if let Some(idx) = labels.iter().position(|l| l.eq_ignore_ascii_case(trimmed)) {
            return AnswerValue::from_value(2 - idx as i64).context(InvalidAnswerSnafu {
                lineno,
                content: trimmed,
            });
        }
    }
    None.context(InvalidAnswerSnafu {
        lineno,
        content: trimmed,
    })
}

pub fn parse_timestamp(content: &str, lineno: usize) -> QuizCliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(content.trim())
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .context(InvalidTimestampSnafu {
            lineno,
            content: content.trim(),
        })
}

/// Assembles one row of cells into a parsed response. The expected layout is
/// an optional timestamp column, the identity columns, then one answer cell
/// per question. Trailing empty cells are treated as unanswered.
pub fn row_to_response(
    cells: &[String],
    lineno: usize,
    source: &SourceSettings,
    labels: Option<&[String]>,
) -> QuizCliResult<ParsedResponse> {
    let mut iter = cells.iter();
    let completed_at = if source.timestamp_column() {
        let cell = iter.next().context(LineTooShortSnafu { lineno })?;
        if cell.trim().is_empty() {
            None
        } else {
            Some(parse_timestamp(cell, lineno)?)
        }
    } else {
        None
    };
    let id = iter.next().context(LineTooShortSnafu { lineno })?.trim().to_string();
    let name = iter.next().context(LineTooShortSnafu { lineno })?.trim().to_string();
    let team = iter.next().context(LineTooShortSnafu { lineno })?.trim().to_string();

    let mut rest: Vec<&String> = iter.collect();
    while rest.last().map(|c| c.trim().is_empty()).unwrap_or(false) {
        rest.pop();
    }
    let mut answers: Vec<AnswerValue> = Vec::new();
    for cell in rest {
        answers.push(parse_answer(cell, labels, lineno)?);
    }
    debug!(
        "row_to_response: lineno {} id {} with {} answers",
        lineno,
        id,
        answers.len()
    );
    Ok(ParsedResponse {
        id,
        name,
        team,
        answers,
        completed_at,
    })
}
