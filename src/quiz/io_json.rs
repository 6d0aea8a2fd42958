// Reader for JSON response arrays, the format produced by the web front end.

use log::debug;
use serde::Deserialize;
use snafu::prelude::*;

use std::fs;

use chrono::{DateTime, Utc};

use persona_scoring::AnswerValue;

use crate::quiz::{
    InvalidAnswerSnafu, OpeningJsonSnafu, ParsedResponse, ParsingJsonSnafu, QuizCliResult,
};

#[derive(Eq, PartialEq, Debug, Clone, Deserialize)]
struct JsonResponse {
    id: String,
    name: String,
    team: String,
    answers: Vec<i64>,
    #[serde(rename = "completedAt")]
    completed_at: Option<DateTime<Utc>>,
}

pub fn read_json_responses(path: &str) -> QuizCliResult<Vec<ParsedResponse>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let rows: Vec<JsonResponse> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_json_responses: {} records in {}", rows.len(), path);

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let mut answers: Vec<AnswerValue> = Vec::new();
        for value in row.answers.iter() {
            let answer = AnswerValue::from_value(*value).context(InvalidAnswerSnafu {
                lineno: idx + 1,
                content: format!("{}", value),
            })?;
            answers.push(answer);
        }
        res.push(ParsedResponse {
            id: row.id,
            name: row.name,
            team: row.team,
            answers,
            completed_at: row.completed_at,
        });
    }
    Ok(res)
}
