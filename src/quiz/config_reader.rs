use log::info;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use std::collections::{HashMap, HashSet};
use std::fs;

use persona_scoring::{Question, Questionnaire, AXIS_KEY};

use crate::quiz::{
    InvalidDefinitionSnafu, OpeningJsonSnafu, ParsingJsonSnafu, QuizCliResult, ScoringSnafu,
};

/// One persona entry of the questionnaire definition. The key is the
/// category key used in the weight maps.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDef {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDef {
    pub text: String,
    pub weights: HashMap<String, i64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    #[serde(rename = "appsScriptUrl")]
    pub apps_script_url: String,
}

/// Options describing the layout of the response files.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "headerRow")]
    _header_row: Option<bool>,
    #[serde(rename = "timestampColumn")]
    _timestamp_column: Option<bool>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl SourceSettings {
    pub fn header_row(&self) -> bool {
        self._header_row.unwrap_or(true)
    }

    pub fn timestamp_column(&self) -> bool {
        self._timestamp_column.unwrap_or(false)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub title: String,
    pub personas: Vec<PersonaDef>,
    pub teams: Vec<String>,
    #[serde(rename = "answerLabels")]
    pub answer_labels: Option<Vec<String>>,
    pub questions: Vec<QuestionDef>,
    pub source: Option<SourceSettings>,
    pub export: Option<ExportSettings>,
}

pub fn read_config(path: &str) -> QuizCliResult<QuizConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let config: QuizConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    info!(
        "config {}: {} questions, {} personas, {} teams",
        path,
        config.questions.len(),
        config.personas.len(),
        config.teams.len()
    );
    Ok(config)
}

/// Validates the definition and assembles the immutable questionnaire.
pub fn to_questionnaire(config: &QuizConfig) -> QuizCliResult<Questionnaire> {
    if let Some(labels) = &config.answer_labels {
        ensure!(
            labels.len() == 5,
            InvalidDefinitionSnafu {
                message: format!("answerLabels must list 5 labels, got {}", labels.len()),
            }
        );
    }
    let mut seen: HashSet<&String> = HashSet::new();
    for p in config.personas.iter() {
        ensure!(
            p.key != AXIS_KEY,
            InvalidDefinitionSnafu {
                message: format!("the key {:?} is reserved for the axis", AXIS_KEY),
            }
        );
        ensure!(
            seen.insert(&p.key),
            InvalidDefinitionSnafu {
                message: format!("duplicate persona key {:?}", p.key),
            }
        );
    }
    let categories: Vec<String> = config.personas.iter().map(|p| p.key.clone()).collect();
    let questions: Vec<Question> = config
        .questions
        .iter()
        .map(|q| Question {
            text: q.text.clone(),
            weights: q.weights.clone(),
        })
        .collect();
    let questionnaire =
        Questionnaire::new(&categories, &config.teams, questions).context(ScoringSnafu)?;
    Ok(questionnaire)
}

/// The display name for a category key, for the terminal output.
pub fn persona_display<'a>(config: &'a QuizConfig, key: &'a str) -> &'a str {
    config
        .personas
        .iter()
        .find(|p| p.key == key)
        .map(|p| p.name.as_str())
        .unwrap_or(key)
}

fn pd(key: &str, name: &str, description: &str) -> PersonaDef {
    PersonaDef {
        key: key.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
    }
}

fn qd(text: &str, weights: &[(&str, i64)]) -> QuestionDef {
    QuestionDef {
        text: text.to_string(),
        weights: weights.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
    }
}

/// The built-in questionnaire: six working-style personas, twelve persona
/// questions and four leader/player questions.
pub fn default_bank() -> QuizConfig {
    QuizConfig {
        title: "Working-style persona quiz".to_string(),
        personas: vec![
            pd(
                "A",
                "The uncompromising craftsman",
                "Pursues quality relentlessly, with deep expertise and a style of their own. The refusal to cut corners raises the bar for the whole organization.",
            ),
            pd(
                "B",
                "The quiet harmonizer",
                "A peacemaker who values the balance of the group above all, holds back their own opinion and keeps the team stable by listening.",
            ),
            pd(
                "C",
                "The fast mover",
                "Acts quickly but tends to skip the fine checking. Brings momentum to the team, at the cost of more frequent slips.",
            ),
            pd(
                "D",
                "The meticulous checker",
                "A careful worker who reviews everything several times over. Prevents mistakes, at the cost of slower delivery.",
            ),
            pd(
                "E",
                "The adaptable supporter",
                "Reads the room and bends flexibly to the team's opinion, supporting others and keeping relationships smooth.",
            ),
            pd(
                "F",
                "The cautious conservative",
                "Values precedent and established methods, and resists sudden change. Prioritizes stability and certainty.",
            ),
        ],
        teams: vec![
            "Senior Curriculum Research".to_string(),
            "Answer Review".to_string(),
            "Subject Management".to_string(),
            "Mock Exam Management".to_string(),
            "Infrastructure Management".to_string(),
            "New Project Management".to_string(),
            "Talent Management".to_string(),
            "HR Section".to_string(),
        ],
        answer_labels: Some(vec![
            "Strongly agree".to_string(),
            "Agree".to_string(),
            "Neutral".to_string(),
            "Disagree".to_string(),
            "Strongly disagree".to_string(),
        ]),
        questions: vec![
            // Persona questions
            qd(
                "Work only feels right when I can do it my own way.",
                &[("A", 2), ("E", -1), ("F", -1)],
            ),
            qd(
                "Acting first matters more to me than planning.",
                &[("C", 2), ("D", -2), ("F", -1)],
            ),
            qd(
                "I get anxious unless I review a document several times before submitting it.",
                &[("D", 2), ("C", -2)],
            ),
            qd(
                "I often yield my own opinion to keep the team in harmony.",
                &[("E", 2), ("B", 2), ("A", -1)],
            ),
            qd(
                "Introducing new tools or methods makes me uncomfortable.",
                &[("F", 2), ("C", -1), ("A", -1)],
            ),
            qd(
                "In meetings I would rather hear everyone out than voice my own opinion.",
                &[("B", 2), ("E", 1)],
            ),
            qd(
                "I tend to spend too much time on the quality of small details.",
                &[("A", 2), ("C", -1)],
            ),
            qd(
                "I prefer meetings with a calm mood over lively debates.",
                &[("B", 2), ("F", 1)],
            ),
            qd(
                "The phrase \"let's just try it\" strongly resonates with me.",
                &[("C", 2), ("D", -2)],
            ),
            qd(
                "What I most want to avoid at work is unexpected trouble.",
                &[("D", 2), ("F", 1), ("C", -2)],
            ),
            qd(
                "When people count on me I take the work on, even with a full plate.",
                &[("E", 2), ("A", -1)],
            ),
            qd(
                "Hearing that something has no precedent makes me hesitate.",
                &[("F", 2), ("C", -1)],
            ),
            // Leader/player questions
            qd("Being trusted to lead a team feels rewarding.", &[(AXIS_KEY, 2)]),
            qd(
                "I would rather focus on my own assignment than on overall strategy.",
                &[(AXIS_KEY, -2)],
            ),
            qd(
                "I am comfortable tracking and supporting the progress of team members.",
                &[(AXIS_KEY, 2)],
            ),
            qd(
                "Executing instructions flawlessly gives me deep satisfaction.",
                &[(AXIS_KEY, -2)],
            ),
        ],
        source: None,
        export: None,
    }
}
