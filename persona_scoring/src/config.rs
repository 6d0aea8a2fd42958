// ********* Input data structures ***********

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The weight key reserved for the leader/player axis.
///
/// A positive weight under this key feeds the leader accumulator, a negative
/// weight feeds the player accumulator. The key never materializes as a
/// category.
pub const AXIS_KEY: &str = "LP";

/// The number of digits expected in a participant identifier.
pub const USER_ID_DIGITS: usize = 6;

/// One point on the five-level agreement scale.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AnswerValue {
    StronglyAgree,
    Agree,
    Neutral,
    Disagree,
    StronglyDisagree,
}

impl AnswerValue {
    /// The signed scale value folded into the accumulators.
    pub fn value(&self) -> i64 {
        match self {
            AnswerValue::StronglyAgree => 2,
            AnswerValue::Agree => 1,
            AnswerValue::Neutral => 0,
            AnswerValue::Disagree => -1,
            AnswerValue::StronglyDisagree => -2,
        }
    }

    /// Maps a raw value back onto the scale. Values outside {-2,..,2} are not
    /// part of the scale.
    pub fn from_value(value: i64) -> Option<AnswerValue> {
        match value {
            2 => Some(AnswerValue::StronglyAgree),
            1 => Some(AnswerValue::Agree),
            0 => Some(AnswerValue::Neutral),
            -1 => Some(AnswerValue::Disagree),
            -2 => Some(AnswerValue::StronglyDisagree),
            _ => None,
        }
    }
}

/// A single question: display text and a sparse mapping from score key to
/// integer weight.
///
/// Keys are category keys, except for [AXIS_KEY] which routes to the
/// leader/player axis.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub text: String,
    pub weights: HashMap<String, i64>,
}

/// The identity record collected at intake.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub team: String,
}

impl UserInfo {
    /// Intake validation: fixed-length numeric identifier, non-empty trimmed
    /// name, team drawn from `teams`. An empty team list accepts any
    /// non-empty team.
    pub fn validate(&self, teams: &[String]) -> Result<(), QuizError> {
        if self.id.len() != USER_ID_DIGITS || !self.id.chars().all(|c| c.is_ascii_digit()) {
            return Err(QuizError::InvalidUserId {
                id: self.id.clone(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(QuizError::EmptyUserName);
        }
        let team_ok = if teams.is_empty() {
            !self.team.trim().is_empty()
        } else {
            teams.iter().any(|t| *t == self.team)
        };
        if !team_ok {
            return Err(QuizError::UnknownTeam {
                team: self.team.clone(),
            });
        }
        Ok(())
    }
}

/// A recorded response: identity, the ordered answer sequence and the
/// completion time. This is the unit of work for batch scoring.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Response {
    pub user: UserInfo,
    pub answers: Vec<AnswerValue>,
    pub completed_at: DateTime<Utc>,
}

// ******** Output data structures *********

/// Final signed totals per category key.
pub type CategoryScores = BTreeMap<String, i64>;

/// Derived per-category percentages, each in [0, 100].
pub type CategoryPercentages = BTreeMap<String, u32>;

/// Signed totals for the two orientation accumulators.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct AxisScores {
    pub leader: i64,
    pub player: i64,
}

/// Percentage split of the axis. The two sides always sum to exactly 100.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisSplit {
    pub leader: u32,
    pub player: u32,
}

/// The terminal, immutable snapshot of a completed questionnaire session.
///
/// Field names follow the wire format consumed by downstream collectors.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(rename = "userInfo")]
    pub user: UserInfo,
    #[serde(rename = "personaScores")]
    pub category_scores: CategoryScores,
    #[serde(rename = "personaPercentages")]
    pub category_percentages: CategoryPercentages,
    #[serde(rename = "leaderPercentage")]
    pub leader_percentage: u32,
    #[serde(rename = "playerPercentage")]
    pub player_percentage: u32,
    pub answers: Vec<i64>,
    #[serde(rename = "completedAt")]
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// The categories ranked by signed score, best first, truncated to
    /// `count` entries. Ties keep the key order.
    pub fn top_categories(&self, count: usize) -> Vec<(String, i64)> {
        let mut ranked: Vec<(String, i64)> = self
            .category_scores
            .iter()
            .map(|(k, s)| (k.clone(), *s))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(count);
        ranked
    }
}

/// Errors raised at the session boundary. The scoring fold itself is total
/// and never fails.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum QuizError {
    EmptyQuestionnaire,
    InvalidUserId { id: String },
    EmptyUserName,
    UnknownTeam { team: String },
    /// An answer was submitted before intake completed.
    IntakePending,
    /// An answer was submitted to a session that already completed.
    SessionComplete,
    /// A result was requested before the session completed.
    SessionNotComplete,
    /// Intake ran twice on the same session.
    IntakeDone,
}

impl Error for QuizError {}

impl Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::EmptyQuestionnaire => write!(f, "the questionnaire has no questions"),
            QuizError::InvalidUserId { id } => {
                write!(f, "the identifier {:?} is not a {}-digit number", id, USER_ID_DIGITS)
            }
            QuizError::EmptyUserName => write!(f, "the participant name is empty"),
            QuizError::UnknownTeam { team } => write!(f, "the team {:?} is not configured", team),
            QuizError::IntakePending => write!(f, "intake has not completed yet"),
            QuizError::SessionComplete => write!(f, "the session is already complete"),
            QuizError::SessionNotComplete => write!(f, "the session is not complete yet"),
            QuizError::IntakeDone => write!(f, "intake already ran for this session"),
        }
    }
}
