mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

pub use crate::config::*;

// **** Private structures ****

// Categories are interned once per questionnaire. The id order is the
// declaration order: declared categories first, then keys that only appear in
// weight maps, in encounter order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CategoryId(u32);

/// A fixed questionnaire: the declared categories, the configured teams and
/// the ordered question sequence. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<Question>,
    teams: Vec<String>,
    // index = CategoryId
    names: Vec<String>,
    ids: HashMap<String, CategoryId>,
    // How many of `names` were declared upfront (seeded at zero in every
    // session) rather than discovered in a weight map.
    declared: usize,
}

impl Questionnaire {
    /// Builds a questionnaire over the declared category keys.
    ///
    /// Weight-map keys that are not declared are still interned so they can
    /// materialize on first use during scoring, per the accumulation
    /// contract. The reserved axis key is never a category.
    pub fn new(
        categories: &[String],
        teams: &[String],
        questions: Vec<Question>,
    ) -> Result<Questionnaire, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionnaire);
        }
        let mut names: Vec<String> = Vec::new();
        let mut ids: HashMap<String, CategoryId> = HashMap::new();
        for key in categories {
            intern(key, &mut names, &mut ids);
        }
        let declared = names.len();
        for q in questions.iter() {
            // Sorted for a deterministic intern order within one question.
            let mut keys: Vec<&String> = q.weights.keys().collect();
            keys.sort();
            for key in keys {
                if key != AXIS_KEY {
                    intern(key, &mut names, &mut ids);
                }
            }
        }
        info!(
            "Questionnaire: {} questions, {} declared categories, {} score keys",
            questions.len(),
            declared,
            names.len()
        );
        Ok(Questionnaire {
            questions,
            teams: teams.to_vec(),
            names,
            ids,
            declared,
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// The declared category keys, in declaration order.
    pub fn categories(&self) -> &[String] {
        &self.names[..self.declared]
    }

    fn category_id(&self, key: &str) -> Option<CategoryId> {
        self.ids.get(key).copied()
    }

    fn category_name(&self, cid: CategoryId) -> &str {
        &self.names[cid.0 as usize]
    }
}

fn intern(key: &str, names: &mut Vec<String>, ids: &mut HashMap<String, CategoryId>) {
    if !ids.contains_key(key) {
        ids.insert(key.to_string(), CategoryId(names.len() as u32));
        names.push(key.to_string());
    }
}

// Folds one answered question into the accumulators. Integer arithmetic
// only, commutative per category.
fn apply_answer(
    questionnaire: &Questionnaire,
    question: &Question,
    value: i64,
    scores: &mut BTreeMap<CategoryId, i64>,
    axis: &mut AxisScores,
) {
    for (key, weight) in question.weights.iter() {
        if key == AXIS_KEY {
            if *weight > 0 {
                axis.leader += value * weight;
            } else {
                axis.player += value * weight.abs();
            }
        } else {
            // Interned at construction; materializes here on first use.
            let cid = questionnaire
                .category_id(key)
                .expect("weight keys are interned at construction");
            *scores.entry(cid).or_insert(0) += value * weight;
        }
    }
}

fn seeded_scores(questionnaire: &Questionnaire) -> BTreeMap<CategoryId, i64> {
    (0..questionnaire.declared)
        .map(|idx| (CategoryId(idx as u32), 0))
        .collect()
}

fn named_scores(
    questionnaire: &Questionnaire,
    scores: &BTreeMap<CategoryId, i64>,
) -> CategoryScores {
    scores
        .iter()
        .map(|(cid, s)| (questionnaire.category_name(*cid).to_string(), *s))
        .collect()
}

/// Folds an ordered answer sequence against the questionnaire's weight
/// table and returns the final category totals and axis totals.
///
/// Pure and total: only the answered prefix is folded
/// (`answers.len() <= questions.len()` is the caller's contract, longer
/// sequences are truncated by the zip), and any integer answer values are
/// accepted. Declared categories are present in the output even when no
/// answered question touches them.
pub fn accumulate(questionnaire: &Questionnaire, answers: &[i64]) -> (CategoryScores, AxisScores) {
    let mut scores = seeded_scores(questionnaire);
    let mut axis = AxisScores::default();
    for (question, value) in questionnaire.questions.iter().zip(answers.iter()) {
        apply_answer(questionnaire, question, *value, &mut scores, &mut axis);
    }
    debug!("accumulate: {} answers folded, axis {:?}", answers.len(), axis);
    (named_scores(questionnaire, &scores), axis)
}

/// Derives the axis percentage split.
///
/// The total is the sum of absolute accumulator values; a zero total falls
/// back to an even 50/50. The player side is the exact complement of the
/// rounded leader side, so the pair always sums to 100.
pub fn axis_split(axis: &AxisScores) -> AxisSplit {
    let total = axis.leader.abs() + axis.player.abs();
    if total == 0 {
        return AxisSplit {
            leader: 50,
            player: 50,
        };
    }
    let leader = (100.0 * axis.leader.abs() as f64 / total as f64).round() as u32;
    AxisSplit {
        leader,
        player: 100 - leader,
    }
}

/// Derives per-category percentages over the sum of absolute scores.
///
/// Each share rounds independently, so the total may drift from 100; a zero
/// total distributes `round(100/count)` to every category. Neither case is
/// corrected for drift, which is the observed product behavior.
pub fn category_percentages(scores: &CategoryScores) -> CategoryPercentages {
    if scores.is_empty() {
        return CategoryPercentages::new();
    }
    let total: i64 = scores.values().map(|s| s.abs()).sum();
    if total == 0 {
        let equal = (100.0 / scores.len() as f64).round() as u32;
        return scores.keys().map(|k| (k.clone(), equal)).collect();
    }
    scores
        .iter()
        .map(|(k, s)| {
            let pct = (100.0 * s.abs() as f64 / total as f64).round() as u32;
            (k.clone(), pct)
        })
        .collect()
}

// **** Session state machine ****

/// Where a session currently stands.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SessionPhase {
    /// Collecting and validating the identity record.
    Intake,
    /// Walking the question sequence with a zero-based cursor.
    Questioning,
    /// Terminal. Restarting means constructing a fresh session.
    Complete,
}

/// One questionnaire run. Owns the cursor and all accumulating state, so a
/// restart is simply a new `Session` value.
#[derive(Debug, Clone)]
pub struct Session<'a> {
    questionnaire: &'a Questionnaire,
    user: Option<UserInfo>,
    cursor: usize,
    answers: Vec<AnswerValue>,
    scores: BTreeMap<CategoryId, i64>,
    axis: AxisScores,
}

impl<'a> Session<'a> {
    /// A fresh session in the intake phase, all accumulators at their
    /// initial values.
    pub fn new(questionnaire: &'a Questionnaire) -> Session<'a> {
        Session {
            questionnaire,
            user: None,
            cursor: 0,
            answers: Vec::new(),
            scores: seeded_scores(questionnaire),
            axis: AxisScores::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.user.is_none() {
            SessionPhase::Intake
        } else if self.cursor < self.questionnaire.len() {
            SessionPhase::Questioning
        } else {
            SessionPhase::Complete
        }
    }

    /// Validates the identity record and transitions to questioning.
    /// On a validation error the session stays in intake.
    pub fn begin(&mut self, user: UserInfo) -> Result<(), QuizError> {
        if self.user.is_some() {
            return Err(QuizError::IntakeDone);
        }
        user.validate(self.questionnaire.teams())?;
        info!("session: intake complete for id {}", user.id);
        self.user = Some(user);
        Ok(())
    }

    /// Appends one answer, advances the cursor and updates the accumulators
    /// incrementally. Returns the phase after the transition.
    pub fn submit(&mut self, answer: AnswerValue) -> Result<SessionPhase, QuizError> {
        match self.phase() {
            SessionPhase::Intake => return Err(QuizError::IntakePending),
            SessionPhase::Complete => return Err(QuizError::SessionComplete),
            SessionPhase::Questioning => {}
        }
        let question = &self.questionnaire.questions[self.cursor];
        apply_answer(
            self.questionnaire,
            question,
            answer.value(),
            &mut self.scores,
            &mut self.axis,
        );
        self.answers.push(answer);
        self.cursor += 1;
        debug!(
            "session: answer {} recorded, cursor {}/{}",
            answer.value(),
            self.cursor,
            self.questionnaire.len()
        );
        Ok(self.phase())
    }

    /// Zero-based index of the question currently asked.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The question under the cursor, while questioning.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase() {
            SessionPhase::Questioning => self.questionnaire.question(self.cursor),
            _ => None,
        }
    }

    /// Progress through the sequence while the cursor question is on screen,
    /// as a percentage.
    pub fn progress_percentage(&self) -> u32 {
        let len = self.questionnaire.len();
        let shown = (self.cursor + 1).min(len);
        (100.0 * shown as f64 / len as f64).round() as u32
    }

    pub fn answers(&self) -> &[AnswerValue] {
        &self.answers
    }

    /// Snapshot of the current category totals.
    pub fn category_scores(&self) -> CategoryScores {
        named_scores(self.questionnaire, &self.scores)
    }

    pub fn axis_scores(&self) -> AxisScores {
        self.axis
    }

    /// Produces the terminal result record. Only valid once the session is
    /// complete; the completion timestamp is supplied by the caller.
    pub fn finish(&self, completed_at: DateTime<Utc>) -> Result<QuizResult, QuizError> {
        if self.phase() != SessionPhase::Complete {
            return Err(QuizError::SessionNotComplete);
        }
        let user = self.user.clone().ok_or(QuizError::IntakePending)?;
        let category_scores = self.category_scores();
        let category_percentages = category_percentages(&category_scores);
        let split = axis_split(&self.axis);
        Ok(QuizResult {
            user,
            category_scores,
            category_percentages,
            leader_percentage: split.leader,
            player_percentage: split.player,
            answers: self.answers.iter().map(|a| a.value()).collect(),
            completed_at,
        })
    }
}

/// Runs every recorded response through a fresh session and collects the
/// result records.
///
/// Responses whose answer sequence does not cover the whole questionnaire
/// never reach the complete phase and are skipped with a warning, as are
/// responses with an identity record that fails intake. Parse-level
/// validation is the caller's concern.
pub fn run_scoring(
    questionnaire: &Questionnaire,
    responses: &[Response],
) -> Result<Vec<QuizResult>, QuizError> {
    info!(
        "run_scoring: processing {} responses over {} questions",
        responses.len(),
        questionnaire.len()
    );
    let mut results: Vec<QuizResult> = Vec::new();
    for response in responses.iter() {
        if response.answers.len() != questionnaire.len() {
            warn!(
                "run_scoring: skipping id {}: {} answers for {} questions",
                response.user.id,
                response.answers.len(),
                questionnaire.len()
            );
            continue;
        }
        let mut session = Session::new(questionnaire);
        if let Err(e) = session.begin(response.user.clone()) {
            warn!("run_scoring: skipping id {}: {}", response.user.id, e);
            continue;
        }
        for answer in response.answers.iter() {
            session.submit(*answer)?;
        }
        results.push(session.finish(response.completed_at)?);
    }
    info!("run_scoring: {} results", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use chrono::TimeZone;

    fn six_categories() -> Vec<String> {
        ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sample_questionnaire() -> Questionnaire {
        Builder::new()
            .categories(&six_categories())
            .teams(&["Platform".to_string(), "Research".to_string()])
            .question("Prefers their own way of working", &[("A", 2), ("E", -1), ("F", -1)])
            .axis_question("Enjoys leading the team", 2)
            .question("Listens before speaking up", &[("B", 1), ("D", 1)])
            .axis_question("Prefers their own assignment over strategy", -2)
            .build()
            .unwrap()
    }

    fn user() -> UserInfo {
        UserInfo {
            id: "123456".to_string(),
            name: "Alice Example".to_string(),
            team: "Platform".to_string(),
        }
    }

    fn ts() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 15, 0).unwrap()
    }

    #[test]
    fn empty_answer_sequence_scores_zero() {
        let q = sample_questionnaire();
        let (scores, axis) = accumulate(&q, &[]);
        assert_eq!(scores.len(), 6);
        assert!(scores.values().all(|s| *s == 0));
        assert_eq!(axis_split(&axis), AxisSplit { leader: 50, player: 50 });
    }

    #[test]
    fn accumulation_matches_weight_sum() {
        let q = sample_questionnaire();
        let answers = vec![2, -1, 1, 0];
        let (scores, _) = accumulate(&q, &answers);
        // Category score for K = sum over answered i of answers[i] * weight(q_i, K).
        for key in q.categories() {
            let expected: i64 = q
                .questions()
                .iter()
                .zip(answers.iter())
                .map(|(question, a)| a * question.weights.get(key).copied().unwrap_or(0))
                .sum();
            assert_eq!(scores[key], expected, "category {}", key);
        }
    }

    #[test]
    fn single_answer_scenario() {
        // Weights {A:2, E:-1, F:-1}, answer 2.
        let q = sample_questionnaire();
        let (scores, _) = accumulate(&q, &[2]);
        assert_eq!(scores["A"], 4);
        assert_eq!(scores["E"], -2);
        assert_eq!(scores["F"], -2);
        assert_eq!(scores["B"], 0);
        assert_eq!(scores["C"], 0);
        assert_eq!(scores["D"], 0);
        let pct = category_percentages(&scores);
        assert_eq!(pct["A"], 50);
        assert_eq!(pct["E"], 25);
        assert_eq!(pct["F"], 25);
        assert_eq!(pct["B"], 0);
    }

    #[test]
    fn negative_answer_on_positive_axis_weight() {
        // Weight {LP:2}, answer -2: the leader accumulator goes to -4, and
        // the split is taken on absolute values.
        let q = Builder::new()
            .categories(&six_categories())
            .axis_question("Enjoys leading the team", 2)
            .build()
            .unwrap();
        let (_, axis) = accumulate(&q, &[-2]);
        assert_eq!(axis.leader, -4);
        assert_eq!(axis.player, 0);
        assert_eq!(axis_split(&axis), AxisSplit { leader: 100, player: 0 });
    }

    #[test]
    fn negative_axis_weight_feeds_player() {
        let q = sample_questionnaire();
        // Question 4 has weight {LP:-2}.
        let (_, axis) = accumulate(&q, &[0, 0, 0, 1]);
        assert_eq!(axis.leader, 0);
        assert_eq!(axis.player, 2);
        assert_eq!(axis_split(&axis), AxisSplit { leader: 0, player: 100 });
    }

    #[test]
    fn all_neutral_answers_fall_back_to_even_splits() {
        let q = sample_questionnaire();
        let (scores, axis) = accumulate(&q, &[0, 0, 0, 0]);
        assert!(scores.values().all(|s| *s == 0));
        let pct = category_percentages(&scores);
        // round(100/6) for each; the total drifts from 100 and is accepted.
        assert!(pct.values().all(|p| *p == 17));
        assert_eq!(axis_split(&axis), AxisSplit { leader: 50, player: 50 });
    }

    #[test]
    fn axis_percentages_always_complement() {
        let q = sample_questionnaire();
        for answers in [vec![1, 2, 0, 1], vec![2, -1, -2, 2], vec![0, 1, 0, -1]] {
            let (_, axis) = accumulate(&q, &answers);
            let split = axis_split(&axis);
            assert_eq!(split.leader + split.player, 100);
        }
    }

    #[test]
    fn category_percentages_stay_in_range() {
        let q = sample_questionnaire();
        let (scores, _) = accumulate(&q, &[2, 2, -2, 1]);
        for (_, p) in category_percentages(&scores) {
            assert!(p <= 100);
        }
    }

    #[test]
    fn accumulate_is_idempotent() {
        let q = sample_questionnaire();
        let answers = vec![2, -1, 0, 1];
        assert_eq!(accumulate(&q, &answers), accumulate(&q, &answers));
    }

    #[test]
    fn undeclared_weight_key_materializes_on_first_use() {
        let q = Builder::new()
            .categories(&["A".to_string()])
            .question("Improvises under pressure", &[("G", 1)])
            .question("Plans the week ahead", &[("A", 1)])
            .build()
            .unwrap();
        // Only the answered prefix is folded: G is untouched so far.
        let (scores, _) = accumulate(&q, &[]);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["A"], 0);
        let (scores, _) = accumulate(&q, &[1]);
        assert_eq!(scores["G"], 1);
        assert_eq!(scores["A"], 0);
    }

    #[test]
    fn session_walks_intake_to_complete() {
        let q = sample_questionnaire();
        let mut session = Session::new(&q);
        assert_eq!(session.phase(), SessionPhase::Intake);
        assert_eq!(
            session.submit(AnswerValue::Agree),
            Err(QuizError::IntakePending)
        );

        session.begin(user()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Questioning);
        assert_eq!(session.finish(ts()), Err(QuizError::SessionNotComplete));

        session.submit(AnswerValue::StronglyAgree).unwrap();
        session.submit(AnswerValue::StronglyDisagree).unwrap();
        session.submit(AnswerValue::Neutral).unwrap();
        let phase = session.submit(AnswerValue::Neutral).unwrap();
        assert_eq!(phase, SessionPhase::Complete);
        assert_eq!(
            session.submit(AnswerValue::Agree),
            Err(QuizError::SessionComplete)
        );

        let result = session.finish(ts()).unwrap();
        assert_eq!(result.category_scores["A"], 4);
        assert_eq!(result.leader_percentage, 100);
        assert_eq!(result.player_percentage, 0);
        assert_eq!(result.answers, vec![2, -2, 0, 0]);
        assert_eq!(result.completed_at, ts());
    }

    #[test]
    fn session_matches_batch_accumulate() {
        let q = sample_questionnaire();
        let mut session = Session::new(&q);
        session.begin(user()).unwrap();
        for v in [1, -1, 2, -2] {
            session.submit(AnswerValue::from_value(v).unwrap()).unwrap();
        }
        let (scores, axis) = accumulate(&q, &[1, -1, 2, -2]);
        assert_eq!(session.category_scores(), scores);
        assert_eq!(session.axis_scores(), axis);
    }

    #[test]
    fn intake_rejects_invalid_identity() {
        let q = sample_questionnaire();
        let mut session = Session::new(&q);
        let mut bad = user();
        bad.id = "12345".to_string();
        assert_eq!(
            session.begin(bad),
            Err(QuizError::InvalidUserId {
                id: "12345".to_string()
            })
        );
        let mut bad = user();
        bad.id = "12a456".to_string();
        assert!(session.begin(bad).is_err());
        let mut bad = user();
        bad.name = "  ".to_string();
        assert_eq!(session.begin(bad), Err(QuizError::EmptyUserName));
        let mut bad = user();
        bad.team = "Marketing".to_string();
        assert_eq!(
            session.begin(bad),
            Err(QuizError::UnknownTeam {
                team: "Marketing".to_string()
            })
        );
        // The session stays in intake and can still start with valid input.
        assert_eq!(session.phase(), SessionPhase::Intake);
        session.begin(user()).unwrap();
        assert_eq!(session.phase(), SessionPhase::Questioning);
    }

    #[test]
    fn restart_resets_all_state() {
        let q = sample_questionnaire();
        let mut first = Session::new(&q);
        first.begin(user()).unwrap();
        for _ in 0..4 {
            first.submit(AnswerValue::StronglyAgree).unwrap();
        }
        assert_eq!(first.phase(), SessionPhase::Complete);

        let fresh = Session::new(&q);
        assert_eq!(fresh.phase(), SessionPhase::Intake);
        assert_eq!(fresh.cursor(), 0);
        assert!(fresh.answers().is_empty());
        assert!(fresh.category_scores().values().all(|s| *s == 0));
        assert_eq!(fresh.axis_scores(), AxisScores::default());
    }

    #[test]
    fn progress_tracks_the_cursor() {
        let q = sample_questionnaire();
        let mut session = Session::new(&q);
        session.begin(user()).unwrap();
        assert_eq!(session.progress_percentage(), 25);
        session.submit(AnswerValue::Neutral).unwrap();
        assert_eq!(session.progress_percentage(), 50);
        session.submit(AnswerValue::Neutral).unwrap();
        session.submit(AnswerValue::Neutral).unwrap();
        session.submit(AnswerValue::Neutral).unwrap();
        assert_eq!(session.progress_percentage(), 100);
    }

    #[test]
    fn top_categories_rank_by_signed_score() {
        let q = sample_questionnaire();
        let mut session = Session::new(&q);
        session.begin(user()).unwrap();
        for v in [2, 0, 1, 0] {
            session.submit(AnswerValue::from_value(v).unwrap()).unwrap();
        }
        let result = session.finish(ts()).unwrap();
        let top = result.top_categories(3);
        assert_eq!(top[0], ("A".to_string(), 4));
        assert_eq!(top[1], ("B".to_string(), 1));
        assert_eq!(top[2], ("D".to_string(), 1));
    }

    #[test]
    fn run_scoring_skips_incomplete_and_invalid_rows() {
        let q = sample_questionnaire();
        let ok = Response {
            user: user(),
            answers: vec![
                AnswerValue::StronglyAgree,
                AnswerValue::Neutral,
                AnswerValue::Neutral,
                AnswerValue::Neutral,
            ],
            completed_at: ts(),
        };
        let short = Response {
            user: UserInfo {
                id: "654321".to_string(),
                name: "Bob Example".to_string(),
                team: "Research".to_string(),
            },
            answers: vec![AnswerValue::Agree],
            completed_at: ts(),
        };
        let bad_team = Response {
            user: UserInfo {
                id: "111111".to_string(),
                name: "Carol Example".to_string(),
                team: "Marketing".to_string(),
            },
            answers: ok.answers.clone(),
            completed_at: ts(),
        };
        let results = run_scoring(&q, &[ok, short, bad_team]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].user.id, "123456");
    }

    #[test]
    fn answer_scale_round_trips() {
        for v in [-2i64, -1, 0, 1, 2] {
            assert_eq!(AnswerValue::from_value(v).unwrap().value(), v);
        }
        assert_eq!(AnswerValue::from_value(3), None);
        assert_eq!(AnswerValue::from_value(-3), None);
    }

    #[test]
    fn empty_questionnaire_is_rejected() {
        let r = Questionnaire::new(&six_categories(), &[], Vec::new());
        assert_eq!(r.err(), Some(QuizError::EmptyQuestionnaire));
    }
}
