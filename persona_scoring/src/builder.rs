pub use crate::config::*;
use crate::Questionnaire;

use std::collections::HashMap;

/// A builder for assembling a questionnaire.
///
/// ```
/// pub use persona_scoring::builder::Builder;
/// # use persona_scoring::QuizError;
///
/// let questionnaire = Builder::new()
///     .categories(&["A".to_string(), "B".to_string()])
///     .teams(&["Platform".to_string()])
///     .question("Keeps their own style of working", &[("A", 2), ("B", -1)])
///     .axis_question("Enjoys leading the team", 2)
///     .build()?;
///
/// assert_eq!(questionnaire.len(), 2);
/// # Ok::<(), QuizError>(())
/// ```
pub struct Builder {
    _categories: Vec<String>,
    _teams: Vec<String>,
    _questions: Vec<Question>,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _categories: Vec::new(),
            _teams: Vec::new(),
            _questions: Vec::new(),
        }
    }

    /// Declares the category keys. Declared categories appear in every
    /// result with an initial score of zero.
    pub fn categories(self, keys: &[String]) -> Builder {
        Builder {
            _categories: keys.to_vec(),
            ..self
        }
    }

    /// Declares the team list used for intake validation.
    pub fn teams(self, teams: &[String]) -> Builder {
        Builder {
            _teams: teams.to_vec(),
            ..self
        }
    }

    /// Appends a question with its sparse weight map.
    pub fn question(mut self, text: &str, weights: &[(&str, i64)]) -> Builder {
        let weights: HashMap<String, i64> = weights
            .iter()
            .map(|(key, w)| (key.to_string(), *w))
            .collect();
        self._questions.push(Question {
            text: text.to_string(),
            weights,
        });
        self
    }

    /// Appends a question that only feeds the leader/player axis.
    pub fn axis_question(self, text: &str, weight: i64) -> Builder {
        self.question(text, &[(AXIS_KEY, weight)])
    }

    /// Appends an already-assembled question.
    pub fn add_question(mut self, question: &Question) -> Builder {
        self._questions.push(question.clone());
        self
    }

    pub fn build(self) -> Result<Questionnaire, QuizError> {
        Questionnaire::new(&self._categories, &self._teams, self._questions)
    }
}
