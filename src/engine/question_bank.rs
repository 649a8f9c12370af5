// src/engine/question_bank.rs

use std::collections::HashMap;

use super::{
    error::EngineError,
    mastery::Subject,
    random::RandomSource,
    scoring::{OPTIONS_PER_QUESTION, QuizQuestion},
};

const BUILTIN_BANK: &str = include_str!("../../data/question_bank.json");

/// Read-only table of quiz questions, keyed by subject.
///
/// Loaded once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: HashMap<Subject, Vec<QuizQuestion>>,
}

impl QuestionBank {
    /// The bank shipped with the crate (`data/question_bank.json`).
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json(BUILTIN_BANK)
    }

    /// Parses and validates a bank of the form `{ "math": [question, ...], ... }`.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let questions: HashMap<Subject, Vec<QuizQuestion>> = serde_json::from_str(raw)
            .map_err(|e| EngineError::InvalidInput(format!("question bank: {}", e)))?;
        Self::new(questions)
    }

    pub fn new(questions: HashMap<Subject, Vec<QuizQuestion>>) -> Result<Self, EngineError> {
        for subject in Subject::ALL {
            let list = questions.get(&subject).map(Vec::as_slice).unwrap_or_default();
            if list.is_empty() {
                return Err(EngineError::InvalidInput(format!(
                    "question bank has no questions for {}",
                    subject
                )));
            }

            for (i, question) in list.iter().enumerate() {
                if question.options.len() != OPTIONS_PER_QUESTION {
                    return Err(EngineError::InvalidInput(format!(
                        "{} question {} has {} options, expected {}",
                        subject,
                        i,
                        question.options.len(),
                        OPTIONS_PER_QUESTION
                    )));
                }
                if !(0..OPTIONS_PER_QUESTION as i32).contains(&question.correct_index) {
                    return Err(EngineError::InvalidInput(format!(
                        "{} question {} has correct index {} out of range",
                        subject, i, question.correct_index
                    )));
                }
            }
        }

        Ok(Self { questions })
    }

    pub fn questions(&self, subject: Subject) -> &[QuizQuestion] {
        self.questions
            .get(&subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Picks up to `count` distinct questions for `subject` in random order.
    pub fn draw<R: RandomSource + ?Sized>(
        &self,
        subject: Subject,
        count: usize,
        rng: &mut R,
    ) -> Vec<QuizQuestion> {
        let mut pool: Vec<&QuizQuestion> = self.questions(subject).iter().collect();
        let take = count.min(pool.len());

        // Partial Fisher-Yates: the first `take` slots end up uniformly shuffled.
        for i in 0..take {
            let j = i + rng.below(pool.len() - i);
            pool.swap(i, j);
        }

        pool.into_iter().take(take).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::engine::random::{RngSource, testing::Scripted};

    #[test]
    fn test_builtin_bank_covers_every_subject() {
        let bank = QuestionBank::builtin().unwrap();
        for subject in Subject::ALL {
            assert_eq!(bank.questions(subject).len(), 5, "{}", subject);
        }
    }

    #[test]
    fn test_draw_returns_distinct_questions() {
        let bank = QuestionBank::builtin().unwrap();
        let mut rng = RngSource::seeded(3);

        for _ in 0..20 {
            let drawn = bank.draw(Subject::Science, 3, &mut rng);
            assert_eq!(drawn.len(), 3);
            let prompts: HashSet<_> = drawn.iter().map(|q| q.prompt.as_str()).collect();
            assert_eq!(prompts.len(), 3);
        }
    }

    #[test]
    fn test_draw_caps_at_bank_size() {
        let bank = QuestionBank::builtin().unwrap();
        let mut rng = RngSource::seeded(11);
        assert_eq!(bank.draw(Subject::Math, 50, &mut rng).len(), 5);
    }

    #[test]
    fn test_draw_with_scripted_source() {
        let bank = QuestionBank::builtin().unwrap();
        // Always picking offset 0 keeps the stored order.
        let mut rng = Scripted::new(vec![0]);
        let drawn = bank.draw(Subject::History, 2, &mut rng);
        assert_eq!(drawn[0].prompt, "In which year did World War II end?");
        assert_eq!(drawn[1].prompt, "Who was the first President of the United States?");
    }

    #[test]
    fn test_rejects_missing_subject() {
        let raw = r#"{ "math": [{ "prompt": "1+1", "options": ["1","2","3","4"], "correct_index": 1 }] }"#;
        assert!(matches!(
            QuestionBank::from_json(raw),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_bad_correct_index() {
        let mut questions = HashMap::new();
        for subject in Subject::ALL {
            questions.insert(
                subject,
                vec![QuizQuestion {
                    prompt: "?".into(),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_index: if subject == Subject::English { 4 } else { 0 },
                }],
            );
        }
        assert!(QuestionBank::new(questions).is_err());
    }

    #[test]
    fn test_rejects_unknown_subject_key() {
        let raw = r#"{ "art": [] }"#;
        assert!(QuestionBank::from_json(raw).is_err());
    }
}
