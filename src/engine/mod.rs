//! Mastery & twin engine.
//!
//! Pure computations behind the request handlers: mastery adjustment, twin
//! targets, quiz scoring, classroom codes, the question bank and progress
//! analytics. Nothing here touches the database; randomness and the clock
//! are passed in by the caller.

pub mod analytics;
pub mod classroom_code;
pub mod error;
pub mod mastery;
pub mod question_bank;
pub mod random;
pub mod scoring;
pub mod twin;

pub use error::EngineError;
pub use mastery::{MasteryAdjustment, MasteryProfile, Subject, adjust};
pub use question_bank::QuestionBank;
pub use random::{RandomSource, RngSource};
pub use scoring::{QuizQuestion, QuizScore, score_quiz};
pub use twin::{TwinTarget, generate_twin};
