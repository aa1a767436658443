mod model;
pub mod repository;

pub use self::model::*;
pub use self::repository::{QuestionStatisticRepository, QuizSubmissionRepository};
