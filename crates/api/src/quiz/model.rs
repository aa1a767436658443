use serde::{Deserialize, Serialize};

/// One drag item placed on one drop location.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DragAndDropAssignment {
    pub item_id: i64,
    pub location_id: i64,
}

/// Answer-specific payload, discriminated the same way the submitted-answer
/// rows are stored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "discriminator", rename_all = "camelCase")]
pub enum AnswerPayload {
    MultipleChoice { selected_option_ids: Vec<i64> },
    DragAndDrop { assignments: Vec<DragAndDropAssignment> },
}

/// A single answer within a quiz submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub id: Option<i64>,
    pub submission_id: Option<i64>,
    #[serde(flatten)]
    pub payload: AnswerPayload,
}

impl PartialEq for SubmittedAnswer {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A student's quiz submission. The answer set belongs exclusively to this
/// submission and is unique by answer identity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub id: Option<i64>,
    #[serde(default)]
    pub submitted_answers: Vec<SubmittedAnswer>,
}

impl QuizSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an answer, replacing any existing answer with the same identity.
    pub fn add_submitted_answer(&mut self, answer: SubmittedAnswer) {
        if let Some(id) = answer.id {
            if let Some(existing) = self
                .submitted_answers
                .iter_mut()
                .find(|a| a.id == Some(id))
            {
                *existing = answer;
                return;
            }
        }
        self.submitted_answers.push(answer);
    }
}

impl PartialEq for QuizSubmission {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Correct-answer counters for a question, split by rated and unrated results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionStatistic {
    pub id: Option<i64>,
    pub rated_correct_counter: i64,
    pub un_rated_correct_counter: i64,
    pub question_id: Option<i64>,
}

impl QuestionStatistic {
    pub fn new(question_id: i64) -> Self {
        Self {
            id: None,
            rated_correct_counter: 0,
            un_rated_correct_counter: 0,
            question_id: Some(question_id),
        }
    }
}

impl PartialEq for QuestionStatistic {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
