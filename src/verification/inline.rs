//! Defines the [InlineVerification] struct, the non-modal variant of the verification gate
//! where every question is answered on the page itself.

use crate::error::KioskError;
use crate::verification::question::{Question, QuestionSet};

/// All questions shown at once, answerable in any order.
///
/// Capture stays blocked until every question holds its expected answer. An unanswered
/// question blocks capture just like a wrong one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineVerification {
    questions: QuestionSet,
    answers: Vec<Option<bool>>,
}

impl InlineVerification {
    /// Creates a new [InlineVerification] with every question unanswered.
    pub fn new(questions: QuestionSet) -> Self {
        let answers = vec![None; questions.len()];

        Self { questions, answers }
    }

    /// Returns the questions shown by this gate.
    #[inline]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    /// Records the answer to the question at the given index.
    pub fn set_answer(&mut self, index: usize, answer: bool) -> Result<(), KioskError> {
        let slot = self
            .answers
            .get_mut(index)
            .ok_or(KioskError::QuestionIndexOutOfBounds(index))?;

        *slot = Some(answer);

        Ok(())
    }

    /// Returns the answer recorded for the question at the given index.
    #[inline]
    pub fn answer(&self, index: usize) -> Option<bool> {
        self.answers.get(index).copied().flatten()
    }

    /// Returns `true` if the question at the given index holds a wrong answer.
    /// Unanswered questions are not reported as wrong.
    pub fn is_wrong(&self, index: usize) -> bool {
        match (self.questions.get(index), self.answer(index)) {
            (Some(question), Some(answer)) => !question.accepts(answer),
            _ => false,
        }
    }

    /// Returns `true` if every question holds its expected answer.
    pub fn is_satisfied(&self) -> bool {
        self.failing().next().is_none()
    }

    /// Returns the lowest-indexed question that blocks capture, together with its index.
    /// This is the question the signer's attention should be directed to.
    pub fn first_failing(&self) -> Option<(usize, &Question)> {
        self.failing().next()
    }

    /// Returns every question that blocks capture, in index order.
    pub fn failing(&self) -> impl Iterator<Item = (usize, &Question)> + '_ {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .enumerate()
            .filter(|(_, (question, answer))| {
                !matches!(answer, Some(answer) if question.accepts(*answer))
            })
            .map(|(index, (question, _))| (index, question))
    }

    /// Clears every answer.
    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|answer| *answer = None);
    }
}
