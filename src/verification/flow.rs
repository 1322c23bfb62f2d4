//! Defines the [VerificationFlow] struct, a strict sequential gate over a [QuestionSet].

use crate::error::KioskError;
use crate::verification::question::{Question, QuestionSet};
use log::debug;
use std::fmt::{Debug, Formatter};

/// The state of a [VerificationFlow] after an answer is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStep {
    /// The question at the given index is waiting for an answer.
    Answering(usize),

    /// The last answer to the question at the given index was wrong. The index does not
    /// advance until the question is answered correctly.
    Rejected { index: usize, message: String },

    /// Every question was answered correctly, in order.
    Completed,
}

/// The display state of a single question, for progress indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionProgress {
    Answered,
    Current,
    Pending,
}

/// A sequential yes/no question gate.
///
/// Questions must be answered correctly one at a time, in order. A wrong answer freezes
/// the flow on that question and reports the question's error message; earlier correct
/// answers are kept and the same question may be answered again. The flow completes only
/// through a correct answer to the final question, at which point the completion callback
/// runs once and the flow resets itself so it can be reused.
pub struct VerificationFlow {
    questions: QuestionSet,
    current_index: usize,
    answers: Vec<Option<bool>>,
    last_error: Option<String>,
    passed: bool,
    on_complete: Option<Box<dyn FnMut()>>,
    on_cancel: Option<Box<dyn FnMut()>>,
}

impl VerificationFlow {
    /// Creates a new [VerificationFlow] waiting on the first of the given questions.
    pub fn new(questions: QuestionSet) -> Self {
        let answers = vec![None; questions.len()];

        Self {
            questions,
            current_index: 0,
            answers,
            last_error: None,
            passed: false,
            on_complete: None,
            on_cancel: None,
        }
    }

    /// Sets the callback invoked each time the final question is answered correctly.
    pub fn with_on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Sets the callback invoked when the flow is cancelled.
    pub fn with_on_cancel(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Returns the questions asked by this flow.
    #[inline]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    /// Returns the index of the question currently being asked.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Returns the question currently being asked.
    #[inline]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    /// Returns the recorded answers. Unanswered questions are `None`.
    #[inline]
    pub fn answers(&self) -> &[Option<bool>] {
        &self.answers
    }

    /// Returns the error message of the last rejected answer, if the current question
    /// has not since been answered correctly.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the current state of this flow.
    pub fn step(&self) -> VerificationStep {
        match &self.last_error {
            Some(message) => VerificationStep::Rejected {
                index: self.current_index,
                message: message.clone(),
            },
            None => VerificationStep::Answering(self.current_index),
        }
    }

    /// Returns the one-based position of the current question and the question count,
    /// e.g. `(2, 4)` while the second of four questions is asked.
    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.current_index + 1, self.questions.len())
    }

    /// Returns the display state of every question.
    pub fn progress(&self) -> Vec<QuestionProgress> {
        (0..self.questions.len())
            .map(|index| match index.cmp(&self.current_index) {
                std::cmp::Ordering::Less => QuestionProgress::Answered,
                std::cmp::Ordering::Equal => QuestionProgress::Current,
                std::cmp::Ordering::Greater => QuestionProgress::Pending,
            })
            .collect()
    }

    /// Returns `true` if this flow has been completed since it was created or last
    /// cancelled.
    #[inline]
    pub fn has_passed(&self) -> bool {
        self.passed
    }

    /// Answers the question currently being asked.
    pub fn answer(&mut self, answer: bool) -> VerificationStep {
        self.apply(answer)
    }

    /// Answers the question at the given index. Only the question currently being asked
    /// can be answered; any other index is refused without changing the flow.
    pub fn submit(&mut self, index: usize, answer: bool) -> Result<VerificationStep, KioskError> {
        if index >= self.questions.len() {
            return Err(KioskError::QuestionIndexOutOfBounds(index));
        }

        if index != self.current_index {
            return Err(KioskError::QuestionOutOfOrder {
                expected: self.current_index,
                submitted: index,
            });
        }

        Ok(self.apply(answer))
    }

    /// Abandons the flow, clearing every answer and the passed state.
    pub fn cancel(&mut self) {
        debug!("verification cancelled at question {}", self.current_index);

        self.reset();
        self.passed = false;

        if let Some(callback) = self.on_cancel.as_mut() {
            callback();
        }
    }

    fn apply(&mut self, answer: bool) -> VerificationStep {
        let index = self.current_index;

        self.answers[index] = Some(answer);

        let question = &self.questions[index];

        if !question.accepts(answer) {
            debug!("verification question {} rejected", index);

            let message = question.error_message().to_string();

            self.last_error = Some(message.clone());

            return VerificationStep::Rejected { index, message };
        }

        self.last_error = None;

        if index + 1 < self.questions.len() {
            self.current_index = index + 1;

            return VerificationStep::Answering(self.current_index);
        }

        debug!("verification completed");

        self.passed = true;
        self.reset();

        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }

        VerificationStep::Completed
    }

    fn reset(&mut self) {
        self.current_index = 0;
        self.answers.iter_mut().for_each(|answer| *answer = None);
        self.last_error = None;
    }
}

impl Debug for VerificationFlow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationFlow")
            .field("questions", &self.questions)
            .field("current_index", &self.current_index)
            .field("answers", &self.answers)
            .field("last_error", &self.last_error)
            .field("passed", &self.passed)
            .finish_non_exhaustive()
    }
}
