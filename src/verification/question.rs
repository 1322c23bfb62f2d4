//! Defines the [Question] and [QuestionSet] structs, the static configuration of a
//! verification gate.

use crate::error::KioskError;
use std::ops::Index;
use std::slice::Iter;

/// A single yes/no question with the answer the signer must give.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    expected_answer: bool,
    error_message: String,
}

impl Question {
    /// Creates a new [Question].
    pub fn new(
        prompt: impl Into<String>,
        expected_answer: bool,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            expected_answer,
            error_message: error_message.into(),
        }
    }

    /// Returns the text shown to the signer.
    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the answer that lets the signer proceed.
    #[inline]
    pub fn expected_answer(&self) -> bool {
        self.expected_answer
    }

    /// Returns the message shown when the signer gives any other answer.
    #[inline]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Returns `true` if the given answer is the expected one.
    #[inline]
    pub fn accepts(&self, answer: bool) -> bool {
        answer == self.expected_answer
    }
}

/// A non-empty, ordered list of [Question] objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Creates a new [QuestionSet] from the given questions.
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Result<Self, KioskError> {
        let questions: Vec<Question> = questions.into_iter().collect();

        if questions.is_empty() {
            Err(KioskError::NoQuestions)
        } else {
            Ok(Self { questions })
        }
    }

    /// Returns the number of questions in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`; a [QuestionSet] holds at least one question.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Returns the question at the given index, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Returns an iterator over the questions in order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, Question> {
        self.questions.iter()
    }
}

impl Index<usize> for QuestionSet {
    type Output = Question;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.questions[index]
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = Iter<'a, Question>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
