//! Problem generation and answer checking.
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::layout::Operator;
use crate::tokens::RandomSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProblemError {
    #[error("subtraction {num1} - {num2} would go below zero")]
    NegativeDifference { num1: u32, num2: u32 },
    #[error("sum {num1} + {num2} overflows")]
    Overflow { num1: u32, num2: u32 },
}

/// One drill question. Immutable for the duration of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
    num1: u32,
    num2: u32,
    operator: Operator,
    answer: u32,
}

impl Problem {
    pub fn new(num1: u32, num2: u32, operator: Operator) -> Result<Self, ProblemError> {
        let answer = match operator {
            Operator::Add => num1
                .checked_add(num2)
                .ok_or(ProblemError::Overflow { num1, num2 })?,
            Operator::Subtract => num1
                .checked_sub(num2)
                .ok_or(ProblemError::NegativeDifference { num1, num2 })?,
        };
        Ok(Self { num1, num2, operator, answer })
    }

    pub fn num1(&self) -> u32 {
        self.num1
    }
    pub fn num2(&self) -> u32 {
        self.num2
    }
    pub fn operator(&self) -> Operator {
        self.operator
    }
    pub fn answer(&self) -> u32 {
        self.answer
    }

    /// e.g. `7 + 4 = ?`
    pub fn prompt(&self) -> String {
        format!("{} {} {} = ?", self.num1, self.operator, self.num2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Addition,
    Subtraction,
    #[default]
    Mixed,
}

/// Result of comparing typed input to a problem's answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerCheck {
    /// Nothing typed yet; the caller should prompt rather than score.
    Empty,
    Correct,
    Wrong,
}

pub fn check_answer(problem: &Problem, input: &str) -> AnswerCheck {
    let input = input.trim();
    if input.is_empty() {
        return AnswerCheck::Empty;
    }
    match input.parse::<i64>() {
        Ok(v) if v == i64::from(problem.answer) => AnswerCheck::Correct,
        _ => AnswerCheck::Wrong,
    }
}

/// Operand bounds for generated problems: every operand is at least `min`,
/// sums and minuends stay within `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
}

pub struct ProblemGenerator<R> {
    rng: R,
    question_type: QuestionType,
    range: NumberRange,
}

impl<R: RandomSource> ProblemGenerator<R> {
    /// `range` must satisfy `2 * min <= max <= MAX_NUMBER_RANGE` (checked by
    /// `Settings::validate`); narrower ranges degrade to the smallest legal operands.
    pub fn new(rng: R, question_type: QuestionType, range: NumberRange) -> Self {
        Self { rng, question_type, range }
    }

    pub fn configure(&mut self, question_type: QuestionType, range: NumberRange) {
        self.question_type = question_type;
        self.range = range;
    }

    pub fn generate(&mut self) -> Problem {
        let operator = match self.question_type {
            QuestionType::Addition => Operator::Add,
            QuestionType::Subtraction => Operator::Subtract,
            QuestionType::Mixed => {
                if self.rng.next_bool() {
                    Operator::Add
                } else {
                    Operator::Subtract
                }
            }
        };
        let problem = match operator {
            Operator::Add => self.addition(),
            Operator::Subtract => self.subtraction(),
        };
        debug!(prompt = %problem.prompt(), "generated problem");
        problem
    }

    /// Every pair `(num1, num2)` with both operands `>= min` and a sum `<= max`
    /// is equally likely.
    fn addition(&mut self) -> Problem {
        let NumberRange { min, max } = self.range;
        // Column `a` (num1 = min + a) holds `span - a + 1` pairs; walk the
        // triangle to the chosen index instead of rejection sampling.
        let span = max.saturating_sub(min.saturating_mul(2)) as usize;
        let total = (span + 1) * (span + 2) / 2;
        let mut k = self.rng.next_index(total);
        let mut a = 0;
        while k > span - a {
            k -= span - a + 1;
            a += 1;
        }
        let num1 = min + a as u32;
        let num2 = min + k as u32;
        Problem { num1, num2, operator: Operator::Add, answer: num1 + num2 }
    }

    fn subtraction(&mut self) -> Problem {
        let NumberRange { min, max } = self.range;
        let num1 = self.rng.next_in_range(min, max);
        let num2 = self.rng.next_in_range(min, num1).min(num1);
        Problem { num1, num2, operator: Operator::Subtract, answer: num1 - num2 }
    }
}
