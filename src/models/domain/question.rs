use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoiceLabel {
    A,
    B,
    C,
    D,
}

impl ChoiceLabel {
    /// Accepts `a`-`d` in either case.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'a' => Some(ChoiceLabel::A),
            'b' => Some(ChoiceLabel::B),
            'c' => Some(ChoiceLabel::C),
            'd' => Some(ChoiceLabel::D),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let mut chars = value.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceLabel::A => "a",
            ChoiceLabel::B => "b",
            ChoiceLabel::C => "c",
            ChoiceLabel::D => "d",
        }
    }
}

impl fmt::Display for ChoiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four option texts of a multiple-choice question, positions a-d.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Choices {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl Choices {
    pub fn new(a: &str, b: &str, c: &str, d: &str) -> Self {
        Choices {
            a: a.trim().to_string(),
            b: b.trim().to_string(),
            c: c.trim().to_string(),
            d: d.trim().to_string(),
        }
    }

    pub fn get(&self, label: ChoiceLabel) -> &str {
        match label {
            ChoiceLabel::A => &self.a,
            ChoiceLabel::B => &self.b,
            ChoiceLabel::C => &self.c,
            ChoiceLabel::D => &self.d,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        choices: Choices,
        correct: ChoiceLabel,
    },
    ShortAnswer {
        answer: String,
    },
}

impl QuestionKind {
    /// Wire name used by the web application (`mcq` / `short`).
    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "mcq",
            QuestionKind::ShortAnswer { .. } => "short",
        }
    }
}

/// A question extracted from a model reply, not yet attached to a run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewQuestion {
    pub question: String,
    pub kind: QuestionKind,
}

impl NewQuestion {
    pub fn multiple_choice(question: &str, choices: Choices, correct: ChoiceLabel) -> Self {
        NewQuestion {
            question: question.trim().to_string(),
            kind: QuestionKind::MultipleChoice { choices, correct },
        }
    }

    /// Returns `None` when the model answer is blank.
    pub fn short_answer(question: &str, answer: &str) -> Option<Self> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }

        Some(NewQuestion {
            question: question.trim().to_string(),
            kind: QuestionKind::ShortAnswer {
                answer: answer.to_string(),
            },
        })
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self.kind, QuestionKind::MultipleChoice { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub run_id: i64,
    pub question: String,
    pub kind: QuestionKind,
}

impl QuestionRecord {
    pub fn from_new(id: i64, run_id: i64, question: NewQuestion) -> Self {
        QuestionRecord {
            id,
            run_id,
            question: question.question,
            kind: question.kind,
        }
    }
}
