//! Extraction of quiz questions from the free-text reply of the model.
//!
//! The reply is expected to follow the layout requested by
//! [`quiz_generation_prompt`](crate::services::prompt_builder::quiz_generation_prompt),
//! but nothing enforces that. Extraction anchors on the literal markers the
//! prompt asks for (`a)`..`d)`, `Correct answer:`, `(Sample answer:`) and
//! drops any block that does not have the full shape. A reply that yields
//! fewer questions than requested, or none, is a normal result.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::domain::{ChoiceLabel, Choices, NewQuestion};

pub const EXPECTED_MULTIPLE_CHOICE: usize = 5;
pub const EXPECTED_SHORT_ANSWER: usize = 5;

static CORRECT_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)correct answer[:\s]+([a-d])\b").expect("CORRECT_MARKER is a valid regex")
});

static NUMBERED_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\s+").expect("NUMBERED_START is a valid regex"));

static MULTIPLE_CHOICE_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^(?P<question>.*?\?)\s*a\)\s*(?P<a>.*?)\s*b\)\s*(?P<b>.*?)\s*c\)\s*(?P<c>.*?)\s*d\)\s*(?P<d>.*?)\s*$",
    )
    .expect("MULTIPLE_CHOICE_BODY is a valid regex")
});

static CHOICE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)([a-d])\)").expect("CHOICE_LABEL is a valid regex"));

static SHORT_SECTION_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(6\.)(?:\D|$)").expect("SHORT_SECTION_START is a valid regex")
});

static SHORT_ANSWER_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?si)\b(?:10|[6-9])\.\s*(?P<question>.*?)\s*\(sample answer:\s*(?P<answer>.*?)\)",
    )
    .expect("SHORT_ANSWER_BLOCK is a valid regex")
});

static SHORT_NUMBERED_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:10|[6-9])\.\s+").expect("SHORT_NUMBERED_START is a valid regex")
});

/// Questions found in one model reply, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuiz {
    pub questions: Vec<NewQuestion>,
}

impl ParsedQuiz {
    pub fn multiple_choice_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_multiple_choice()).count()
    }

    pub fn short_answer_count(&self) -> usize {
        self.questions.len() - self.multiple_choice_count()
    }

    /// True when fewer questions came back than the prompt asked for.
    pub fn is_degraded(&self) -> bool {
        self.multiple_choice_count() < EXPECTED_MULTIPLE_CHOICE
            || self.short_answer_count() < EXPECTED_SHORT_ANSWER
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn into_questions(self) -> Vec<NewQuestion> {
        self.questions
    }
}

pub fn parse_quiz(reply: &str) -> ParsedQuiz {
    let mut found = find_multiple_choice(reply);
    found.extend(find_short_answers(reply));
    found.sort_by_key(|(offset, _)| *offset);

    ParsedQuiz {
        questions: found.into_iter().map(|(_, question)| question).collect(),
    }
}

pub fn parse_multiple_choice(reply: &str) -> Vec<NewQuestion> {
    find_multiple_choice(reply)
        .into_iter()
        .map(|(_, question)| question)
        .collect()
}

pub fn parse_short_answers(reply: &str) -> Vec<NewQuestion> {
    find_short_answers(reply)
        .into_iter()
        .map(|(_, question)| question)
        .collect()
}

/// Each `Correct answer:` marker closes one candidate block: the text since
/// the previous marker. Within it the block starts at the first numbered
/// line from which the whole question/a)/b)/c)/d) shape matches cleanly.
fn find_multiple_choice(reply: &str) -> Vec<(usize, NewQuestion)> {
    let mut found = Vec::new();
    let mut segment_start = 0;

    for marker in CORRECT_MARKER.captures_iter(reply) {
        let (Some(whole), Some(letter)) = (marker.get(0), marker.get(1)) else {
            continue;
        };
        let segment = &reply[segment_start..whole.start()];
        let segment_offset = segment_start;
        segment_start = whole.end();

        let Some(correct) = letter.as_str().chars().next().and_then(ChoiceLabel::from_letter)
        else {
            continue;
        };

        let block = NUMBERED_START.find_iter(segment).find_map(|start| {
            multiple_choice_from_body(&segment[start.end()..], correct)
                .map(|question| (segment_offset + start.start(), question))
        });

        match block {
            Some(block) => found.push(block),
            None => log::debug!(
                "Dropping multiple-choice block ending at byte {}: incomplete shape",
                whole.start()
            ),
        }
    }

    found
}

fn multiple_choice_from_body(body: &str, correct: ChoiceLabel) -> Option<NewQuestion> {
    let caps = MULTIPLE_CHOICE_BODY.captures(body)?;
    let question = caps.name("question")?.as_str();
    let options = [
        caps.name("a")?.as_str(),
        caps.name("b")?.as_str(),
        caps.name("c")?.as_str(),
        caps.name("d")?.as_str(),
    ];

    // A field that swallowed the label after it belongs to a broken block.
    // Other labels are ordinary text, as in "d) Both a) and b)".
    if NUMBERED_START.is_match(question) || has_label(question, ChoiceLabel::A) {
        return None;
    }
    let next_labels = [ChoiceLabel::B, ChoiceLabel::C, ChoiceLabel::D];
    if options.iter().zip(next_labels).any(|(option, next)| has_label(option, next)) {
        return None;
    }
    if swallows_next_block(options[3]) {
        return None;
    }

    Some(NewQuestion::multiple_choice(
        question,
        Choices::new(options[0], options[1], options[2], options[3]),
        correct,
    ))
}

fn has_label(text: &str, label: ChoiceLabel) -> bool {
    CHOICE_LABEL
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .any(|letter| letter.as_str() == label.as_str())
}

/// Option d runs to the marker, so it holds any block that lost its own.
fn swallows_next_block(option: &str) -> bool {
    NUMBERED_START
        .find_iter(option)
        .any(|start| MULTIPLE_CHOICE_BODY.is_match(&option[start.end()..]))
}

/// Short answers are only searched from the first `6.` onwards; without
/// that boundary there are none.
fn find_short_answers(reply: &str) -> Vec<(usize, NewQuestion)> {
    let Some(section_start) = SHORT_SECTION_START
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.start())
    else {
        return Vec::new();
    };
    let section = &reply[section_start..];

    let mut found = Vec::new();
    for caps in SHORT_ANSWER_BLOCK.captures_iter(section) {
        let (Some(whole), Some(question), Some(answer)) =
            (caps.get(0), caps.name("question"), caps.name("answer"))
        else {
            continue;
        };

        // a block without its sample answer runs into the next numbered one
        let (offset, question) = match SHORT_NUMBERED_START.find_iter(question.as_str()).last() {
            Some(last) => (
                section_start + question.start() + last.start(),
                &question.as_str()[last.end()..],
            ),
            None => (section_start + whole.start(), question.as_str()),
        };

        match NewQuestion::short_answer(question, answer.as_str()) {
            Some(parsed) => found.push((offset, parsed)),
            None => log::debug!(
                "Dropping short-answer block at byte {}: blank sample answer",
                offset
            ),
        }
    }

    found
}
