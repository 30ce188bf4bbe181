pub const GENERATION_SYSTEM_PROMPT: &str = "You are a helpful education assistant. You write clear, unambiguous quiz questions that are answerable from the supplied document alone.";

// The numbering and the literal markers below are what the quiz parser anchors on.
pub const GENERATION_INSTRUCTIONS: &str = "Generate exactly 5 multiple-choice questions numbered 1 to 5. Each question must end with a question mark and be followed by exactly 4 options labelled a), b), c) and d), one per line, then a line in the form 'Correct answer: <letter>' where <letter> is one of a, b, c or d.
Then generate exactly 5 short-answer questions numbered 6 to 10, each followed by '(Sample answer: <answer>)'.
Use the format below and add no other commentary.

1. <question>?
a) <option>
b) <option>
c) <option>
d) <option>
Correct answer: <letter>

6. <question>
(Sample answer: <answer>)";

pub const EVALUATION_SYSTEM_PROMPT: &str = "You are a strict but fair evaluator of student answers. You reply with JSON only.";

pub const EVALUATION_INSTRUCTIONS: &str = "Score the student's answer against the expected answer on a scale from 0 to 5, where 5 means fully correct and complete and 0 means wrong or missing.
Return ONLY this JSON object and nothing else:
{\"score\": <number between 0 and 5>, \"feedback\": \"<one or two sentences for the student>\"}";
