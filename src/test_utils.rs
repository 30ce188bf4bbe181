#[cfg(test)]
pub mod fixtures {
    use std::io::{Cursor, Write};

    use zip::{write::SimpleFileOptions, ZipWriter};

    use crate::models::domain::{ChoiceLabel, Choices, NewQuestion};

    /// A well-formed generation reply: five multiple-choice and five
    /// short-answer questions.
    pub const WELL_FORMED_REPLY: &str = "Here are the questions:

1. What does photosynthesis convert?
a) Heat
b) Light
c) Sound
d) Mass
Correct answer: b

2. Where does photosynthesis take place?
a) Mitochondria
b) Nucleus
c) Chloroplasts
d) Ribosomes
Correct Answer: C

3. Which gas do plants absorb?
a) Oxygen
b) Carbon dioxide
c) Nitrogen
d) Helium
Correct answer: b

4. Which pigment captures light?
a) Chlorophyll
b) Keratin
c) Melanin
d) Hemoglobin
Correct answer: a

5. What is released as a by-product?
a) Methane
b) Hydrogen
c) Carbon monoxide
d) Oxygen
Correct answer: d

6. Explain photosynthesis briefly.
(Sample answer: It converts light energy into chemical energy.)

7. Name the two stages of photosynthesis.
(Sample answer: The light-dependent reactions and the Calvin cycle.)

8. Why are leaves green?
(Sample answer: Chlorophyll reflects green light.)

9. What role does water play?
(Sample answer: Water is split to supply electrons and release oxygen.)

10. How does light intensity affect the rate?
(Sample answer: The rate rises with intensity until another factor limits it.)
";

    /// One question of each kind on a single line.
    pub const SINGLE_PAIR_REPLY: &str = "1. What does photosynthesis convert? a) Heat b) Light c) Sound d) Mass Correct answer: b 6. Explain photosynthesis briefly. (Sample answer: It converts light energy into chemical energy.)";

    pub fn sample_multiple_choice() -> NewQuestion {
        NewQuestion::multiple_choice(
            "What does photosynthesis convert?",
            Choices::new("Heat", "Light", "Sound", "Mass"),
            ChoiceLabel::B,
        )
    }

    pub fn sample_short_answer() -> NewQuestion {
        NewQuestion::short_answer(
            "Explain photosynthesis briefly.",
            "It converts light energy into chemical energy.",
        )
        .expect("sample answer is not blank")
    }

    /// Builds a minimal .docx whose body holds one paragraph per entry.
    pub fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", escape_xml(p)))
            .collect();
        build_docx_from_body(&body)
    }

    /// Builds a minimal .docx around raw `w:body` content.
    pub fn build_docx_from_body(body: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .expect("start document part");
        writer
            .write_all(document.as_bytes())
            .expect("write document part");
        writer.finish().expect("finish docx").into_inner()
    }

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::services::text_extractor::extract_docx_text;
    use std::io::Cursor;

    #[test]
    fn test_build_docx_is_a_zip() {
        let bytes = build_docx(&["Hello"]);
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_build_docx_escapes_markup() {
        let bytes = build_docx(&["a < b & c"]);
        let text = extract_docx_text(Cursor::new(bytes)).unwrap();
        assert_eq!(text, "a < b & c");
    }

    #[test]
    fn test_sample_questions() {
        assert!(sample_multiple_choice().is_multiple_choice());
        assert!(!sample_short_answer().is_multiple_choice());
    }
}
