//! Prompts sent to the completion API.
//!
//! Keeping every prompt here means changing what the model is asked for
//! touches one file, and tests can inspect the exact text without a network
//! round trip.
//!
//! Both system prompts ask for the same JSON shape. Models wrap it in an
//! object often enough (`{"qa_pairs": [...]}`) that the response side
//! tolerates several shapes; see [`crate::pipeline::normalize`].

/// Template for direct mode (text chunk inlined in the user message).
///
/// Placeholders: `{count}`, `{language}`.
pub const DIRECT_SYSTEM_TEMPLATE: &str = r#"You are a professional question-answer pair generator. Based on the text you are given, produce high-quality question/answer pairs.

Rules:
- Questions must be realistic and substantive — the kind a reader of this text would actually ask.
- Answers must be detailed and accurate, and must be based entirely on the provided text.
- Write every question and answer in {language}.

Your reply must be a JSON array in which every element is an object with a "question" field and an "answer" field, for example:
[
    {"question": "Question 1?", "answer": "Answer 1."},
    {"question": "Question 2?", "answer": "Answer 2."}
]

Aim for {count} high-quality question/answer pairs."#;

/// Template for file-upload mode (document referenced by file id).
///
/// Placeholders: `{count}`, `{language}`.
pub const UPLOAD_SYSTEM_TEMPLATE: &str = r#"You are a professional question-answer pair generator. Based on the content of the uploaded document, produce high-quality question/answer pairs.

Rules:
- Questions must be realistic and substantive — the kind a reader of this document would actually ask.
- Answers must be detailed and accurate, and must be based entirely on the provided document.
- Write every question and answer in {language}.

Your reply must be a JSON array in which every element is an object with a "question" field and an "answer" field, for example:
[
    {"question": "Question 1?", "answer": "Answer 1."},
    {"question": "Question 2?", "answer": "Answer 2."}
]

Aim for {count} high-quality question/answer pairs."#;

/// User message for file-upload mode; the document itself travels as a file id.
pub const UPLOAD_USER_MESSAGE: &str =
    "Generate high-quality question/answer pairs based on the content of the uploaded document.";

/// System prompt for direct mode.
pub fn direct_system_prompt(count: usize, language: &str) -> String {
    fill(DIRECT_SYSTEM_TEMPLATE, count, language)
}

/// System prompt for file-upload mode.
pub fn upload_system_prompt(count: usize, language: &str) -> String {
    fill(UPLOAD_SYSTEM_TEMPLATE, count, language)
}

/// User message embedding one chunk of document text.
pub fn direct_user_message(chunk_text: &str) -> String {
    format!(
        "Here is a passage of text. Create high-quality question/answer pairs from it:\n\n{}",
        chunk_text
    )
}

fn fill(template: &str, count: usize, language: &str) -> String {
    template
        .replace("{count}", &count.to_string())
        .replace("{language}", language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_prompt_fills_placeholders() {
        let p = direct_system_prompt(5, "English");
        assert!(p.contains("Aim for 5 "));
        assert!(p.contains("in English."));
        assert!(!p.contains('{') || p.contains(r#"{"question""#));
        assert!(!p.contains("{count}"));
        assert!(!p.contains("{language}"));
    }

    #[test]
    fn upload_prompt_targets_document() {
        let p = upload_system_prompt(10, "Chinese");
        assert!(p.contains("uploaded document"));
        assert!(p.contains("Aim for 10 "));
    }

    #[test]
    fn prompts_mention_both_fields() {
        for p in [direct_system_prompt(5, "x"), upload_system_prompt(10, "x")] {
            assert!(p.contains(r#""question""#));
            assert!(p.contains(r#""answer""#));
            assert!(p.contains("JSON array"));
        }
    }

    #[test]
    fn user_message_embeds_chunk() {
        let m = direct_user_message("The sky is blue.");
        assert!(m.ends_with("\n\nThe sky is blue."));
    }
}
