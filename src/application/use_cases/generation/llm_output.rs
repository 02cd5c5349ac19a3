use super::fallback::synthesize_testcase;
use crate::domain::generation::{GenerationOutcome, GenerationRequest};
use crate::domain::testcase::NewTestcase;
use crate::infrastructure::response::{clean_llm_response, reasoning_spans, strip_prompt_echo};
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

/// The shape requested from the model. Only the description is mandatory;
/// the other fields fall back to the request.
#[derive(Debug, Deserialize)]
struct GeneratedTestcase {
    #[serde(default)]
    testcase_description: Option<String>,
    /// Accepted when `testcase_description` is missing or blank.
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    api_name: Option<String>,
    #[serde(default)]
    request_type: Option<String>,
    #[serde(default)]
    testcase_type: Option<String>,
}

/// Turns raw model text into an outcome. Never fails: anything that cannot
/// be decoded becomes a `Fallback` carrying `raw` verbatim.
pub fn extract_outcome(raw: &str, request: &GenerationRequest) -> GenerationOutcome {
    extract_completion(raw, "", request)
}

/// Same as [`extract_outcome`], ignoring an echo of `prompt` at the start
/// of the text.
pub fn extract_completion(
    raw: &str,
    prompt: &str,
    request: &GenerationRequest,
) -> GenerationOutcome {
    let completion = strip_prompt_echo(raw, prompt);

    // Decoding the untouched text first keeps template tokens that appear
    // inside JSON strings; the cleaned text covers objects wrapped in them.
    let testcase = parse_visible_testcase(completion, request).or_else(|| {
        let cleaned = clean_llm_response(completion);
        (cleaned != completion)
            .then(|| parse_testcase(&cleaned, request))
            .flatten()
    });

    match testcase {
        Some(testcase) => GenerationOutcome::Structured { testcase },
        None => {
            debug!(
                raw_chars = raw.chars().count(),
                "Model output had no usable test case; synthesizing fallback"
            );
            GenerationOutcome::Fallback {
                testcase: synthesize_testcase(request),
                raw_model_text: raw.to_string(),
            }
        }
    }
}

/// Skips the text when its first object opens inside a reasoning block.
fn parse_visible_testcase(text: &str, request: &GenerationRequest) -> Option<NewTestcase> {
    let start = text.find('{')?;
    if reasoning_spans(text).iter().any(|span| span.contains(&start)) {
        return None;
    }
    parse_testcase(text, request)
}

fn parse_testcase(text: &str, request: &GenerationRequest) -> Option<NewTestcase> {
    let span = brace_span(text)?;
    if let Some(testcase) = decode_testcase(span, request) {
        return Some(testcase);
    }

    // The outer span can swallow prose between two objects; retry with the
    // first object on its own.
    balanced_object(text)
        .filter(|object| *object != span)
        .and_then(|object| decode_testcase(object, request))
}

/// From the first `{` to the last `}`, without checking nesting.
pub(crate) fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// The first depth-balanced `{...}`, ignoring braces inside JSON strings.
pub(crate) fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_testcase(span: &str, request: &GenerationRequest) -> Option<NewTestcase> {
    let generated = match serde_json::from_str::<GeneratedTestcase>(span) {
        Ok(generated) => generated,
        Err(err) => {
            debug!(error = %err, "Candidate span is not a valid test case object");
            return None;
        }
    };

    let description = generated
        .testcase_description
        .filter(|value| !value.trim().is_empty())
        .or(generated.description)
        .filter(|value| !value.trim().is_empty())?;

    let testcase = NewTestcase {
        testcase_description: description,
        pattern: generated.pattern,
        api_name: or_request(generated.api_name, &request.api_name),
        request_type: or_request(generated.request_type, &request.request_type),
        testcase_type: or_request(generated.testcase_type, &request.testcase_type),
    }
    .normalized();

    match testcase.validate() {
        Ok(()) => Some(testcase),
        Err(err) => {
            debug!(error = %err, "Decoded test case failed validation");
            None
        }
    }
}

fn or_request(value: Option<String>, requested: &str) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| requested.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            api_name: "user_api".to_string(),
            request_type: "GET".to_string(),
            testcase_type: "negative".to_string(),
            user_prompt: "test invalid id".to_string(),
        }
    }

    fn structured(outcome: GenerationOutcome) -> NewTestcase {
        match outcome {
            GenerationOutcome::Structured { testcase } => testcase,
            other => panic!("expected structured outcome, got {:?}", other),
        }
    }

    fn fallback(outcome: GenerationOutcome) -> (NewTestcase, String) {
        match outcome {
            GenerationOutcome::Fallback {
                testcase,
                raw_model_text,
            } => (testcase, raw_model_text),
            other => panic!("expected fallback outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_description_is_preserved_verbatim() {
        let raw = r#"Here you go: {"testcase_description": "Checks 404 on missing user", "pattern": "GET /api/user/999 should return 404"} Hope that helps."#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(testcase.testcase_description, "Checks 404 on missing user");
        assert_eq!(
            testcase.pattern.as_deref(),
            Some("GET /api/user/999 should return 404")
        );
        assert_eq!(testcase.api_name, "user_api");
        assert_eq!(testcase.request_type, "GET");
        assert_eq!(testcase.testcase_type, "negative");
    }

    #[test]
    fn test_full_contract_object_is_structured() {
        let raw = r#"{"testcase_description":"Invalid id returns 404","pattern":"GET /api/user/invalid should return 404","api_name":"user_api","request_type":"GET","testcase_type":"negative"}"#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(
            testcase,
            NewTestcase {
                testcase_description: "Invalid id returns 404".to_string(),
                pattern: Some("GET /api/user/invalid should return 404".to_string()),
                api_name: "user_api".to_string(),
                request_type: "GET".to_string(),
                testcase_type: "negative".to_string(),
            }
        );
    }

    #[test]
    fn test_plain_prose_falls_back_with_raw_text() {
        let raw = "Sorry, I cannot help";
        let (testcase, raw_model_text) = fallback(extract_outcome(raw, &request()));
        assert_eq!(raw_model_text, raw);
        assert_eq!(
            testcase.pattern.as_deref(),
            Some("GET /api/user should return 200")
        );
    }

    #[test]
    fn test_invalid_structure_falls_back() {
        for raw in [
            "{testcase_description: \"unquoted key\"}",
            "{\"testcase_description\": \"trailing comma\",}",
            "} backwards {",
        ] {
            let (_, raw_model_text) = fallback(extract_outcome(raw, &request()));
            assert_eq!(raw_model_text, raw);
        }
    }

    #[test]
    fn test_missing_or_blank_description_falls_back() {
        fallback(extract_outcome(r#"{"pattern": "GET /x"}"#, &request()));
        fallback(extract_outcome(
            r#"{"testcase_description": "   "}"#,
            &request(),
        ));
    }

    #[test]
    fn test_description_alias_is_accepted() {
        let testcase = structured(extract_outcome(
            r#"{"description": "Rejects empty id", "pattern": null}"#,
            &request(),
        ));
        assert_eq!(testcase.testcase_description, "Rejects empty id");
        assert_eq!(testcase.pattern, None);
    }

    #[test]
    fn test_both_description_keys_prefer_the_full_name() {
        let testcase = structured(extract_outcome(
            r#"{"description": "short", "testcase_description": "Rejects negative id"}"#,
            &request(),
        ));
        assert_eq!(testcase.testcase_description, "Rejects negative id");

        let testcase = structured(extract_outcome(
            r#"{"testcase_description": "", "description": "Rejects empty body"}"#,
            &request(),
        ));
        assert_eq!(testcase.testcase_description, "Rejects empty body");
    }

    #[test]
    fn test_template_tokens_inside_description_are_kept() {
        let raw = r#"{"testcase_description":"Body with <s> tag and [INST] marker is rejected"}"#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(
            testcase.testcase_description,
            "Body with <s> tag and [INST] marker is rejected"
        );
    }

    #[test]
    fn test_object_wrapped_in_template_tokens_is_structured() {
        let raw = r#"<s>[INST] {"testcase_description": "Empty id is rejected"} [/INST]</s>"#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(testcase.testcase_description, "Empty id is rejected");
    }

    #[test]
    fn test_draft_inside_think_block_is_ignored() {
        let raw = r#"<think>{"testcase_description": "draft"}</think>{"testcase_description": "final"}"#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(testcase.testcase_description, "final");
    }

    #[test]
    fn test_code_fence_and_think_block_are_tolerated() {
        let raw = "<think>the user wants {something}</think>\n```json\n{\"testcase_description\": \"Id with letters is rejected\"}\n```";
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(testcase.testcase_description, "Id with letters is rejected");
    }

    #[test]
    fn test_second_object_does_not_hide_the_first() {
        let raw = r#"{"testcase_description": "first"} or maybe {"testcase_description": "second"}"#;
        let testcase = structured(extract_outcome(raw, &request()));
        assert_eq!(testcase.testcase_description, "first");
    }

    #[test]
    fn test_prompt_echo_is_skipped() {
        let prompt = "Example:\n{\"testcase_description\": \"example only\"}";
        let raw = format!("{}\n{{\"testcase_description\": \"real answer\"}}", prompt);
        let testcase = structured(extract_completion(&raw, prompt, &request()));
        assert_eq!(testcase.testcase_description, "real answer");
    }

    #[test]
    fn test_balanced_object_ignores_braces_in_strings() {
        let text = r#"x {"a": "}{", "b": {"c": "\"}"}} y }"#;
        assert_eq!(
            balanced_object(text),
            Some(r#"{"a": "}{", "b": {"c": "\"}"}}"#)
        );
        assert_eq!(balanced_object("{ never closed"), None);
    }

    #[test]
    fn test_brace_span_is_first_to_last() {
        assert_eq!(brace_span("a {1} b {2} c"), Some("{1} b {2}"));
        assert_eq!(brace_span("no braces"), None);
    }
}
