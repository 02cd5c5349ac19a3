use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

static INTERNAL_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<internal>[\s\S]*?</internal>").unwrap());

static INSTRUCTION_TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<s>|</s>|\[/?INST\]").unwrap());

/// Removes reasoning blocks and instruction-template tokens that local
/// models tend to leak into their answer.
pub fn clean_llm_response(response: &str) -> String {
    let mut cleaned = THINK_TAG_PATTERN.replace_all(response, "").to_string();
    cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = INTERNAL_TAG_PATTERN.replace_all(&cleaned, "").to_string();
    cleaned = INSTRUCTION_TOKEN_PATTERN
        .replace_all(&cleaned, "")
        .to_string();

    cleaned.trim().to_string()
}

/// Byte ranges of the reasoning blocks `clean_llm_response` would drop.
pub fn reasoning_spans(response: &str) -> Vec<Range<usize>> {
    [
        &*THINK_TAG_PATTERN,
        &*REASONING_TAG_PATTERN,
        &*INTERNAL_TAG_PATTERN,
    ]
    .iter()
    .flat_map(|pattern| pattern.find_iter(response).map(|found| found.range()))
    .collect()
}

/// Text-generation pipelines often return the prompt followed by the
/// completion. Only the completion is worth parsing.
pub fn strip_prompt_echo<'a>(response: &'a str, prompt: &str) -> &'a str {
    let trimmed_prompt = prompt.trim();
    if trimmed_prompt.is_empty() {
        return response;
    }
    response
        .trim_start()
        .strip_prefix(trimmed_prompt)
        .unwrap_or(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_think_tags() {
        let input = "<think>Some reasoning here</think>The actual response";
        assert_eq!(clean_llm_response(input), "The actual response");
    }

    #[test]
    fn test_clean_self_closing_think() {
        assert_eq!(clean_llm_response("<think />{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_clean_reasoning_and_internal_tags() {
        let input = "<reasoning>the id is invalid</reasoning><internal>debug</internal>Final";
        assert_eq!(clean_llm_response(input), "Final");
    }

    #[test]
    fn test_clean_instruction_tokens() {
        let input = "<s>[INST] ignored? [/INST] {\"pattern\": null}</s>";
        assert_eq!(clean_llm_response(input), "ignored?  {\"pattern\": null}");
    }

    #[test]
    fn test_clean_preserves_normal_text() {
        let input = "Sorry, I cannot help";
        assert_eq!(clean_llm_response(input), "Sorry, I cannot help");
    }

    #[test]
    fn test_reasoning_spans() {
        let input = "a<think>x</think>b<internal>y</internal>";
        assert_eq!(reasoning_spans(input), vec![1..17, 18..40]);
        assert!(reasoning_spans("<s>[INST] plain [/INST]").is_empty());
    }

    #[test]
    fn test_strip_prompt_echo() {
        let prompt = "API Name: user_api\nReturn JSON.";
        let response = "API Name: user_api\nReturn JSON. {\"testcase_description\":\"x\"}";
        assert_eq!(
            strip_prompt_echo(response, prompt),
            " {\"testcase_description\":\"x\"}"
        );
    }

    #[test]
    fn test_strip_prompt_echo_leaves_plain_completion() {
        let response = "{\"testcase_description\":\"x\"}";
        assert_eq!(strip_prompt_echo(response, "prompt"), response);
    }
}
