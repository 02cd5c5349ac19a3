use crate::domain::generation::GenerationRequest;
use crate::domain::testcase::NewTestcase;

const API_NAME_SUFFIXES: [&str; 2] = ["_api", "-api"];

/// Deterministic stand-in used when the model answer cannot be parsed.
pub(crate) fn synthesize_testcase(request: &GenerationRequest) -> NewTestcase {
    let method = request.request_type.trim().to_uppercase();

    NewTestcase {
        testcase_description: format!(
            "Verify {} request to {} handles {} scenario",
            method,
            request.api_name.trim(),
            request.testcase_type.trim()
        ),
        pattern: Some(format!(
            "{} /api/{} should return 200",
            method,
            api_path_segment(&request.api_name)
        )),
        api_name: request.api_name.clone(),
        request_type: request.request_type.clone(),
        testcase_type: request.testcase_type.clone(),
    }
}

/// `user_api` -> `user`. Names without a recognised suffix are kept as is.
pub(crate) fn api_path_segment(api_name: &str) -> String {
    let trimmed = api_name.trim().trim_matches('/');
    let lowered = trimmed.to_ascii_lowercase();

    for suffix in API_NAME_SUFFIXES {
        if lowered.ends_with(suffix) && trimmed.len() > suffix.len() {
            return trimmed[..trimmed.len() - suffix.len()].to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(api_name: &str, request_type: &str) -> GenerationRequest {
        GenerationRequest {
            api_name: api_name.to_string(),
            request_type: request_type.to_string(),
            testcase_type: "negative".to_string(),
            user_prompt: "anything".to_string(),
        }
    }

    #[test]
    fn test_pattern_follows_method_path_convention() {
        let testcase = synthesize_testcase(&request("user_api", "get"));
        assert_eq!(
            testcase.pattern.as_deref(),
            Some("GET /api/user should return 200")
        );
        assert_eq!(
            testcase.testcase_description,
            "Verify GET request to user_api handles negative scenario"
        );
        assert_eq!(testcase.request_type, "get");
    }

    #[test]
    fn test_api_path_segment_suffixes() {
        assert_eq!(api_path_segment("user_api"), "user");
        assert_eq!(api_path_segment("Order-API"), "Order");
        assert_eq!(api_path_segment("payments"), "payments");
        assert_eq!(api_path_segment("_api"), "_api");
        assert_eq!(api_path_segment("/user_api/"), "user");
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let req = request("user_api", "POST");
        assert_eq!(synthesize_testcase(&req), synthesize_testcase(&req));
    }
}
