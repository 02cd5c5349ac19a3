use crate::domain::generation::GenerationRequest;

/// Field names the model must use. They mirror `NewTestcase`, which is what
/// the extractor decodes into.
pub(crate) const OUTPUT_FIELDS: [&str; 5] = [
    "testcase_description",
    "pattern",
    "api_name",
    "request_type",
    "testcase_type",
];

pub(crate) fn build_generation_prompt(request: &GenerationRequest, context: &str) -> String {
    let mut body = String::new();
    body.push_str(
        "You are a QA automation assistant that writes API test cases. Suggest one new test case for the API below that complements the existing test cases without duplicating them.\n\n",
    );

    body.push_str(&format!("API Name: {}\n", request.api_name));
    body.push_str(&format!("Request Type: {}\n", request.request_type));
    body.push_str(&format!("Testcase Type: {}\n", request.testcase_type));
    body.push_str(&format!("User Prompt: {}\n", request.user_prompt));

    body.push_str("\nExisting Testcases:\n");
    body.push_str(context);
    body.push('\n');

    body.push_str("\nOutput format:\n");
    body.push_str("Return exactly one JSON object with these fields:\n");
    body.push_str("- testcase_description (string, required): what the test verifies\n");
    body.push_str(
        "- pattern (string or null): \"<REQUEST_TYPE> <path> should return <status>\"\n",
    );
    body.push_str("- api_name (string): the API name given above\n");
    body.push_str("- request_type (string): the request type given above\n");
    body.push_str("- testcase_type (string): the testcase type given above\n");

    let example = serde_json::json!({
        OUTPUT_FIELDS[0]: "Request with a non-numeric id is rejected",
        OUTPUT_FIELDS[1]: format!("{} /api/resource/abc should return 400", request.request_type.to_uppercase()),
        OUTPUT_FIELDS[2]: request.api_name,
        OUTPUT_FIELDS[3]: request.request_type,
        OUTPUT_FIELDS[4]: request.testcase_type,
    });
    body.push_str(&format!("\nExample:\n{}\n", example));

    body.push_str(
        "\nReturn only the JSON object. Do not add explanations, markdown, or more than one test case.\n",
    );

    body
}
