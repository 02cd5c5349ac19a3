use crate::domain::testcase::TestcaseRecord;

/// Placeholder used when there is no history, so the prompt never carries
/// an empty section.
pub(crate) const NO_CONTEXT: &str = "None";

pub(crate) const MAX_CONTEXT_FIELD_CHARS: usize = 140;

/// Renders historical test cases as `- <label>: <description>`, one line per
/// record in the given order. The label is the record's pattern, or its
/// testcase type when no pattern was stored.
pub fn build_context_block(records: &[TestcaseRecord]) -> String {
    if records.is_empty() {
        return NO_CONTEXT.to_string();
    }

    records
        .iter()
        .map(format_record_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_record_line(record: &TestcaseRecord) -> String {
    let label = record
        .pattern
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(record.testcase_type.as_str());

    format!(
        "- {}: {}",
        truncate(label, MAX_CONTEXT_FIELD_CHARS),
        truncate(&record.testcase_description, MAX_CONTEXT_FIELD_CHARS)
    )
}

/// Collapses whitespace (newlines included) and cuts to `limit` chars.
pub(crate) fn truncate(value: &str, limit: usize) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= limit {
        collapsed
    } else {
        let head: String = collapsed.chars().take(limit).collect();
        format!("{}...", head.trim_end())
    }
}
