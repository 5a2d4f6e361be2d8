//! LLM prompts for schema-constrained extraction.

use crate::pipeline::chunking::Chunk;
use crate::schema::{ExtractionSchema, Shape};

/// System prompt: the task, the instruction, and the schema the reply must follow.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You extract structured data from web page content.

Instruction:
{instruction}

The reply must be JSON matching this schema:
{schema}

Rules:
- Reply with JSON only, no commentary and no markdown fences
- {shape_rule}
- Use only information present in the content; omit fields you cannot find
- If the content holds nothing relevant, reply with {empty}"#;

/// User prompt: one chunk of one page.
pub const EXTRACT_USER_PROMPT: &str = r#"Page URL: {url}
Part {part} of {total}

Content:
{content}"#;

/// Format the system prompt for a schema and instruction.
pub fn format_system_prompt(instruction: &str, schema: &ExtractionSchema) -> String {
    let schema_json =
        serde_json::to_string_pretty(&schema.to_json()).unwrap_or_else(|_| "{}".to_string());

    let (shape_rule, empty) = match schema.shape() {
        Shape::List => ("Return a JSON array with one object per item", "[]"),
        Shape::Single => ("Return a single JSON object", "{}"),
    };

    EXTRACT_SYSTEM_PROMPT
        .replace("{shape_rule}", shape_rule)
        .replace("{empty}", empty)
        .replace("{schema}", &schema_json)
        .replace("{instruction}", instruction.trim())
}

/// Format the user prompt for one chunk.
pub fn format_user_prompt(url: &str, chunk: &Chunk) -> String {
    EXTRACT_USER_PROMPT
        .replace("{url}", url)
        .replace("{part}", &(chunk.index + 1).to_string())
        .replace("{total}", &chunk.total.to_string())
        .replace("{content}", &chunk.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_case::UseCase;

    #[test]
    fn test_system_prompt_embeds_schema() {
        let case = UseCase::course_catalog();
        let prompt = format_system_prompt(&case.instruction, &case.schema);

        assert!(prompt.contains("Extract a list of courses"));
        assert!(prompt.contains("\"credits\""));
        assert!(prompt.contains("\"required\""));
        assert!(prompt.contains("JSON array"));
        assert!(!prompt.contains("{schema}"));
    }

    #[test]
    fn test_single_record_prompt() {
        let case = UseCase::product();
        let prompt = format_system_prompt(&case.instruction, &case.schema);
        assert!(prompt.contains("single JSON object"));
        assert!(prompt.contains("reply with {}"));
    }

    #[test]
    fn test_user_prompt() {
        let chunk = Chunk {
            index: 1,
            total: 3,
            text: "COM001 Intro {url}".to_string(),
        };
        let prompt = format_user_prompt("https://example.test/catalog", &chunk);

        assert!(prompt.starts_with("Page URL: https://example.test/catalog"));
        assert!(prompt.contains("Part 2 of 3"));
        assert!(prompt.ends_with("COM001 Intro {url}"));
    }
}
