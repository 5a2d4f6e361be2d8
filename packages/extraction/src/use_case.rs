//! Built-in extraction use cases.
//!
//! A use case bundles everything that is fixed per kind of page: the
//! instruction, the schema, how the model's reply wraps records, how the result
//! file is laid out, and default knobs.

use std::time::Duration;

use crate::error::SchemaError;
use crate::schema::{ExtractionSchema, FieldType};
use crate::types::config::{BrowserOptions, CacheMode, ChunkingConfig, LlmOptions};

const COURSE_INSTRUCTION: &str = r#"Extract a list of courses from the page. For each course include:
   - Course code (e.g., COM001HH1A)
   - Course name
   - Credits (number)
   - Category/group name
   - Mandatory status (true if mandatory/"valitaan kaikki", false if optional)
   - Description (if available)

Return the data as a JSON array where each item represents a course.

Notes:
- Keep original language (Finnish/English) as found
- Convert credit strings to numbers (e.g., "5 op" -> 5)
- Mark courses as mandatory (true) if they are required"#;

const PRODUCT_INSTRUCTION: &str = "Find the product name, price and features as a list";

/// How records sit inside the model's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// A wrapping object holds records under this key.
    Keyed(String),
    /// As `Keyed`, but an object without the key is itself one record.
    KeyedOrSelf(String),
}

impl Envelope {
    pub fn key(&self) -> &str {
        match self {
            Self::Keyed(key) | Self::KeyedOrSelf(key) => key,
        }
    }
}

/// Naming of the persisted result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    /// Key under `results` holding the records, e.g. `courses`.
    pub records_key: String,
    /// Key under `metadata` holding the record count, e.g. `course_count`.
    pub count_field: String,
    /// File name prefix, e.g. `course_catalog`.
    pub file_prefix: String,
}

/// How the summary previews records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStyle {
    /// `- name (code) credits ECTS [Mandatory]`
    CourseLines,
    /// Pretty-printed JSON.
    RawJson,
}

#[derive(Debug, Clone)]
pub struct UseCase {
    pub name: String,
    pub instruction: String,
    pub schema: ExtractionSchema,
    pub envelope: Envelope,
    pub layout: BundleLayout,
    pub preview: PreviewStyle,
    pub browser: BrowserOptions,
    pub chunking: ChunkingConfig,
    pub llm: LlmOptions,
}

impl UseCase {
    /// University course catalog pages.
    pub fn course_catalog() -> Self {
        let schema = ExtractionSchema::list()
            .required_field("code", FieldType::String)
            .required_field("name", FieldType::String)
            .required_field("credits", FieldType::Number)
            .field("category", FieldType::String)
            .field("mandatory", FieldType::Boolean)
            .field("description", FieldType::String);

        Self {
            name: "course-catalog".to_string(),
            instruction: COURSE_INSTRUCTION.to_string(),
            schema,
            envelope: Envelope::Keyed("courses".to_string()),
            layout: BundleLayout {
                records_key: "courses".to_string(),
                count_field: "course_count".to_string(),
                file_prefix: "course_catalog".to_string(),
            },
            preview: PreviewStyle::CourseLines,
            browser: BrowserOptions::default()
                .with_page_timeout(Duration::from_secs(30))
                .with_overlay_removal(true)
                .with_cache_mode(CacheMode::Bypass),
            chunking: ChunkingConfig::default(),
            llm: LlmOptions {
                temperature: Some(0.1),
                max_tokens: Some(4000),
                ..LlmOptions::default()
            },
        }
    }

    /// A single e-commerce product page.
    pub fn product() -> Self {
        let schema = ExtractionSchema::single()
            .field("name", FieldType::String)
            .field("price", FieldType::String)
            .field("features", FieldType::StringArray);

        Self {
            name: "product".to_string(),
            instruction: PRODUCT_INSTRUCTION.to_string(),
            schema,
            envelope: Envelope::KeyedOrSelf("products".to_string()),
            layout: BundleLayout {
                records_key: "products".to_string(),
                count_field: "product_count".to_string(),
                file_prefix: "product".to_string(),
            },
            preview: PreviewStyle::RawJson,
            browser: BrowserOptions::default().with_overlay_removal(true),
            chunking: ChunkingConfig::default(),
            llm: LlmOptions::default(),
        }
    }

    /// A caller-supplied schema document and instruction.
    pub fn custom(
        instruction: impl Into<String>,
        schema_document: &serde_json::Value,
        records_key: impl Into<String>,
        file_prefix: impl Into<String>,
    ) -> Result<Self, SchemaError> {
        let schema = ExtractionSchema::from_json(schema_document)?;
        let records_key = records_key.into();
        let count_field = format!("{}_count", singular(&records_key));

        Ok(Self {
            name: "custom".to_string(),
            instruction: instruction.into(),
            schema,
            envelope: Envelope::KeyedOrSelf(records_key.clone()),
            layout: BundleLayout {
                records_key,
                count_field,
                file_prefix: file_prefix.into(),
            },
            preview: PreviewStyle::RawJson,
            browser: BrowserOptions::default().with_overlay_removal(true),
            chunking: ChunkingConfig::default(),
            llm: LlmOptions::default(),
        })
    }
}

fn singular(key: &str) -> &str {
    key.strip_suffix('s').filter(|s| !s.is_empty()).unwrap_or(key)
}
