//! End-to-end tests of a scrape run with mock collaborators.

use std::fs;
use std::path::Path;

use chrono::{Local, TimeZone};
use extraction::{
    normalize_text, write_summary, ErrorKind, ExtractionRequest, MockExtractor, MockRenderer,
    RenderedPage, RequestBuilder, ResultBundle, RunReport, ScrapeError, Scraper, UseCase,
    API_KEY_ENV,
};
use serde_json::{json, Value};

const CATALOG_URL: &str = "https://example.test/catalog";

fn catalog_page() -> RenderedPage {
    RenderedPage::new(
        CATALOG_URL,
        "# Tradenomi, tietojenkäsittely\n\nCOM001 Intro to Programming 5 op valitaan kaikki",
    )
    .with_status(200)
}

fn catalog_request() -> ExtractionRequest {
    ExtractionRequest::builder(CATALOG_URL, UseCase::course_catalog())
        .api_token(Some("sk-test".to_string()))
        .build_with(|_| None)
        .unwrap()
}

fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn bare_array_yields_records_in_order() {
    let case = UseCase::course_catalog();
    let text = r#"[
        {"code":"COM001","name":"Intro to Programming","credits":5},
        {"code":"COM002","name":"Databases","credits":5},
        {"code":"COM003","name":"Web Development","credits":10}
    ]"#;

    let records = normalize_text(text, &case.envelope).unwrap();

    let codes: Vec<&str> = records.iter().map(|r| r["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["COM001", "COM002", "COM003"]);
}

#[test]
fn wrapped_object_and_missing_key() {
    let case = UseCase::course_catalog();

    let wrapped = r#"{"courses":[{"code":"A"},{"code":"B"}]}"#;
    assert_eq!(normalize_text(wrapped, &case.envelope).unwrap().len(), 2);

    let unrelated = r#"{"programme":"TRATI22"}"#;
    assert!(normalize_text(unrelated, &case.envelope).unwrap().is_empty());
}

#[test]
fn persistence_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let case = UseCase::course_catalog();
    let records = normalize_text(
        r#"[{"code":"COM001","name":"Ohjelmoinnin perusteet","credits":5,"mandatory":true},
            {"code":"SWD4TF021","name":"Ohjelmistoprojekti","credits":10,"mandatory":false}]"#,
        &case.envelope,
    )
    .unwrap();
    let now = Local.with_ymd_and_hms(2024, 3, 14, 9, 26, 53).unwrap();

    let bundle = ResultBundle::new(CATALOG_URL, records.clone(), case.layout.clone(), now);
    let path = extraction::write_bundle(dir.path(), &bundle).unwrap();

    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "course_catalog_20240314_092653.json"
    );
    let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["metadata"]["course_count"], json!(records.len()));
    assert_eq!(value["metadata"]["url"], json!(CATALOG_URL));
    assert_eq!(value["metadata"]["timestamp"], json!("20240314_092653"));
    assert_eq!(
        value["results"]["courses"],
        Value::Array(records.into_iter().map(Value::Object).collect())
    );
}

/// Build the request and, if that succeeds, run it, as the CLI does.
async fn build_and_run(
    builder: RequestBuilder,
    renderer: MockRenderer,
    extractor: MockExtractor,
    out: &Path,
) -> Result<RunReport, ScrapeError> {
    let request = builder.build_with(|key| {
        assert_eq!(key, API_KEY_ENV);
        None
    })?;
    Scraper::new(renderer, extractor)
        .with_output_dir(out)
        .run(&request)
        .await
}

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let renderer = MockRenderer::new().with_page(catalog_page());
    let extractor = MockExtractor::new();

    let err = build_and_run(
        ExtractionRequest::builder(CATALOG_URL, UseCase::course_catalog()),
        renderer.clone(),
        extractor.clone(),
        &out,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains(API_KEY_ENV));
    assert_eq!(renderer.open_count(), 0);
    assert_eq!(extractor.call_count(), 0);
    assert!(files_in(&out).is_empty());
}

#[tokio::test]
async fn unknown_provider_without_base_url_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let renderer = MockRenderer::new().with_page(catalog_page());
    let extractor = MockExtractor::new();

    let err = build_and_run(
        ExtractionRequest::builder(CATALOG_URL, UseCase::course_catalog())
            .api_token(Some("sk-test".to_string()))
            .provider("acme/model-1"),
        renderer.clone(),
        extractor.clone(),
        &out,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("acme"));
    assert_eq!(renderer.open_count(), 0);
    assert_eq!(extractor.call_count(), 0);
    assert!(files_in(&out).is_empty());
}

#[tokio::test]
async fn unknown_provider_with_base_url_runs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let renderer = MockRenderer::new().with_page(catalog_page());
    let extractor = MockExtractor::new().with_reply(r#"[{"code":"COM001"}]"#);

    let report = build_and_run(
        ExtractionRequest::builder(CATALOG_URL, UseCase::course_catalog())
            .api_token(Some("sk-test".to_string()))
            .provider("acme/model-1")
            .base_url(Some("http://127.0.0.1:8080/v1".to_string())),
        renderer.clone(),
        extractor.clone(),
        &out,
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(renderer.open_count(), 1);
    assert_eq!(extractor.call_count(), 1);
}

#[tokio::test]
async fn extractor_config_error_surfaces_as_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let extractor = MockExtractor::new().with_config_error("no base URL known for provider 'acme'");

    let err = Scraper::new(MockRenderer::new().with_page(catalog_page()), extractor)
        .with_output_dir(&out)
        .run(&catalog_request())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(files_in(&out).is_empty());
}

#[tokio::test]
async fn blank_credential_counts_as_missing() {
    let err = ExtractionRequest::builder(CATALOG_URL, UseCase::course_catalog())
        .api_token(Some("   ".to_string()))
        .build_with(|_| Some(String::new()))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn fetch_failure_reports_message_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let renderer = MockRenderer::new().with_error("timeout");
    let handle = renderer.clone();
    let scraper = Scraper::new(renderer, MockExtractor::new()).with_output_dir(&out);

    let err = scraper.run(&catalog_request()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fetch);
    let mut console = Vec::new();
    extraction::write_error(&mut console, &err.to_string()).unwrap();
    let console = String::from_utf8(console).unwrap();
    assert!(console.starts_with("Error: "));
    assert!(console.contains("timeout"));

    assert!(files_in(&out).is_empty());
    assert_eq!(scraper.extractor().call_count(), 0);
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn end_to_end_course_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let extractor = MockExtractor::new().with_reply(
        r#"[{"code":"COM001","name":"Intro to Programming","credits":5,"mandatory":true}]"#,
    );
    let scraper =
        Scraper::new(MockRenderer::new().with_page(catalog_page()), extractor).with_output_dir(&out);
    let request = catalog_request();

    let report = scraper.run(&request).await.unwrap();

    // one file, shaped as a result bundle
    let files = files_in(&out);
    assert_eq!(files, vec![report.output_path.clone()]);
    let value: Value = serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(value["results"]["courses"].as_array().unwrap().len(), 1);
    assert_eq!(value["metadata"]["course_count"], 1);
    assert_eq!(value["metadata"]["url"], CATALOG_URL);

    // the renderer saw the catalog options
    let seen = scraper.renderer().seen_options();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].remove_overlays);
    assert!(seen[0].bypass_cache());
    assert_eq!(seen[0].page_timeout.as_millis(), 30_000);

    // the model got the course instruction and the page text
    let calls = scraper.extractor().calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].instruction.contains("Extract a list of courses"));
    assert!(calls[0].text.contains("COM001 Intro to Programming 5 op"));

    let mut console = Vec::new();
    report.write_summary(&mut console, request.use_case()).unwrap();
    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("Total courses: 1"));
    assert!(console.contains("Intro to Programming (COM001) 5 ECTS [Mandatory]"));
}

#[tokio::test]
async fn product_single_object_becomes_one_record() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = MockExtractor::new().with_reply(
        r#"{"name":"Handball Spezial Shoes","price":"$100","features":["Suede upper","Gum rubber outsole"]}"#,
    );
    let scraper = Scraper::new(
        MockRenderer::new().with_page(RenderedPage::new("https://shop.test/p", "Handball Spezial")),
        extractor,
    )
    .with_output_dir(dir.path());
    let request = ExtractionRequest::builder("https://shop.test/p", UseCase::product())
        .api_token(Some("sk-test".to_string()))
        .build_with(|_| None)
        .unwrap();

    let report = scraper.run(&request).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let name = report.output_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("product_"));
    let value: Value =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(value["metadata"]["product_count"], 1);
    assert_eq!(value["results"]["products"][0]["features"][1], "Gum rubber outsole");

    let mut console = Vec::new();
    write_summary(
        &mut console,
        &report.records,
        &request.use_case().layout.records_key,
        request.use_case().preview,
    )
    .unwrap();
    assert!(String::from_utf8(console).unwrap().contains("\"price\": \"$100\""));
}

#[tokio::test]
async fn custom_schema_run() {
    let dir = tempfile::tempdir().unwrap();
    let schema = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "date": {"type": "string"}
            },
            "required": ["title"]
        }
    });
    let case = UseCase::custom("List the events", &schema, "events", "events").unwrap();
    let request = ExtractionRequest::builder("https://events.test", case)
        .api_token(Some("sk-test".to_string()))
        .build_with(|_| None)
        .unwrap();
    let scraper = Scraper::new(
        MockRenderer::new().with_page(RenderedPage::new("https://events.test", "Spring fair May 1")),
        MockExtractor::new().with_reply(r#"{"events":[{"title":"Spring fair","date":"May 1"}]}"#),
    )
    .with_output_dir(dir.path());

    let report = scraper.run(&request).await.unwrap();

    let value: Value =
        serde_json::from_str(&fs::read_to_string(&report.output_path).unwrap()).unwrap();
    assert_eq!(value["metadata"]["event_count"], 1);
    assert_eq!(value["results"]["events"][0]["title"], "Spring fair");
}
