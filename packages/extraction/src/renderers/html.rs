//! HTML → readable text for the model.
//!
//! Scripts, styles and other non-content elements are always removed.
//! Overlays (modals, cookie banners, popups) are removed on request. What is
//! left is converted to Markdown.

use regex::Regex;
use scraper::{Html, Selector};

/// Elements that never carry page content.
const NON_CONTENT: &[&str] = &["script", "style", "noscript", "template", "iframe", "svg"];

/// Elements that typically cover the page content.
const OVERLAYS: &[&str] = &[
    "dialog",
    "[aria-modal='true']",
    "[role='dialog']",
    "[role='alertdialog']",
    "[class*='modal']",
    "[class*='overlay']",
    "[class*='popup']",
    "[class*='cookie']",
    "[class*='consent']",
    "[id*='modal']",
    "[id*='overlay']",
    "[id*='popup']",
    "[id*='cookie']",
    "[id*='consent']",
];

/// Title and body text of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
}

/// Convert a rendered HTML document to Markdown-ish text.
pub fn html_to_text(html: &str, remove_overlays: bool) -> PageText {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let body_html = match Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
    {
        Some(body) => body.html(),
        None => document.root_element().html(),
    };
    let cleaned = remove_elements(&document, body_html, remove_overlays);

    let markdown = htmd::convert(&cleaned).unwrap_or_else(|_| {
        Html::parse_fragment(&cleaned)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join("\n")
    });

    PageText {
        title,
        text: tidy_whitespace(&markdown),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;
    document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Cut unwanted elements out of `html`, which must be serialized from `document`.
fn remove_elements(document: &Html, mut html: String, remove_overlays: bool) -> String {
    let mut unwanted: Vec<&str> = NON_CONTENT.to_vec();
    if remove_overlays {
        unwanted.extend_from_slice(OVERLAYS);
    }

    // one selector group so matches come back in document order, outer before inner
    let Ok(selector) = Selector::parse(&unwanted.join(", ")) else {
        return html;
    };
    for element in document.select(&selector) {
        let element_html = element.html();
        if html.contains(&element_html) {
            html = html.replacen(&element_html, "", 1);
        }
    }
    html
}

fn tidy_whitespace(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    match Regex::new(r"\n{3,}") {
        Ok(blank_runs) => blank_runs.replace_all(&joined, "\n\n").trim().to_string(),
        Err(_) => joined.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"<!DOCTYPE html>
<html>
<head><title> Opinto-opas </title><style>body { color: red }</style></head>
<body>
  <h1>Courses</h1>
  <div class="cookie-consent"><p>Accept cookies to continue</p></div>
  <ul>
    <li>COM001 Intro to Programming 5 op</li>
    <li>COM002 Databases 5 op</li>
  </ul>
  <script>window.tracking = "tracking-id";</script>
  <div role="dialog"><p>Subscribe to our newsletter</p></div>
</body>
</html>"#;

    #[test]
    fn test_extracts_title_and_content() {
        let page = html_to_text(CATALOG, true);

        assert_eq!(page.title.as_deref(), Some("Opinto-opas"));
        assert!(page.text.contains("Courses"));
        assert!(page.text.contains("COM001 Intro to Programming 5 op"));
        assert!(page.text.contains("COM002 Databases 5 op"));
    }

    #[test]
    fn test_scripts_and_styles_always_removed() {
        let page = html_to_text(CATALOG, false);
        assert!(!page.text.contains("tracking-id"));
        assert!(!page.text.contains("color: red"));
    }

    #[test]
    fn test_overlays_removed_on_request() {
        let removed = html_to_text(CATALOG, true);
        assert!(!removed.text.contains("Accept cookies"));
        assert!(!removed.text.contains("newsletter"));

        let kept = html_to_text(CATALOG, false);
        assert!(kept.text.contains("Accept cookies"));
        assert!(kept.text.contains("newsletter"));
    }

    #[test]
    fn test_no_title() {
        let page = html_to_text("<p>Just text</p>", false);
        assert_eq!(page.title, None);
        assert_eq!(page.text, "Just text");
    }

    #[test]
    fn test_tidy_whitespace() {
        assert_eq!(tidy_whitespace("a  \n\n\n\nb\n"), "a\n\nb");
    }
}
