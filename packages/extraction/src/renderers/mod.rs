//! Renderer implementations.
//!
//! - [`HttpRenderer`]: plain HTTP GET, no script execution
//! - [`ChromiumRenderer`]: headless Chromium (feature `browser`)

#[cfg(feature = "browser")]
pub mod chromium;
pub mod html;
pub mod http;

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;
pub use html::{html_to_text, PageText};
pub use http::HttpRenderer;
