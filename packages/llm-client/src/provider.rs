//! Provider strings of the form `provider/model`.

use std::fmt;
use std::str::FromStr;

use crate::error::LlmError;

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A parsed `provider/model` identifier, e.g. `deepseek/deepseek-chat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub model: String,
}

impl Provider {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }

    /// Default chat endpoint for known providers.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self.name.as_str() {
            "deepseek" => Some(DEEPSEEK_BASE_URL),
            "openai" => Some(OPENAI_BASE_URL),
            _ => None,
        }
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((name, model)) if !name.trim().is_empty() && !model.trim().is_empty() => {
                Ok(Self::new(name.trim(), model.trim()))
            }
            _ => Err(LlmError::Config(format!(
                "provider must look like 'provider/model', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider() {
        let provider: Provider = "deepseek/deepseek-chat".parse().unwrap();
        assert_eq!(provider.name, "deepseek");
        assert_eq!(provider.model, "deepseek-chat");
        assert_eq!(provider.default_base_url(), Some(DEEPSEEK_BASE_URL));
        assert_eq!(provider.to_string(), "deepseek/deepseek-chat");
    }

    #[test]
    fn test_model_may_contain_slash() {
        let provider: Provider = "openrouter/meta/llama-3".parse().unwrap();
        assert_eq!(provider.name, "openrouter");
        assert_eq!(provider.model, "meta/llama-3");
        assert_eq!(provider.default_base_url(), None);
    }

    #[test]
    fn test_rejects_bare_model() {
        assert!("deepseek-chat".parse::<Provider>().is_err());
        assert!("/model".parse::<Provider>().is_err());
    }
}
