use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PARAM_PATTERN: &str = "[^/]+";

/// Configuration accepted at router construction time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouterOptions {
    /// When `false` (the default), a request path ending in `/` also
    /// matches a pattern that did not end in `/`. A pattern that does
    /// end in `/` always requires the request to end in `/` too.
    pub strict_slashes: bool,
    /// The implicit character class applied to a parameter that
    /// carries no explicit regex constraint.
    pub default_param_pattern: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            strict_slashes: false,
            default_param_pattern: DEFAULT_PARAM_PATTERN.to_string(),
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }
}

#[derive(Default)]
pub struct RouterOptionsBuilder {
    strict_slashes: Option<bool>,
    default_param_pattern: Option<String>,
}

impl RouterOptionsBuilder {
    pub fn strict_slashes(mut self, value: bool) -> Self {
        self.strict_slashes = Some(value);
        self
    }

    pub fn default_param_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.default_param_pattern = Some(pattern.into());
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterOptionsError> {
        let default_param_pattern = self
            .default_param_pattern
            .unwrap_or_else(|| DEFAULT_PARAM_PATTERN.to_string());

        Regex::new(&default_param_pattern).map_err(|error| {
            RouterOptionsError::InvalidDefaultParamPattern {
                pattern: default_param_pattern.clone(),
                error: error.to_string(),
            }
        })?;

        Ok(RouterOptions {
            strict_slashes: self.strict_slashes.unwrap_or(false),
            default_param_pattern,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterOptionsError {
    #[error("default parameter pattern {pattern:?} is not a valid regex: {error}")]
    InvalidDefaultParamPattern { pattern: String, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let options = RouterOptions::default();
        assert!(!options.strict_slashes);
        assert_eq!(options.default_param_pattern, "[^/]+");
    }

    #[test]
    fn invalid_default_pattern_is_rejected_at_build_time() {
        let err = RouterOptions::builder()
            .default_param_pattern("[")
            .build()
            .unwrap_err();
        assert!(matches!(err, RouterOptionsError::InvalidDefaultParamPattern { .. }));
    }
}
