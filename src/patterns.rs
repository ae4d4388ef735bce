use regex::Regex;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

use crate::config::PatternConfig;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regex for `patterns.{key}`: {source}")]
    Invalid {
        key: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("`patterns.{key}` must contain a capture group for the extracted name")]
    MissingCaptureGroup { key: &'static str },
}

/// The four compiled patterns driving classification and extraction.
///
/// Built once per run from the configuration; a bad pattern fails here,
/// before any URL is looked at.
#[derive(Debug, Clone)]
pub struct PatternSet {
    category: Regex,
    product: Regex,
    category_name: Regex,
    manufacturer: Regex,
}

impl PatternSet {
    pub fn compile(config: &PatternConfig) -> Result<Self, PatternError> {
        let start_time = Instant::now();
        info!(
            action = "start",
            component = "pattern_compile",
            "Compiling URL patterns"
        );

        let set = Self {
            category: compile_one("category", &config.category)?,
            product: compile_one("product", &config.product)?,
            category_name: compile_extractor("category_name", &config.category_name)?,
            manufacturer: compile_extractor("manufacturer", &config.manufacturer)?,
        };

        info!(
            action = "complete",
            component = "pattern_compile",
            duration_ms = start_time.elapsed().as_millis(),
            "Successfully compiled patterns"
        );
        Ok(set)
    }

    pub fn is_category(&self, url: &str) -> bool {
        self.category.is_match(url)
    }

    pub fn is_product(&self, url: &str) -> bool {
        self.product.is_match(url)
    }

    pub fn category_name<'u>(&self, url: &'u str) -> Option<&'u str> {
        first_group(&self.category_name, url)
    }

    pub fn manufacturer<'u>(&self, url: &'u str) -> Option<&'u str> {
        first_group(&self.manufacturer, url)
    }
}

fn compile_one(key: &'static str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::Invalid { key, source })
}

fn compile_extractor(key: &'static str, pattern: &str) -> Result<Regex, PatternError> {
    let regex = compile_one(key, pattern)?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() < 2 {
        return Err(PatternError::MissingCaptureGroup { key });
    }
    Ok(regex)
}

fn first_group<'u>(regex: &Regex, url: &'u str) -> Option<&'u str> {
    regex
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
}
