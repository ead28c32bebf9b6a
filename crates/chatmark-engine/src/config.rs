//! Write-once pipeline configuration.
//!
//! Scheme registration happens once, at start-up, by building a
//! [`PipelineConfig`]; the compiled scanner lives inside it and is shared by
//! reference for the life of the process.

use crate::error::PipelineError;
use crate::scan::url::{DEFAULT_PEAR_SCHEME, UrlScanner};

/// Scheme of mention links. Always registered.
pub const MENTION_SCHEME: &str = "mention";

/// Blockquote nesting kept by the receive pipeline.
pub const DEFAULT_QUOTE_DEPTH: usize = 1;

/// Largest message, in bytes, either pipeline will process.
pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024;

/// Extra link schemes the product registers out of the box.
pub const DEFAULT_CUSTOM_SCHEMES: &[&str] = &["holepunch", "punch"];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pear_scheme: String,
    schemes: Vec<String>,
    quote_depth: usize,
    max_input_len: usize,
    scanner: UrlScanner,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn pear_scheme(&self) -> &str {
        &self.pear_scheme
    }

    /// Every registered custom scheme, including `mention` and the pear scheme.
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    pub fn quote_depth(&self) -> usize {
        self.quote_depth
    }

    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    pub fn scanner(&self) -> &UrlScanner {
        &self.scanner
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let schemes: Vec<String> = DEFAULT_CUSTOM_SCHEMES
            .iter()
            .chain([MENTION_SCHEME, DEFAULT_PEAR_SCHEME].iter())
            .map(|s| s.to_string())
            .collect();
        Self {
            pear_scheme: DEFAULT_PEAR_SCHEME.to_string(),
            scanner: UrlScanner::new(&schemes, DEFAULT_PEAR_SCHEME),
            schemes,
            quote_depth: DEFAULT_QUOTE_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    pear_scheme: String,
    custom_schemes: Vec<String>,
    quote_depth: usize,
    max_input_len: usize,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            pear_scheme: DEFAULT_PEAR_SCHEME.to_string(),
            custom_schemes: DEFAULT_CUSTOM_SCHEMES.iter().map(|s| s.to_string()).collect(),
            quote_depth: DEFAULT_QUOTE_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl PipelineConfigBuilder {
    pub fn pear_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.pear_scheme = scheme.into();
        self
    }

    /// Adds a custom scheme on top of the defaults.
    pub fn custom_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.custom_schemes.push(scheme.into());
        self
    }

    /// Replaces the custom scheme list. `mention` and the pear scheme are
    /// registered regardless.
    pub fn custom_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// `0` strips quote markers entirely.
    pub fn quote_depth(mut self, depth: usize) -> Self {
        self.quote_depth = depth;
        self
    }

    pub fn max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let pear_scheme = normalize_scheme(&self.pear_scheme)?;
        let mut schemes: Vec<String> = Vec::with_capacity(self.custom_schemes.len() + 2);
        for raw in self
            .custom_schemes
            .iter()
            .map(String::as_str)
            .chain([MENTION_SCHEME, pear_scheme.as_str()])
        {
            let scheme = normalize_scheme(raw)?;
            if !schemes.contains(&scheme) {
                schemes.push(scheme);
            }
        }
        let scanner = UrlScanner::new(&schemes, &pear_scheme);
        log::debug!(
            "pipeline config: pear scheme {pear_scheme}, schemes {schemes:?}, quote depth {}",
            self.quote_depth
        );
        Ok(PipelineConfig {
            pear_scheme,
            schemes,
            quote_depth: self.quote_depth,
            max_input_len: self.max_input_len,
            scanner,
        })
    }
}

/// Lower-cases a scheme and checks it against `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
/// A trailing `://` or `:` is tolerated.
fn normalize_scheme(raw: &str) -> Result<String, PipelineError> {
    let trimmed = raw
        .trim()
        .trim_end_matches("://")
        .trim_end_matches(':')
        .to_ascii_lowercase();
    let mut chars = trimmed.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        Ok(trimmed)
    } else {
        Err(PipelineError::InvalidScheme(raw.to_string()))
    }
}
