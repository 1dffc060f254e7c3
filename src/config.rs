//! Configuration for the conversion pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built
//! via its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across requests, log it, and diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults
//! for the rest; adding a field never breaks existing call sites.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};

/// Configuration for a document conversion.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2tree::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_attempts(2)
///     .temperature(0.0)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// File extensions accepted by input validation. Default: `["docx"]`.
    ///
    /// The pipeline supports exactly one structured office format; the list
    /// exists so tests can exercise the rejection path without inventing
    /// fake extensions.
    pub allowed_extensions: Vec<String>,

    /// Total conversion attempts against the generative model. Default: 3.
    ///
    /// Counts attempts, not retries: 3 means one initial call plus up to
    /// two more after parse failures. Only the final attempt's failure is
    /// surfaced.
    pub max_attempts: u32,

    /// Fixed delay between conversion attempts in milliseconds. Default: 0.
    ///
    /// Parse failures are not load-induced, so waiting between attempts
    /// buys nothing by default. Raise this if the model endpoint itself
    /// rate-limits repeated calls.
    pub retry_backoff_ms: u64,

    /// Sampling temperature for the generative call. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to the source HTML, which
    /// is what a transcription task wants. Higher values increase the rate
    /// of invented structure and parse failures.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 8192.
    ///
    /// Dense documents produce large trees; setting this too low truncates
    /// the JSON mid-object and burns a retry attempt.
    pub max_tokens: usize,

    /// Maximum HTML characters sent to the model. Default: 60 000.
    ///
    /// Longer documents are cut at this boundary with an explicit
    /// truncation marker so the model knows content is missing rather than
    /// silently ending mid-sentence.
    pub max_html_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["docx".to_string()],
            max_attempts: 3,
            retry_backoff_ms: 0,
            temperature: 0.1,
            max_tokens: 8192,
            max_html_len: 60_000,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `extension` (without the dot, any case) is accepted.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let ext = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| e == &ext)
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn allowed_extensions(mut self, exts: Vec<String>) -> Self {
        self.config.allowed_extensions =
            exts.into_iter().map(|e| e.to_ascii_lowercase()).collect();
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n.max(1);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_html_len(mut self, n: usize) -> Self {
        self.config.max_html_len = n.max(100);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ConvertError> {
        let c = &self.config;
        if c.allowed_extensions.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "At least one allowed extension is required".into(),
            ));
        }
        if c.max_attempts == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_attempts must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = PipelineConfig::default();
        assert_eq!(c.allowed_extensions, vec!["docx"]);
        assert_eq!(c.max_attempts, 3);
        assert_eq!(c.retry_backoff_ms, 0);
        assert_eq!(c.max_html_len, 60_000);
    }

    #[test]
    fn accepts_extension_is_case_insensitive() {
        let c = PipelineConfig::default();
        assert!(c.accepts_extension("docx"));
        assert!(c.accepts_extension("DOCX"));
        assert!(!c.accepts_extension("pdf"));
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = PipelineConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_extension_list() {
        let result = PipelineConfig::builder()
            .allowed_extensions(vec![])
            .build();
        assert!(matches!(result, Err(ConvertError::InvalidConfig(_))));
    }

    #[test]
    fn max_attempts_floor_is_one() {
        let c = PipelineConfig::builder().max_attempts(0).build().unwrap();
        assert_eq!(c.max_attempts, 1);
    }
}
