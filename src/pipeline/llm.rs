//! Structural conversion: HTML → node tree via the generative model.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching retry or
//! parse-repair logic here.
//!
//! ## Retry Strategy
//!
//! Generative output is non-deterministic: a response that is not valid
//! JSON on one attempt often is on the next, with identical inputs. The
//! budget is a fixed total attempt count (default 3) with no backoff —
//! parse failures are not load-induced, so waiting between attempts buys
//! nothing. Only the final attempt's failure is surfaced, wrapped in the
//! generic [`ConvertError::ConversionFailed`]; the raw diagnostic goes to
//! operator logs.

use crate::collaborators::{SamplingOptions, TextModel};
use crate::config::PipelineConfig;
use crate::document::Node;
use crate::error::ConvertError;
use crate::prompts::{build_user_prompt, SYSTEM_PROMPT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Matches a whole response wrapped in a code fence, with or without a
/// language tag. Models emit ```json, ```javascript, or bare ``` fences
/// despite being told not to; the inner capture is the payload.
static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\s*\n(.*)\n```\s*$").expect("valid regex"));

/// Convert extracted HTML into a structured node tree.
///
/// One request is built once and re-sent unchanged on every attempt; both
/// model-call failures and parse failures consume an attempt.
pub async fn convert(
    model: &dyn TextModel,
    html: &str,
    image_count: usize,
    config: &PipelineConfig,
) -> Result<Vec<Node>, ConvertError> {
    let prompt = build_user_prompt(html, image_count, config.max_html_len);
    let options = SamplingOptions {
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let mut last_err = String::from("no attempts made");

    for attempt in 1..=config.max_attempts {
        if attempt > 1 {
            warn!(
                "Conversion attempt {}/{} after failure: {}",
                attempt, config.max_attempts, last_err
            );
            if config.retry_backoff_ms > 0 {
                sleep(Duration::from_millis(config.retry_backoff_ms)).await;
            }
        }

        match model.generate(SYSTEM_PROMPT, &prompt, &options).await {
            Ok(response) => {
                let body = strip_code_fence(&response);
                match parse_tree(body) {
                    Ok(tree) => {
                        debug!(
                            "Conversion succeeded on attempt {} ({} top-level nodes)",
                            attempt,
                            tree.len()
                        );
                        return Ok(tree);
                    }
                    Err(e) => {
                        last_err = format!("response not parseable as a node tree: {e}");
                    }
                }
            }
            Err(e) => {
                last_err = format!("model call failed: {e}");
            }
        }
    }

    Err(ConvertError::ConversionFailed {
        attempts: config.max_attempts,
        detail: last_err,
    })
}

/// Strip an optional enclosing code fence, agnostic to language tag.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    match RE_OUTER_FENCE.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    }
}

#[derive(Deserialize)]
struct DocEnvelope {
    content: Vec<Node>,
}

/// Parse the fence-stripped response into a node tree.
///
/// Accepts the requested shape (a top-level JSON array of nodes) and the
/// common deviation where the model wraps the array in a
/// `{"type":"doc","content":[...]}` envelope.
pub fn parse_tree(body: &str) -> Result<Vec<Node>, serde_json::Error> {
    match serde_json::from_str::<Vec<Node>>(body) {
        Ok(tree) => Ok(tree),
        Err(array_err) => match serde_json::from_str::<DocEnvelope>(body) {
            Ok(envelope) => Ok(envelope.content),
            // The array error is the one worth reporting: the envelope is
            // a fallback shape.
            Err(_) => Err(array_err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Model fake that replays a fixed script of responses.
    struct ScriptedModel {
        responses: Vec<Result<String, String>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(
            &self,
            _system: &str,
            _prompt: &str,
            _options: &SamplingOptions,
        ) -> Result<String, CollaboratorError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            let slot = self.responses.get(i).cloned().unwrap_or_else(|| {
                self.responses.last().cloned().expect("non-empty script")
            });
            slot.map_err(|e| -> CollaboratorError { e.into() })
        }
    }

    const PARAGRAPH_JSON: &str =
        r#"[{"type":"paragraph","content":[{"type":"text","text":"hi"}]}]"#;

    #[test]
    fn strips_fence_with_language_tag() {
        let fenced = format!("```json\n{PARAGRAPH_JSON}\n```");
        assert_eq!(strip_code_fence(&fenced), PARAGRAPH_JSON);
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("```\n{PARAGRAPH_JSON}\n```\n");
        assert_eq!(strip_code_fence(&fenced), PARAGRAPH_JSON);
    }

    #[test]
    fn unfenced_response_passes_through() {
        assert_eq!(strip_code_fence(PARAGRAPH_JSON), PARAGRAPH_JSON);
    }

    #[test]
    fn parses_doc_envelope_fallback() {
        let body = format!(r#"{{"type":"doc","content":{PARAGRAPH_JSON}}}"#);
        let tree = parse_tree(&body).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[tokio::test]
    async fn succeeds_first_attempt() {
        let model = ScriptedModel::new(vec![Ok(PARAGRAPH_JSON.into())]);
        let tree = convert(&model, "<p>hi</p>", 0, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn retries_on_parse_failure_then_succeeds() {
        let model = ScriptedModel::new(vec![
            Ok("I cannot convert this document.".into()),
            Ok(format!("```json\n{PARAGRAPH_JSON}\n```")),
        ]);
        let tree = convert(&model, "<p>hi</p>", 0, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_generic_error() {
        let model = ScriptedModel::new(vec![Ok("not json at all".into())]);
        let err = convert(&model, "<p>hi</p>", 0, &PipelineConfig::default())
            .await
            .unwrap_err();

        assert_eq!(model.call_count(), 3);
        match &err {
            ConvertError::ConversionFailed { attempts, detail } => {
                assert_eq!(*attempts, 3);
                assert!(detail.contains("not parseable"));
            }
            other => panic!("expected ConversionFailed, got {other:?}"),
        }
        // Caller-facing message never carries the parse diagnostic.
        assert!(!err.user_message().contains("parseable"));
    }

    #[tokio::test]
    async fn model_call_failures_also_consume_attempts() {
        let model = ScriptedModel::new(vec![
            Err("connection reset".into()),
            Ok(PARAGRAPH_JSON.into()),
        ]);
        let tree = convert(&model, "<p>hi</p>", 0, &PipelineConfig::default())
            .await
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(model.call_count(), 2);
    }
}
