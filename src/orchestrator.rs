//! Pipeline orchestration: one request, one linear state machine.
//!
//! The orchestrator owns the ordered execution of the stages, maps each
//! stage boundary to a progress event, and guarantees the event contract:
//! exactly one terminal frame per request, no progress frame before input
//! validation passes, monotonically increasing percentages, and nothing
//! written after the terminal frame.
//!
//! ## Stage order
//!
//! ```text
//! Validating-Input → Extracting → Uploading-Assets → Converting
//!                  → Resolving-Placeholders → Validating-Output → Completed
//! ```
//!
//! `Failed` is reachable from every state except Uploading-Assets, whose
//! per-image failures are absorbed inside the uploader. The Uploading
//! stage is skipped entirely — no event — when the document has no images.
//!
//! ## Failure policy
//!
//! Already-uploaded images are NOT deleted when conversion or validation
//! fails afterwards. That is a deliberate best-effort, no-compensation
//! choice: orphaned assets are cheap, and a delete pass would add a second
//! failure domain to every error path. Hosts that care can sweep storage
//! using [`crate::collaborators::StorageProvider::delete`].

use crate::collaborators::{DocumentParser, OwnerContext, StorageProvider, TextModel};
use crate::config::PipelineConfig;
use crate::document::FinalDocument;
use crate::error::ConvertError;
use crate::events::{EventFrame, EventSink};
use crate::pipeline::{extract, llm, resolve, upload, validate};
use crate::pipeline::validate::{DefaultSchemaValidator, SchemaValidator};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, warn};

/// One conversion request: a single uploaded file plus its owner.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Original filename as supplied by the caller; its extension is the
    /// only format signal the pipeline trusts before parsing.
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Owner identity passed through to the storage collaborator.
    pub owner: OwnerContext,
}

/// The conversion pipeline, holding its collaborators and configuration.
///
/// Cheap to clone per request via the shared `Arc`s; no state is carried
/// between runs.
#[derive(Clone)]
pub struct Pipeline {
    parser: Arc<dyn DocumentParser>,
    storage: Arc<dyn StorageProvider>,
    model: Arc<dyn TextModel>,
    validator: Arc<dyn SchemaValidator>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline with the built-in schema validator.
    pub fn new(
        parser: Arc<dyn DocumentParser>,
        storage: Arc<dyn StorageProvider>,
        model: Arc<dyn TextModel>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            parser,
            storage,
            model,
            validator: Arc::new(DefaultSchemaValidator),
            config,
        }
    }

    /// Replace the schema validator (e.g. with a host's schema engine).
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Run one conversion, writing every event to `sink`.
    ///
    /// Infallible from the caller's perspective: every outcome, including
    /// a panic inside a stage or collaborator, ends with exactly one
    /// terminal frame on the sink.
    pub async fn run(&self, request: ConversionRequest, sink: &dyn EventSink) {
        let outcome = AssertUnwindSafe(self.execute(request, sink))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic with non-string payload".to_string());
                Err(ConvertError::Internal(detail))
            });

        match outcome {
            Ok(document) => {
                info!("Conversion complete: {} assets", document.assets.len());
                sink.send(EventFrame::complete(document)).await;
            }
            Err(e) => {
                // Operator detail stays in the log; the frame carries only
                // the user-facing message.
                match &e {
                    ConvertError::ExtractionFailed { detail } => {
                        warn!("Extraction failed: {detail}")
                    }
                    ConvertError::ConversionFailed { attempts, detail } => {
                        warn!("Conversion failed after {attempts} attempts: {detail}")
                    }
                    ConvertError::ValidationFailed { detail } => {
                        warn!("Validation rejected document: {detail}")
                    }
                    ConvertError::Internal(detail) => warn!("Internal error: {detail}"),
                    other => warn!("Conversion failed: {other}"),
                }
                sink.send(EventFrame::error(e.user_message())).await;
            }
        }
    }

    /// The stage sequence proper. Returns instead of emitting terminal
    /// frames so [`run`](Self::run) is the single place that writes them.
    async fn execute(
        &self,
        request: ConversionRequest,
        sink: &dyn EventSink,
    ) -> Result<FinalDocument, ConvertError> {
        // ── Validating-Input ────────────────────────────────────────────
        // No progress frame precedes this check.
        validate_input(&request, &self.config)?;

        // ── Extracting ──────────────────────────────────────────────────
        sink.send(EventFrame::progress(
            "extracting",
            10,
            "Extracting document content",
        ))
        .await;
        let extracted = extract::extract(self.parser.as_ref(), &request.bytes).await?;
        let image_count = extracted.images.len();

        // ── Uploading-Assets (skipped when there are no images) ─────────
        let assets = if extracted.images.is_empty() {
            Vec::new()
        } else {
            sink.send(EventFrame::progress(
                "uploading",
                35,
                format!(
                    "Uploading {image_count} image{}",
                    if image_count == 1 { "" } else { "s" }
                ),
            ))
            .await;
            // Always proceeds regardless of how many individual uploads
            // failed.
            upload::upload_all(self.storage.as_ref(), extracted.images, &request.owner).await
        };

        // ── Converting ──────────────────────────────────────────────────
        sink.send(EventFrame::progress(
            "converting",
            60,
            "Converting to structured content",
        ))
        .await;
        // Placeholder instructions key off the extracted image count, not
        // the upload success count: the tokens are in the HTML either way.
        let mut tree =
            llm::convert(self.model.as_ref(), &extracted.html, image_count, &self.config).await?;

        // ── Resolving-Placeholders (best-effort, cannot fail) ───────────
        sink.send(EventFrame::progress("finalizing", 85, "Finalizing document"))
            .await;
        resolve::resolve(&mut tree, &assets);

        // ── Validating-Output ───────────────────────────────────────────
        let candidate = FinalDocument::new(tree, assets);
        validate::validate(self.validator.as_ref(), candidate)
    }
}

/// Reject the request unless it carries exactly one file with a supported
/// extension.
fn validate_input(
    request: &ConversionRequest,
    config: &PipelineConfig,
) -> Result<(), ConvertError> {
    if request.filename.is_empty() || request.bytes.is_empty() {
        return Err(ConvertError::NoFile);
    }

    let extension = request
        .filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("");

    if !config.accepts_extension(extension) {
        return Err(ConvertError::UnsupportedExtension {
            extension: extension.to_ascii_lowercase(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(filename: &str, bytes: &[u8]) -> ConversionRequest {
        ConversionRequest {
            filename: filename.into(),
            bytes: bytes.to_vec(),
            owner: OwnerContext {
                owner_id: "user-1".into(),
                classification: "document-image".into(),
            },
        }
    }

    #[test]
    fn accepts_docx() {
        let config = PipelineConfig::default();
        assert!(validate_input(&request("lesson.docx", b"PK"), &config).is_ok());
        assert!(validate_input(&request("LESSON.DOCX", b"PK"), &config).is_ok());
    }

    #[test]
    fn rejects_missing_file() {
        let config = PipelineConfig::default();
        assert!(matches!(
            validate_input(&request("", b"PK"), &config),
            Err(ConvertError::NoFile)
        ));
        assert!(matches!(
            validate_input(&request("lesson.docx", b""), &config),
            Err(ConvertError::NoFile)
        ));
    }

    #[test]
    fn rejects_unsupported_extension() {
        let config = PipelineConfig::default();
        match validate_input(&request("lesson.pdf", b"%PDF"), &config) {
            Err(ConvertError::UnsupportedExtension { extension }) => {
                assert_eq!(extension, "pdf")
            }
            other => panic!("expected UnsupportedExtension, got {other:?}"),
        }
    }

    #[test]
    fn rejects_extensionless_filename() {
        let config = PipelineConfig::default();
        assert!(matches!(
            validate_input(&request("lesson", b"PK"), &config),
            Err(ConvertError::UnsupportedExtension { .. })
        ));
    }
}
