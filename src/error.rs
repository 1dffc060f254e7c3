//! Error types for the docx2tree library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal**: the conversion cannot proceed at all
//!   (unsupported file, unparseable document, converter out of retries,
//!   schema rejection). Returned as `Err(ConvertError)` from the pipeline
//!   stages and mapped to exactly one terminal `error` event by the
//!   orchestrator.
//!
//! * [`AssetError`] — **Non-fatal**: a single image failed to upload but
//!   the rest of the batch is fine. Absorbed inside the uploader loop and
//!   logged; the conversion continues with that image unresolved.
//!
//! The separation matters because the two kinds of failure have opposite
//! propagation rules: a fatal error must end the run with a terminal event,
//! while an asset error must never escape the upload loop.

use thiserror::Error;

/// All fatal errors produced by the conversion pipeline.
///
/// Per-image upload failures use [`AssetError`] and never appear here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request carried no file at all.
    #[error("No file provided")]
    NoFile,

    /// The file's extension is not in the supported set.
    #[error("Unsupported file type '.{extension}'. Only .docx files are supported.")]
    UnsupportedExtension { extension: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The document parser rejected the input bytes.
    #[error("Failed to read the document. Please check the file is a valid .docx document.")]
    ExtractionFailed { detail: String },

    /// Parsing succeeded but produced no usable content.
    #[error("The document appears to be empty.")]
    EmptyDocument,

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The generative model failed to produce a parseable tree after all
    /// attempts. `detail` holds the last attempt's error for operator logs;
    /// the caller-facing message is intentionally generic.
    #[error("Failed to convert the document content.")]
    ConversionFailed { attempts: u32, detail: String },

    // ── Validation errors ─────────────────────────────────────────────────
    /// The assembled document was rejected by the content schema. The
    /// structured diagnostic stays in `detail` for logs only.
    #[error("The converted document failed validation.")]
    ValidationFailed { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error caught at the orchestrator boundary.
    #[error("An unexpected error occurred during conversion.")]
    Internal(String),
}

impl ConvertError {
    /// The message surfaced to the caller in the terminal `error` event.
    ///
    /// Identical to `Display` for every variant: the `#[error]` strings are
    /// already written as user-facing text, with operator detail kept in
    /// the struct fields and emitted only through `tracing`.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// A non-fatal error for a single image upload.
///
/// Logged by the uploader and dropped; the corresponding placeholder in the
/// tree is simply left unresolved.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// The storage collaborator refused or failed the upload.
    #[error("Image {index}: upload failed: {detail}")]
    UploadFailed { index: usize, detail: String },

    /// The image's declared format does not map to a known MIME type.
    #[error("Image {index}: unknown image format '{format}'")]
    UnknownFormat { index: usize, format: String },
}
