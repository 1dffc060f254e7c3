//! External collaborator interfaces consumed by the pipeline.
//!
//! The document parser, storage backend, and generative model are injected
//! as trait objects: the pipeline owns the coordination logic, not the
//! collaborators' implementations. This keeps the crate free of vendor
//! SDKs and lets tests drive every stage with scripted fakes.
//!
//! All three traits are `async` (via `async-trait`) because each call is a
//! suspension point — the pipeline task yields while a collaborator does
//! its I/O, and nothing else runs for that request in the meantime.

use async_trait::async_trait;
use serde_json::Value;

/// Boxed error type for collaborator failures.
///
/// The pipeline never inspects collaborator errors structurally; it only
/// formats them into its own error variants, so a boxed `Error` is the
/// least demanding contract for implementors.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

// ── Document parser ──────────────────────────────────────────────────────

/// One image extracted by the parser, in document order.
#[derive(Debug, Clone)]
pub struct ParsedImage {
    /// Raw image bytes from the document archive.
    pub data: Vec<u8>,
    /// Image subtype, e.g. `"png"`.
    pub format: String,
}

/// Raw parser output: HTML plus the images it references.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub html: String,
    pub images: Vec<ParsedImage>,
}

/// Turns a binary office document into HTML plus raw image payloads.
///
/// Contract: for each image, the parser embeds the literal token
/// `IMAGE_PLACEHOLDER_<n>` in the HTML at the image's original position,
/// where `n` is the image's 0-based position in [`ParsedDocument::images`].
/// The extractor relies on this to keep index and in-tree position in
/// agreement for later resolution.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument, CollaboratorError>;
}

// ── Storage provider ─────────────────────────────────────────────────────

/// A transient file-like object handed to the storage collaborator.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub filename: String,
    /// MIME type derived from the image format, e.g. `"image/png"`.
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Identity and classification of the caller owning the uploaded assets.
#[derive(Debug, Clone)]
pub struct OwnerContext {
    pub owner_id: String,
    /// Storage classification bucket, e.g. `"document-image"`.
    pub classification: String,
}

/// Durable asset descriptor returned by a successful upload.
#[derive(Debug, Clone)]
pub struct StoredAsset {
    /// Durable URL of the persisted file.
    pub url: String,
    /// The provider's full descriptor record (size, owner, etc.), passed
    /// through to the final document untouched.
    pub descriptor: Value,
}

/// Persists files to durable storage.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn upload(
        &self,
        file: AssetUpload,
        owner: &OwnerContext,
        metadata: Option<Value>,
    ) -> Result<StoredAsset, CollaboratorError>;

    /// Remove a previously stored asset. Available to hosts for cleanup;
    /// the conversion pipeline itself never calls this — already-uploaded
    /// images are deliberately kept when a later stage fails.
    async fn delete(&self, descriptor: &Value) -> Result<bool, CollaboratorError>;
}

// ── Generative text model ────────────────────────────────────────────────

/// Sampling configuration for one generative call.
#[derive(Debug, Clone)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A generative text model endpoint.
///
/// The full response is buffered and returned as one string; the converter
/// does not consume streaming output.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        prompt: &str,
        options: &SamplingOptions,
    ) -> Result<String, CollaboratorError>;
}
