//! # docx2tree
//!
//! Convert DOCX documents into structured editor content using generative
//! text models.
//!
//! ## Why this crate?
//!
//! Mechanical DOCX-to-HTML converters preserve markup but not meaning:
//! the editor downstream needs a typed node tree (headings, lists, tables,
//! media references with durable URLs), not a blob of HTML. This crate
//! extracts the document's HTML and images, lets a text model re-express
//! the content as a closed-grammar JSON tree, uploads the images to
//! durable storage, re-links the tree's placeholders to the uploaded
//! assets, and validates the result — streaming progress the whole way.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DOCX
//!  │
//!  ├─ 1. Validate  exactly one file, supported extension
//!  ├─ 2. Extract   HTML + indexed images with placeholder tokens
//!  ├─ 3. Upload    each image to durable storage (sequential, best-effort)
//!  ├─ 4. Convert   HTML → node tree via the model (3 attempts)
//!  ├─ 5. Resolve   placeholder tokens → uploaded asset descriptions
//!  ├─ 6. Validate  structural + semantic schema checks
//!  └─ 7. Emit      terminal complete/error event frame
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2tree::{ConversionRequest, MemorySink, OwnerContext, Pipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     parser: Arc<dyn docx2tree::DocumentParser>,
//! #     storage: Arc<dyn docx2tree::StorageProvider>,
//! #     model: Arc<dyn docx2tree::TextModel>,
//! # ) {
//! let pipeline = Pipeline::new(parser, storage, model, PipelineConfig::default());
//! let sink = MemorySink::new();
//!
//! pipeline
//!     .run(
//!         ConversionRequest {
//!             filename: "lesson.docx".into(),
//!             bytes: std::fs::read("lesson.docx").unwrap(),
//!             owner: OwnerContext {
//!                 owner_id: "user-1".into(),
//!                 classification: "document-image".into(),
//!             },
//!         },
//!         &sink,
//!     )
//!     .await;
//!
//! for frame in sink.frames() {
//!     println!("{}", serde_json::to_string(&frame).unwrap());
//! }
//! # }
//! ```
//!
//! ## Partial success is success
//!
//! A single failed image upload never fails the conversion: the batch
//! continues, the tree keeps that placeholder unresolved, and the run ends
//! with a normal `complete` frame. Only input, extraction, conversion, and
//! validation failures are terminal — each produces exactly one `error`
//! frame and nothing after it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod collaborators;
pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use collaborators::{
    AssetUpload, CollaboratorError, DocumentParser, OwnerContext, ParsedDocument, ParsedImage,
    SamplingOptions, StorageProvider, StoredAsset, TextModel,
};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use document::{
    ExtractedContent, ExtractedImage, FinalDocument, Mark, MediaAttrs, Node, UploadedAsset,
    CONTENT_TYPE, EDITOR_TYPE, PLACEHOLDER_PREFIX,
};
pub use error::{AssetError, ConvertError};
pub use events::{ChannelSink, EventFrame, EventSink, MemorySink};
pub use orchestrator::{ConversionRequest, Pipeline};
pub use pipeline::validate::{DefaultSchemaValidator, SchemaValidator};
