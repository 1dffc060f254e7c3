//! Pipeline stages for document-to-structured-content conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations without touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ upload ──▶ llm ──▶ resolve ──▶ validate
//! (HTML+imgs) (storage)  (tree)  (re-link)   (schema)
//! ```
//!
//! 1. [`extract`]  — parse the document into HTML with placeholder tokens
//!    plus indexed images; rejects empty content
//! 2. [`upload`]   — persist each image sequentially; per-image failures
//!    are absorbed, never escalated
//! 3. [`llm`]      — drive the generative call with a bounded retry budget;
//!    the only stage that can burn multiple network round-trips
//! 4. [`resolve`]  — best-effort in-place substitution of placeholder
//!    tokens with uploaded asset descriptions
//! 5. [`validate`] — structural and semantic schema checks on the
//!    assembled document

pub mod extract;
pub mod llm;
pub mod resolve;
pub mod upload;
pub mod validate;
