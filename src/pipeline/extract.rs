//! Content extraction: document bytes → HTML + indexed images.
//!
//! The heavy lifting (unzipping the archive, walking the XML body) belongs
//! to the injected [`DocumentParser`]; this stage owns the invariants the
//! rest of the pipeline depends on: indices are 0-based and assigned in
//! document order, empty content is a fatal error not an empty success,
//! and a placeholder/image count mismatch is logged for operators.

use crate::collaborators::DocumentParser;
use crate::document::{ExtractedContent, ExtractedImage};
use crate::error::ConvertError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static RE_PLACEHOLDER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"IMAGE_PLACEHOLDER_(\d+)").expect("valid regex"));

/// Extract HTML and images from raw document bytes.
///
/// Fails with [`ConvertError::ExtractionFailed`] when the parser rejects
/// the input and [`ConvertError::EmptyDocument`] when the resulting HTML
/// is empty or all whitespace.
pub async fn extract(
    parser: &dyn DocumentParser,
    bytes: &[u8],
) -> Result<ExtractedContent, ConvertError> {
    let parsed = parser
        .parse(bytes)
        .await
        .map_err(|e| ConvertError::ExtractionFailed {
            detail: e.to_string(),
        })?;

    if parsed.html.trim().is_empty() {
        return Err(ConvertError::EmptyDocument);
    }

    // Indices are assigned here, in document order, and are the single
    // source of truth for placeholder resolution.
    let images: Vec<ExtractedImage> = parsed
        .images
        .into_iter()
        .enumerate()
        .map(|(index, img)| ExtractedImage {
            data: img.data,
            format: img.format,
            index,
        })
        .collect();

    let token_count = RE_PLACEHOLDER_TOKEN.find_iter(&parsed.html).count();
    if token_count != images.len() {
        // Unreferenced images are still uploaded and listed in the final
        // document's assets; the divergence is an operator signal only.
        warn!(
            "Placeholder/image divergence: {} tokens in HTML, {} extracted images",
            token_count,
            images.len()
        );
    }

    debug!(
        "Extracted {} chars of HTML and {} images",
        parsed.html.len(),
        images.len()
    );

    Ok(ExtractedContent {
        html: parsed.html,
        images,
    })
}
