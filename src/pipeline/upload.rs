//! Asset upload: persist extracted images to durable storage.
//!
//! Uploads run strictly sequentially — expected image counts per document
//! are low and the simplicity is worth more than the throughput. Each
//! image is an independent create; one failure is logged and skipped, and
//! [`upload_all`] never returns an error. A conversion with N−1 images
//! correctly placed and one missing is more useful to the caller than
//! total failure.

use crate::collaborators::{AssetUpload, OwnerContext, StorageProvider};
use crate::document::{ExtractedImage, UploadedAsset};
use crate::error::AssetError;
use tracing::{debug, warn};

/// Map an image subtype to its MIME type.
///
/// Fails only for an empty format string; unrecognised subtypes fall back
/// to `image/<format>`, which is what the IANA registry uses for the
/// common cases anyway.
pub fn mime_type(format: &str) -> Option<String> {
    let f = format.trim().to_ascii_lowercase();
    if f.is_empty() {
        return None;
    }
    Some(match f.as_str() {
        "jpg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "tif" => "image/tiff".to_string(),
        other => format!("image/{other}"),
    })
}

/// Upload every image sequentially, accumulating the successes.
///
/// The returned sequence is an ordered, duplicate-free subset of the input
/// indices: iteration order is extraction order, and each image is
/// attempted exactly once.
pub async fn upload_all(
    storage: &dyn StorageProvider,
    images: Vec<ExtractedImage>,
    owner: &OwnerContext,
) -> Vec<UploadedAsset> {
    let total = images.len();
    let mut assets: Vec<UploadedAsset> = Vec::with_capacity(total);

    for image in images {
        match upload_one(storage, image, owner).await {
            Ok(asset) => assets.push(asset),
            // Absorbed: an individual upload failure is non-fatal to the
            // batch and never raises out of this call.
            Err(e) => warn!("Skipping image: {e}"),
        }
    }

    debug!("Uploaded {}/{} images", assets.len(), total);
    assets
}

async fn upload_one(
    storage: &dyn StorageProvider,
    image: ExtractedImage,
    owner: &OwnerContext,
) -> Result<UploadedAsset, AssetError> {
    let index = image.index;
    let content_type = mime_type(&image.format).ok_or_else(|| AssetError::UnknownFormat {
        index,
        format: image.format.clone(),
    })?;
    let filename = format!("document-image-{}.{}", index, image.format);

    let stored = storage
        .upload(
            AssetUpload {
                filename: filename.clone(),
                content_type,
                data: image.data,
            },
            owner,
            None,
        )
        .await
        .map_err(|e| AssetError::UploadFailed {
            index,
            detail: e.to_string(),
        })?;

    Ok(UploadedAsset {
        index,
        url: stored.url,
        caption: filename,
        media: stored.descriptor,
    })
}
