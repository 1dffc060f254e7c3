//! Placeholder resolution: attach uploaded assets to media nodes.
//!
//! A depth-first, in-place visitor over the node tree. Image nodes whose
//! placeholder token matches an uploaded asset get the asset's URL,
//! caption, and media descriptor attached; the placeholder string itself
//! is never touched, which keeps the pass idempotent and leaves a
//! provenance trail in the final document.
//!
//! Unmatched placeholders (upload failed, or index out of range) are left
//! inert. That is the intended partial-success behaviour, not an error:
//! the tree still validates, the reference just points nowhere.

use crate::document::{Node, UploadedAsset, PLACEHOLDER_PREFIX};
use std::collections::HashMap;

/// Extract the image index from a placeholder token.
///
/// Strict match: the whole token must be `IMAGE_PLACEHOLDER_<n>`, nothing
/// prepended or appended.
pub fn placeholder_index(token: &str) -> Option<usize> {
    token
        .strip_prefix(PLACEHOLDER_PREFIX)
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|rest| rest.parse().ok())
}

/// Resolve every matching media node in `tree` against `assets`, in place.
pub fn resolve(tree: &mut [Node], assets: &[UploadedAsset]) {
    let by_index: HashMap<usize, &UploadedAsset> =
        assets.iter().map(|a| (a.index, a)).collect();
    for node in tree {
        visit(node, &by_index);
    }
}

fn visit(node: &mut Node, assets: &HashMap<usize, &UploadedAsset>) {
    if let Node::Image { attrs } = node {
        let matched = attrs
            .placeholder
            .as_deref()
            .and_then(placeholder_index)
            .and_then(|idx| assets.get(&idx));
        if let Some(asset) = matched {
            attrs.src = Some(asset.url.clone());
            attrs.caption = Some(asset.caption.clone());
            attrs.media = Some(asset.media.clone());
        }
        return;
    }

    if let Some(children) = node.children_mut() {
        for child in children {
            visit(child, assets);
        }
    }
}
