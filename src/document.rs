//! Data model for the conversion pipeline.
//!
//! The types here mirror the wire shapes consumed by the editor frontend:
//! [`Node`] is the tagged document tree the generative model produces and
//! [`FinalDocument`] is the envelope the pipeline ultimately emits. Both
//! round-trip through `serde_json` unchanged, which is what makes the model
//! response directly parseable into a typed tree instead of a bag of
//! `serde_json::Value`s.
//!
//! Unknown JSON keys are ignored on deserialisation (serde default), so a
//! model that adds a stray attribute does not fail the parse; an unknown
//! node *type* does fail it, which is exactly when a retry is warranted.

use serde::{Deserialize, Serialize};

/// Prefix of the literal token the extractor embeds in HTML at each image's
/// original position. The full token is `IMAGE_PLACEHOLDER_<n>` where `n`
/// is the image's 0-based extraction index.
pub const PLACEHOLDER_PREFIX: &str = "IMAGE_PLACEHOLDER_";

/// Editor implementation tag the validator requires on every document.
pub const EDITOR_TYPE: &str = "tiptap";

/// Content classification tag stamped on every converted document.
pub const CONTENT_TYPE: &str = "document";

/// Build the placeholder token for an image index.
pub fn placeholder_token(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}")
}

// ── Extraction types ─────────────────────────────────────────────────────

/// One image discovered during document extraction.
///
/// Created once per image in document order, read exactly once by the
/// uploader, then discarded.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Raw image bytes as stored inside the document archive.
    pub data: Vec<u8>,
    /// Image subtype, e.g. `"png"` or `"jpeg"`.
    pub format: String,
    /// 0-based index assigned at extraction time; matches the `<n>` in the
    /// placeholder token embedded in the HTML.
    pub index: usize,
}

/// The extractor's output: HTML with embedded placeholder tokens plus the
/// images those tokens refer to.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub html: String,
    pub images: Vec<ExtractedImage>,
}

// ── Asset types ──────────────────────────────────────────────────────────

/// A durably stored image, created only when its upload succeeded.
///
/// The sequence of these in [`FinalDocument::assets`] is always an ordered,
/// duplicate-free subset of the extracted image indices — a failed upload
/// simply produces no entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedAsset {
    /// Matches [`ExtractedImage::index`].
    pub index: usize,
    /// Durable URL returned by the storage collaborator.
    pub url: String,
    /// Display caption (defaults to the generated filename).
    pub caption: String,
    /// Opaque media descriptor from the storage collaborator, passed
    /// through to the editor untouched.
    pub media: serde_json::Value,
}

// ── Node tree ────────────────────────────────────────────────────────────

/// A node in the structured document tree.
///
/// The variant set is closed: the generative model is prompted with exactly
/// these types, and any response containing an unknown `type` fails to
/// deserialise (triggering a conversion retry).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Heading {
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    Paragraph {
        #[serde(default)]
        content: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    BulletList {
        #[serde(default)]
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(default)]
        attrs: OrderedListAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    Table {
        #[serde(default)]
        content: Vec<Node>,
    },
    TableRow {
        #[serde(default)]
        content: Vec<Node>,
    },
    TableCell {
        #[serde(default)]
        attrs: TableCellAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    TableHeader {
        #[serde(default)]
        attrs: TableCellAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    CodeBlock {
        #[serde(default)]
        attrs: CodeBlockAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    HorizontalRule,
    HardBreak,
    /// Media reference. Carries the placeholder token until the resolver
    /// attaches the uploaded asset's URL, caption, and media descriptor.
    Image {
        #[serde(default)]
        attrs: MediaAttrs,
    },
    /// External video embed (e.g. a YouTube iframe in the source HTML).
    Video {
        #[serde(default)]
        attrs: VideoAttrs,
    },
}

impl Node {
    /// Mutable access to this node's children, when it has any.
    ///
    /// Leaf variants (text, rules, breaks, media) return `None`; the
    /// resolver's traversal stops there.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Heading { content, .. }
            | Node::Paragraph { content }
            | Node::BulletList { content }
            | Node::OrderedList { content, .. }
            | Node::ListItem { content }
            | Node::Table { content }
            | Node::TableRow { content }
            | Node::TableCell { content, .. }
            | Node::TableHeader { content, .. }
            | Node::Blockquote { content }
            | Node::CodeBlock { content, .. } => Some(content),
            Node::Text { .. }
            | Node::HorizontalRule
            | Node::HardBreak
            | Node::Image { .. }
            | Node::Video { .. } => None,
        }
    }

    /// Convenience constructor for a plain text leaf.
    pub fn text(s: impl Into<String>) -> Node {
        Node::Text {
            text: s.into(),
            marks: Vec::new(),
        }
    }

    /// Convenience constructor for a paragraph wrapping text leaves.
    pub fn paragraph(content: Vec<Node>) -> Node {
        Node::Paragraph { content }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadingAttrs {
    /// 1–6, as in HTML heading levels.
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderedListAttrs {
    #[serde(default = "default_list_start")]
    pub start: u32,
}

impl Default for OrderedListAttrs {
    fn default() -> Self {
        Self { start: 1 }
    }
}

fn default_list_start() -> u32 {
    1
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableCellAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CodeBlockAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Attributes of a media-reference node.
///
/// `placeholder` is set by the model from the literal token in the HTML and
/// is never cleared — after resolution it remains as a provenance trail
/// alongside the attached asset fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

// ── Marks ────────────────────────────────────────────────────────────────

/// Inline formatting attached to text leaves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link { attrs: LinkAttrs },
    Highlight {
        #[serde(default)]
        attrs: HighlightAttrs,
    },
    Subscript,
    Superscript,
    TextStyle {
        #[serde(default)]
        attrs: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkAttrs {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HighlightAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ── Final document ───────────────────────────────────────────────────────

/// The sole externally visible output of a successful pipeline run.
///
/// Immutable once validation passes; serialised into the terminal
/// `complete` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalDocument {
    /// Always `"doc"`.
    #[serde(rename = "type")]
    pub doc_type: String,
    /// The structured node tree.
    pub content: Vec<Node>,
    /// Successfully uploaded assets, ordered by extraction index.
    pub assets: Vec<UploadedAsset>,
    /// Reserved for interactive widgets; always empty for this pipeline.
    pub widgets: Vec<serde_json::Value>,
    pub config: DocumentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    pub editor_type: String,
    pub content_type: String,
}

impl FinalDocument {
    /// Assemble a document with the fixed type and config tags.
    pub fn new(content: Vec<Node>, assets: Vec<UploadedAsset>) -> Self {
        Self {
            doc_type: "doc".to_string(),
            content,
            assets,
            widgets: Vec::new(),
            config: DocumentConfig {
                editor_type: EDITOR_TYPE.to_string(),
                content_type: CONTENT_TYPE.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_tree_round_trips_through_json() {
        let tree = vec![
            Node::Heading {
                attrs: HeadingAttrs { level: 1 },
                content: vec![Node::text("Title")],
            },
            Node::Paragraph {
                content: vec![Node::Text {
                    text: "bold".into(),
                    marks: vec![Mark::Bold],
                }],
            },
            Node::Image {
                attrs: MediaAttrs {
                    placeholder: Some(placeholder_token(0)),
                    ..Default::default()
                },
            },
        ];

        let json = serde_json::to_string(&tree).unwrap();
        let back: Vec<Node> = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }

    #[test]
    fn node_type_tags_are_camel_case() {
        let json = serde_json::to_value(Node::BulletList { content: vec![] }).unwrap();
        assert_eq!(json["type"], "bulletList");

        let json = serde_json::to_value(Node::HorizontalRule).unwrap();
        assert_eq!(json["type"], "horizontalRule");
    }

    #[test]
    fn unknown_node_type_fails_to_parse() {
        let result: Result<Node, _> =
            serde_json::from_str(r#"{"type":"marquee","content":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_attrs_are_ignored() {
        let node: Node = serde_json::from_str(
            r#"{"type":"paragraph","content":[],"confidence":0.97}"#,
        )
        .unwrap();
        assert_eq!(node, Node::Paragraph { content: vec![] });
    }

    #[test]
    fn text_marks_default_to_empty() {
        let node: Node = serde_json::from_str(r#"{"type":"text","text":"hi"}"#).unwrap();
        assert_eq!(node, Node::text("hi"));
    }

    #[test]
    fn final_document_config_tags() {
        let doc = FinalDocument::new(vec![], vec![]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "doc");
        assert_eq!(json["config"]["editorType"], EDITOR_TYPE);
        assert_eq!(json["config"]["contentType"], CONTENT_TYPE);
        assert!(json["widgets"].as_array().unwrap().is_empty());
    }

    #[test]
    fn placeholder_token_format() {
        assert_eq!(placeholder_token(7), "IMAGE_PLACEHOLDER_7");
    }
}
