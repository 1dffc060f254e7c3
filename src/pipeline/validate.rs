//! Content validation: the last gate before the document leaves the
//! pipeline.
//!
//! Validation failure is terminal — no partial output reaches the caller.
//! The structured diagnostic is logged for operators only; the caller gets
//! the generic message from [`ConvertError::ValidationFailed`] so schema
//! internals never leak onto the wire.

use crate::document::{FinalDocument, Node, EDITOR_TYPE};
use crate::error::ConvertError;
use tracing::error;

/// Schema-level validation of a candidate document.
///
/// The default implementation covers the structural and semantic checks
/// downstream consumers rely on; hosts with a richer schema engine can
/// inject their own implementation.
pub trait SchemaValidator: Send + Sync {
    /// `Ok(())` when the candidate satisfies the schema; `Err` carries the
    /// structured diagnostic (operator-facing only).
    fn check(&self, candidate: &FinalDocument) -> Result<(), String>;
}

/// Built-in validator for the fixed document schema.
#[derive(Debug, Default)]
pub struct DefaultSchemaValidator;

impl SchemaValidator for DefaultSchemaValidator {
    fn check(&self, candidate: &FinalDocument) -> Result<(), String> {
        if candidate.doc_type != "doc" {
            return Err(format!(
                "type: expected \"doc\", got {:?}",
                candidate.doc_type
            ));
        }
        // Semantic constraint: a well-formed tree built for the wrong
        // editor is still rejected.
        if candidate.config.editor_type != EDITOR_TYPE {
            return Err(format!(
                "config.editorType: expected {:?}, got {:?}",
                EDITOR_TYPE, candidate.config.editor_type
            ));
        }
        if candidate.config.content_type.is_empty() {
            return Err("config.contentType: must not be empty".to_string());
        }
        for (i, node) in candidate.content.iter().enumerate() {
            check_node(node).map_err(|e| format!("content[{i}]: {e}"))?;
        }
        Ok(())
    }
}

/// Per-node structural checks, applied recursively.
fn check_node(node: &Node) -> Result<(), String> {
    match node {
        Node::Heading { attrs, content } => {
            if !(1..=6).contains(&attrs.level) {
                return Err(format!("heading level {} out of range 1-6", attrs.level));
            }
            check_children(content)
        }
        Node::OrderedList { content, .. }
        | Node::Paragraph { content }
        | Node::BulletList { content }
        | Node::ListItem { content }
        | Node::Table { content }
        | Node::TableRow { content }
        | Node::TableCell { content, .. }
        | Node::TableHeader { content, .. }
        | Node::Blockquote { content }
        | Node::CodeBlock { content, .. } => check_children(content),
        Node::Text { text, .. } => {
            if text.is_empty() {
                return Err("text node with empty text".to_string());
            }
            Ok(())
        }
        Node::HorizontalRule | Node::HardBreak | Node::Image { .. } | Node::Video { .. } => {
            Ok(())
        }
    }
}

fn check_children(content: &[Node]) -> Result<(), String> {
    for (i, child) in content.iter().enumerate() {
        check_node(child).map_err(|e| format!("content[{i}]: {e}"))?;
    }
    Ok(())
}

/// Run the validator, logging the diagnostic and converting a rejection
/// into the pipeline-fatal error.
pub fn validate(
    validator: &dyn SchemaValidator,
    candidate: FinalDocument,
) -> Result<FinalDocument, ConvertError> {
    match validator.check(&candidate) {
        Ok(()) => Ok(candidate),
        Err(detail) => {
            error!("Document validation failed: {detail}");
            Err(ConvertError::ValidationFailed { detail })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HeadingAttrs, Node};

    fn valid_doc() -> FinalDocument {
        FinalDocument::new(
            vec![
                Node::Heading {
                    attrs: HeadingAttrs { level: 2 },
                    content: vec![Node::text("Section")],
                },
                Node::paragraph(vec![Node::text("Body")]),
            ],
            vec![],
        )
    }

    #[test]
    fn well_formed_document_passes() {
        let doc = valid_doc();
        let validated = validate(&DefaultSchemaValidator, doc.clone()).unwrap();
        assert_eq!(validated, doc);
    }

    #[test]
    fn wrong_editor_type_is_rejected() {
        let mut doc = valid_doc();
        doc.config.editor_type = "quill".into();

        let err = validate(&DefaultSchemaValidator, doc).unwrap_err();
        match &err {
            ConvertError::ValidationFailed { detail } => {
                assert!(detail.contains("editorType"));
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
        assert!(!err.user_message().contains("editorType"));
    }

    #[test]
    fn wrong_doc_type_is_rejected() {
        let mut doc = valid_doc();
        doc.doc_type = "fragment".into();
        assert!(DefaultSchemaValidator.check(&doc).is_err());
    }

    #[test]
    fn heading_level_out_of_range_is_rejected() {
        let doc = FinalDocument::new(
            vec![Node::Heading {
                attrs: HeadingAttrs { level: 9 },
                content: vec![Node::text("x")],
            }],
            vec![],
        );
        let detail = DefaultSchemaValidator.check(&doc).unwrap_err();
        assert!(detail.contains("level 9"));
    }

    #[test]
    fn nested_violation_reports_path() {
        let doc = FinalDocument::new(
            vec![Node::Blockquote {
                content: vec![Node::paragraph(vec![Node::text("")])],
            }],
            vec![],
        );
        let detail = DefaultSchemaValidator.check(&doc).unwrap_err();
        assert!(detail.starts_with("content[0]:"), "got: {detail}");
        assert!(detail.contains("empty text"));
    }

    #[test]
    fn unresolved_image_still_validates() {
        use crate::document::{placeholder_token, MediaAttrs};
        let doc = FinalDocument::new(
            vec![Node::Image {
                attrs: MediaAttrs {
                    placeholder: Some(placeholder_token(0)),
                    ..Default::default()
                },
            }],
            vec![],
        );
        assert!(DefaultSchemaValidator.check(&doc).is_ok());
    }
}
