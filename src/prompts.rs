//! Prompts for HTML-to-node-tree conversion.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the target tree grammar (node types,
//!    attributes, mark types) is described in exactly one place; changing
//!    the grammar means editing one constant.
//!
//! 2. **Testability** — unit tests can inspect the assembled prompt
//!    directly without calling a real model, so truncation and the
//!    placeholder instruction are cheap to verify.

use crate::document::PLACEHOLDER_PREFIX;

/// Fixed system instructions: the target tree grammar.
///
/// Sent unchanged on every attempt of every request. The grammar mirrors
/// the [`crate::document::Node`] variant set exactly — any node type the
/// model invents outside this list fails deserialisation and burns a retry.
pub const SYSTEM_PROMPT: &str = r##"You are a document structure converter. Convert the provided HTML into a JSON array of editor nodes.

NODE TYPES (use only these):

- {"type":"heading","attrs":{"level":1},"content":[...]} — level is 1 to 6
- {"type":"paragraph","content":[...]}
- {"type":"text","text":"...","marks":[...]} — leaf node; marks optional
- {"type":"bulletList","content":[listItem...]}
- {"type":"orderedList","attrs":{"start":1},"content":[listItem...]}
- {"type":"listItem","content":[block nodes...]}
- {"type":"table","content":[tableRow...]}
- {"type":"tableRow","content":[tableCell or tableHeader...]}
- {"type":"tableCell","attrs":{"colspan":1,"rowspan":1},"content":[...]}
- {"type":"tableHeader","attrs":{"colspan":1,"rowspan":1},"content":[...]}
- {"type":"blockquote","content":[...]}
- {"type":"codeBlock","attrs":{"language":"python"},"content":[{"type":"text","text":"..."}]}
- {"type":"horizontalRule"}
- {"type":"hardBreak"}
- {"type":"image","attrs":{"placeholder":"IMAGE_PLACEHOLDER_0"}}
- {"type":"video","attrs":{"src":"https://..."}}

MARK TYPES (inside a text node's "marks" array, use only these):

- {"type":"bold"}
- {"type":"italic"}
- {"type":"underline"}
- {"type":"strike"}
- {"type":"code"}
- {"type":"link","attrs":{"href":"https://..."}}
- {"type":"highlight","attrs":{"color":"#ffff00"}}
- {"type":"subscript"}
- {"type":"superscript"}
- {"type":"textStyle","attrs":{"color":"#333333"}}

EXAMPLE:

HTML: <h1>Intro</h1><p>Hello <strong>world</strong></p>
Output:
[{"type":"heading","attrs":{"level":1},"content":[{"type":"text","text":"Intro"}]},{"type":"paragraph","content":[{"type":"text","text":"Hello "},{"type":"text","text":"world","marks":[{"type":"bold"}]}]}]

RULES:

1. Preserve ALL text content completely; keep the document's reading order.
2. Use the closest node type for each HTML element; never invent new types.
3. Every text fragment must be a "text" node inside a block node.
4. Output ONLY the JSON array.
   Do NOT wrap it in ``` fences.
   Do NOT add commentary or explanations."##;

/// Extra instruction appended to the user prompt when the document
/// contains at least one image.
pub const PLACEHOLDER_INSTRUCTION: &str = r#"
The HTML contains image placeholder tokens of the form IMAGE_PLACEHOLDER_<n>.
For each one, emit {"type":"image","attrs":{"placeholder":"IMAGE_PLACEHOLDER_<n>"}} at that position.
Copy each token EXACTLY as literal text; do not translate, renumber, or drop any of them."#;

/// Marker appended when the HTML exceeds the configured length limit, so
/// the model knows content is missing rather than ending mid-sentence.
pub const TRUNCATION_MARKER: &str = "\n[CONTENT TRUNCATED]";

/// Assemble the user prompt for one conversion attempt.
///
/// The HTML is cut at `max_html_len` characters (on a char boundary) with
/// [`TRUNCATION_MARKER`] appended when exceeded. The placeholder
/// instruction is included only when `image_count > 0`; an image-free
/// document gets the shorter prompt.
pub fn build_user_prompt(html: &str, image_count: usize, max_html_len: usize) -> String {
    let mut prompt = String::with_capacity(html.len().min(max_html_len) + 512);
    prompt.push_str("Convert this HTML to the node tree:\n\n");

    match html.char_indices().nth(max_html_len) {
        Some((byte_idx, _)) => {
            prompt.push_str(&html[..byte_idx]);
            prompt.push_str(TRUNCATION_MARKER);
        }
        None => prompt.push_str(html),
    }

    if image_count > 0 {
        prompt.push('\n');
        prompt.push_str(PLACEHOLDER_INSTRUCTION);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_the_placeholder_token() {
        assert!(SYSTEM_PROMPT.contains(PLACEHOLDER_PREFIX));
    }

    #[test]
    fn short_html_is_not_truncated() {
        let prompt = build_user_prompt("<p>hi</p>", 0, 1000);
        assert!(prompt.contains("<p>hi</p>"));
        assert!(!prompt.contains(TRUNCATION_MARKER.trim()));
    }

    #[test]
    fn long_html_gets_truncation_marker() {
        let html = "x".repeat(500);
        let prompt = build_user_prompt(&html, 0, 100);
        assert!(prompt.contains(TRUNCATION_MARKER.trim()));
        assert!(!prompt.contains(&"x".repeat(101)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let html = "é".repeat(200);
        let prompt = build_user_prompt(&html, 0, 100);
        assert!(prompt.contains(TRUNCATION_MARKER.trim()));
    }

    #[test]
    fn placeholder_instruction_only_with_images() {
        let with = build_user_prompt("<p>a</p>", 2, 1000);
        let without = build_user_prompt("<p>a</p>", 0, 1000);
        assert!(with.contains("placeholder tokens"));
        assert!(!without.contains("placeholder tokens"));
    }
}
