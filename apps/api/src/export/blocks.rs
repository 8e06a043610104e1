//! Normalizes sanitized document HTML into a flat sequence of print blocks.
//!
//! Export rendering does not honor stylesheets, so layout-relevant structure
//! (headings, paragraphs, bullets) is lifted out of the markup here and
//! inline formatting tags are flattened into their text content. Input is
//! expected to have passed the allow-list sanitizer already; unknown tags are
//! simply dropped.

/// One printable unit, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Heading level 1–4 (h1 = document title).
    Heading(u8),
    Paragraph,
    Bullet,
}

/// Splits a document into blocks. Plain text (no markup at all) falls back to
/// blank-line paragraph splitting so REFINE output that came back as text
/// still exports.
pub fn blocks_from_html(html: &str) -> Vec<Block> {
    if !html.contains('<') {
        return plain_text_blocks(html);
    }

    let mut blocks = Vec::new();
    let mut kind = BlockKind::Paragraph;
    let mut buf = String::new();
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        push_text(&mut buf, &rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            // Unterminated tag: treat the remainder as text and stop.
            push_text(&mut buf, &rest[open..]);
            rest = "";
            break;
        };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let (closing, name) = parse_tag_name(tag);
        match (name.as_str(), closing) {
            ("h1", false) | ("h2", false) | ("h3", false) | ("h4", false) => {
                flush(&mut blocks, &mut buf, kind);
                let level = name.as_bytes()[1] - b'0';
                kind = BlockKind::Heading(level);
            }
            ("h1", true) | ("h2", true) | ("h3", true) | ("h4", true) => {
                flush(&mut blocks, &mut buf, kind);
                kind = BlockKind::Paragraph;
            }
            ("li", false) => {
                flush(&mut blocks, &mut buf, kind);
                kind = BlockKind::Bullet;
            }
            ("li", true) => {
                flush(&mut blocks, &mut buf, kind);
                kind = BlockKind::Paragraph;
            }
            ("p", _) | ("div", _) | ("br", _) | ("hr", _) | ("ul", _) | ("ol", _) => {
                flush(&mut blocks, &mut buf, kind);
            }
            // Inline tags (strong, em, span, a, ...) flatten into the text.
            _ => {}
        }
    }
    push_text(&mut buf, rest);
    flush(&mut blocks, &mut buf, kind);
    blocks
}

fn plain_text_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for chunk in text.split("\n\n") {
        for line in chunk.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
                blocks.push(Block {
                    kind: BlockKind::Bullet,
                    text: item.trim().to_string(),
                });
            } else {
                blocks.push(Block {
                    kind: BlockKind::Paragraph,
                    text: line.to_string(),
                });
            }
        }
    }
    blocks
}

/// Returns (is_closing, lowercased tag name) for the inside of a `<...>`.
fn parse_tag_name(tag: &str) -> (bool, String) {
    let tag = tag.trim();
    let (closing, tag) = match tag.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, tag),
    };
    let name: String = tag
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (closing, name)
}

fn push_text(buf: &mut String, raw: &str) {
    if raw.is_empty() {
        return;
    }
    let decoded = decode_entities(raw);
    for word in decoded.split_whitespace() {
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(word);
    }
}

fn flush(blocks: &mut Vec<Block>, buf: &mut String, kind: BlockKind) {
    let text = std::mem::take(buf);
    let text = text.trim();
    if !text.is_empty() {
        blocks.push(Block {
            kind,
            text: text.to_string(),
        });
    }
}

/// Decodes the handful of entities the sanitizer emits.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_paragraphs_and_bullets_in_order() {
        let html = "<h1>Jane Doe</h1><h2>Experience</h2>\
                    <p>Backend engineer.</p>\
                    <ul><li>Shipped a payments service</li><li>Cut latency 40%</li></ul>";
        let blocks = blocks_from_html(html);
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0].kind, BlockKind::Heading(1));
        assert_eq!(blocks[0].text, "Jane Doe");
        assert_eq!(blocks[1].kind, BlockKind::Heading(2));
        assert_eq!(blocks[2].kind, BlockKind::Paragraph);
        assert_eq!(blocks[3].kind, BlockKind::Bullet);
        assert_eq!(blocks[4].text, "Cut latency 40%");
    }

    #[test]
    fn test_inline_tags_flatten_into_text() {
        let html = "<p>Led a <strong>cross-team</strong> effort with <em>measurable</em> impact.</p>";
        let blocks = blocks_from_html(html);
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].text,
            "Led a cross-team effort with measurable impact."
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = "<p>R&amp;D &mdash; ops &lt;2ms&gt;</p>";
        let blocks = blocks_from_html(html);
        assert!(blocks[0].text.contains("R&D"));
        assert!(blocks[0].text.contains("<2ms>"));
    }

    #[test]
    fn test_whitespace_collapses_inside_a_block() {
        let html = "<p>spaced   \n   out</p>";
        let blocks = blocks_from_html(html);
        assert_eq!(blocks[0].text, "spaced out");
    }

    #[test]
    fn test_plain_text_falls_back_to_paragraph_split() {
        let text = "Summary line one.\n\n- bullet one\n- bullet two\n\nClosing paragraph.";
        let blocks = blocks_from_html(text);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].kind, BlockKind::Bullet);
        assert_eq!(blocks[1].text, "bullet one");
        assert_eq!(blocks[3].text, "Closing paragraph.");
    }

    #[test]
    fn test_empty_input_yields_no_blocks() {
        assert!(blocks_from_html("").is_empty());
        assert!(blocks_from_html("<p>  </p>").is_empty());
    }

    #[test]
    fn test_unterminated_tag_does_not_panic() {
        let blocks = blocks_from_html("<p>fine</p><h2");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "fine");
    }

    #[test]
    fn test_style_attributes_are_ignored_for_structure() {
        let html = r#"<h2 style="color:#333">Skills</h2><p style="margin:0">Rust, SQL</p>"#;
        let blocks = blocks_from_html(html);
        assert_eq!(blocks[0].kind, BlockKind::Heading(2));
        assert_eq!(blocks[1].text, "Rust, SQL");
    }
}
