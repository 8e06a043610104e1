//! Response Sanitizer — strips model formatting artifacts and untrusted markup
//! before output is treated as displayable or exportable content.
//!
//! Two layers: `strip_fences` removes markdown code-fence wrappers the model
//! sometimes adds despite the prompt contract; `clean_document` additionally
//! passes the HTML through an allow-list sanitizer, because the content comes
//! from a third-party model that can itself be steered by injected text.

use std::collections::HashSet;

/// Strips a leading code-fence marker (with an optional language tag such as
/// `html` or `json`) and a trailing fence marker, trimming whitespace.
///
/// Runs to a fixpoint, so applying it twice yields the same result as once.
pub fn strip_fences(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let next = strip_once(current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // A language tag, if present, occupies the remainder of the fence line.
        text = match rest.find('\n') {
            Some(idx) if rest[..idx].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                rest[idx + 1..].trim_start()
            }
            _ => rest.trim_start(),
        };
    }

    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim_end();
    }

    text
}

/// Cleans raw model output into trusted displayable HTML: fence strip, then an
/// allow-list pass that keeps structural tags and inline styling but drops
/// scripts, event handlers, and anything else outside the list.
pub fn clean_document(raw: &str) -> String {
    let tags: HashSet<&str> = [
        "h1", "h2", "h3", "h4", "p", "br", "hr", "ul", "ol", "li", "strong", "em", "b", "i", "u",
        "span", "div", "a",
    ]
    .into_iter()
    .collect();
    let generic_attributes: HashSet<&str> = ["style"].into_iter().collect();

    ammonia::Builder::default()
        .tags(tags)
        .generic_attributes(generic_attributes)
        .clean(strip_fences(raw))
        .to_string()
}
