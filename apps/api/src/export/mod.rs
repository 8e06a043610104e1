//! Export Renderer — turns a sanitized document into a downloadable PDF.
//!
//! Blocks are paginated onto US-letter pages with 1" margins using the static
//! Helvetica metrics for word-wrap. Rendering is CPU-bound; handlers run it
//! inside `tokio::task::spawn_blocking`.

pub mod blocks;
pub mod metrics;

use anyhow::{bail, Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use blocks::{blocks_from_html, Block, BlockKind};
use metrics::{PageSetup, HELVETICA, MM_PER_PT};

const BULLET_PREFIX: &str = "•  ";
const BULLET_INDENT_MM: f32 = 5.0;

/// Heading point sizes by level; anything deeper renders as body text.
fn heading_size_pt(level: u8, body_pt: f32) -> f32 {
    match level {
        1 => body_pt + 6.0,
        2 => body_pt + 3.0,
        3 => body_pt + 1.0,
        _ => body_pt,
    }
}

/// Renders sanitized HTML (or plain text) into PDF bytes.
///
/// Fails on empty content or engine errors; callers map failures to the
/// export error kind, never to an inference error, and the on-screen document
/// is untouched either way.
pub fn render_pdf(html: &str, title: &str) -> Result<Vec<u8>> {
    let blocks = blocks_from_html(html);
    if blocks.is_empty() {
        bail!("the document has no renderable content");
    }

    let setup = PageSetup::default();
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(setup.width_mm), Mm(setup.height_mm), "content");
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("loading body font")?;
    let bold_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("loading heading font")?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut cursor_mm = setup.height_mm - setup.margin_mm;

    for block in &blocks {
        let (size_pt, font, indent_mm) = match block.kind {
            BlockKind::Heading(level) => (
                heading_size_pt(level, setup.body_size_pt),
                &bold_font,
                0.0,
            ),
            BlockKind::Paragraph => (setup.body_size_pt, &body_font, 0.0),
            BlockKind::Bullet => (setup.body_size_pt, &body_font, BULLET_INDENT_MM),
        };

        // Half a line of air before headings, except at the top of a page.
        if matches!(block.kind, BlockKind::Heading(_))
            && cursor_mm < setup.height_mm - setup.margin_mm - 0.1
        {
            cursor_mm -= setup.line_advance_mm(size_pt) * 0.5;
        }

        let indent_em = indent_mm / MM_PER_PT / size_pt;
        let max_width_em = setup.text_width_em(size_pt) - indent_em;
        let lines = wrapped_lines(block, max_width_em);

        for (i, line) in lines.iter().enumerate() {
            let advance = setup.line_advance_mm(size_pt);
            if cursor_mm - advance < setup.margin_mm {
                let (page, page_layer) =
                    doc.add_page(Mm(setup.width_mm), Mm(setup.height_mm), "content");
                layer = doc.get_page(page).get_layer(page_layer);
                cursor_mm = setup.height_mm - setup.margin_mm;
            }
            cursor_mm -= advance;

            let x_mm = setup.margin_mm
                + match block.kind {
                    // Continuation lines hang under the bullet text.
                    BlockKind::Bullet if i > 0 => indent_mm,
                    _ => 0.0,
                };
            draw_line(&layer, line, size_pt, x_mm, cursor_mm, font);
        }
    }

    doc.save_to_bytes().context("serializing PDF")
}

fn wrapped_lines(block: &Block, max_width_em: f32) -> Vec<String> {
    match block.kind {
        BlockKind::Bullet => {
            let mut lines = HELVETICA.wrap(&block.text, max_width_em);
            if let Some(first) = lines.first_mut() {
                *first = format!("{BULLET_PREFIX}{first}");
            }
            lines
        }
        _ => HELVETICA.wrap(&block.text, max_width_em),
    }
}

fn draw_line(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    x_mm: f32,
    y_mm: f32,
    font: &IndirectFontRef,
) {
    layer.use_text(text, size_pt, Mm(x_mm), Mm(y_mm), font);
}
