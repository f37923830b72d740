//! Glyph metrics for the built-in Helvetica faces and the word wrapping
//! built on top of them.

/// Font faces used on the invoice. All three are PDF standard fonts, so
/// nothing needs to be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// Helvetica widths for ASCII 32..=126 in 1/1000 em (Adobe AFM data).
/// Helvetica-Oblique shares these metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Helvetica-Bold widths for ASCII 32..=126 in 1/1000 em (Adobe AFM data).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48-63
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80-95
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96-111
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112-126
];

/// Width assumed for characters outside the table (an average digit width)
const FALLBACK_WIDTH: u16 = 556;

pub fn char_width(face: FontFace, ch: char) -> u16 {
    let code = ch as u32;
    if !(32..=126).contains(&code) {
        return FALLBACK_WIDTH;
    }
    let index = (code - 32) as usize;
    match face {
        FontFace::Regular | FontFace::Italic => HELVETICA_WIDTHS[index],
        FontFace::Bold => HELVETICA_BOLD_WIDTHS[index],
    }
}

/// Width of `text` in points
pub fn measure_text(text: &str, face: FontFace, size: f32) -> f32 {
    let units: u32 = text.chars().map(|ch| char_width(face, ch) as u32).sum();
    units as f32 * size / 1000.0
}

/// Split a word that is wider than `avail_width` into pieces that fit,
/// breaking between characters. Always yields at least one character per
/// piece so a very narrow column still makes progress.
pub fn break_word(word: &str, avail_width: f32, face: FontFace, size: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0_f32;

    for ch in word.chars() {
        let ch_width = char_width(face, ch) as f32 * size / 1000.0;
        if width + ch_width > avail_width && !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(ch);
        width += ch_width;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
