//! Standard Type 1 font metrics and WinAnsi text encoding.
//!
//! Reports use the built-in Helvetica faces, so no font program is
//! embedded. Widths come from the Adobe core font metrics and are needed
//! to right-align amounts and clamp text to column widths.

use super::Font;

/// Helvetica advance widths for codes 32..=126, in 1/1000 em.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for codes 32..=126, in 1/1000 em.
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

/// Byte used for characters WinAnsi cannot represent.
const REPLACEMENT: u8 = b'?';

/// Encode text as WinAnsi (CP1252) bytes for a standard font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c as u32 {
        0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
        _ => match c {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            '\u{2212}' => b'-',
            '\u{202f}' | '\u{2009}' => 0xa0,
            '\t' | '\n' | '\r' => b' ',
            _ => REPLACEMENT,
        },
    }
}

/// Advance width of one WinAnsi code in 1/1000 em.
fn glyph_width(code: u8, font: Font) -> u16 {
    let bold = font == Font::Bold;
    match code {
        0x20..=0x7e => {
            let table = if bold { &HELVETICA_BOLD_ASCII } else { &HELVETICA_ASCII };
            table[(code - 0x20) as usize]
        }
        0xa0 => 278,
        0xc6 | 0x8c => 1000, // Æ Œ
        0xe6 => 889,         // æ
        0xd8 | 0xd2..=0xd6 => 778, // Ø Ò-Ö
        0xc5 | 0xc0..=0xc4 => {
            if bold { 722 } else { 667 }
        }
        0xf8 | 0xf0..=0xf6 => {
            if bold { 611 } else { 556 }
        }
        0xe5 | 0xe0..=0xe4 | 0xe8..=0xeb => 556,
        0xec..=0xef => {
            if bold { 278 } else { 222 }
        }
        0x85 | 0x89 | 0x99 | 0x97 => 1000,
        0x91 | 0x92 | 0x82 => {
            if bold { 278 } else { 222 }
        }
        0x95 => 350,
        _ => 556,
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text)
        .into_iter()
        .map(|b| u32::from(glyph_width(b, font)))
        .sum();
    units as f32 * size / 1000.0
}

/// Shorten `text` so it fits in `max_width` points, appending `...`
/// when anything was cut.
pub fn truncate_to_width(text: &str, font: Font, size: f32, max_width: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let budget = max_width - text_width(ellipsis, font, size);
    if budget <= 0.0 {
        return String::new();
    }

    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let w = text_width(c.encode_utf8(&mut [0; 4]), font, size);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }

    format!("{}{}", out.trim_end(), ellipsis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Beløp"), vec![b'B', b'e', b'l', 0xf8, b'p']);
        assert_eq!(encode_win_ansi("1\u{a0}234"), vec![b'1', 0xa0, b'2', b'3', b'4']);
        assert_eq!(encode_win_ansi("5 €"), vec![b'5', b' ', 0x80]);
        assert_eq!(encode_win_ansi("\u{2212}1"), vec![b'-', b'1']);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }

    #[test]
    fn test_text_width() {
        // Every digit is 556 units, comma is 278
        assert!((text_width("30,75", Font::Regular, 10.0) - 25.02).abs() < 1e-3);
        assert!((text_width("Total", Font::Bold, 12.0) - 28.668).abs() < 1e-3);
        assert_eq!(text_width("", Font::Regular, 10.0), 0.0);
    }

    #[test]
    fn test_truncate_to_width() {
        let text = "Leie av lokale for sommeravslutning med grillmat";
        assert_eq!(truncate_to_width(text, Font::Regular, 10.0, 1000.0), text);

        let short = truncate_to_width(text, Font::Regular, 10.0, 80.0);
        assert!(short.ends_with("..."));
        assert!(text_width(&short, Font::Regular, 10.0) <= 80.0);

        assert_eq!(truncate_to_width(text, Font::Regular, 10.0, 5.0), "");
    }
}
