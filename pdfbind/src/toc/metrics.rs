//! Text measurement and encoding for the standard Helvetica faces.
//!
//! Generated pages use the base-14 Type1 fonts, so no font program is
//! embedded. Widths come from the Helvetica AFM file (units of 1/1000 em)
//! and text is encoded as WinAnsi bytes.

/// Advance widths of Helvetica for codes 32..=126.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

/// Width used for WinAnsi codes outside the ASCII range.
const DEFAULT_WIDTH: u16 = 556;

/// Built-in fonts used on generated pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Helvetica.
    Regular,
    /// Helvetica-Bold.
    Bold,
}

impl FontFace {
    /// PostScript name of the font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "PbHelv",
            Self::Bold => "PbHelvB",
        }
    }
}

/// Map a character onto its WinAnsi code.
///
/// Characters WinAnsi cannot represent become `?`.
pub fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => b'?',
    }
}

/// Encode text as WinAnsi bytes for a `Tj` operand.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn glyph_width(code: u8) -> u16 {
    match code {
        32..=126 => HELVETICA_ASCII[(code - 32) as usize],
        0x85 | 0x97 => 1000,
        0x91 | 0x92 | 0x82 => 222,
        0x93 | 0x94 | 0x84 => 333,
        0x95 => 350,
        0x99 => 1000,
        0xa0 => 278,
        _ => DEFAULT_WIDTH,
    }
}

/// Rendered width of `text` in Helvetica at `size` points.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|ch| glyph_width(win_ansi_byte(ch)) as u32)
        .sum();
    units as f32 * size / 1000.0
}
