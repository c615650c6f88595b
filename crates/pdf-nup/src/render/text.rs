//! Text labels on output pages
//!
//! Labels use the standard Type1 Helvetica font, so no font program is
//! embedded. Widths come from the Helvetica metrics for the characters the
//! labels actually use; anything else gets an average width.

use crate::constants::HELVETICA_CHAR_WIDTH_RATIO;
use crate::layout::Rect;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Horizontal alignment inside a text box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A single line of text placed in a box
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub font_size: f32,
    /// Box the line is placed in; the baseline sits one font size below its top
    pub bounds: Rect,
    pub align: Align,
    /// Fill gray level (0 = black)
    pub gray: f32,
}

impl TextLabel {
    /// Black, right-aligned label (footers and cell indices)
    pub fn right_aligned(text: impl Into<String>, font_size: f32, bounds: Rect) -> Self {
        Self {
            text: text.into(),
            font_size,
            bounds,
            align: Align::Right,
            gray: 0.0,
        }
    }

    /// Position of the first glyph's baseline origin
    pub fn origin(&self) -> (f32, f32) {
        let width = text_width(&self.text, self.font_size);
        let x = match self.align {
            Align::Left => self.bounds.x,
            Align::Center => self.bounds.center_x() - width / 2.0,
            Align::Right => self.bounds.right() - width,
        };
        (x, self.bounds.top() - self.font_size)
    }

    /// Content stream operations drawing this label with font `font_name`
    pub fn to_ops(&self, font_name: &str) -> String {
        let (x, y) = self.origin();
        format!(
            "BT /{} {} Tf {} g {} {} Td ({}) Tj ET\n",
            font_name,
            self.font_size,
            self.gray,
            x,
            y,
            escape_pdf_string(&self.text)
        )
    }
}

/// Helvetica advance width in 1/1000 em
fn helvetica_advance(c: char) -> Option<u16> {
    match c {
        '0'..='9' => Some(556),
        ' ' | '/' | '.' | ',' => Some(278),
        '-' => Some(333),
        _ => None,
    }
}

/// Approximate rendered width of `text` in points
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| match helvetica_advance(c) {
            Some(w) => w as f32 / 1000.0 * font_size,
            None => HELVETICA_CHAR_WIDTH_RATIO * font_size,
        })
        .sum()
}

/// Encode text as a PDF literal string body in WinAnsi.
///
/// Delimiters are escaped, Latin-1 characters outside ASCII are written as
/// octal escapes and anything beyond Latin-1 becomes `?`.
pub fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Add a Helvetica font dictionary to `output`
pub fn add_helvetica_font(output: &mut Document) -> ObjectId {
    let mut font_dict = Dictionary::new();
    font_dict.set("Type", Object::Name(b"Font".to_vec()));
    font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    font_dict.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
    font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    output.add_object(font_dict)
}
