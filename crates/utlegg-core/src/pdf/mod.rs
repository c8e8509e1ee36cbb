//! PDF construction module.

mod fonts;
mod writer;

pub use fonts::{encode_win_ansi, text_width, truncate_to_width};
pub use writer::{ImageXObject, PdfWriter};

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use crate::error::ReportError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Standard font faces used on generated pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Name of the font in page resource dictionaries.
    ///
    /// Prefixed so it cannot clash with fonts of imported pages.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "UtF1",
            Self::Bold => "UtF2",
        }
    }

    /// PostScript name of the standard Type 1 font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }
}

/// A single line of text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge of the text, in points from the page origin.
    pub x: f32,
    /// Baseline, in points from the page origin.
    pub y: f32,
    pub size: f32,
    pub font: Font,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f32, y: f32, size: f32, font: Font) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size,
            font,
        }
    }

    /// Rendered width in points.
    pub fn width(&self) -> f32 {
        text_width(&self.text, self.font, self.size)
    }

    /// Right edge of the text in points.
    pub fn right(&self) -> f32 {
        self.x + self.width()
    }
}

/// Content stream operations drawing `runs` in black.
pub fn text_operations(runs: &[TextRun]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(runs.len() * 5 + 1);
    ops.push(Operation::new("g", vec![Object::Integer(0)]));

    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![run.font.resource_name().into(), run.size.into()],
        ));
        ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    ops
}
