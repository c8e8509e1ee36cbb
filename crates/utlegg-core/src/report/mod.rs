//! Expense report assembly.
//!
//! A report becomes one PDF: a cover page with the payer's details and
//! the expense table, followed by every attachment in line item order.
//! Each attachment page is captioned with its line item number and
//! description so the reviewer can match receipts to rows.

mod attachment;
mod layout;

pub use attachment::{
    downscale_image, fit_within, image_to_document, load_pdf, PreparedAttachment,
};
pub use layout::{Column, Columns, CoverLayout};

use tracing::{debug, info};

use crate::error::ReportError;
use crate::models::{AttachmentConfig, ExpenseLineItem, ExpenseReport, LayoutConfig, UtleggConfig};
use crate::pdf::{truncate_to_width, Font, PdfWriter, TextRun};

/// Result type for report assembly.
pub type Result<T> = std::result::Result<T, ReportError>;

/// MIME type of generated reports.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A finished report PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    bytes: Vec<u8>,
    page_count: usize,
    file_name: String,
}

impl AssembledDocument {
    /// Serialized PDF.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total number of pages, cover included.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Suggested download name, e.g. `2026-10-16-expense-report.pdf`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        PDF_MIME_TYPE
    }
}

/// Builds report PDFs with a fixed layout.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    layout: LayoutConfig,
    attachments: AttachmentConfig,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler using the layout and attachment settings of `config`.
    pub fn from_config(config: &UtleggConfig) -> Self {
        Self {
            layout: config.layout.clone(),
            attachments: config.attachments.clone(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_attachment_config(mut self, attachments: AttachmentConfig) -> Self {
        self.attachments = attachments;
        self
    }

    /// Assemble the report into a single PDF.
    ///
    /// Any attachment that cannot be embedded fails the whole report.
    pub fn assemble(&self, report: &ExpenseReport) -> Result<AssembledDocument> {
        let labels = report.locale.labels();
        let mut writer = PdfWriter::new().with_title(format!(
            "{} {}",
            labels.title,
            report.date.format("%Y-%m-%d")
        ));

        let cover = CoverLayout::build(report, &self.layout);
        writer.add_text_page(self.layout.page_width, self.layout.page_height, &cover.runs)?;
        debug!("Cover laid out with {:.1} pt rows", cover.row_height);

        for (i, expense) in report.expenses.iter().enumerate() {
            self.append_attachment(&mut writer, report, i + 1, expense)?;
        }

        let page_count = writer.page_count();
        let bytes = writer.finish()?;

        info!(
            "Assembled report with {} items, {} pages, {} bytes",
            report.expenses.len(),
            page_count,
            bytes.len()
        );

        Ok(AssembledDocument {
            bytes,
            page_count,
            file_name: report.file_name(),
        })
    }

    fn append_attachment(
        &self,
        writer: &mut PdfWriter,
        report: &ExpenseReport,
        index: usize,
        expense: &ExpenseLineItem,
    ) -> Result<()> {
        let prepared = PreparedAttachment::resolve(&expense.attachment, index)?;
        let source = prepared.into_document(&self.attachments)?;
        let page_ids = writer.import_document(source)?;

        let caption = format!(
            "{} {}: {}",
            report.locale.labels().attachment,
            index,
            expense.description
        );
        let size = self.layout.caption_size;

        for &page_id in &page_ids {
            let (width, height) = writer.display_size(page_id)?;
            let x = self.layout.margin_left;
            let max_width = (width - x - self.layout.margin_right).max(0.0);
            let run = TextRun::new(
                truncate_to_width(&caption, Font::Bold, size, max_width),
                x,
                height - self.layout.caption_offset,
                size,
                Font::Bold,
            );
            writer.overlay_text(page_id, &[run])?;
        }

        debug!(
            "Attachment {} ({}) added as {} page(s)",
            index,
            prepared.file_name(),
            page_ids.len()
        );
        Ok(())
    }
}

/// Assemble `report` with the default layout.
pub fn generate_pdf(report: &ExpenseReport) -> Result<AssembledDocument> {
    ReportAssembler::default().assemble(report)
}
