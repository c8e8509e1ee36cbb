//! Cover page layout: identity block and expense summary table.
//!
//! The layout is computed as plain text runs so it can be inspected
//! without rendering. Column positions are fractions of the usable
//! width, so the table follows the configured page size.

use tracing::debug;

use crate::models::{ExpenseReport, LayoutConfig};
use crate::pdf::{text_width, truncate_to_width, Font, TextRun};

/// A table column in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub x: f32,
    pub width: f32,
}

impl Column {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// The four summary table columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Columns {
    pub attachment: Column,
    pub description: Column,
    pub category: Column,
    pub amount: Column,
}

impl Columns {
    /// Lay out columns left to right across the usable width.
    pub fn new(layout: &LayoutConfig) -> Self {
        let usable = layout.usable_width();
        let fractions = &layout.columns;

        let attachment = Column {
            x: layout.margin_left,
            width: usable * fractions.attachment,
        };
        let description = Column {
            x: attachment.right(),
            width: usable * fractions.description,
        };
        let category = Column {
            x: description.right(),
            width: usable * fractions.category,
        };
        let amount = Column {
            x: category.right(),
            width: usable * fractions.amount,
        };

        Self {
            attachment,
            description,
            category,
            amount,
        }
    }
}

/// Text runs of the cover page.
#[derive(Debug, Clone, Default)]
pub struct CoverLayout {
    pub runs: Vec<TextRun>,
    /// Row pitch actually used for the table.
    pub row_height: f32,
}

impl CoverLayout {
    /// Lay out the cover page for `report`.
    ///
    /// The table always ends on the cover page: when the rows and the
    /// total would not fit above the bottom margin at the configured row
    /// height, the row pitch and font sizes shrink proportionally.
    pub fn build(report: &ExpenseReport, layout: &LayoutConfig) -> Self {
        let labels = report.locale.labels();
        let top = layout.page_height;
        let columns = Columns::new(layout);
        let mut runs = Vec::new();

        runs.push(TextRun::new(
            labels.title,
            layout.margin_left,
            top - layout.title_offset,
            layout.title_size,
            Font::Bold,
        ));

        let info_lines = [
            (labels.name, report.payer.name.clone()),
            (labels.address, report.payer.address_line()),
            (labels.bank_account, report.bank_account_clean()),
            (labels.email, report.email.clone()),
            (labels.date, report.locale.format_date(report.date)),
        ];

        let value_x = layout.margin_left + layout.info_label_width;
        let value_width = layout.page_width - layout.margin_right - value_x;
        let info_y = |i: usize| top - layout.info_offset - i as f32 * layout.info_spacing;
        for (i, (label, value)) in info_lines.iter().enumerate() {
            let y = info_y(i);
            runs.push(TextRun::new(*label, layout.margin_left, y, layout.info_size, Font::Bold));
            runs.push(TextRun::new(
                truncate_to_width(value, Font::Regular, layout.info_size, value_width),
                value_x,
                y,
                layout.info_size,
                Font::Regular,
            ));
        }

        let header_y = info_y(info_lines.len() - 1) - layout.table_gap;
        push_header(&mut runs, report, layout, &columns, header_y);

        // Item rows plus the total row
        let rows = report.expenses.len() + 1;
        let row_height = fitted_row_height(layout, header_y, rows);
        let scale = if layout.row_height > 0.0 {
            row_height / layout.row_height
        } else {
            1.0
        };
        let size = layout.row_size * scale;
        let total_size = layout.header_size * scale;
        if scale < 1.0 {
            debug!(
                "{} rows do not fit at {} pt, using {:.2} pt",
                rows, layout.row_height, row_height
            );
        }

        let mut y = header_y;
        for (i, expense) in report.expenses.iter().enumerate() {
            y -= row_height;
            if !expense.attachment.is_empty() {
                runs.push(TextRun::new(
                    (i + 1).to_string(),
                    columns.attachment.x,
                    y,
                    size,
                    Font::Regular,
                ));
            }
            runs.push(left_aligned(&expense.description, columns.description, y, size, Font::Regular, layout));
            runs.push(left_aligned(
                &expense.category.full_name(),
                columns.category,
                y,
                size,
                Font::Regular,
                layout,
            ));
            runs.push(right_aligned(
                report.locale.format_amount(expense.amount),
                columns.amount,
                y,
                size,
                Font::Regular,
            ));
        }

        y -= row_height;
        runs.push(TextRun::new(labels.total, columns.category.x, y, total_size, Font::Bold));
        runs.push(right_aligned(
            report.locale.format_amount(report.total()),
            columns.amount,
            y,
            total_size,
            Font::Bold,
        ));

        Self { runs, row_height }
    }
}

/// Row pitch that fits `rows` rows between the header at `header_y` and
/// the bottom margin, capped at the configured row height.
fn fitted_row_height(layout: &LayoutConfig, header_y: f32, rows: usize) -> f32 {
    let available = (header_y - layout.margin_bottom).max(0.0);
    layout.row_height.min(available / rows.max(1) as f32)
}

fn push_header(
    runs: &mut Vec<TextRun>,
    report: &ExpenseReport,
    layout: &LayoutConfig,
    columns: &Columns,
    y: f32,
) {
    let labels = report.locale.labels();
    let size = layout.header_size;

    runs.push(left_aligned(labels.attachment_column, columns.attachment, y, size, Font::Bold, layout));
    runs.push(left_aligned(labels.description, columns.description, y, size, Font::Bold, layout));
    runs.push(left_aligned(labels.category, columns.category, y, size, Font::Bold, layout));
    runs.push(right_aligned(labels.amount.to_string(), columns.amount, y, size, Font::Bold));
}

fn left_aligned(
    text: &str,
    column: Column,
    y: f32,
    size: f32,
    font: Font,
    layout: &LayoutConfig,
) -> TextRun {
    let max_width = (column.width - layout.column_padding).max(0.0);
    TextRun::new(truncate_to_width(text, font, size, max_width), column.x, y, size, font)
}

fn right_aligned(text: String, column: Column, y: f32, size: f32, font: Font) -> TextRun {
    let x = column.right() - text_width(&text, font, size);
    TextRun::new(text, x, y, size, font)
}
