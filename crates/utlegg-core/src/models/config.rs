//! Configuration structures for report generation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, UtleggError};
use crate::locale::Locale;

/// A4 in PDF points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// Main configuration for utlegg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtleggConfig {
    /// Report defaults.
    pub report: ReportConfig,

    /// Cover page geometry.
    pub layout: LayoutConfig,

    /// Attachment page handling.
    pub attachments: AttachmentConfig,
}

/// Report defaults used by the front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Locale used when a report does not specify one.
    pub locale: Locale,

    /// Directory where generated reports are written (default: current directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Run form validation before generating.
    pub validate: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale: Locale::NbNo,
            output_dir: None,
            validate: true,
        }
    }
}

/// Cover page geometry in PDF points, measured from the page edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,

    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,

    /// Distance from the top edge to the title baseline.
    pub title_offset: f32,
    pub title_size: f32,

    /// Distance from the top edge to the first identity line.
    pub info_offset: f32,
    /// Vertical distance between identity lines.
    pub info_spacing: f32,
    /// Horizontal space reserved for identity labels.
    pub info_label_width: f32,
    pub info_size: f32,

    /// Gap between the last identity line and the table header.
    pub table_gap: f32,
    pub row_height: f32,
    pub header_size: f32,
    pub row_size: f32,
    /// Space kept free at the right of left-aligned columns.
    pub column_padding: f32,
    /// Column widths as fractions of the usable page width.
    pub columns: ColumnFractions,

    /// Distance from the top edge to attachment captions.
    pub caption_offset: f32,
    pub caption_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin_left: 50.0,
            margin_right: 50.0,
            margin_bottom: 50.0,
            title_offset: 50.0,
            title_size: 24.0,
            info_offset: 120.0,
            info_spacing: 30.0,
            info_label_width: 100.0,
            info_size: 12.0,
            table_gap: 40.0,
            row_height: 22.0,
            header_size: 12.0,
            row_size: 10.0,
            column_padding: 8.0,
            columns: ColumnFractions::default(),
            caption_offset: 30.0,
            caption_size: 12.0,
        }
    }
}

impl LayoutConfig {
    /// Page width minus the left and right margins.
    pub fn usable_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }
}

/// Relative widths of the summary table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnFractions {
    pub attachment: f32,
    pub description: f32,
    pub category: f32,
    pub amount: f32,
}

impl Default for ColumnFractions {
    fn default() -> Self {
        Self {
            attachment: 0.08,
            description: 0.42,
            category: 0.32,
            amount: 0.18,
        }
    }
}

/// How image attachments become pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentConfig {
    /// Page size used for images.
    pub page_width: f32,
    pub page_height: f32,

    /// Images larger than this box are scaled down to fit it.
    pub max_image_width: f32,
    pub max_image_height: f32,

    /// Pixel bounds used when downscaling photos before assembly.
    pub resize_max_width: u32,
    pub resize_max_height: u32,

    /// JPEG quality (1-100) for downscaled photos.
    pub resize_quality: u8,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            max_image_width: 500.0,
            max_image_height: 700.0,
            resize_max_width: 1600,
            resize_max_height: 1600,
            resize_quality: 80,
        }
    }
}

impl UtleggConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| UtleggError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| UtleggError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_fractions_cover_usable_width() {
        let c = ColumnFractions::default();
        let sum = c.attachment + c.description + c.category + c.amount;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: UtleggConfig =
            serde_json::from_str(r#"{"report": {"locale": "en-GB"}, "layout": {"row_height": 18}}"#)
                .unwrap();
        assert_eq!(config.report.locale, Locale::EnGb);
        assert!(config.report.validate);
        assert_eq!(config.layout.row_height, 18.0);
        assert_eq!(config.layout.page_width, A4_WIDTH);
        assert_eq!(config.attachments, AttachmentConfig::default());
    }

    #[test]
    fn test_usable_width() {
        let layout = LayoutConfig::default();
        assert!((layout.usable_width() - 495.28).abs() < 1e-3);
    }
}
