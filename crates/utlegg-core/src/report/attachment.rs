//! Attachment resolution: content sniffing, image pages and PDF loading.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::Document;
use tracing::{debug, trace};

use super::Result;
use crate::error::ReportError;
use crate::models::{Attachment, AttachmentConfig};
use crate::pdf::{ImageXObject, PdfWriter};

/// PDF readers accept the header anywhere in the first KiB.
const PDF_HEADER_WINDOW: usize = 1024;

/// An attachment whose encoding has been decided.
#[derive(Debug, Clone, Copy)]
pub enum PreparedAttachment<'a> {
    /// A JPEG or PNG image, shown as a single page.
    Image {
        file_name: &'a str,
        bytes: &'a [u8],
        format: ImageFormat,
    },
    /// A PDF whose pages are copied as they are.
    Document { file_name: &'a str, bytes: &'a [u8] },
}

impl<'a> PreparedAttachment<'a> {
    /// Decide how to embed `attachment` from its bytes.
    ///
    /// The file name is not trusted. `item` is the 1-based line item
    /// number used in errors.
    pub fn resolve(attachment: &'a Attachment, item: usize) -> Result<Self> {
        let file_name = attachment.file_name.as_str();
        let bytes = attachment.bytes.as_slice();

        // Image magic sits at offset 0, while a PDF header may follow junk
        if let Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) = image::guess_format(bytes) {
            trace!("{} sniffed as {:?}", file_name, format);
            return Ok(Self::Image {
                file_name,
                bytes,
                format,
            });
        }

        if is_pdf(bytes) {
            return Ok(Self::Document { file_name, bytes });
        }

        Err(ReportError::UnsupportedAttachment {
            item,
            file_name: file_name.to_string(),
        })
    }

    pub fn file_name(&self) -> &'a str {
        match self {
            Self::Image { file_name, .. } | Self::Document { file_name, .. } => file_name,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Turn the attachment into a document ready for import.
    pub fn into_document(self, config: &AttachmentConfig) -> Result<Document> {
        match self {
            Self::Image {
                file_name,
                bytes,
                format,
            } => image_to_document(file_name, bytes, format, config),
            Self::Document { file_name, bytes } => load_pdf(file_name, bytes),
        }
    }
}

fn is_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Load a PDF attachment, opening it with an empty password if needed.
pub fn load_pdf(file_name: &str, bytes: &[u8]) -> Result<Document> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| ReportError::Pdf(format!("failed to read {}: {}", file_name, e)))?;

    if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(ReportError::Encrypted(file_name.to_string()));
        }
        debug!("Decrypted {} with empty password", file_name);
    }

    if doc.get_pages().is_empty() {
        return Err(ReportError::NoPages(file_name.to_string()));
    }

    Ok(doc)
}

/// Size of an image drawn at one point per pixel, scaled down to fit
/// `max_width` x `max_height`. Never scales up.
pub fn fit_within(width: u32, height: u32, max_width: f32, max_height: f32) -> (f32, f32) {
    let (w, h) = (width as f32, height as f32);
    if w <= 0.0 || h <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / w).min(max_height / h).min(1.0);
    (w * scale, h * scale)
}

/// Render an image as a one-page document with the image centered.
pub fn image_to_document(
    file_name: &str,
    bytes: &[u8],
    format: ImageFormat,
    config: &AttachmentConfig,
) -> Result<Document> {
    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|source| {
        ReportError::Image {
            file_name: file_name.to_string(),
            source,
        }
    })?;

    let (width, height) = (decoded.width(), decoded.height());
    let xobject = image_xobject(bytes, format, decoded);

    let (w, h) = fit_within(width, height, config.max_image_width, config.max_image_height);
    let x = (config.page_width - w) / 2.0;
    let y = (config.page_height - h) / 2.0;
    debug!(
        "Image {} ({}x{} px) placed at {:.1},{:.1} size {:.1}x{:.1}",
        file_name, width, height, x, y, w, h
    );

    let mut writer = PdfWriter::new();
    writer.add_image_page(config.page_width, config.page_height, xobject, (x, y, w, h))?;
    Ok(writer.into_document())
}

fn image_xobject(bytes: &[u8], format: ImageFormat, decoded: DynamicImage) -> ImageXObject {
    let (width, height) = (decoded.width(), decoded.height());

    // Baseline gray and RGB JPEGs are embedded without re-encoding
    if format == ImageFormat::Jpeg {
        let color_space = match jpeg_components(bytes) {
            Some(1) => Some("DeviceGray"),
            Some(3) => Some("DeviceRGB"),
            _ => None,
        };
        if let Some(color_space) = color_space {
            return ImageXObject {
                width,
                height,
                color_space,
                filter: Some("DCTDecode"),
                data: bytes.to_vec(),
            };
        }
    }

    let rgb = if decoded.color().has_alpha() {
        flatten_on_white(&decoded)
    } else {
        decoded.to_rgb8()
    };

    ImageXObject {
        width,
        height,
        color_space: "DeviceRGB",
        filter: None,
        data: rgb.into_raw(),
    }
}

/// Composite a transparent image onto a white background.
fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = src.0;
        let a = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8;
        *dst = Rgb([blend(r), blend(g), blend(b)]);
    }

    rgb
}

/// Number of color components declared in a JPEG frame header.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    if !bytes.starts_with(&[0xff, 0xd8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xff {
            return None;
        }
        let marker = bytes[pos + 1];
        if marker == 0xff {
            pos += 1;
            continue;
        }

        let length = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
        let is_frame = matches!(marker, 0xc0..=0xcf) && !matches!(marker, 0xc4 | 0xc8 | 0xcc);
        if is_frame {
            // FF Cn, length(2), precision(1), height(2), width(2), components(1)
            return bytes.get(pos + 9).copied();
        }
        if marker == 0xda {
            return None;
        }
        pos += 2 + length;
    }

    None
}

/// Shrink an oversized photo so it fits `max_width` x `max_height`
/// pixels, re-encoded as JPEG at `quality`.
///
/// Returns `None` when the bytes are not an image or already fit.
pub fn downscale_image(
    bytes: &[u8],
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<Option<Vec<u8>>> {
    let format = match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        _ => return Ok(None),
    };

    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|source| {
        ReportError::Image {
            file_name: "attachment".to_string(),
            source,
        }
    })?;

    if decoded.width() <= max_width && decoded.height() <= max_height {
        return Ok(None);
    }

    let resized = decoded.resize(max_width, max_height, FilterType::Triangle);
    let rgb = if resized.color().has_alpha() {
        flatten_on_white(&resized)
    } else {
        resized.to_rgb8()
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    DynamicImage::ImageRgb8(rgb)
        .write_with_encoder(encoder)
        .map_err(|source| ReportError::Image {
            file_name: "attachment".to_string(),
            source,
        })?;

    debug!(
        "Downscaled image {}x{} -> {} bytes",
        decoded.width(),
        decoded.height(),
        out.len()
    );
    Ok(Some(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn jpeg_bytes(image: DynamicImage) -> Vec<u8> {
        let mut out = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn test_resolve_by_content() {
        let png = Attachment::new("receipt.pdf", png_bytes(4, 4));
        assert!(PreparedAttachment::resolve(&png, 1).unwrap().is_image());

        let pdf = Attachment::new("receipt.png", b"%PDF-1.4\n...".to_vec());
        assert!(!PreparedAttachment::resolve(&pdf, 1).unwrap().is_image());
    }

    #[test]
    fn test_jpeg_with_pdf_marker_in_comment_is_an_image() {
        let jpeg = jpeg_bytes(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
        let comment = b"%PDF-1.7 scanned by office copier";
        let length = (comment.len() + 2) as u16;

        // COM segment right after SOI
        let mut bytes = jpeg[..2].to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(comment);
        bytes.extend_from_slice(&jpeg[2..]);

        let attachment = Attachment::new("scan.jpg", bytes);
        let prepared = PreparedAttachment::resolve(&attachment, 1).unwrap();
        assert!(prepared.is_image());

        let doc = prepared.into_document(&AttachmentConfig::default()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_text_file_named_jpg_is_rejected() {
        let fake = Attachment::new("kvittering.jpg", b"just some notes".to_vec());
        match PreparedAttachment::resolve(&fake, 3) {
            Err(ReportError::UnsupportedAttachment { item, file_name }) => {
                assert_eq!(item, 3);
                assert_eq!(file_name, "kvittering.jpg");
            }
            other => panic!("expected UnsupportedAttachment, got {:?}", other),
        }
    }

    #[test]
    fn test_gif_is_rejected() {
        let gif = Attachment::new("anim.gif", b"GIF89a\x01\x00\x01\x00".to_vec());
        assert!(matches!(
            PreparedAttachment::resolve(&gif, 1),
            Err(ReportError::UnsupportedAttachment { .. })
        ));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(100, 50, 500.0, 700.0), (100.0, 50.0));
        assert_eq!(fit_within(1000, 700, 500.0, 700.0), (500.0, 350.0));
        assert_eq!(fit_within(500, 1400, 500.0, 700.0), (250.0, 700.0));
        assert_eq!(fit_within(0, 10, 500.0, 700.0), (0.0, 0.0));
    }

    #[test]
    fn test_image_becomes_single_a4_page() {
        let config = AttachmentConfig::default();
        let doc = image_to_document("r.png", &png_bytes(1000, 700), ImageFormat::Png, &config).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_jpeg_components() {
        let rgb = jpeg_bytes(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
        assert_eq!(jpeg_components(&rgb), Some(3));

        let gray = jpeg_bytes(DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([90]))));
        assert_eq!(jpeg_components(&gray), Some(1));

        assert_eq!(jpeg_components(b"not a jpeg"), None);
    }

    #[test]
    fn test_jpeg_is_passed_through() {
        let bytes = jpeg_bytes(DynamicImage::ImageRgb8(RgbImage::new(16, 8)));
        let decoded = image::load_from_memory(&bytes).unwrap();
        let xobject = image_xobject(&bytes, ImageFormat::Jpeg, decoded);

        assert_eq!(xobject.filter, Some("DCTDecode"));
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert_eq!(xobject.data, bytes);
    }

    #[test]
    fn test_transparent_png_is_flattened() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let flat = flatten_on_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_corrupt_png_fails() {
        let mut bytes = png_bytes(4, 4);
        bytes.truncate(20);
        let attachment = Attachment::new("broken.png", bytes);
        let prepared = PreparedAttachment::resolve(&attachment, 1).unwrap();
        assert!(matches!(
            prepared.into_document(&AttachmentConfig::default()),
            Err(ReportError::Image { .. })
        ));
    }

    #[test]
    fn test_unreadable_pdf_fails() {
        let attachment = Attachment::new("broken.pdf", b"%PDF-1.4 garbage".to_vec());
        let prepared = PreparedAttachment::resolve(&attachment, 1).unwrap();
        assert!(prepared.into_document(&AttachmentConfig::default()).is_err());
    }

    #[test]
    fn test_downscale_image() {
        let large = png_bytes(400, 200);
        let out = downscale_image(&large, 100, 100, 80).unwrap().unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (100, 50));

        assert_eq!(downscale_image(&png_bytes(50, 50), 100, 100, 80).unwrap(), None);
        assert_eq!(downscale_image(b"%PDF-1.4", 100, 100, 80).unwrap(), None);
    }
}
