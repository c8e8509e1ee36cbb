//! Incremental PDF document builder on top of lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::{text_operations, Font, Result, TextRun};
use crate::error::ReportError;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Media box assumed for pages that declare none (US Letter).
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Resource name of the image on an image page.
const IMAGE_RESOURCE: &str = "UtIm1";

/// Object types that belong to a source document's structure rather
/// than to its pages, and are dropped when importing.
const STRUCTURAL_TYPES: [&[u8]; 6] = [b"Catalog", b"Pages", b"Outlines", b"Outline", b"XRef", b"ObjStm"];

/// An image ready to be placed as an XObject.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `DeviceRGB` or `DeviceGray`.
    pub color_space: &'static str,
    /// Stream filter already applied to `data` (e.g. `DCTDecode`), if any.
    pub filter: Option<&'static str>,
    /// Image samples, raw or encoded according to `filter`.
    pub data: Vec<u8>,
}

impl ImageXObject {
    fn into_stream(self) -> Stream {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
        };

        match self.filter {
            Some(filter) => {
                dict.set("Filter", filter);
                Stream::new(dict, self.data).with_compression(false)
            }
            None => Stream::new(dict, self.data),
        }
    }
}

/// Builds a PDF page by page.
///
/// Pages are either drawn from scratch with the standard Helvetica fonts
/// or imported from other documents. Text can be laid over any page.
pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    regular_font_id: ObjectId,
    bold_font_id: ObjectId,
    kids: Vec<ObjectId>,
    title: Option<String>,
}

impl PdfWriter {
    /// Create an empty document.
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular_font_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_font_id = doc.add_object(font_dictionary(Font::Bold));

        Self {
            doc,
            pages_id,
            regular_font_id,
            bold_font_id,
            kids: Vec::new(),
            title: None,
        }
    }

    /// Set the document title shown by PDF readers.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a new page of the given size with `runs` drawn on it.
    pub fn add_text_page(&mut self, width: f32, height: f32, runs: &[TextRun]) -> Result<ObjectId> {
        let content_id = self.add_content(text_operations(runs))?;
        let fonts = self.font_resources();

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(width, height),
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => fonts },
        });

        self.kids.push(page_id);
        trace!("Added text page {:?} with {} runs", page_id, runs.len());
        Ok(page_id)
    }

    /// Append a page showing `image` in the rectangle `(x, y, w, h)`.
    pub fn add_image_page(
        &mut self,
        width: f32,
        height: f32,
        image: ImageXObject,
        rect: (f32, f32, f32, f32),
    ) -> Result<ObjectId> {
        let (x, y, w, h) = rect;
        let image_id = self.doc.add_object(image.into_stream());

        let content_id = self.add_content(vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
            ),
            Operation::new("Do", vec![IMAGE_RESOURCE.into()]),
            Operation::new("Q", vec![]),
        ])?;

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(width, height),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_RESOURCE => image_id },
            },
        });

        self.kids.push(page_id);
        Ok(page_id)
    }

    /// Copy every page of `source` into this document, in order.
    ///
    /// Returns the ids of the copied pages. Attributes the pages inherit
    /// from the source page tree are flattened onto each page.
    pub fn import_document(&mut self, mut source: Document) -> Result<Vec<ObjectId>> {
        source.renumber_objects_with(self.doc.max_id + 1);
        self.doc.max_id = self.doc.max_id.max(source.max_id);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        let inherited: Vec<(ObjectId, Vec<(&'static [u8], Object)>)> = page_ids
            .iter()
            .map(|&id| (id, inherited_attributes(&source, id)))
            .collect();

        let mut copied = 0usize;
        for (id, object) in source.objects {
            let structural = object_type(&object)
                .is_some_and(|t| STRUCTURAL_TYPES.iter().any(|s| *s == t));
            if !structural {
                self.doc.objects.insert(id, object);
                copied += 1;
            }
        }

        for (page_id, attributes) in inherited {
            let page = self
                .doc
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)?;
            for (key, value) in attributes {
                if !page.has(key) {
                    page.set(key, value);
                }
            }
            if !page.has(b"MediaBox") {
                let [llx, lly, urx, ury] = DEFAULT_MEDIA_BOX;
                page.set(
                    "MediaBox",
                    vec![llx.into(), lly.into(), urx.into(), ury.into()],
                );
            }
            page.set("Parent", self.pages_id);
            self.kids.push(page_id);
        }

        debug!("Imported {} pages ({} objects)", page_ids.len(), copied);
        Ok(page_ids)
    }

    /// Page bounds as `[llx, lly, urx, ury]`.
    pub fn page_box(&self, page_id: ObjectId) -> Result<[f32; 4]> {
        let page = self.doc.get_dictionary(page_id)?;
        let Ok(value) = page.get(b"MediaBox") else {
            return Ok(DEFAULT_MEDIA_BOX);
        };

        let (_, value) = self.doc.dereference(value)?;
        let numbers: Vec<f32> = value
            .as_array()?
            .iter()
            .filter_map(|v| v.as_float().ok())
            .collect();

        match numbers.as_slice() {
            [a, b, c, d] => Ok([a.min(*c), b.min(*d), a.max(*c), b.max(*d)]),
            _ => Err(ReportError::Pdf(format!(
                "malformed MediaBox on page {:?}",
                page_id
            ))),
        }
    }

    /// Clockwise display rotation of a page: 0, 90, 180 or 270.
    pub fn page_rotation(&self, page_id: ObjectId) -> Result<i64> {
        let page = self.doc.get_dictionary(page_id)?;
        let Ok(value) = page.get(b"Rotate") else {
            return Ok(0);
        };
        let (_, value) = self.doc.dereference(value)?;
        Ok(value.as_i64().unwrap_or(0).rem_euclid(360) / 90 * 90)
    }

    /// Page width and height as a viewer shows them, after `/Rotate`.
    pub fn display_size(&self, page_id: ObjectId) -> Result<(f32, f32)> {
        let [llx, lly, urx, ury] = self.page_box(page_id)?;
        let (width, height) = (urx - llx, ury - lly);
        Ok(match self.page_rotation(page_id)? {
            90 | 270 => (height, width),
            _ => (width, height),
        })
    }

    /// Matrix from display coordinates to the page's user space.
    fn display_matrix(&self, page_id: ObjectId) -> Result<[f32; 6]> {
        let [llx, lly, urx, ury] = self.page_box(page_id)?;
        Ok(match self.page_rotation(page_id)? {
            90 => [0.0, 1.0, -1.0, 0.0, urx, lly],
            180 => [-1.0, 0.0, 0.0, -1.0, urx, ury],
            270 => [0.0, -1.0, 1.0, 0.0, llx, ury],
            _ => [1.0, 0.0, 0.0, 1.0, llx, lly],
        })
    }

    /// Draw `runs` on top of an existing page.
    ///
    /// Run positions are in display coordinates: the origin is the lower
    /// left corner of the page as a viewer shows it, so text stays upright
    /// on rotated pages. The page's own content is wrapped in a saved
    /// graphics state so its transformations do not affect the overlay.
    pub fn overlay_text(&mut self, page_id: ObjectId, runs: &[TextRun]) -> Result<()> {
        let existing = self.page_contents(page_id)?;
        let resources = self.resources_with_fonts(page_id)?;
        let matrix = self.display_matrix(page_id)?;

        let save_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let mut operations = vec![
            Operation::new("Q", vec![]),
            Operation::new("cm", matrix.iter().map(|&v| v.into()).collect()),
        ];
        operations.extend(text_operations(runs));
        let overlay_id = self.add_content(operations)?;

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        contents.push(Object::Reference(overlay_id));

        let page = self
            .doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page.set("Contents", contents);
        page.set("Resources", resources);
        Ok(())
    }

    /// Finish the page tree and catalog and return the document.
    pub fn into_document(mut self) -> Document {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = self.doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("utlegg"),
            });
            self.doc.trailer.set("Info", info_id);
        }

        self.doc
    }

    /// Serialize the finished document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut doc = self.into_document();
        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| ReportError::Pdf(format!("failed to save PDF: {}", e)))?;
        Ok(output)
    }

    fn add_content(&mut self, operations: Vec<Operation>) -> Result<ObjectId> {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ReportError::Content(e.to_string()))?;
        Ok(self.doc.add_object(Stream::new(Dictionary::new(), encoded)))
    }

    fn font_resources(&self) -> Dictionary {
        dictionary! {
            Font::Regular.resource_name() => self.regular_font_id,
            Font::Bold.resource_name() => self.bold_font_id,
        }
    }

    /// Content stream references of a page, flattened to a list.
    fn page_contents(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let page = self.doc.get_dictionary(page_id)?;
        let contents = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Ok(contents)
    }

    /// The page's resource dictionary with our fonts added.
    fn resources_with_fonts(&self, page_id: ObjectId) -> Result<Dictionary> {
        let page = self.doc.get_dictionary(page_id)?;
        let mut resources = self.resolve_dictionary(page.get(b"Resources").ok())?;
        let mut fonts = self.resolve_dictionary(resources.get(b"Font").ok())?;

        for (name, value) in self.font_resources().iter() {
            fonts.set(name.clone(), value.clone());
        }
        resources.set("Font", fonts);
        Ok(resources)
    }

    fn resolve_dictionary(&self, value: Option<&Object>) -> Result<Dictionary> {
        match value {
            Some(value) => match self.doc.dereference(value)? {
                (_, Object::Dictionary(dict)) => Ok(dict.clone()),
                _ => Ok(Dictionary::new()),
            },
            None => Ok(Dictionary::new()),
        }
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn font_dictionary(font: Font) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    vec![0.into(), 0.into(), width.into(), height.into()]
}

fn object_type(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").and_then(Object::as_name).ok()
}

/// Collect attributes `page_id` inherits from its ancestors and does not
/// define itself. The nearest ancestor wins.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found: Vec<(&'static [u8], Object)> = Vec::new();
    let Ok(page) = doc.get_dictionary(page_id) else {
        return found;
    };

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(node_id) = parent {
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };

        for key in INHERITABLE {
            if page.has(key) || found.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
            }
        }

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
        if depth > 64 {
            break;
        }
    }

    found
}
