//! Source documents
//!
//! A source is either a PDF (parsed with lopdf, raw bytes kept for
//! rasterization) or a decoded image that acts as a single page whose
//! native size is its pixel size (1 px = 1 pt).

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::layout::Rect;
use crate::types::*;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// Maximum depth followed when looking up inherited page attributes
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Parsed content of a source file
pub enum SourceContent {
    Pdf {
        document: Document,
        bytes: Vec<u8>,
        page_ids: Vec<ObjectId>,
    },
    Image(DynamicImage),
}

/// An opened input file
pub struct SourceDocument {
    path: Option<PathBuf>,
    content: SourceContent,
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("path", &self.path)
            .field("kind", &if self.is_pdf() { "pdf" } else { "image" })
            .field("pages", &self.page_count())
            .finish()
    }
}

impl SourceDocument {
    /// Open a PDF or image from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, Some(path.to_owned()))
    }

    /// Build a source from file contents, sniffing PDF vs image
    pub fn from_bytes(bytes: Vec<u8>, path: Option<PathBuf>) -> Result<Self> {
        if looks_like_pdf(&bytes) {
            let mut source = Self::from_pdf_bytes(bytes)?;
            source.path = path;
            return Ok(source);
        }

        if image::guess_format(&bytes).is_err() {
            return Err(NupError::UnsupportedSource(path.unwrap_or_default()));
        }
        let image = image::load_from_memory(&bytes)?;
        Ok(Self {
            path,
            content: SourceContent::Image(image),
        })
    }

    /// Parse a PDF held in memory
    pub fn from_pdf_bytes(bytes: Vec<u8>) -> Result<Self> {
        let document = Document::load_mem(&bytes)?;
        let page_ids = document.get_pages().values().copied().collect();
        Ok(Self {
            path: None,
            content: SourceContent::Pdf {
                document,
                bytes,
                page_ids,
            },
        })
    }

    /// Wrap an already parsed lopdf document. The document is serialized
    /// once so pages can still be rasterized.
    pub fn from_document(mut document: Document) -> Result<Self> {
        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;
        let page_ids = document.get_pages().values().copied().collect();
        Ok(Self {
            path: None,
            content: SourceContent::Pdf {
                document,
                bytes,
                page_ids,
            },
        })
    }

    /// Wrap a decoded image as a one-page source
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            path: None,
            content: SourceContent::Image(image),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &SourceContent {
        &self.content
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self.content, SourceContent::Pdf { .. })
    }

    pub fn page_count(&self) -> usize {
        match &self.content {
            SourceContent::Pdf { page_ids, .. } => page_ids.len(),
            SourceContent::Image(_) => 1,
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.page_count();
        if index < count {
            Ok(())
        } else {
            Err(NupError::PageOutOfRange { index, count })
        }
    }

    /// Rectangle of a page as it is displayed: the visible (crop) box for
    /// PDFs, turned by the page's `/Rotate`, and the pixel extent for images.
    ///
    /// Unrotated pages keep their native coordinates. A page turned by a
    /// right angle is described in the display space set up by
    /// [`display_transform`], whose origin is the displayed lower-left corner.
    pub fn page_rect(&self, index: usize) -> Result<Rect> {
        let native = self.native_page_rect(index)?;
        let rotation = self.page_rotation(index)?;
        Ok(display_rect(&native, rotation))
    }

    /// Page rectangle in the page's own coordinates, ignoring `/Rotate`
    pub fn native_page_rect(&self, index: usize) -> Result<Rect> {
        self.check_index(index)?;
        match &self.content {
            SourceContent::Pdf {
                document, page_ids, ..
            } => Ok(pdf_page_rect(document, page_ids[index])),
            SourceContent::Image(image) => Ok(Rect::new(
                0.0,
                0.0,
                image.width() as f32,
                image.height() as f32,
            )),
        }
    }

    /// Page rotation in degrees (`/Rotate`, normalized to 0..360)
    pub fn page_rotation(&self, index: usize) -> Result<i64> {
        self.check_index(index)?;
        match &self.content {
            SourceContent::Pdf {
                document, page_ids, ..
            } => Ok(pdf_page_rotation(document, page_ids[index])),
            SourceContent::Image(_) => Ok(0),
        }
    }
}

/// PDF files start with `%PDF-`, possibly after some leading junk
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(5).any(|w| w == b"%PDF-")
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Look up a page attribute, following `/Parent` for inheritable keys
/// such as MediaBox, CropBox, Resources and Rotate.
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current: &Dictionary = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(obj) = current.get(key) {
            return doc.dereference(obj).ok().map(|(_, obj)| obj);
        }
        let parent = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Read a `[llx lly urx ury]` box attribute
pub(crate) fn page_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Rect> {
    let arr = inherited_attribute(doc, page_id, key)?.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }

    let mut coords = [0.0f32; 4];
    for (slot, obj) in coords.iter_mut().zip(arr) {
        let obj = doc.dereference(obj).ok()?.1;
        *slot = extract_number(obj)?;
    }

    Some(Rect::from_corners(coords[0], coords[1], coords[2], coords[3]))
}

/// The visible page rectangle: CropBox clipped to MediaBox, or MediaBox
/// alone, or US Letter when neither is usable.
pub(crate) fn pdf_page_rect(doc: &Document, page_id: ObjectId) -> Rect {
    let (default_width, default_height) = DEFAULT_PAGE_DIMENSIONS;
    let media = page_box(doc, page_id, b"MediaBox")
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| Rect::new(0.0, 0.0, default_width, default_height));

    match page_box(doc, page_id, b"CropBox") {
        Some(crop) => {
            let visible = crop.intersect(&media);
            if visible.is_empty() { media } else { visible }
        }
        None => media,
    }
}

/// `/Rotate` of a page in degrees, normalized to 0..360
pub(crate) fn pdf_page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .map(|deg| deg.rem_euclid(360))
        .unwrap_or(0)
}

/// Matrix taking native page coordinates to display coordinates for a
/// page turned clockwise by `rotation` degrees.
///
/// `None` for unrotated pages and for angles that are not a right angle,
/// which are drawn as if unrotated.
pub(crate) fn display_transform(native: &Rect, rotation: i64) -> Option<[f32; 6]> {
    let (x0, y0) = (native.x, native.y);
    let (x1, y1) = (native.right(), native.top());
    match rotation {
        90 => Some([0.0, -1.0, 1.0, 0.0, -y0, x1]),
        180 => Some([-1.0, 0.0, 0.0, -1.0, x1, y1]),
        270 => Some([0.0, 1.0, -1.0, 0.0, y1, -x0]),
        _ => None,
    }
}

/// The rectangle `native` covers once [`display_transform`] is applied
pub(crate) fn display_rect(native: &Rect, rotation: i64) -> Rect {
    match rotation {
        90 | 270 => Rect::new(0.0, 0.0, native.height, native.width),
        180 => Rect::new(0.0, 0.0, native.width, native.height),
        _ => *native,
    }
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use lopdf::{Stream, dictionary};

    fn pdf_with_inherited_box() -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "CropBox" => vec![10.into(), 10.into(), 110.into(), 210.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
                "Rotate" => 450,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_page_rect_uses_crop_box_and_inherits() {
        let source = SourceDocument::from_document(pdf_with_inherited_box()).unwrap();
        assert_eq!(source.page_count(), 1);
        assert_eq!(
            source.native_page_rect(0).unwrap(),
            Rect::new(10.0, 10.0, 100.0, 200.0)
        );
        assert_eq!(source.page_rotation(0).unwrap(), 90);
        // Displayed a quarter turn clockwise: width and height swap
        assert_eq!(source.page_rect(0).unwrap(), Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    fn apply(m: [f32; 6], x: f32, y: f32) -> (f32, f32) {
        (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
    }

    #[test]
    fn test_display_transform_maps_box_onto_display_rect() {
        let native = Rect::new(10.0, 20.0, 100.0, 200.0);
        for rotation in [90, 180, 270] {
            let m = display_transform(&native, rotation).unwrap();
            let shown = display_rect(&native, rotation);
            let (ax, ay) = apply(m, native.x, native.y);
            let (bx, by) = apply(m, native.right(), native.top());
            let mapped = Rect::from_corners(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by));
            assert_eq!(mapped, shown, "rotation {}", rotation);
        }
        assert_eq!(display_transform(&native, 0), None);
        assert_eq!(display_transform(&native, 45), None);
        assert_eq!(display_rect(&native, 45), native);
    }

    #[test]
    fn test_quarter_turn_moves_top_left_to_top_right() {
        // Clockwise: the native top-left corner ends up top-right
        let native = Rect::new(0.0, 0.0, 612.0, 792.0);
        let m = display_transform(&native, 90).unwrap();
        assert_eq!(apply(m, 0.0, 792.0), (792.0, 612.0));
        let m = display_transform(&native, 270).unwrap();
        assert_eq!(apply(m, 0.0, 792.0), (0.0, 0.0));
    }

    #[test]
    fn test_image_source_is_single_page() {
        let source = SourceDocument::from_image(DynamicImage::ImageRgb8(RgbImage::new(40, 30)));
        assert!(!source.is_pdf());
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.page_rect(0).unwrap(), Rect::new(0.0, 0.0, 40.0, 30.0));
        assert!(matches!(
            source.page_rect(1),
            Err(NupError::PageOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_from_bytes_rejects_unknown_data() {
        let result = SourceDocument::from_bytes(b"not a pdf, not an image".to_vec(), None);
        assert!(matches!(result, Err(NupError::UnsupportedSource(_))));
    }
}
