//! XObject creation for N-up composition
//!
//! Source PDF pages become Form XObjects and source images become Image
//! XObjects; both are then placed onto output pages with a transformation.

use crate::layout::Rect;
use crate::source::{
    SourceContent, SourceDocument, display_transform, inherited_attribute, pdf_page_rect,
    pdf_page_rotation,
};
use crate::types::Result;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::HashMap;

/// Something that can be drawn into a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drawable {
    /// Form XObject drawn in the page's display space
    Form(ObjectId),
    /// Image XObject drawn over a `width` x `height` point area at the origin
    Image {
        id: ObjectId,
        width: f32,
        height: f32,
    },
}

impl Drawable {
    pub fn object_id(&self) -> ObjectId {
        match *self {
            Drawable::Form(id) | Drawable::Image { id, .. } => id,
        }
    }
}

/// Import one page of a source into the output as a drawable XObject.
///
/// `cache` maps source object IDs to their copies in `output` and should be
/// shared by all pages of the same source, so shared resources (fonts,
/// images) are copied once.
pub fn import_page(
    output: &mut Document,
    source: &SourceDocument,
    page_index: usize,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Drawable> {
    match source.content() {
        SourceContent::Pdf {
            document, page_ids, ..
        } => {
            let page_id = page_ids[page_index];
            Ok(Drawable::Form(create_page_xobject(
                output, document, page_id, cache,
            )?))
        }
        SourceContent::Image(image) => Ok(create_image_xobject(output, image)),
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// The BBox is the visible page rectangle, so anything outside the crop box
/// is clipped by the XObject itself. Pages with a `/Rotate` get a `/Matrix`
/// that turns them upright, so the form is drawn the way viewers show the
/// page.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Cache to avoid copying the same object multiple times
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let bbox = pdf_page_rect(source, page_id);

    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", rect_to_array(&bbox));
    xobject_dict.set("FormType", Object::Integer(1));
    if let Some(matrix) = display_transform(&bbox, pdf_page_rotation(source, page_id)) {
        xobject_dict.set(
            "Matrix",
            Object::Array(matrix.iter().map(|&v| Object::Real(v)).collect()),
        );
    }

    // Resources may be inherited from the page tree
    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

/// Create an Image XObject from a decoded image.
///
/// Transparent images get a soft mask so their alpha survives.
pub fn create_image_xobject(output: &mut Document, image: &DynamicImage) -> Drawable {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };

    if image.color().has_alpha() && alpha.iter().any(|&a| a != 255) {
        let smask_id = output.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        image_dict.set("SMask", Object::Reference(smask_id));
    }

    let id = output.add_object(Stream::new(image_dict, rgb));
    Drawable::Image {
        id,
        width: width as f32,
        height: height as f32,
    }
}

/// PDF rectangle array `[llx lly urx ury]`
pub fn rect_to_array(rect: &Rect) -> Object {
    Object::Array(vec![
        Object::Real(rect.x),
        Object::Real(rect.y),
        Object::Real(rect.right()),
        Object::Real(rect.top()),
    ])
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the content stream data from a page.
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id)? {
            // A reference may point at an array of stream references
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            _ => get_single_content_stream(doc, *id),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

/// Get content from a single content stream reference.
///
/// The form is written without a `/Filter`, so filtered streams must decode;
/// a stream that does not is an error rather than raw bytes.
fn get_single_content_stream(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    match doc.get_object(id)?.as_stream() {
        Ok(stream) if stream.dict.has(b"Filter") => Ok(stream.decompressed_content()?),
        Ok(stream) => Ok(stream.content.clone()),
        Err(_) => Ok(Vec::new()),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Object::Reference(id) = obj {
            let content = get_single_content_stream(doc, *id)?;
            result.extend_from_slice(&content);
            result.push(b'\n');
        }
    }

    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. Page tree
/// back-links (`/Parent`) are dropped so a copied annotation or widget does
/// not drag the whole source page tree along.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the ID before recursing so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}
