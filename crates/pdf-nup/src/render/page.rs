//! Output page rendering
//!
//! A [`PageCanvas`] collects content stream operations and XObject
//! resources for one output page. Canvases stay editable until
//! [`assemble_document`] turns them into the page tree, which lets the
//! footer pass run after every page has been placed.

use crate::constants::LABEL_FONT_NAME;
use crate::layout::{FittedContent, Rect};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::text::{TextLabel, add_helvetica_font};
use super::xobject::{Drawable, rect_to_array};

/// Content of one output page under construction
#[derive(Debug, Clone)]
pub struct PageCanvas {
    width_pt: f32,
    height_pt: f32,
    ops: Vec<String>,
    xobjects: Dictionary,
    uses_font: bool,
}

impl PageCanvas {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            uses_font: false,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width_pt, self.height_pt)
    }

    /// Draw `drawable`, clipped to `clip` in source space, at `fitted`.
    pub fn place(&mut self, drawable: Drawable, clip: &Rect, fitted: &FittedContent) {
        let name = format!("P{}", self.xobjects.len());
        self.xobjects
            .set(name.as_bytes(), Object::Reference(drawable.object_id()));
        self.ops.push(placement_ops(&name, drawable, clip, fitted));
    }

    /// Draw a text label with the shared label font
    pub fn draw_label(&mut self, label: &TextLabel) {
        self.uses_font = true;
        self.ops.push(label.to_ops(LABEL_FONT_NAME));
    }

    pub fn content(&self) -> String {
        self.ops.concat()
    }
}

/// Content stream operations placing one XObject.
///
/// The clip path is set in output space (the scaled clip rectangle), then
/// the source-to-output matrix is applied. Images additionally map their
/// unit square onto their pixel extent.
fn placement_ops(name: &str, drawable: Drawable, clip: &Rect, fitted: &FittedContent) -> String {
    let [a, b, c, d, e, f] = fitted.matrix();
    let dest = &fitted.dest;
    let image_matrix = match drawable {
        Drawable::Form(_) => String::new(),
        Drawable::Image { width, height, .. } => format!("{} 0 0 {} 0 0 cm ", width, height),
    };
    debug_assert!(clip.width > 0.0 && clip.height > 0.0);

    format!(
        "q {} {} {} {} re W n {} {} {} {} {} {} cm {}/{} Do Q\n",
        dest.x, dest.y, dest.width, dest.height, a, b, c, d, e, f, image_matrix, name
    )
}

/// Turn finished canvases into a complete document with page tree and catalog.
///
/// A single Helvetica font object is shared by every page that draws labels.
pub fn assemble_document(
    output: &mut Document,
    canvases: Vec<PageCanvas>,
) -> Result<Vec<ObjectId>> {
    let pages_tree_id = output.new_object_id();
    let font_id = canvases
        .iter()
        .any(|c| c.uses_font)
        .then(|| add_helvetica_font(output));

    let mut page_ids = Vec::with_capacity(canvases.len());
    for canvas in canvases {
        page_ids.push(render_canvas(output, canvas, pages_tree_id, font_id)?);
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_ids.len() as i64)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(page_ids)
}

fn render_canvas(
    output: &mut Document,
    canvas: PageCanvas,
    parent_pages_id: ObjectId,
    font_id: Option<ObjectId>,
) -> Result<ObjectId> {
    let content = canvas.content();
    let PageCanvas {
        width_pt,
        height_pt,
        xobjects,
        uses_font,
        ..
    } = canvas;

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        rect_to_array(&Rect::new(0.0, 0.0, width_pt, height_pt)),
    );

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));
    if let (true, Some(font_id)) = (uses_font, font_id) {
        let mut fonts = Dictionary::new();
        fonts.set(LABEL_FONT_NAME, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
    }

    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}
