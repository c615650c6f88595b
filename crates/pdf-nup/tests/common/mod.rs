#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

/// A PDF with `num_pages` Letter pages, each drawing its 1-based number
pub fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 24 Tf 100 700 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// A one-page Letter PDF whose page carries `/Rotate rotation`
pub fn create_rotated_test_pdf(rotation: i64) -> Document {
    let mut doc = create_test_pdf(1);
    let page_id = *doc.get_pages().values().next().expect("one page");
    doc.get_dictionary_mut(page_id)
        .expect("page dictionary")
        .set("Rotate", rotation);
    doc
}

/// Save a test PDF with `num_pages` pages under `dir`
pub fn write_test_pdf(dir: &Path, name: &str, num_pages: usize) -> PathBuf {
    let path = dir.join(name);
    create_test_pdf(num_pages)
        .save(&path)
        .expect("failed to write test PDF");
    path
}

/// White image with a black rectangle covering `[x0, x1) x [y0, y1)`
pub fn image_with_box(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// Decoded content stream of every output page, in page order
pub fn page_contents(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let bytes = doc.get_page_content(id).expect("page content");
            String::from_utf8_lossy(&bytes).into_owned()
        })
        .collect()
}
