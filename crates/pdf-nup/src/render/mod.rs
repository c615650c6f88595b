//! PDF rendering modules for N-up composition
//!
//! This module handles all PDF-specific operations:
//! - Creating XObjects from source pages and images
//! - Building output page content (placements and labels)
//! - Assembling the page tree
//! - Deep copying PDF objects

mod page;
mod text;
mod xobject;

pub use page::*;
pub use text::{Align, TextLabel, add_helvetica_font, escape_pdf_string, text_width};
pub use xobject::{
    Drawable, copy_object_deep, create_image_xobject, create_page_xobject, import_page,
    rect_to_array,
};
