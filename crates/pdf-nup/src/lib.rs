//! N-up composition of PDFs and images
//!
//! Source pages are concatenated in order and laid out in a grid on output
//! pages, optionally trimmed to their visible content, with `i / N` footers
//! and running cell indices. A second builder lays images out as titled
//! 2 x 2 sheets.

pub mod compose;
pub mod constants;
pub mod io;
pub mod layout;
mod options;
mod output;
mod preview;
pub mod raster;
pub mod render;
pub mod sheets;
mod source;
mod stats;
pub mod trim;
mod types;

pub use compose::{build_nup_from_multiple, compose, compose_sources, open_sources};
pub use io::{
    collect_pdfs_in_dir, count_pages, default_base_name, load_source, next_available_path,
};
pub use layout::{GridLayout, Placement, Rect, SourcePageRef, choose_grid};
pub use options::*;
pub use output::OutputDocument;
pub use preview::generate_preview;
pub use raster::{PageRasterizer, RasterDocument, default_rasterizer};
pub use sheets::{build_image_sheets, build_image_sheets_from_files, sanitize_title};
pub use source::{SourceContent, SourceDocument};
pub use stats::{calculate_statistics, statistics_for_files};
pub use trim::{ClipEstimate, ContentScanner, TrimUnavailable, estimate_content_clip};
pub use types::*;
