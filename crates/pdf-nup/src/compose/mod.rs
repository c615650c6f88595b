//! N-up composition - arranging source pages in a grid on output pages
//!
//! This module orchestrates one build:
//! 1. Choose the grid for the output paper
//! 2. Place every source page, in order, into the next free cell
//! 3. Stamp footers once the final page count is known
//! 4. Assemble the output page tree

mod annotate;
mod context;

pub use annotate::{cell_index_box, footer_box, footer_text};

use crate::layout::{Placement, Rect, SourcePageRef, fit_into_cell, slot_bounds};
use crate::options::BuildParams;
use crate::output::OutputDocument;
use crate::raster::{PageRasterizer, default_rasterizer};
use crate::render::{assemble_document, import_page};
use crate::source::SourceDocument;
use crate::trim::ContentScanner;
use crate::types::*;
use context::BuildContext;
use lopdf::Document;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Build an N-up document from files on disk.
///
/// Files are opened one at a time as placement reaches them, so files past
/// `stop_after_pages` are never read. Files that cannot be opened are
/// skipped with a warning. Composition runs on a blocking thread with the
/// default rasterizer; without one, pages are placed untrimmed.
///
/// # Arguments
/// * `paths` - PDFs and images, in output order
/// * `params` - Build parameters
/// * `stop_after_pages` - Stop once this many output pages are full
pub async fn build_nup_from_multiple(
    paths: &[impl AsRef<Path>],
    params: &BuildParams,
    stop_after_pages: Option<usize>,
) -> Result<OutputDocument> {
    params.validate()?;

    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_owned()).collect();
    let params = params.clone();

    tokio::task::spawn_blocking(move || {
        let rasterizer = if params.trim_whitespace {
            default_rasterizer()
        } else {
            None
        };
        compose_sources(
            open_sources(&paths),
            &params,
            stop_after_pages,
            rasterizer.as_deref(),
        )
    })
    .await?
}

/// Open the paths lazily, in order, skipping (and logging) the ones that fail
pub fn open_sources(paths: &[PathBuf]) -> impl Iterator<Item = SourceDocument> + '_ {
    paths
        .iter()
        .filter_map(|path| match SourceDocument::open(path) {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
}

/// Compose already opened sources into an N-up document.
///
/// Pages are taken in source order, then native page order, filling cells
/// row by row; a new output page starts whenever the current one is full.
/// With `stop_after_pages`, no page beyond that count is started and the
/// footers count only the pages produced.
pub fn compose(
    sources: &[SourceDocument],
    params: &BuildParams,
    stop_after_pages: Option<usize>,
    rasterizer: Option<&dyn PageRasterizer>,
) -> Result<OutputDocument> {
    compose_sources(sources.iter(), params, stop_after_pages, rasterizer)
}

/// [`compose`] over sources produced on demand.
///
/// The next source is only pulled once the previous one is placed, and
/// none is pulled after the page limit is reached. Source indices in the
/// placements count the sources pulled.
pub fn compose_sources<S: Borrow<SourceDocument>>(
    sources: impl IntoIterator<Item = S>,
    params: &BuildParams,
    stop_after_pages: Option<usize>,
    rasterizer: Option<&dyn PageRasterizer>,
) -> Result<OutputDocument> {
    let grid = params.grid();
    log::info!(
        "Composing on {} {:?} paper, {}x{} grid",
        params.paper_size.name(),
        params.orientation,
        grid.rows,
        grid.cols
    );

    let mut output = Document::with_version("1.7");
    let mut ctx = BuildContext::new(grid, stop_after_pages);
    let mut sources = sources.into_iter();
    let mut source_count = 0;

    // Placement phase
    while !ctx.is_stopped() {
        let Some(source) = sources.next() else {
            break;
        };
        let source: &SourceDocument = source.borrow();
        let doc_index = source_count;
        source_count += 1;

        let mut cache = HashMap::new();
        let mut scanner = ContentScanner::new(source, params.trim_threshold, rasterizer);

        for page_index in 0..source.page_count() {
            let Some(ticket) = ctx.next_cell() else {
                break;
            };

            let clip = if params.trim_whitespace {
                scanner.clip_or_full(page_index)
            } else {
                source.page_rect(page_index)?
            };

            let cell = slot_bounds(&ctx.grid, ticket.slot);
            let source_ref = SourcePageRef {
                document: doc_index,
                page: page_index,
            };

            let dest = place_page(
                &mut output,
                &mut ctx,
                source,
                source_ref,
                &clip,
                &cell,
                &mut cache,
                ticket.output_page,
            )
            .unwrap_or_else(|| Rect::new(cell.center_x(), cell.center_y(), 0.0, 0.0));

            if params.draw_cell_indices {
                if let Some(canvas) = ctx.canvas_mut(ticket.output_page) {
                    annotate::draw_cell_index(
                        canvas,
                        &cell,
                        ticket.global_index,
                        params.cell_index_font_size_pt,
                    );
                }
            }

            ctx.placements.push(Placement {
                output_page: ticket.output_page,
                slot: ticket.slot,
                source: source_ref,
                global_index: ticket.global_index,
                clip,
                dest,
            });
        }
    }

    // Annotation phase, now that the page count is final
    if params.draw_page_numbers {
        annotate::draw_page_numbers(&mut ctx.canvases, params.page_number_font_size_pt);
    }

    log::info!(
        "Placed {} page(s) from {} source(s) on {} output page(s)",
        ctx.placed_pages(),
        source_count,
        ctx.canvases.len()
    );

    let BuildContext {
        grid,
        canvases,
        placements,
        ..
    } = ctx;
    assemble_document(&mut output, canvases)?;
    output.compress();

    Ok(OutputDocument::new(output, placements, grid.rows, grid.cols))
}

/// Draw one source page into `cell`. Returns the covered output rectangle,
/// or `None` when the page could not be drawn and the cell stays blank.
#[allow(clippy::too_many_arguments)]
fn place_page(
    output: &mut Document,
    ctx: &mut BuildContext,
    source: &SourceDocument,
    source_ref: SourcePageRef,
    clip: &Rect,
    cell: &Rect,
    cache: &mut HashMap<lopdf::ObjectId, lopdf::ObjectId>,
    output_page: usize,
) -> Option<Rect> {
    let Some(fitted) = fit_into_cell(clip, cell) else {
        log::warn!(
            "Page {} of source {} has no area, leaving its cell empty",
            source_ref.page + 1,
            source_ref.document + 1
        );
        return None;
    };

    let drawable = match import_page(output, source, source_ref.page, cache) {
        Ok(drawable) => drawable,
        Err(e) => {
            log::warn!(
                "Could not import page {} of source {}: {}",
                source_ref.page + 1,
                source_ref.document + 1,
                e
            );
            return None;
        }
    };

    let canvas = ctx.canvas_mut(output_page)?;
    canvas.place(drawable, clip, &fitted);
    Some(fitted.dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LayoutParams;
    use image::{DynamicImage, RgbImage};
    use std::cell::Cell;

    fn fixed_grid(rows: usize, cols: usize) -> BuildParams {
        BuildParams {
            layout: LayoutParams {
                rows,
                cols,
                auto_readable: false,
                ..Default::default()
            },
            trim_whitespace: false,
            ..Default::default()
        }
    }

    fn image_source(width: u32, height: u32) -> SourceDocument {
        SourceDocument::from_image(DynamicImage::ImageRgb8(RgbImage::new(width, height)))
    }

    #[test]
    fn test_empty_input_gives_empty_document() {
        let output = compose(&[], &BuildParams::default(), None, None).unwrap();
        assert_eq!(output.page_count(), 0);
        assert!(output.placements().is_empty());
    }

    #[test]
    fn test_partial_last_page_is_kept() {
        let sources: Vec<_> = (0..5).map(|_| image_source(40, 30)).collect();
        let output = compose(&sources, &fixed_grid(2, 2), None, None).unwrap();
        assert_eq!(output.page_count(), 2);
        assert_eq!(output.placements().len(), 5);
        assert_eq!(output.placements()[4].slot, 0);
    }

    #[test]
    fn test_placement_preserves_aspect_ratio() {
        let sources = vec![image_source(200, 100)];
        let output = compose(&sources, &fixed_grid(1, 1), None, None).unwrap();
        let dest = output.placements()[0].dest;
        assert!((dest.width / dest.height - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_sources_past_the_page_limit_are_not_pulled() {
        let pulled = Cell::new(0);
        let sources = (0..5).map(|_| {
            pulled.set(pulled.get() + 1);
            image_source(40, 30)
        });

        // Four one-page sources fill the single 2x2 page
        let output = compose_sources(sources, &fixed_grid(2, 2), Some(1), None).unwrap();
        assert_eq!(output.page_count(), 1);
        assert_eq!(output.placements().len(), 4);
        assert_eq!(pulled.get(), 4);
    }

    #[test]
    fn test_zero_page_limit_pulls_nothing() {
        let pulled = Cell::new(0);
        let sources = (0..3).map(|_| {
            pulled.set(pulled.get() + 1);
            image_source(40, 30)
        });

        let output = compose_sources(sources, &fixed_grid(2, 2), Some(0), None).unwrap();
        assert_eq!(output.page_count(), 0);
        assert_eq!(pulled.get(), 0);
    }

    #[test]
    fn test_unreadable_paths_are_skipped_lazily() {
        let paths = vec![
            PathBuf::from("/nonexistent/a.pdf"),
            PathBuf::from("/nonexistent/b.png"),
        ];
        assert_eq!(open_sources(&paths).count(), 0);
    }
}
