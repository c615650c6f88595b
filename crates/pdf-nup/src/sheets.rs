//! Titled image sheets
//!
//! Lays images out four to a landscape page (2 x 2) below a centred title
//! line, with the page number centred at the bottom. Every page carries
//! the same title.

use crate::constants::{
    SHEET_GRID, SHEET_MARGIN_MM, SHEET_PAGE_NUMBER_FONT_SIZE, SHEET_PAGE_NUMBER_GRAY,
    SHEET_PAGE_NUMBER_OFFSET_MM, SHEET_TITLE_FONT_SIZE, SHEET_TITLE_HEIGHT_MM, mm_to_pt,
};
use crate::layout::{GridPosition, Placement, Rect, SourcePageRef, fit_into_cell};
use crate::output::OutputDocument;
use crate::render::{Align, PageCanvas, TextLabel, assemble_document, create_image_xobject};
use crate::types::*;
use image::DynamicImage;
use lopdf::Document;
use std::path::{Path, PathBuf};

/// Characters that cannot appear in file names on common platforms
const FORBIDDEN_TITLE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Strip characters that are not allowed in file names
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c))
        .collect()
}

/// Check a sheet title and return it trimmed.
///
/// A title must be non-blank and must keep at least one character after
/// [`sanitize_title`], since it also names the output file.
pub fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NupError::Config("A title is required".to_string()));
    }
    if sanitize_title(title).trim().is_empty() {
        return Err(NupError::Config(format!(
            "Title {:?} contains only invalid characters",
            title
        )));
    }
    Ok(title)
}

/// Suggested output file name for a title: `"<sanitized title>.pdf"`
pub fn default_file_name(title: &str) -> Result<String> {
    let title = validate_title(title)?;
    Ok(format!("{}.pdf", sanitize_title(title).trim()))
}

/// Geometry of one landscape sheet, in points
#[derive(Debug, Clone, Copy, PartialEq)]
struct SheetGeometry {
    page_width: f32,
    page_height: f32,
    margin: f32,
    title_height: f32,
    cell_width: f32,
    cell_height: f32,
}

impl SheetGeometry {
    fn new(paper: PaperSize) -> Self {
        let (w, h) = paper.dimensions_with_orientation(Orientation::Landscape);
        let (rows, cols) = SHEET_GRID;
        let (page_width, page_height) = (mm_to_pt(w), mm_to_pt(h));
        let margin = mm_to_pt(SHEET_MARGIN_MM);
        let title_height = mm_to_pt(SHEET_TITLE_HEIGHT_MM);

        Self {
            page_width,
            page_height,
            margin,
            title_height,
            cell_width: (page_width - (cols as f32 + 1.0) * margin) / cols as f32,
            cell_height: (page_height - title_height - (rows as f32 + 1.0) * margin)
                / rows as f32,
        }
    }

    /// Cell rectangle; rows count down from below the title band
    fn cell(&self, pos: GridPosition) -> Rect {
        let x = self.margin + pos.col as f32 * (self.cell_width + self.margin);
        let top = self.page_height
            - self.title_height
            - self.margin
            - pos.row as f32 * (self.cell_height + self.margin);
        Rect::new(x, top - self.cell_height, self.cell_width, self.cell_height)
    }

    fn title_label(&self, title: &str) -> TextLabel {
        // Baseline roughly centred in the band for Helvetica cap height
        let baseline = self.page_height - self.title_height / 2.0 - 0.35 * SHEET_TITLE_FONT_SIZE;
        TextLabel {
            text: title.to_string(),
            font_size: SHEET_TITLE_FONT_SIZE,
            bounds: Rect::new(0.0, baseline, self.page_width, SHEET_TITLE_FONT_SIZE),
            align: Align::Center,
            gray: 0.0,
        }
    }

    fn page_number_label(&self, page_number: usize) -> TextLabel {
        TextLabel {
            text: page_number.to_string(),
            font_size: SHEET_PAGE_NUMBER_FONT_SIZE,
            bounds: Rect::new(
                0.0,
                mm_to_pt(SHEET_PAGE_NUMBER_OFFSET_MM),
                self.page_width,
                SHEET_PAGE_NUMBER_FONT_SIZE,
            ),
            align: Align::Center,
            gray: SHEET_PAGE_NUMBER_GRAY,
        }
    }
}

/// Build titled image sheets from decoded images
pub fn build_image_sheets(
    images: &[DynamicImage],
    title: &str,
    paper: PaperSize,
) -> Result<OutputDocument> {
    if images.is_empty() {
        return Err(NupError::NoImages);
    }
    let title = validate_title(title)?;

    let geometry = SheetGeometry::new(paper);
    let (rows, cols) = SHEET_GRID;
    let per_page = rows * cols;

    let mut output = Document::with_version("1.7");
    let mut canvases = Vec::new();
    let mut placements = Vec::with_capacity(images.len());

    for (page_index, chunk) in images.chunks(per_page).enumerate() {
        let mut canvas = PageCanvas::new(geometry.page_width, geometry.page_height);
        canvas.draw_label(&geometry.title_label(title));

        for (slot, image) in chunk.iter().enumerate() {
            let index = page_index * per_page + slot;
            let cell = geometry.cell(GridPosition::from_slot(slot, cols));
            let clip = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);

            let Some(fitted) = fit_into_cell(&clip, &cell) else {
                log::warn!("Image {} is empty, leaving its cell blank", index + 1);
                continue;
            };

            let drawable = create_image_xobject(&mut output, image);
            canvas.place(drawable, &clip, &fitted);
            placements.push(Placement {
                output_page: page_index,
                slot,
                source: SourcePageRef {
                    document: index,
                    page: 0,
                },
                global_index: index + 1,
                clip,
                dest: fitted.dest,
            });
        }

        canvas.draw_label(&geometry.page_number_label(page_index + 1));
        canvases.push(canvas);
    }

    log::info!(
        "Laid out {} image(s) on {} {} sheet(s)",
        images.len(),
        canvases.len(),
        paper.name()
    );

    assemble_document(&mut output, canvases)?;
    output.compress();

    Ok(OutputDocument::new(output, placements, rows, cols))
}

/// Decode image files and build titled sheets from them.
///
/// Any file that cannot be decoded fails the whole build.
pub async fn build_image_sheets_from_files(
    paths: &[impl AsRef<Path>],
    title: &str,
    paper: PaperSize,
) -> Result<OutputDocument> {
    if paths.is_empty() {
        return Err(NupError::NoImages);
    }
    validate_title(title)?;

    let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_owned()).collect();
    let title = title.to_string();

    tokio::task::spawn_blocking(move || {
        let images = paths
            .iter()
            .map(|path| {
                image::open(path).map_err(|e| {
                    log::error!("Cannot decode {}: {}", path.display(), e);
                    NupError::Image(e)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        build_image_sheets(&images, &title, paper)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("a/b:c*d?"), "abcd");
        assert_eq!(sanitize_title("Lecture 3"), "Lecture 3");
    }

    #[test]
    fn test_validate_title_errors() {
        assert!(matches!(validate_title("   "), Err(NupError::Config(_))));
        assert!(matches!(validate_title("<>|"), Err(NupError::Config(_))));
        assert_eq!(validate_title("  Notes ").unwrap(), "Notes");
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(default_file_name("Week 1: Intro").unwrap(), "Week 1 Intro.pdf");
    }

    #[test]
    fn test_cells_sit_below_title_band() {
        let geometry = SheetGeometry::new(PaperSize::A4);
        let top_left = geometry.cell(GridPosition::new(0, 0));
        let bottom_right = geometry.cell(GridPosition::new(1, 1));

        let band_bottom = geometry.page_height - geometry.title_height;
        assert!(top_left.top() <= band_bottom - geometry.margin + 1e-3);
        assert!((bottom_right.y - geometry.margin).abs() < 1e-3);
        assert!((bottom_right.right() - (geometry.page_width - geometry.margin)).abs() < 1e-3);
    }
}
