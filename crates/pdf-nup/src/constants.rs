//! Shared constants for N-up composition
//!
//! This module centralizes magic numbers and constants used throughout
//! the layout, trimming and annotation passes.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Millimetres per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = POINTS_PER_INCH / MM_PER_INCH; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Fallback page width in points when a page has no usable MediaBox (US Letter)
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Fallback page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Grid Candidates
// =============================================================================

/// Layouts the automatic grid chooser may pick from, as (rows, cols).
///
/// The order matters: among equal slot counts and equal cell widths the
/// earlier candidate wins.
pub const CANDIDATE_GRIDS: [(usize, usize); 12] = [
    (1, 1),
    (1, 2),
    (2, 1),
    (2, 2),
    (2, 3),
    (3, 2),
    (3, 3),
    (2, 4),
    (4, 2),
    (3, 4),
    (4, 3),
    (4, 4),
];

// =============================================================================
// Whitespace Trimming
// =============================================================================

/// Scan resolution for content-bounds estimation (pixels per inch)
pub const TRIM_SCAN_DPI: f32 = 72.0;

/// Slack added around detected content so antialiased edges survive (points)
pub const TRIM_PADDING_PT: f32 = 2.0;

/// Default brightness threshold: channels below this count as content
pub const DEFAULT_TRIM_THRESHOLD: u8 = 245;

// =============================================================================
// Labels
// =============================================================================

/// Footer box inset from the page's bottom-right corner (mm)
pub const FOOTER_PADDING_MM: f32 = 6.0;

/// Footer box width (mm)
pub const FOOTER_BOX_WIDTH_MM: f32 = 40.0;

/// Footer box height (mm)
pub const FOOTER_BOX_HEIGHT_MM: f32 = 10.0;

/// Cell index box inset from the cell's top-right corner (mm)
pub const CELL_INDEX_PADDING_MM: f32 = 2.5;

/// Cell index box width (mm)
pub const CELL_INDEX_BOX_WIDTH_MM: f32 = 10.0;

/// Cell index box height (mm)
pub const CELL_INDEX_BOX_HEIGHT_MM: f32 = 6.0;

/// Default font size for output page footers (points)
pub const PAGE_NUMBER_FONT_SIZE: f32 = 9.0;

/// Default font size for cell indices (points)
pub const CELL_INDEX_FONT_SIZE: f32 = 7.0;

/// Approximate character width ratio for Helvetica glyphs without a table entry
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Resource name of the label font on every output page
pub const LABEL_FONT_NAME: &str = "F1";

// =============================================================================
// Titled Image Sheets
// =============================================================================

/// Outer margin and inter-cell gap on image sheets (mm)
pub const SHEET_MARGIN_MM: f32 = 10.0;

/// Height of the title band at the top of image sheets (mm)
pub const SHEET_TITLE_HEIGHT_MM: f32 = 15.0;

/// Title font size on image sheets (points)
pub const SHEET_TITLE_FONT_SIZE: f32 = 16.0;

/// Page number font size on image sheets (points)
pub const SHEET_PAGE_NUMBER_FONT_SIZE: f32 = 12.0;

/// Distance of the image sheet page number baseline from the bottom edge (mm)
pub const SHEET_PAGE_NUMBER_OFFSET_MM: f32 = 5.0;

/// Gray level of the image sheet page number (0 = black, 1 = white)
pub const SHEET_PAGE_NUMBER_GRAY: f32 = 100.0 / 255.0;

/// Images per image sheet (2 x 2)
pub const SHEET_GRID: (usize, usize) = (2, 2);

// =============================================================================
// Output Files
// =============================================================================

/// Highest suffix tried when picking a numbered output file name
pub const MAX_NUMBERED_OUTPUTS: usize = 1000;

/// Default scale for preview rasterization (pixels per point)
pub const DEFAULT_PREVIEW_SCALE: f32 = 2.0;
