//! Grid layout calculation
//!
//! This module handles the geometric layout of the cell grid on an output
//! page: picking rows and columns, and computing cell bounds.

use crate::constants::{CANDIDATE_GRIDS, mm_to_pt};
use crate::options::LayoutParams;

use super::{GridLayout, GridPosition, Rect};

// =============================================================================
// Grid Selection
// =============================================================================

/// Width of one cell when `cols` columns share `usable_width` with `gap` between them
pub fn cell_width_for(usable_width: f32, gap: f32, cols: usize) -> f32 {
    (usable_width - (cols as f32 - 1.0) * gap) / cols as f32
}

/// Choose (rows, cols) for a page from the fixed candidate list.
///
/// Picks the candidate with the most cells whose cell width is at least
/// `min_cell_width`. Equal cell counts go to the wider cell. Falls back to
/// 1×1 when nothing qualifies.
///
/// # Arguments
/// * `usable_width` - Page width minus both side margins, in points
/// * `gap` - Space between columns, in points
/// * `min_cell_width` - Required minimum cell width, in points
pub fn choose_grid(usable_width: f32, gap: f32, min_cell_width: f32) -> (usize, usize) {
    let mut best = (1, 1);
    let mut best_width = cell_width_for(usable_width, gap, 1);

    for &(rows, cols) in CANDIDATE_GRIDS.iter() {
        let width = cell_width_for(usable_width, gap, cols);
        if width < min_cell_width {
            continue;
        }

        let slots = rows * cols;
        let best_slots = best.0 * best.1;
        if slots > best_slots || (slots == best_slots && width > best_width) {
            best = (rows, cols);
            best_width = width;
        }
    }

    best
}

/// Choose (rows, cols) for a page size given in points, using the layout's
/// margin, gap and minimum slide width.
pub fn choose_auto_grid(page_size_pt: (f32, f32), layout: &LayoutParams) -> (usize, usize) {
    let usable_width = page_size_pt.0 - 2.0 * mm_to_pt(layout.margin_mm);
    choose_grid(
        usable_width,
        mm_to_pt(layout.gap_mm),
        mm_to_pt(layout.min_slide_width_mm),
    )
}

/// Apply the auto/fixed rule: the chooser when `auto_readable`, otherwise
/// the configured rows and columns.
pub fn resolve_grid(page_size_pt: (f32, f32), layout: &LayoutParams) -> (usize, usize) {
    if layout.auto_readable {
        choose_auto_grid(page_size_pt, layout)
    } else {
        (layout.rows, layout.cols)
    }
}

// =============================================================================
// Grid Creation
// =============================================================================

/// Create a uniform grid layout for an output page.
///
/// # Arguments
/// * `page_size_pt` - Output page (width, height) in points
/// * `layout` - Layout parameters (margin, gap, rows/cols or auto mode)
pub fn create_grid_layout(page_size_pt: (f32, f32), layout: &LayoutParams) -> GridLayout {
    let (page_width_pt, page_height_pt) = page_size_pt;
    let (rows, cols) = resolve_grid(page_size_pt, layout);

    let margin_pt = mm_to_pt(layout.margin_mm);
    let gap_pt = mm_to_pt(layout.gap_mm);
    let usable_width = page_width_pt - 2.0 * margin_pt;
    let usable_height = page_height_pt - 2.0 * margin_pt;

    GridLayout {
        rows,
        cols,
        cell_width_pt: cell_width_for(usable_width, gap_pt, cols),
        cell_height_pt: cell_width_for(usable_height, gap_pt, rows),
        margin_pt,
        gap_pt,
        page_width_pt,
        page_height_pt,
    }
}

// =============================================================================
// Cell Calculations
// =============================================================================

/// Calculate the bounds of a cell at the given grid position.
///
/// Row 0 is the top row of the page, so the y coordinate is measured down
/// from the page top and then flipped into PDF space.
pub fn cell_bounds(grid: &GridLayout, pos: GridPosition) -> Rect {
    let x = grid.margin_pt + pos.col as f32 * (grid.cell_width_pt + grid.gap_pt);
    let top = grid.page_height_pt
        - grid.margin_pt
        - pos.row as f32 * (grid.cell_height_pt + grid.gap_pt);

    Rect::new(
        x,
        top - grid.cell_height_pt,
        grid.cell_width_pt,
        grid.cell_height_pt,
    )
}

/// Bounds of a row-major slot index
pub fn slot_bounds(grid: &GridLayout, slot: usize) -> Rect {
    cell_bounds(grid, GridPosition::from_slot(slot, grid.cols))
}
