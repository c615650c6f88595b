//! Footer and cell index labels

use crate::constants::{
    CELL_INDEX_BOX_HEIGHT_MM, CELL_INDEX_BOX_WIDTH_MM, CELL_INDEX_PADDING_MM,
    FOOTER_BOX_HEIGHT_MM, FOOTER_BOX_WIDTH_MM, FOOTER_PADDING_MM, mm_to_pt,
};
use crate::layout::Rect;
use crate::render::{PageCanvas, TextLabel};

/// Box of the global index label, inset from the cell's top-right corner
pub fn cell_index_box(cell: &Rect) -> Rect {
    let pad = mm_to_pt(CELL_INDEX_PADDING_MM);
    let width = mm_to_pt(CELL_INDEX_BOX_WIDTH_MM);
    let height = mm_to_pt(CELL_INDEX_BOX_HEIGHT_MM);
    Rect::new(
        cell.right() - pad - width,
        cell.top() - pad - height,
        width,
        height,
    )
}

/// Box of the `i / N` footer, inset from the page's bottom-right corner
pub fn footer_box(page_width_pt: f32) -> Rect {
    let pad = mm_to_pt(FOOTER_PADDING_MM);
    let width = mm_to_pt(FOOTER_BOX_WIDTH_MM);
    Rect::new(
        page_width_pt - pad - width,
        pad,
        width,
        mm_to_pt(FOOTER_BOX_HEIGHT_MM),
    )
}

pub fn footer_text(page_number: usize, total: usize) -> String {
    format!("{} / {}", page_number, total)
}

/// Stamp the global running index of a placed page into its cell
pub fn draw_cell_index(canvas: &mut PageCanvas, cell: &Rect, global_index: usize, font_size: f32) {
    let label = TextLabel::right_aligned(global_index.to_string(), font_size, cell_index_box(cell));
    canvas.draw_label(&label);
}

/// Second pass: stamp `i / N` on every finished page, N being the number
/// of pages actually produced.
pub fn draw_page_numbers(canvases: &mut [PageCanvas], font_size: f32) {
    let total = canvases.len();
    for (i, canvas) in canvases.iter_mut().enumerate() {
        let (width, _) = canvas.size();
        let label =
            TextLabel::right_aligned(footer_text(i + 1, total), font_size, footer_box(width));
        canvas.draw_label(&label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_box_sits_in_bottom_right_corner() {
        let page_width = 595.0;
        let footer = footer_box(page_width);
        assert!((footer.right() - (page_width - mm_to_pt(6.0))).abs() < 1e-3);
        assert!((footer.y - mm_to_pt(6.0)).abs() < 1e-3);
        assert!((footer.width - mm_to_pt(40.0)).abs() < 1e-3);
    }

    #[test]
    fn test_cell_index_box_inside_cell() {
        let cell = Rect::new(100.0, 100.0, 200.0, 150.0);
        let index = cell_index_box(&cell);
        assert!(cell.contains(&index));
        assert!((cell.top() - index.top() - mm_to_pt(2.5)).abs() < 1e-3);
    }

    #[test]
    fn test_page_numbers_use_final_total() {
        let mut canvases = vec![PageCanvas::new(595.0, 842.0); 3];
        draw_page_numbers(&mut canvases, 9.0);
        assert!(canvases[0].content().contains("(1 / 3) Tj"));
        assert!(canvases[2].content().contains("(3 / 3) Tj"));
    }
}
