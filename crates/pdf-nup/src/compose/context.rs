//! Per-build state of the placement phase

use crate::layout::{GridLayout, Placement};
use crate::render::PageCanvas;

/// Running state of one composition.
///
/// The slot cursor and the global page counter span source boundaries and
/// output page boundaries; they live here instead of in the loop so the
/// placement phase can hand everything to the annotation phase in one piece.
#[derive(Debug)]
pub(crate) struct BuildContext {
    pub grid: GridLayout,
    pub canvases: Vec<PageCanvas>,
    pub placements: Vec<Placement>,
    /// Next free slot on the last canvas; equals `grid.cell_count()` once it is full
    slot: usize,
    /// Source pages placed so far
    global_index: usize,
    /// Maximum number of output pages to produce
    page_limit: Option<usize>,
}

/// A reserved cell, ready to receive one source page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellTicket {
    pub output_page: usize,
    pub slot: usize,
    /// 1-based running count of the page going into this cell
    pub global_index: usize,
}

impl BuildContext {
    pub fn new(grid: GridLayout, page_limit: Option<usize>) -> Self {
        let slot = grid.cell_count();
        Self {
            grid,
            canvases: Vec::new(),
            placements: Vec::new(),
            slot,
            global_index: 0,
            page_limit,
        }
    }

    /// True once the page limit is reached and the last page is full, so
    /// no further page may be started
    pub fn is_stopped(&self) -> bool {
        match self.page_limit {
            Some(limit) => self.slot >= self.grid.cell_count() && self.canvases.len() >= limit,
            None => false,
        }
    }

    /// Reserve the next cell, opening a new output page when the current
    /// one is full. Returns `None` when the page limit forbids a new page.
    pub fn next_cell(&mut self) -> Option<CellTicket> {
        if self.is_stopped() {
            return None;
        }

        if self.slot >= self.grid.cell_count() {
            self.canvases.push(PageCanvas::new(
                self.grid.page_width_pt,
                self.grid.page_height_pt,
            ));
            self.slot = 0;
        }

        let ticket = CellTicket {
            output_page: self.canvases.len() - 1,
            slot: self.slot,
            global_index: self.global_index + 1,
        };
        self.slot += 1;
        self.global_index += 1;
        Some(ticket)
    }

    pub fn canvas_mut(&mut self, output_page: usize) -> Option<&mut PageCanvas> {
        self.canvases.get_mut(output_page)
    }

    pub fn placed_pages(&self) -> usize {
        self.global_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::create_grid_layout;
    use crate::options::LayoutParams;

    fn two_by_two() -> GridLayout {
        let layout = LayoutParams {
            rows: 2,
            cols: 2,
            auto_readable: false,
            ..Default::default()
        };
        create_grid_layout((595.0, 842.0), &layout)
    }

    #[test]
    fn test_cursor_spans_pages() {
        let mut ctx = BuildContext::new(two_by_two(), None);
        let tickets: Vec<_> = (0..5).map(|_| ctx.next_cell().unwrap()).collect();

        assert_eq!(ctx.canvases.len(), 2);
        assert_eq!(tickets[3].output_page, 0);
        assert_eq!(tickets[3].slot, 3);
        assert_eq!(tickets[4].output_page, 1);
        assert_eq!(tickets[4].slot, 0);
        assert_eq!(tickets[4].global_index, 5);
    }

    #[test]
    fn test_page_limit_stops_when_page_full() {
        let mut ctx = BuildContext::new(two_by_two(), Some(1));
        for _ in 0..4 {
            assert!(ctx.next_cell().is_some());
        }
        assert!(ctx.is_stopped());
        assert!(ctx.next_cell().is_none());
        assert_eq!(ctx.canvases.len(), 1);
    }

    #[test]
    fn test_zero_page_limit_produces_nothing() {
        let mut ctx = BuildContext::new(two_by_two(), Some(0));
        assert!(ctx.next_cell().is_none());
        assert!(ctx.canvases.is_empty());
    }
}
