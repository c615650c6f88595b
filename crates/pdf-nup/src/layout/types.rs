//! Layout data types for N-up composition
//!
//! These types represent the intermediate layout calculations between
//! grid selection and PDF rendering.

/// A rectangular area in points, PDF convention (origin bottom-left, y up)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its corner coordinates
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// True when the rectangle encloses no area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Overlapping region of two rectangles (empty when they do not overlap)
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.top().min(other.top());
        Rect::new(x0, y0, (x1 - x0).max(0.0), (y1 - y0).max(0.0))
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.top() <= self.top()
    }
}

/// Position within the grid (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Row index (0 = top row)
    pub row: usize,
    /// Column index (0 = leftmost column)
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of a row-major slot index
    pub fn from_slot(slot: usize, cols: usize) -> Self {
        Self::new(slot / cols, slot % cols)
    }
}

/// Uniform grid of cells on an output page
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Number of rows in the page grid
    pub rows: usize,
    /// Number of columns in the page grid
    pub cols: usize,
    /// Width of each cell in points
    pub cell_width_pt: f32,
    /// Height of each cell in points
    pub cell_height_pt: f32,
    /// Outer margin on every side of the page in points
    pub margin_pt: f32,
    /// Space between neighbouring cells in points
    pub gap_pt: f32,
    /// Output page width in points
    pub page_width_pt: f32,
    /// Output page height in points
    pub page_height_pt: f32,
}

impl GridLayout {
    /// Total number of cells in the grid
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }
}

/// Reference to one page of one source document in the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePageRef {
    /// Index of the source in the build's input list
    pub document: usize,
    /// Zero-based page index within that source
    pub page: usize,
}

/// Where one source page ended up on the output
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Zero-based output page index
    pub output_page: usize,
    /// Row-major cell index on that page
    pub slot: usize,
    /// The placed source page
    pub source: SourcePageRef,
    /// 1-based running count of placed pages across the whole build
    pub global_index: usize,
    /// Region of the source page that was rendered, in the space of
    /// `SourceDocument::page_rect`
    pub clip: Rect,
    /// Region of the output page covered by the content
    pub dest: Rect,
}
