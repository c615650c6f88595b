//! Content placement within cells
//!
//! This module calculates where a (clipped) source page lands inside its
//! grid cell: uniform scale to fit, centered on both axes.

use super::Rect;

/// Result of fitting a clip region into a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedContent {
    /// Uniform scale from source points to output points
    pub scale: f32,
    /// Output-space rectangle covered by the scaled clip region
    pub dest: Rect,
    /// Output-space translation of the source origin
    pub translate_x: f32,
    /// Output-space translation of the source origin
    pub translate_y: f32,
}

impl FittedContent {
    /// PDF `cm` operands mapping source space into output space
    pub fn matrix(&self) -> [f32; 6] {
        [
            self.scale,
            0.0,
            0.0,
            self.scale,
            self.translate_x,
            self.translate_y,
        ]
    }
}

/// Fit `clip` into `cell` preserving aspect ratio.
///
/// The scale is the largest that keeps the whole clip region inside the
/// cell; the leftover space is split evenly on both sides. Returns `None`
/// when either rectangle has no area.
pub fn fit_into_cell(clip: &Rect, cell: &Rect) -> Option<FittedContent> {
    if clip.is_empty() || cell.is_empty() {
        return None;
    }

    let scale = (cell.width / clip.width).min(cell.height / clip.height);
    let width = clip.width * scale;
    let height = clip.height * scale;

    let dest = Rect::new(
        cell.x + (cell.width - width) / 2.0,
        cell.y + (cell.height - height) / 2.0,
        width,
        height,
    );

    Some(FittedContent {
        scale,
        dest,
        translate_x: dest.x - clip.x * scale,
        translate_y: dest.y - clip.y * scale,
    })
}
