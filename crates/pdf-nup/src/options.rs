use crate::constants::{
    CELL_INDEX_FONT_SIZE, DEFAULT_TRIM_THRESHOLD, PAGE_NUMBER_FONT_SIZE, mm_to_pt,
};
use crate::layout::{GridLayout, create_grid_layout};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid configuration for output pages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutParams {
    /// Fixed row count, used when `auto_readable` is off
    pub rows: usize,
    /// Fixed column count, used when `auto_readable` is off
    pub cols: usize,
    /// Outer margin on every side of the output page
    pub margin_mm: f32,
    /// Space between neighbouring cells
    pub gap_mm: f32,
    /// Pick rows/cols automatically so cells stay at least `min_slide_width_mm` wide
    pub auto_readable: bool,
    /// Minimum cell width for automatic grids
    pub min_slide_width_mm: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            margin_mm: 10.0,
            gap_mm: 4.0,
            auto_readable: true,
            min_slide_width_mm: 90.0,
        }
    }
}

/// Complete configuration of one N-up build
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildParams {
    // Output paper
    pub paper_size: PaperSize,
    pub orientation: Orientation,

    // Grid
    pub layout: LayoutParams,

    // Whitespace trimming
    pub trim_whitespace: bool,
    pub trim_threshold: u8,

    // Annotations
    pub draw_page_numbers: bool,
    pub draw_cell_indices: bool,
    pub cell_index_font_size_pt: f32,
    pub page_number_font_size_pt: f32,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            layout: LayoutParams::default(),
            trim_whitespace: true,
            trim_threshold: DEFAULT_TRIM_THRESHOLD,
            draw_page_numbers: true,
            draw_cell_indices: false,
            cell_index_font_size_pt: CELL_INDEX_FONT_SIZE,
            page_number_font_size_pt: PAGE_NUMBER_FONT_SIZE,
        }
    }
}

impl BuildParams {
    /// Output page (width, height) in points
    pub fn page_size_pt(&self) -> (f32, f32) {
        let (w, h) = self.paper_size.dimensions_with_orientation(self.orientation);
        (mm_to_pt(w), mm_to_pt(h))
    }

    /// The cell grid these parameters produce
    pub fn grid(&self) -> GridLayout {
        create_grid_layout(self.page_size_pt(), &self.layout)
    }

    /// Load parameters from a JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    /// Parse parameters from JSON bytes. Missing fields take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| NupError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save parameters to a JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NupError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the parameters
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;

        if !layout.auto_readable && (layout.rows == 0 || layout.cols == 0) {
            return Err(NupError::Config(
                "Rows and columns must be at least 1".to_string(),
            ));
        }

        for (name, value) in [
            ("margin", layout.margin_mm),
            ("gap", layout.gap_mm),
            ("minimum slide width", layout.min_slide_width_mm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(NupError::Config(format!(
                    "The {} must be a non-negative number of millimetres, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("page number", self.page_number_font_size_pt),
            ("cell index", self.cell_index_font_size_pt),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(NupError::Config(format!(
                    "The {} font size must be positive, got {}",
                    name, value
                )));
            }
        }

        let grid = self.grid();
        if !(grid.cell_width_pt > 0.0 && grid.cell_height_pt > 0.0) {
            return Err(NupError::Config(format!(
                "Margin and gap leave no room for a {}x{} grid on {} paper",
                grid.rows,
                grid.cols,
                self.paper_size.name()
            )));
        }

        Ok(())
    }
}
