use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NupError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Rasterization failed: {0}")]
    Render(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No free output file name in {}", .0.display())]
    NoAvailablePath(PathBuf),
    #[error("No images to lay out")]
    NoImages,
    #[error("Page index {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Unsupported source file: {}", .0.display())]
    UnsupportedSource(PathBuf),
}

pub type Result<T> = std::result::Result<T, NupError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: height > width
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}


/// Output paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    Letter,
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::Letter => (215.9, 279.4),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Look up a paper size by name. Unknown names fall back to A4.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "a4" => PaperSize::A4,
            "a3" => PaperSize::A3,
            "letter" => PaperSize::Letter,
            other => {
                log::warn!("Unknown paper size {:?}, using A4", other);
                PaperSize::A4
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::A3 => "A3",
            PaperSize::Letter => "Letter",
        }
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::PaperSize;
    use serde::{Deserialize, Serialize};

    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    // Unknown names load as A4 instead of failing the whole config file
    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Ok(PaperSize::from_name(&s))
        }
    }
}

/// Statistics about an N-up build, computed without composing
#[derive(Debug, Clone, PartialEq)]
pub struct NupStatistics {
    /// Number of input files that could be opened
    pub input_files: usize,
    /// Number of input files that were skipped as unreadable
    pub skipped_files: usize,
    /// Total number of source pages across readable inputs
    pub source_pages: usize,
    /// Grid rows on each output page
    pub rows: usize,
    /// Grid columns on each output page
    pub cols: usize,
    /// Cells per output page
    pub slots_per_page: usize,
    /// Output page count
    pub output_pages: usize,
    /// Unused cells on the last output page
    pub empty_slots: usize,
}
