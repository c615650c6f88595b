//! Finished output documents

use crate::layout::Placement;
use crate::raster::{PageRasterizer, flatten_on_white};
use crate::types::*;
use image::RgbImage;
use lopdf::Document;
use std::path::{Path, PathBuf};

/// A composed document, ready to be saved or previewed
#[derive(Debug, Clone)]
pub struct OutputDocument {
    document: Document,
    placements: Vec<Placement>,
    rows: usize,
    cols: usize,
}

impl OutputDocument {
    pub(crate) fn new(
        document: Document,
        placements: Vec<Placement>,
        rows: usize,
        cols: usize,
    ) -> Self {
        Self {
            document,
            placements,
            rows,
            cols,
        }
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Where each source page went, in placement order
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_inner(self) -> Document {
        self.document
    }

    /// Serialize the document
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.document.clone();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }

    /// Save to `path`.
    ///
    /// The bytes go to a sibling `.partial` file first, which is then
    /// renamed over `path`, so a failed save never leaves a truncated file
    /// at the target.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_owned();
        let mut doc = self.document.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let mut writer = Vec::new();
            doc.save_to(&mut writer)?;
            Ok::<_, NupError>(writer)
        })
        .await??;

        let partial = partial_path(&path);
        if let Err(e) = write_then_rename(&partial, &path, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        log::info!("Saved {} page(s) to {}", self.page_count(), path.display());
        Ok(())
    }

    /// Rasterize one output page for preview
    pub fn render_page(
        &self,
        index: usize,
        scale: f32,
        rasterizer: &dyn PageRasterizer,
    ) -> Result<RgbImage> {
        let count = self.page_count();
        if index >= count {
            return Err(NupError::PageOutOfRange { index, count });
        }

        let bytes = self.to_bytes()?;
        let image = rasterizer.rasterize(&bytes, index, scale)?;
        Ok(flatten_on_white(&image))
    }
}

/// `<dir>/<name>.partial` next to `path`
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

async fn write_then_rename(partial: &Path, target: &Path, bytes: Vec<u8>) -> Result<()> {
    tokio::fs::write(partial, bytes).await?;
    tokio::fs::rename(partial, target).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_path_is_sibling() {
        let partial = partial_path(Path::new("/tmp/out/deck_1.pdf"));
        assert_eq!(partial, PathBuf::from("/tmp/out/deck_1.pdf.partial"));
    }
}
