//! File system helpers: opening sources, listing folders and picking
//! output names

use crate::constants::MAX_NUMBERED_OUTPUTS;
use crate::source::SourceDocument;
use crate::types::*;
use std::path::{Path, PathBuf};

/// Load a PDF or image from disk
pub async fn load_source(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let source =
        tokio::task::spawn_blocking(move || SourceDocument::from_bytes(bytes, Some(path)))
            .await??;
    Ok(source)
}

/// Total page count across the readable files among `paths`.
///
/// Unreadable files contribute nothing.
pub async fn count_pages(paths: &[impl AsRef<Path>]) -> usize {
    let mut total = 0;
    for path in paths {
        match load_source(path).await {
            Ok(source) => total += source.page_count(),
            Err(e) => log::warn!("Not counting {}: {}", path.as_ref().display(), e),
        }
    }
    total
}

/// Base name for numbered outputs in `folder`: the folder's own name
pub fn default_base_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "output".to_string())
}

/// First `"{base}_{i}.pdf"` in `folder` that does not exist yet, for
/// `i` in `1..=1000`.
pub fn next_available_path(folder: impl AsRef<Path>, base: &str) -> Result<PathBuf> {
    let folder = folder.as_ref();
    (1..=MAX_NUMBERED_OUTPUTS)
        .map(|i| folder.join(format!("{}_{}.pdf", base, i)))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| NupError::NoAvailablePath(folder.to_owned()))
}

/// The `*.pdf` files directly inside `dir`, sorted by name.
///
/// The extension match ignores case.
pub async fn collect_pdfs_in_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
    let mut pdfs = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && entry.file_type().await?.is_file() {
            pdfs.push(path);
        }
    }

    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_name() {
        assert_eq!(default_base_name(Path::new("/data/lectures")), "lectures");
        assert_eq!(default_base_name(Path::new("/")), "output");
    }
}
