use crate::io::load_source;
use crate::options::BuildParams;
use crate::source::SourceDocument;
use crate::types::*;
use std::path::Path;

/// Calculate statistics for an N-up build without composing it
pub fn calculate_statistics(
    sources: &[SourceDocument],
    params: &BuildParams,
) -> Result<NupStatistics> {
    let page_counts: Vec<usize> = sources.iter().map(SourceDocument::page_count).collect();
    statistics_from_counts(&page_counts, 0, params)
}

/// Statistics for files on disk. Unreadable files are counted as skipped,
/// the same way a build skips them.
pub async fn statistics_for_files(
    paths: &[impl AsRef<Path>],
    params: &BuildParams,
) -> Result<NupStatistics> {
    let mut page_counts = Vec::with_capacity(paths.len());
    let mut skipped = 0;

    for path in paths {
        match load_source(path).await {
            Ok(source) => page_counts.push(source.page_count()),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.as_ref().display(), e);
                skipped += 1;
            }
        }
    }

    statistics_from_counts(&page_counts, skipped, params)
}

fn statistics_from_counts(
    page_counts: &[usize],
    skipped_files: usize,
    params: &BuildParams,
) -> Result<NupStatistics> {
    params.validate()?;

    let grid = params.grid();
    let slots_per_page = grid.cell_count();
    let source_pages: usize = page_counts.iter().sum();
    let output_pages = source_pages.div_ceil(slots_per_page);

    Ok(NupStatistics {
        input_files: page_counts.len(),
        skipped_files,
        source_pages,
        rows: grid.rows,
        cols: grid.cols,
        slots_per_page,
        output_pages,
        empty_slots: output_pages * slots_per_page - source_pages,
    })
}
