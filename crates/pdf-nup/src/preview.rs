use crate::compose::build_nup_from_multiple;
use crate::options::BuildParams;
use crate::output::OutputDocument;
use crate::types::*;
use std::path::Path;

/// Generate a preview of the N-up build.
///
/// Composition stops once `max_pages` output pages are full, so the
/// footers read `i / max_pages` even when the full build would be longer.
pub async fn generate_preview(
    paths: &[impl AsRef<Path>],
    params: &BuildParams,
    max_pages: usize,
) -> Result<OutputDocument> {
    build_nup_from_multiple(paths, params, Some(max_pages)).await
}
