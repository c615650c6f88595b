//! Whitespace trimming
//!
//! Estimates the region of a page that actually carries content by
//! scanning a low-resolution rasterization for pixels darker than a
//! threshold. Only a bounding box is needed, so the scan runs at 72 dpi
//! rather than at full resolution.
//!
//! Rasters come out the way a viewer shows the page, so for pages with a
//! `/Rotate` the box is mapped onto the displayed page rectangle.
//!
//! Estimation never fails a build: every problem is reported as
//! [`ClipEstimate::Unavailable`] and callers fall back to the full page.

use crate::constants::{POINTS_PER_INCH, TRIM_PADDING_PT, TRIM_SCAN_DPI};
use crate::layout::Rect;
use crate::raster::{PageRasterizer, RasterDocument, flatten_on_white};
use crate::source::{SourceContent, SourceDocument};
use image::RgbImage;
use std::fmt;

/// Bounding box in raster pixels; `x1`/`y1` are exclusive, row 0 is the top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Why no content rectangle could be computed
#[derive(Debug, Clone, PartialEq)]
pub enum TrimUnavailable {
    /// No rasterizer backend was available for a PDF page
    NoRasterizer,
    /// The backend failed to render the page
    RasterizeFailed(String),
    /// Every pixel is at or above the threshold
    BlankPage,
    /// The page's `/Rotate` is not a multiple of 90, so the raster cannot be
    /// lined up with the page
    RotatedPage(i64),
    /// The page rectangle has no area, or the page does not exist
    InvalidPage,
}

impl fmt::Display for TrimUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimUnavailable::NoRasterizer => write!(f, "no rasterizer available"),
            TrimUnavailable::RasterizeFailed(e) => write!(f, "rasterization failed: {}", e),
            TrimUnavailable::BlankPage => write!(f, "page is blank"),
            TrimUnavailable::RotatedPage(deg) => write!(f, "page is rotated by {}°", deg),
            TrimUnavailable::InvalidPage => write!(f, "page has no area"),
        }
    }
}

/// Outcome of content-bounds estimation
#[derive(Debug, Clone, PartialEq)]
pub enum ClipEstimate {
    /// Content rectangle in page space, padded and clipped to the page
    Content(Rect),
    /// No estimate; use the full page
    Unavailable(TrimUnavailable),
}

impl ClipEstimate {
    /// The clip rectangle to render: the estimate, or `page` when there is none
    pub fn or_full_page(self, page: Rect) -> Rect {
        match self {
            ClipEstimate::Content(rect) => rect,
            ClipEstimate::Unavailable(_) => page,
        }
    }
}

/// Smallest box containing every pixel whose darkest channel is below
/// `threshold`. `None` when there is no such pixel.
pub fn nonwhite_bbox(image: &RgbImage, threshold: u8) -> Option<PixelBox> {
    let (width, height) = image.dimensions();
    let (mut x0, mut y0, mut x1, mut y1) = (width, height, 0u32, 0u32);
    let mut found = false;

    for (x, y, px) in image.enumerate_pixels() {
        let darkest = px[0].min(px[1]).min(px[2]);
        if darkest < threshold {
            found = true;
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x + 1);
            y1 = y1.max(y + 1);
        }
    }

    found.then_some(PixelBox { x0, y0, x1, y1 })
}

/// Map a pixel box from a raster of `page` back into page space.
///
/// The scale is taken per axis from the actual raster size, so rounding of
/// the bitmap dimensions does not shift the result.
pub fn pixel_box_to_page(bbox: PixelBox, page: &Rect, raster_size: (u32, u32)) -> Rect {
    let sx = page.width / raster_size.0.max(1) as f32;
    let sy = page.height / raster_size.1.max(1) as f32;

    Rect::from_corners(
        page.x + bbox.x0 as f32 * sx,
        page.top() - bbox.y1 as f32 * sy,
        page.x + bbox.x1 as f32 * sx,
        page.top() - bbox.y0 as f32 * sy,
    )
}

/// Turn a raster of `page` into a clip estimate: bounding box, padding,
/// and clipping to the page.
pub fn estimate_from_raster(raster: &RgbImage, page: &Rect, threshold: u8) -> ClipEstimate {
    match nonwhite_bbox(raster, threshold) {
        Some(bbox) => {
            let content = pixel_box_to_page(bbox, page, raster.dimensions());
            let clip = content.expand(TRIM_PADDING_PT).intersect(page);
            if clip.is_empty() {
                ClipEstimate::Unavailable(TrimUnavailable::InvalidPage)
            } else {
                ClipEstimate::Content(clip)
            }
        }
        None => ClipEstimate::Unavailable(TrimUnavailable::BlankPage),
    }
}

/// Content estimation for the pages of one source.
///
/// A PDF source is handed to the rasterizer once, on the first page that
/// needs pixels, and every later page reuses the opened document.
pub struct ContentScanner<'a> {
    source: &'a SourceDocument,
    threshold: u8,
    rasterizer: Option<&'a dyn PageRasterizer>,
    document: Option<Result<Box<dyn RasterDocument + 'a>, TrimUnavailable>>,
}

impl<'a> ContentScanner<'a> {
    pub fn new(
        source: &'a SourceDocument,
        threshold: u8,
        rasterizer: Option<&'a dyn PageRasterizer>,
    ) -> Self {
        Self {
            source,
            threshold,
            rasterizer,
            document: None,
        }
    }

    /// Estimate the content rectangle of page `page_index`.
    ///
    /// PDF pages are rasterized at 72 dpi; image pages are scanned from
    /// their own pixels, which already sit at one pixel per point.
    pub fn estimate(&mut self, page_index: usize) -> ClipEstimate {
        let source = self.source;
        let page = match source.page_rect(page_index) {
            Ok(rect) if !rect.is_empty() => rect,
            _ => return ClipEstimate::Unavailable(TrimUnavailable::InvalidPage),
        };

        let raster = match source.content() {
            SourceContent::Image(image) => flatten_on_white(image),
            SourceContent::Pdf { bytes, .. } => {
                let rotation = source.page_rotation(page_index).unwrap_or(0);
                if rotation % 90 != 0 {
                    return ClipEstimate::Unavailable(TrimUnavailable::RotatedPage(rotation));
                }
                let document = match self.raster_document(bytes) {
                    Ok(document) => document,
                    Err(reason) => return ClipEstimate::Unavailable(reason),
                };
                let zoom = TRIM_SCAN_DPI / POINTS_PER_INCH;
                match document.rasterize_page(page_index, zoom) {
                    Ok(image) => flatten_on_white(&image),
                    Err(e) => {
                        return ClipEstimate::Unavailable(TrimUnavailable::RasterizeFailed(
                            e.to_string(),
                        ));
                    }
                }
            }
        };

        estimate_from_raster(&raster, &page, self.threshold)
    }

    /// Clip rectangle for a page, falling back to the full page rectangle
    /// whenever estimation is unavailable.
    pub fn clip_or_full(&mut self, page_index: usize) -> Rect {
        let full = self.source.page_rect(page_index).unwrap_or_default();
        match self.estimate(page_index) {
            ClipEstimate::Content(rect) => rect,
            ClipEstimate::Unavailable(reason) => {
                log::debug!("Not trimming page {}: {}", page_index + 1, reason);
                full
            }
        }
    }

    fn raster_document(&mut self, bytes: &'a [u8]) -> Result<&dyn RasterDocument, TrimUnavailable> {
        let rasterizer = self.rasterizer;
        let opened = self.document.get_or_insert_with(|| {
            let rasterizer = rasterizer.ok_or(TrimUnavailable::NoRasterizer)?;
            rasterizer
                .open(bytes)
                .map_err(|e| TrimUnavailable::RasterizeFailed(e.to_string()))
        });
        match opened {
            Ok(document) => Ok(&**document),
            Err(reason) => Err(reason.clone()),
        }
    }
}

/// Estimate the content rectangle of one source page
pub fn estimate_content_clip(
    source: &SourceDocument,
    page_index: usize,
    threshold: u8,
    rasterizer: Option<&dyn PageRasterizer>,
) -> ClipEstimate {
    ContentScanner::new(source, threshold, rasterizer).estimate(page_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn white(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_bbox_of_blank_image_is_none() {
        assert_eq!(nonwhite_bbox(&white(10, 10), 245), None);
    }

    #[test]
    fn test_bbox_uses_darkest_channel() {
        let mut img = white(10, 10);
        // Only the blue channel is dark enough
        img.put_pixel(3, 4, Rgb([255, 255, 100]));
        img.put_pixel(6, 7, Rgb([250, 250, 250]));

        assert_eq!(
            nonwhite_bbox(&img, 245),
            Some(PixelBox {
                x0: 3,
                y0: 4,
                x1: 4,
                y1: 5
            })
        );
        // Raising the threshold picks up the light gray pixel too
        assert_eq!(
            nonwhite_bbox(&img, 251),
            Some(PixelBox {
                x0: 3,
                y0: 4,
                x1: 7,
                y1: 8
            })
        );
    }

    #[test]
    fn test_pixel_box_maps_top_down_rows() {
        let page = Rect::new(0.0, 0.0, 100.0, 200.0);
        let bbox = PixelBox {
            x0: 10,
            y0: 20,
            x1: 30,
            y1: 60,
        };
        // Raster at one pixel per point
        let rect = pixel_box_to_page(bbox, &page, (100, 200));
        assert_eq!(rect, Rect::new(10.0, 140.0, 20.0, 40.0));
    }

    #[test]
    fn test_estimate_pads_and_clips_to_page() {
        let mut img = white(50, 50);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(20, 20, Rgb([0, 0, 0]));
        let page = Rect::new(0.0, 0.0, 50.0, 50.0);

        let clip = estimate_from_raster(&img, &page, 245).or_full_page(page);
        // Left/top padding is cut off by the page edge, right/bottom kept
        assert_eq!(clip, Rect::new(0.0, 27.0, 23.0, 23.0));
        assert!(page.contains(&clip));
    }

    #[test]
    fn test_blank_raster_is_unavailable() {
        let page = Rect::new(0.0, 0.0, 10.0, 10.0);
        let estimate = estimate_from_raster(&white(10, 10), &page, 245);
        assert_eq!(
            estimate,
            ClipEstimate::Unavailable(TrimUnavailable::BlankPage)
        );
        assert_eq!(estimate.or_full_page(page), page);
    }
}
