//! Page rasterization
//!
//! Rasterizing PDF pages is delegated to pdfium. Everything that needs
//! pixels goes through [`PageRasterizer`] so callers (and tests) can plug in
//! another backend or none at all.

use crate::types::*;
use image::{DynamicImage, Rgb, RgbImage};

/// Renders PDF pages into pixels.
pub trait PageRasterizer {
    /// Parse the PDF in `pdf` once so any number of its pages can be
    /// rasterized without loading it again.
    fn open<'a>(&'a self, pdf: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>>;

    /// Rasterize page `page_index` (zero-based) of the PDF in `pdf` at
    /// `scale` pixels per point.
    fn rasterize(&self, pdf: &[u8], page_index: usize, scale: f32) -> Result<DynamicImage> {
        self.open(pdf)?.rasterize_page(page_index, scale)
    }
}

/// A PDF opened by a [`PageRasterizer`]
pub trait RasterDocument {
    /// Rasterize page `page_index` (zero-based) at `scale` pixels per point
    fn rasterize_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage>;
}

/// Composite any transparency over opaque white and drop the alpha channel
pub fn flatten_on_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }

    out
}

#[cfg(feature = "pdfium")]
pub use pdfium_backend::{PdfiumRasterizer, init_pdfium};

#[cfg(feature = "pdfium")]
mod pdfium_backend {
    use super::{PageRasterizer, RasterDocument};
    use crate::types::*;
    use image::DynamicImage;
    use pdfium_render::prelude::*;

    /// Initialize Pdfium, trying the vendored library first, then falling back to system
    pub fn init_pdfium() -> std::result::Result<Pdfium, PdfiumError> {
        // When running from cargo, the working directory is the workspace root
        let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
            p.push("vendor/pdfium/lib");
            if p.exists() { Some(p) } else { None }
        });

        if let Some(vendor_path) = vendor_path {
            if let Ok(binding) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
            {
                return Ok(Pdfium::new(binding));
            }
        }

        Pdfium::bind_to_system_library().map(Pdfium::new)
    }

    fn render_error(e: PdfiumError) -> NupError {
        NupError::Render(e.to_string())
    }

    /// Rasterizer backed by a bound pdfium library
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        pub fn new() -> Result<Self> {
            let pdfium = init_pdfium().map_err(render_error)?;
            Ok(Self { pdfium })
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn open<'a>(&'a self, pdf: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(pdf, None)
                .map_err(render_error)?;
            Ok(Box::new(PdfiumDocument { document }))
        }
    }

    /// A document loaded into pdfium
    struct PdfiumDocument<'a> {
        document: PdfDocument<'a>,
    }

    impl RasterDocument for PdfiumDocument<'_> {
        fn rasterize_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage> {
            let pages = self.document.pages();
            let count = pages.len() as usize;
            if page_index >= count {
                return Err(NupError::PageOutOfRange {
                    index: page_index,
                    count,
                });
            }

            let page = pages.get(page_index as u16).map_err(render_error)?;
            let config = PdfRenderConfig::new().scale_page_by_factor(scale);
            let bitmap = page.render_with_config(&config).map_err(render_error)?;

            Ok(bitmap.as_image())
        }
    }
}

/// The rasterizer used when callers do not supply one.
///
/// Returns `None` when no backend is compiled in or pdfium cannot be bound;
/// whitespace trimming then falls back to full pages.
pub fn default_rasterizer() -> Option<Box<dyn PageRasterizer>> {
    #[cfg(feature = "pdfium")]
    {
        match PdfiumRasterizer::new() {
            Ok(rasterizer) => return Some(Box::new(rasterizer)),
            Err(e) => log::warn!("Pdfium unavailable, pages will not be trimmed: {}", e),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// Counts how often a PDF is opened and which pages are drawn
    #[derive(Default)]
    struct CountingRasterizer {
        opened: Cell<usize>,
    }

    struct SolidPages;

    impl RasterDocument for SolidPages {
        fn rasterize_page(&self, page_index: usize, _scale: f32) -> Result<DynamicImage> {
            Ok(DynamicImage::ImageRgb8(RgbImage::new(page_index as u32 + 1, 1)))
        }
    }

    impl PageRasterizer for CountingRasterizer {
        fn open<'a>(&'a self, _pdf: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>> {
            self.opened.set(self.opened.get() + 1);
            Ok(Box::new(SolidPages))
        }
    }

    #[test]
    fn test_rasterize_opens_the_document_per_call() {
        let rasterizer = CountingRasterizer::default();
        let image = rasterizer.rasterize(b"%PDF-1.7", 2, 1.0).unwrap();
        assert_eq!(image.width(), 3);

        let document = rasterizer.open(b"%PDF-1.7").unwrap();
        for page in 0..4 {
            document.rasterize_page(page, 1.0).unwrap();
        }
        assert_eq!(rasterizer.opened.get(), 2);
    }

    #[test]
    fn test_flatten_transparent_becomes_white() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let flat = flatten_on_white(&DynamicImage::ImageRgba8(img));
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(flat.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 128]));

        let flat = flatten_on_white(&DynamicImage::ImageRgba8(img));
        let v = flat.get_pixel(0, 0)[0];
        assert!((126..=128).contains(&v), "got {}", v);
    }
}
