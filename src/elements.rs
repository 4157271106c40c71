//! `genpdf` elements used by the report pages.
//!
//! [`ChartImage`] embeds a rasterised chart with a caption underneath and scales
//! the chart so that it fits inside a bounding box while keeping its aspect
//! ratio.

use genpdf::elements::{Image, Paragraph};
use genpdf::error::Error;
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

/// Resolution `genpdf` assumes for embedded images.
const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const CAPTION_SPACING_MM: f64 = 2.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Natural size of an image with the given pixel dimensions at `dpi`, in millimetres.
pub fn natural_size_mm(pixels: (u32, u32), dpi: f64) -> (f64, f64) {
    (
        MM_PER_INCH * f64::from(pixels.0) / dpi,
        MM_PER_INCH * f64::from(pixels.1) / dpi,
    )
}

/// Largest uniform scale that fits `natural` into `bounds` (both in millimetres).
///
/// Degenerate sizes scale by `1.0`.
pub fn fit_scale(natural: (f64, f64), bounds: (f64, f64)) -> f64 {
    if natural.0 <= f64::EPSILON || natural.1 <= f64::EPSILON {
        return 1.0;
    }
    (bounds.0 / natural.0).min(bounds.1 / natural.1)
}

/// A chart image centred on the page with a caption below it.
pub struct ChartImage {
    image: Image,
    caption: Paragraph,
    natural_size: (f64, f64),
    bounds: Option<(f64, f64)>,
}

impl ChartImage {
    /// Wraps the RGB pixels of a rendered chart.
    pub fn from_rgb(pixels: image::RgbImage, caption: Paragraph) -> Result<Self, Error> {
        let natural_size = natural_size_mm(pixels.dimensions(), DEFAULT_IMAGE_DPI);
        let image = Image::from_dynamic_image(image::DynamicImage::ImageRgb8(pixels))?;

        let mut element = Self {
            image,
            caption,
            natural_size,
            bounds: None,
        };
        element.apply_layout();
        Ok(element)
    }

    /// Constrains the rendered image to `width` × `height` millimetres.
    pub fn with_bounds(mut self, width: f64, height: f64) -> Self {
        self.bounds = Some((width, height));
        self.apply_layout();
        self
    }

    /// Size the image will occupy once scaled, in millimetres.
    pub fn rendered_size(&self) -> (f64, f64) {
        let scale = self.scale();
        (self.natural_size.0 * scale, self.natural_size.1 * scale)
    }

    fn scale(&self) -> f64 {
        self.bounds
            .map_or(1.0, |bounds| fit_scale(self.natural_size, bounds))
    }

    fn apply_layout(&mut self) {
        let scale = self.scale();
        self.image.set_alignment(Alignment::Center);
        self.image.set_scale(Scale::new(scale, scale));
        self.caption.set_alignment(Alignment::Center);
    }
}

impl Element for ChartImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.apply_layout();

        let mut result = RenderResult::default();
        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;
        if image_result.has_more {
            return Ok(result);
        }

        let spacing = mm_from_f64(CAPTION_SPACING_MM);
        area.add_offset(Position::new(0, image_result.size.height + spacing));
        result.size = result.size.stack_vertical(Size::new(0, spacing));

        let caption_result = self.caption.render(context, area, style)?;
        result.size = result.size.stack_vertical(caption_result.size);
        result.has_more |= caption_result.has_more;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_size_uses_dpi() {
        let (width, height) = natural_size_mm((300, 600), 300.0);
        assert!((width - 25.4).abs() < 1e-9);
        assert!((height - 50.8).abs() < 1e-9);
    }

    #[test]
    fn fit_scale_respects_the_tighter_bound() {
        // 1400x700 px chart into a 257 x 145 mm box is width bound.
        let natural = natural_size_mm((1400, 700), 300.0);
        let scale = fit_scale(natural, (257.0, 145.0));
        assert!((natural.0 * scale - 257.0).abs() < 1e-9);
        assert!(natural.1 * scale <= 145.0);

        // A square chart is height bound.
        let natural = natural_size_mm((800, 800), 300.0);
        let scale = fit_scale(natural, (257.0, 145.0));
        assert!((natural.1 * scale - 145.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_images_are_not_scaled() {
        assert_eq!(fit_scale((0.0, 10.0), (100.0, 100.0)), 1.0);
    }

    #[test]
    fn bounded_chart_reports_scaled_size() {
        let chart = ChartImage::from_rgb(image::RgbImage::new(800, 400), Paragraph::new("c"))
            .unwrap()
            .with_bounds(100.0, 100.0);
        let (width, height) = chart.rendered_size();
        assert!((width - 100.0).abs() < 1e-9);
        assert!((height - 50.0).abs() < 1e-9);
    }
}
