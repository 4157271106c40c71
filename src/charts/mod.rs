//! Raster chart rendering for the report pages.
//!
//! Every page is a [`Chart`]: a value built from an aggregated view of the
//! table that knows how to draw itself onto a `plotters` drawing area. The
//! [`render`] function draws a chart into an in-memory RGB buffer which the
//! writer later embeds into the PDF.

mod bars;
mod pie;

use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::fonts::ReportFonts;

pub use bars::{AuthorPanel, TopAuthorsByGenreChart, TopAuthorsChart};
pub use pie::{wedges, GenreShareChart, PieCell, Wedge, YearlyGenreChart};

/// Font family name used by every chart text style.
pub const CHART_FONT: &str = "sans-serif";

/// The drawing surface charts render onto.
pub type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Errors raised while drawing a single chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// The chart fonts could not be registered with the rasteriser.
    Fonts(String),
    /// A drawing operation failed.
    Drawing(String),
    /// The pixel buffer did not match the requested dimensions.
    Buffer {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fonts(reason) => write!(f, "Failed to register chart fonts: {reason}"),
            Self::Drawing(reason) => write!(f, "Failed to draw chart: {reason}"),
            Self::Buffer { width, height } => {
                write!(f, "Chart buffer does not hold a {width}x{height} RGB image")
            }
        }
    }
}

impl std::error::Error for ChartError {}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(err.to_string())
    }
}

/// A report page that can draw itself.
pub trait Chart {
    /// Page title, also used for the PDF outline.
    fn title(&self) -> &str;

    /// Short stable identifier of the page.
    fn identifier(&self) -> &'static str;

    /// Size of the rendered image in pixels.
    fn size(&self) -> (u32, u32);

    /// Draws the chart onto `canvas`, which has already been cleared to white.
    fn draw(&self, canvas: &Canvas<'_>) -> Result<(), ChartError>;
}

/// A chart rasterised into an RGB image.
#[derive(Clone, Debug)]
pub struct RenderedChart {
    /// Page title.
    pub title: String,
    /// Page identifier.
    pub identifier: &'static str,
    /// Rendered pixels.
    pub image: image::RgbImage,
}

/// Draws `chart` into a new image.
pub fn render(chart: &dyn Chart) -> Result<RenderedChart, ChartError> {
    let (width, height) = chart.size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let canvas = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        canvas.fill(&WHITE)?;
        chart.draw(&canvas)?;
        canvas.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or(ChartError::Buffer { width, height })?;
    Ok(RenderedChart {
        title: chart.title().to_string(),
        identifier: chart.identifier(),
        image,
    })
}

static FONT_REGISTRATION: OnceLock<Result<(), ChartError>> = OnceLock::new();

/// Registers the report fonts under [`CHART_FONT`].
///
/// Registration happens once per process; later calls return the first outcome.
pub fn register_fonts(fonts: &ReportFonts) -> Result<(), ChartError> {
    FONT_REGISTRATION
        .get_or_init(|| {
            let leak =
                |bytes: &[u8]| -> &'static [u8] { Box::leak(bytes.to_vec().into_boxed_slice()) };
            plotters::style::register_font(CHART_FONT, FontStyle::Normal, leak(fonts.regular()))
                .map_err(|_| {
                    ChartError::Fonts(format!("{} regular is not a valid font", fonts.family_name()))
                })?;
            plotters::style::register_font(CHART_FONT, FontStyle::Bold, leak(fonts.bold()))
                .map_err(|_| {
                    ChartError::Fonts(format!("{} bold is not a valid font", fonts.family_name()))
                })?;
            Ok(())
        })
        .clone()
}

/// Colour palettes matching the report's look.
pub mod palette {
    use plotters::style::RGBColor;

    /// Qualitative palette for the overall genre donut.
    pub const SET2: [RGBColor; 8] = [
        RGBColor(102, 194, 165),
        RGBColor(252, 141, 98),
        RGBColor(141, 160, 203),
        RGBColor(231, 138, 195),
        RGBColor(166, 216, 84),
        RGBColor(255, 217, 47),
        RGBColor(229, 196, 148),
        RGBColor(179, 179, 179),
    ];

    /// Two-colour diverging palette for the per-year pies and genre bars.
    pub const COOLWARM: [RGBColor; 2] = [RGBColor(59, 76, 192), RGBColor(180, 4, 38)];

    /// Title colour of the overall cell in the per-year grid.
    pub const DARK_GREEN: RGBColor = RGBColor(0, 100, 0);

    /// Title colour of the year cells in the per-year grid.
    pub const DARK_RED: RGBColor = RGBColor(139, 0, 0);

    /// Returns `count` evenly spaced hues at fixed lightness and saturation.
    pub fn hues(count: usize) -> Vec<RGBColor> {
        (0..count)
            .map(|index| {
                let hue = 360.0 * index as f64 / count.max(1) as f64;
                hsl_to_rgb(hue, 0.65, 0.55)
            })
            .collect()
    }

    fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> RGBColor {
        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let sector = hue / 60.0;
        let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = lightness - chroma / 2.0;
        let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        RGBColor(channel(r), channel(g), channel(b))
    }
}

pub(crate) fn title_style(size: u32) -> TextStyle<'static> {
    (CHART_FONT, size)
        .into_font()
        .style(FontStyle::Bold)
        .color(&BLACK)
}

pub(crate) fn label_style(size: u32) -> TextStyle<'static> {
    colored_label_style(size, BLACK)
}

pub(crate) fn colored_label_style(size: u32, color: RGBColor) -> TextStyle<'static> {
    (CHART_FONT, size).into_font().color(&color)
}

pub(crate) fn centered(style: TextStyle<'static>) -> TextStyle<'static> {
    style.pos(Pos::new(HPos::Center, VPos::Center))
}

/// Writes a centred "No data" note on an otherwise empty panel.
pub(crate) fn draw_no_data(canvas: &Canvas<'_>) -> Result<(), ChartError> {
    let (width, height) = canvas.dim_in_pixel();
    canvas.draw(&Text::new(
        "No data",
        (width as i32 / 2, height as i32 / 2),
        centered(colored_label_style(16, RGBColor(128, 128, 128))),
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::palette;

    #[test]
    fn hues_are_distinct() {
        let colors = palette::hues(20);
        assert_eq!(colors.len(), 20);
        for (index, color) in colors.iter().enumerate() {
            assert!(!colors[index + 1..].contains(color));
        }
    }

    #[test]
    fn first_hue_is_red_dominant() {
        let color = palette::hues(4)[0];
        assert!(color.0 > color.1 && color.0 > color.2);
    }
}
