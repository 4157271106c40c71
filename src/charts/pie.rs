//! Genre share pies: the overall donut and the per-year grid.

use std::ops::RangeInclusive;

use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{
    colored_label_style, draw_no_data, label_style, palette, title_style, Canvas, Chart,
    ChartError,
};
use crate::aggregate::{self, Counts};
use crate::features::BookTable;

/// Start angle handed to [`Pie`]; the backend's y axis points down, so this is 12 o'clock.
const START_ANGLE_DEGREES: f64 = -90.0;

/// Number of columns in the per-year grid.
const GRID_COLUMNS: usize = 6;

/// Width of the legend strip next to the pies.
const LEGEND_WIDTH: u32 = 180;

/// One slice of a pie.
#[derive(Clone, Debug, PartialEq)]
pub struct Wedge {
    /// Category label.
    pub label: String,
    /// Number of records in the category.
    pub count: usize,
    /// Share of the total, in percent.
    pub percent: f64,
}

impl Wedge {
    /// Count recovered from the rounded percentage, as printed on the donut.
    pub fn label_count(&self, total: usize) -> usize {
        (self.percent * total as f64 / 100.0).round() as usize
    }

    /// Text placed next to the wedge on the donut.
    pub fn donut_label(&self, total: usize) -> String {
        format!(
            "{} {:.2}% ({})",
            self.label,
            self.percent,
            self.label_count(total)
        )
    }
}

/// Splits `counts` into wedges in input order.
///
/// Categories with a zero count are skipped; an empty or all-zero input yields
/// no wedges.
pub fn wedges(counts: &[(String, usize)]) -> Vec<Wedge> {
    let total = aggregate::total(counts);
    if total == 0 {
        return Vec::new();
    }

    counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| Wedge {
            label: label.clone(),
            count: *count,
            percent: *count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// [`Pie`] sweeps clockwise on screen. Handing it the slices in reverse order
/// from 12 o'clock lays them out counter-clockwise in input order.
fn counter_clockwise<T: Clone>(slices: &[T]) -> Vec<T> {
    slices.iter().rev().cloned().collect()
}

fn draw_legend(area: &Canvas<'_>, entries: &[(String, RGBColor)]) -> Result<(), ChartError> {
    let (_, height) = area.dim_in_pixel();
    let row_height = 30;
    let mut y = height as i32 / 2 - (entries.len() as i32 * row_height) / 2;

    for (label, color) in entries {
        area.draw(&Rectangle::new([(10, y), (34, y + 18)], color.filled()))?;
        area.draw(&Text::new(
            label.clone(),
            (42, y + 9),
            label_style(18).pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
        y += row_height;
    }

    Ok(())
}

/// Donut of the deduplicated genre share.
#[derive(Clone, Debug)]
pub struct GenreShareChart {
    title: String,
    counts: Counts,
}

impl GenreShareChart {
    /// Counts genres over the distinct titles of `table`.
    pub fn from_table(table: &BookTable, years: &RangeInclusive<i32>) -> Self {
        Self::new(
            format!(
                "Distribution of Genre ({}-{})",
                years.start(),
                years.end()
            ),
            aggregate::genre_counts(aggregate::unique_titles(table)),
        )
    }

    /// Builds the chart from precomputed counts.
    pub fn new(title: impl Into<String>, counts: Counts) -> Self {
        Self {
            title: title.into(),
            counts,
        }
    }

    /// Genre counts shown by the donut, largest first.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }
}

impl Chart for GenreShareChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn identifier(&self) -> &'static str {
        "genre-share"
    }

    fn size(&self) -> (u32, u32) {
        (1000, 800)
    }

    fn draw(&self, canvas: &Canvas<'_>) -> Result<(), ChartError> {
        let body = canvas.titled(&self.title, title_style(36))?;
        let wedges = wedges(&self.counts);
        if wedges.is_empty() {
            return draw_no_data(&body);
        }

        let (width, height) = body.dim_in_pixel();
        let (pie_area, legend) = body.split_horizontally(width.saturating_sub(LEGEND_WIDTH));
        let center = ((width.saturating_sub(LEGEND_WIDTH) / 2) as i32, height as i32 / 2);
        let radius = f64::from(width.saturating_sub(LEGEND_WIDTH).min(height)) * 0.3;

        let total = aggregate::total(&self.counts);
        let sizes: Vec<f64> = wedges.iter().map(|wedge| wedge.count as f64).collect();
        let colors: Vec<RGBColor> = (0..wedges.len())
            .map(|index| palette::SET2[index % palette::SET2.len()])
            .collect();
        let labels: Vec<String> = wedges.iter().map(|wedge| wedge.donut_label(total)).collect();

        let (sizes, pie_colors, labels) = (
            counter_clockwise(&sizes),
            counter_clockwise(&colors),
            counter_clockwise(&labels),
        );
        let mut pie = Pie::new(&center, &radius, &sizes, &pie_colors, &labels);
        pie.start_angle(START_ANGLE_DEGREES);
        pie.donut_hole(radius * 0.7);
        pie.label_style(label_style(20));
        pie_area.draw(&pie)?;

        let entries: Vec<(String, RGBColor)> = wedges
            .iter()
            .map(|wedge| wedge.label.clone())
            .zip(colors)
            .collect();
        draw_legend(&legend, &entries)
    }
}

/// A titled pie in the per-year grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PieCell {
    /// Cell heading, a year or the overall range.
    pub title: String,
    /// Genre counts for the cell.
    pub counts: Counts,
    /// Whether the cell summarises the whole range.
    pub overall: bool,
}

/// Grid of genre pies: one overall cell followed by one cell per year.
#[derive(Clone, Debug)]
pub struct YearlyGenreChart {
    title: String,
    cells: Vec<PieCell>,
    genres: Vec<String>,
}

impl YearlyGenreChart {
    /// Builds the overall cell from distinct titles and one cell per year from
    /// every row listed in that year.
    pub fn from_table(table: &BookTable, years: &RangeInclusive<i32>) -> Self {
        let overall = PieCell {
            title: format!("{}-{} (Overall)", years.start(), years.end()),
            counts: aggregate::genre_counts(aggregate::unique_titles(table)),
            overall: true,
        };

        let mut cells = vec![overall];
        cells.extend(years.clone().map(|year| PieCell {
            title: year.to_string(),
            counts: aggregate::genre_counts_for_year(table, year),
            overall: false,
        }));

        Self::new("Fiction vs Non-Fiction by Year", cells)
    }

    /// Builds the chart from precomputed cells.
    pub fn new(title: impl Into<String>, cells: Vec<PieCell>) -> Self {
        let mut genres: Vec<String> = Vec::new();
        for cell in &cells {
            for (genre, _) in &cell.counts {
                if !genres.contains(genre) {
                    genres.push(genre.clone());
                }
            }
        }

        Self {
            title: title.into(),
            cells,
            genres,
        }
    }

    /// All cells in drawing order.
    pub fn cells(&self) -> &[PieCell] {
        &self.cells
    }

    /// Genres in legend order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Grid rows and columns needed for the cells.
    pub fn grid_shape(&self) -> (usize, usize) {
        let rows = (self.cells.len() + GRID_COLUMNS - 1) / GRID_COLUMNS;
        (rows.max(1), GRID_COLUMNS)
    }

    /// Colour assigned to `genre`, stable across all cells.
    pub fn genre_color(&self, genre: &str) -> RGBColor {
        match self.genres.iter().position(|known| known == genre) {
            Some(index) if index < palette::COOLWARM.len() => palette::COOLWARM[index],
            Some(index) => palette::SET2[index % palette::SET2.len()],
            None => RGBColor(128, 128, 128),
        }
    }

    fn draw_cell(&self, area: &Canvas<'_>, cell: &PieCell) -> Result<(), ChartError> {
        let heading = if cell.overall {
            colored_label_style(20, palette::DARK_GREEN)
        } else {
            colored_label_style(18, palette::DARK_RED)
        };
        let body = area.titled(&cell.title, heading)?;

        let wedges = wedges(&cell.counts);
        if wedges.is_empty() {
            return draw_no_data(&body);
        }

        let (width, height) = body.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let scale = if cell.overall { 0.46 } else { 0.40 };
        let radius = f64::from(width.min(height)) * scale;

        let sizes: Vec<f64> = wedges.iter().map(|wedge| wedge.count as f64).collect();
        let colors: Vec<RGBColor> = wedges
            .iter()
            .map(|wedge| self.genre_color(&wedge.label))
            .collect();
        let (sizes, colors) = (counter_clockwise(&sizes), counter_clockwise(&colors));
        let labels = vec![String::new(); wedges.len()];

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(START_ANGLE_DEGREES);
        pie.percentages(colored_label_style(15, WHITE));
        body.draw(&pie)?;
        Ok(())
    }

    fn legend_entries(&self) -> Vec<(String, RGBColor)> {
        self.genres
            .iter()
            .map(|genre| (genre.clone(), self.genre_color(genre)))
            .collect()
    }
}

impl Chart for YearlyGenreChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn identifier(&self) -> &'static str {
        "genre-by-year"
    }

    fn size(&self) -> (u32, u32) {
        (1400, 700)
    }

    fn draw(&self, canvas: &Canvas<'_>) -> Result<(), ChartError> {
        let body = canvas.titled(&self.title, title_style(30))?;
        let (width, _) = body.dim_in_pixel();
        let (grid, legend) = body.split_horizontally(width.saturating_sub(LEGEND_WIDTH));

        let shape = self.grid_shape();
        for (area, cell) in grid.split_evenly(shape).iter().zip(&self.cells) {
            self.draw_cell(area, cell)?;
        }

        draw_legend(&legend, &self.legend_entries())
    }
}
