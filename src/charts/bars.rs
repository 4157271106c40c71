//! Horizontal author panels: genre leaders and the top-20 comparison.
//!
//! Each panel is a plotters cartesian chart whose y axis holds one band per
//! author. Rank 0 sits on the top band.

use std::ops::RangeInclusive;

use plotters::element::DashedPathElement;
use plotters::prelude::*;

use super::{draw_no_data, label_style, palette, title_style, Canvas, Chart, ChartError};
use crate::aggregate::{self, AuthorMetrics, Counts};
use crate::dataset::{GENRE_FICTION, GENRE_NON_FICTION};
use crate::features::BookTable;

/// Number of authors shown per genre panel.
pub const GENRE_PANEL_AUTHORS: usize = 11;

/// Number of authors on the top authors page.
pub const TOP_AUTHORS: usize = 20;

const AUTHOR_FONT_SIZE: u32 = 15;
const AUTHOR_LABEL_PADDING: u32 = 24;
const UNLABELLED_AREA: u32 = 12;
const PANEL_MARGIN: u32 = 10;
const X_LABEL_AREA: u32 = 30;
const X_LABELS: usize = 6;
const BAR_HALF_HEIGHT: f64 = 0.36;

const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const LOLLIPOP_APPEARANCES: RGBColor = RGBColor(0, 128, 0);
const LOLLIPOP_UNIQUE: RGBColor = RGBColor(0, 0, 255);

/// Band coordinate of `rank` on a panel with `rows` bands.
fn rank_row(rank: usize, rows: usize) -> f64 {
    rows.saturating_sub(rank + 1) as f64
}

/// Rank drawn on band `y`, if `y` is a band centre.
fn row_rank(y: f64, rows: usize) -> Option<usize> {
    let band = y.round();
    if (y - band).abs() > 1e-6 || band < 0.0 || band >= rows as f64 {
        return None;
    }
    Some(rows - 1 - band as usize)
}

fn value_label(value: f64, integer: bool) -> String {
    if !integer {
        return format!("{value:.1}");
    }
    if (value - value.round()).abs() > 1e-6 {
        return String::new();
    }
    format!("{value:.0}")
}

/// Width of the y label area that fits the widest of `authors`.
fn author_label_width(area: &Canvas<'_>, authors: &[String]) -> Result<u32, ChartError> {
    let style = label_style(AUTHOR_FONT_SIZE);
    let mut widest = 0;
    for author in authors {
        let (width, _) = area.estimate_text_size(author, &style)?;
        widest = widest.max(width);
    }
    let (area_width, _) = area.dim_in_pixel();
    Ok((widest + AUTHOR_LABEL_PADDING).min(area_width / 2))
}

#[derive(Clone, Copy)]
enum Marks<'a> {
    Bars {
        colors: &'a [RGBColor],
        outlined: bool,
    },
    Lollipops {
        stems: &'a [RGBColor],
        marker: RGBColor,
    },
}

struct HorizontalPanel<'a> {
    title: &'a str,
    authors: &'a [String],
    values: &'a [f64],
    label_width: Option<u32>,
    integer: bool,
    marks: Marks<'a>,
}

impl HorizontalPanel<'_> {
    fn draw(&self, area: &Canvas<'_>) -> Result<(), ChartError> {
        if self.values.is_empty() {
            let body = area.titled(self.title, title_style(20))?;
            return draw_no_data(&body);
        }

        let rows = self.values.len();
        let max = self.values.iter().copied().fold(0.0, f64::max);
        let x_max = if max > 0.0 { max * 1.1 } else { 1.0 };
        let label_width = self.label_width.unwrap_or(UNLABELLED_AREA);

        let mut chart = ChartBuilder::on(area)
            .caption(self.title, title_style(20))
            .margin(PANEL_MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(label_width)
            .build_cartesian_2d(0f64..x_max, -0.5f64..rows as f64 - 0.5)?;

        let author_label = |y: &f64| match (self.label_width, row_rank(*y, rows)) {
            (Some(_), Some(rank)) => self.authors.get(rank).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        let integer = self.integer;
        let x_label = |x: &f64| value_label(*x, integer);

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(rows)
            .x_labels(X_LABELS)
            .y_label_formatter(&author_label)
            .x_label_formatter(&x_label)
            .y_label_style(label_style(AUTHOR_FONT_SIZE))
            .x_label_style(label_style(14))
            .light_line_style(GRID_COLOR.stroke_width(1))
            .bold_line_style(GRID_COLOR.stroke_width(1))
            .draw()?;

        let rows_and_values = || {
            self.values
                .iter()
                .enumerate()
                .map(move |(rank, value)| (rank, rank_row(rank, rows), value.max(0.0)))
        };

        match self.marks {
            Marks::Bars { colors, outlined } => {
                let color_of = |rank: usize| colors[rank % colors.len().max(1)];
                chart.draw_series(rows_and_values().map(|(rank, y, value)| {
                    Rectangle::new(
                        [(0.0, y - BAR_HALF_HEIGHT), (value, y + BAR_HALF_HEIGHT)],
                        color_of(rank).filled(),
                    )
                }))?;
                if outlined {
                    chart.draw_series(rows_and_values().map(|(_, y, value)| {
                        Rectangle::new(
                            [(0.0, y - BAR_HALF_HEIGHT), (value, y + BAR_HALF_HEIGHT)],
                            BLACK.stroke_width(1),
                        )
                    }))?;
                }
            }
            Marks::Lollipops { stems, marker } => {
                chart.draw_series(rows_and_values().map(|(rank, y, value)| {
                    let stem = stems[rank % stems.len().max(1)];
                    DashedPathElement::new(vec![(0.0, y), (value, y)], 6, 4, stem.stroke_width(2))
                }))?;
                chart.draw_series(
                    rows_and_values()
                        .map(|(_, y, value)| Circle::new((value, y), 6, marker.filled())),
                )?;
            }
        }

        Ok(())
    }
}

/// Ranked authors of one genre.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorPanel {
    /// Panel heading.
    pub title: String,
    /// Genre the panel ranks.
    pub genre: String,
    /// Authors and distinct title counts, highest first.
    pub entries: Counts,
}

/// Two bar panels ranking authors by distinct titles per genre.
#[derive(Clone, Debug)]
pub struct TopAuthorsByGenreChart {
    panels: Vec<AuthorPanel>,
}

impl TopAuthorsByGenreChart {
    /// Ranks non-fiction and fiction authors over the distinct titles of `table`.
    pub fn from_table(table: &BookTable) -> Self {
        let unique = aggregate::unique_titles(table);
        let panel = |title: &str, genre: &str| AuthorPanel {
            title: title.to_string(),
            genre: genre.to_string(),
            entries: aggregate::top_authors_in_genre(&unique, genre, GENRE_PANEL_AUTHORS),
        };

        Self::new(vec![
            panel("Top Non-Fiction Authors", GENRE_NON_FICTION),
            panel("Top Fiction Authors", GENRE_FICTION),
        ])
    }

    /// Builds the chart from precomputed panels.
    pub fn new(panels: Vec<AuthorPanel>) -> Self {
        Self { panels }
    }

    /// Panels in drawing order.
    pub fn panels(&self) -> &[AuthorPanel] {
        &self.panels
    }
}

impl Chart for TopAuthorsByGenreChart {
    fn title(&self) -> &str {
        "Top Authors by Genre"
    }

    fn identifier(&self) -> &'static str {
        "top-authors-by-genre"
    }

    fn size(&self) -> (u32, u32) {
        (1300, 800)
    }

    fn draw(&self, canvas: &Canvas<'_>) -> Result<(), ChartError> {
        let areas = canvas.split_evenly((1, self.panels.len().max(1)));
        for (index, (area, panel)) in areas.iter().zip(&self.panels).enumerate() {
            let authors: Vec<String> = panel.entries.iter().map(|(name, _)| name.clone()).collect();
            let values: Vec<f64> = panel
                .entries
                .iter()
                .map(|(_, count)| *count as f64)
                .collect();
            let color = [palette::COOLWARM[index % palette::COOLWARM.len()]];

            HorizontalPanel {
                title: &panel.title,
                authors: &authors,
                values: &values,
                label_width: Some(author_label_width(area, &authors)?),
                integer: true,
                marks: Marks::Bars {
                    colors: &color,
                    outlined: false,
                },
            }
            .draw(area)?;
        }
        Ok(())
    }
}

/// Three panels comparing the most listed authors.
#[derive(Clone, Debug)]
pub struct TopAuthorsChart {
    title: String,
    metrics: Vec<AuthorMetrics>,
}

impl TopAuthorsChart {
    /// Collects metrics for the [`TOP_AUTHORS`] most listed authors of `table`.
    pub fn from_table(table: &BookTable, years: &RangeInclusive<i32>) -> Self {
        Self::new(
            format!(
                "Top {} Bestselling Authors ({}-{})",
                TOP_AUTHORS,
                years.start(),
                years.end()
            ),
            aggregate::author_metrics(table, TOP_AUTHORS),
        )
    }

    /// Builds the chart from precomputed metrics.
    pub fn new(title: impl Into<String>, metrics: Vec<AuthorMetrics>) -> Self {
        Self {
            title: title.into(),
            metrics,
        }
    }

    /// Metrics in ranking order.
    pub fn metrics(&self) -> &[AuthorMetrics] {
        &self.metrics
    }
}

impl Chart for TopAuthorsChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn identifier(&self) -> &'static str {
        "top-authors"
    }

    fn size(&self) -> (u32, u32) {
        (1400, 800)
    }

    fn draw(&self, canvas: &Canvas<'_>) -> Result<(), ChartError> {
        let body = canvas.titled(&self.title, title_style(30))?;
        let authors: Vec<String> = self.metrics.iter().map(|m| m.author.clone()).collect();
        let label_width = author_label_width(&body, &authors)?;

        // The first panel also carries the author names.
        let (width, _) = body.dim_in_pixel();
        let panel_width = width.saturating_sub(label_width) / 3;
        let (first, rest) = body.split_horizontally(label_width + panel_width);
        let rest = rest.split_evenly((1, 2));

        let appearances: Vec<f64> = self.metrics.iter().map(|m| m.appearances as f64).collect();
        let unique: Vec<f64> = self.metrics.iter().map(|m| m.unique_books as f64).collect();
        let reviews: Vec<f64> = self.metrics.iter().map(|m| m.reviews_thousands).collect();
        let colors = palette::hues(self.metrics.len());

        HorizontalPanel {
            title: "Appearances",
            authors: &authors,
            values: &appearances,
            label_width: Some(label_width),
            integer: true,
            marks: Marks::Lollipops {
                stems: &colors,
                marker: LOLLIPOP_APPEARANCES,
            },
        }
        .draw(&first)?;

        HorizontalPanel {
            title: "Unique Books",
            authors: &authors,
            values: &unique,
            label_width: None,
            integer: true,
            marks: Marks::Lollipops {
                stems: &colors,
                marker: LOLLIPOP_UNIQUE,
            },
        }
        .draw(&rest[0])?;

        HorizontalPanel {
            title: "Total Reviews (in 1000s)",
            authors: &authors,
            values: &reviews,
            label_width: None,
            integer: false,
            marks: Marks::Bars {
                colors: &colors,
                outlined: true,
            },
        }
        .draw(&rest[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rank_sits_on_the_top_band() {
        assert_eq!(rank_row(0, 20), 19.0);
        assert_eq!(rank_row(19, 20), 0.0);
        assert_eq!(rank_row(0, 1), 0.0);
    }

    #[test]
    fn band_centres_map_back_to_ranks() {
        for rank in 0..11 {
            assert_eq!(row_rank(rank_row(rank, 11), 11), Some(rank));
        }
        assert_eq!(row_rank(0.5, 11), None);
        assert_eq!(row_rank(-1.0, 11), None);
        assert_eq!(row_rank(11.0, 11), None);
    }

    #[test]
    fn integer_axes_label_whole_numbers_only() {
        assert_eq!(value_label(4.0, true), "4");
        assert_eq!(value_label(0.5, true), "");
        assert_eq!(value_label(17.16, false), "17.2");
    }

    #[test]
    fn genre_panels_rank_distinct_titles() {
        use crate::dataset::BookRecord;
        use crate::features::derive_features;

        let record = |name: &str, author: &str, genre: &str| BookRecord {
            name: name.to_string(),
            author: author.to_string(),
            user_rating: 4.5,
            reviews: 10,
            price: 9.0,
            year: 2016,
            genre: genre.to_string(),
        };
        let table = derive_features(vec![
            record("Cat 1", "Dr. Seuss", GENRE_FICTION),
            record("Cat 1", "Dr. Seuss", GENRE_FICTION),
            record("Cat 2", "Dr. Seuss", GENRE_FICTION),
            record("Memo", "Michelle Obama", GENRE_NON_FICTION),
        ]);

        let chart = TopAuthorsByGenreChart::from_table(&table);
        assert_eq!(chart.panels().len(), 2);
        assert_eq!(chart.panels()[0].genre, GENRE_NON_FICTION);
        assert_eq!(
            chart.panels()[1].entries,
            vec![("Dr. Seuss".to_string(), 2)]
        );
    }
}
