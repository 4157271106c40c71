//! The end-to-end run: load, derive, chart, assemble, write, open.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::aggregate;
use crate::builder::{self, RenderedReport, ReportBuilder};
use crate::charts::{
    self, Chart, GenreShareChart, TopAuthorsByGenreChart, TopAuthorsChart, YearlyGenreChart,
};
use crate::config::ReportConfig;
use crate::dataset;
use crate::error::ReportError;
use crate::features::{self, BookTable};
use crate::fonts::{self, ReportFonts};
use crate::model::ReportPage;
use crate::viewer::ViewerStatus;

/// What a successful run produced.
#[derive(Clone, Debug)]
pub struct ReportOutcome {
    /// Absolute path of the written PDF.
    pub output_path: PathBuf,
    /// Number of pages in the PDF.
    pub page_count: usize,
    /// Titles of charts that were replaced by a notice page.
    pub failed_charts: Vec<String>,
    /// What happened when opening the PDF.
    pub viewer: ViewerStatus,
}

/// The four report charts in page order.
pub fn charts(table: &BookTable, years: &RangeInclusive<i32>) -> Vec<Box<dyn Chart>> {
    vec![
        Box::new(GenreShareChart::from_table(table, years)),
        Box::new(YearlyGenreChart::from_table(table, years)),
        Box::new(TopAuthorsByGenreChart::from_table(table)),
        Box::new(TopAuthorsChart::from_table(table, years)),
    ]
}

/// Registers the chart fonts and renders the report charts into pages.
pub fn render_pages(
    table: &BookTable,
    years: &RangeInclusive<i32>,
    fonts: &ReportFonts,
) -> Vec<ReportPage> {
    if let Err(err) = charts::register_fonts(fonts) {
        warn!("{err}; chart text may fail to render");
    }

    chart_pages(&charts(table, years), table)
}

/// Renders `charts` into pages, in order.
///
/// A chart that fails to draw is replaced by a notice page at the same
/// position.
pub fn chart_pages(charts: &[Box<dyn Chart>], table: &BookTable) -> Vec<ReportPage> {
    charts
        .iter()
        .map(|chart| {
            let caption = caption(chart.identifier(), table);
            match charts::render(chart.as_ref()) {
                Ok(rendered) => {
                    debug!(
                        "Rendered chart '{}' ({}x{} px)",
                        rendered.title,
                        rendered.image.width(),
                        rendered.image.height()
                    );
                    ReportPage::chart(rendered)
                }
                Err(err) => {
                    warn!("Chart '{}' could not be rendered: {}", chart.title(), err);
                    ReportPage::notice(chart.title(), err.to_string())
                        .with_identifier(Some(chart.identifier().to_string()))
                }
            }
            .with_caption(caption)
        })
        .collect()
}

fn caption(identifier: &str, table: &BookTable) -> Option<String> {
    let text = match identifier {
        "genre-share" => format!(
            "Genre share over {} distinct titles ({} rows in total).",
            aggregate::unique_titles(table).len(),
            table.len()
        ),
        "genre-by-year" => {
            "Genre share of every yearly list, preceded by the share over all years.".to_string()
        }
        "top-authors-by-genre" => {
            "Authors ranked by the number of distinct bestselling titles in each genre."
                .to_string()
        }
        "top-authors" => {
            "Appearances and distinct titles per author, with reviews summed over distinct titles."
                .to_string()
        }
        _ => return None,
    };
    Some(text)
}

/// Loads the dataset and renders the report into memory.
pub fn render_report(config: &ReportConfig) -> Result<RenderedReport, ReportError> {
    let records = dataset::load_books(config.input_path())?;
    let table = features::derive_features(records);
    let fonts = fonts::load_report_fonts().map_err(ReportError::Fonts)?;
    info!(
        "Using font family {} from {}",
        fonts.family_name(),
        fonts.directory().display()
    );

    let pages = render_pages(&table, config.years(), &fonts);
    let years = config.years();
    let builder = ReportBuilder::new(fonts)
        .with_title(format!(
            "Amazon Bestsellers {}-{}",
            years.start(),
            years.end()
        ))
        .add_pages(pages)
        .with_running_heading(format!(
            "Amazon Top 50 Bestselling Books {}-{}",
            years.start(),
            years.end()
        ));

    let report = if config.bookmarks() {
        render_with_outline(builder)?
    } else {
        builder.render()?
    };
    Ok(report)
}

#[cfg(feature = "bookmarks")]
fn render_with_outline(builder: ReportBuilder) -> Result<RenderedReport, ReportError> {
    Ok(builder.render_with_bookmarks()?)
}

#[cfg(not(feature = "bookmarks"))]
fn render_with_outline(builder: ReportBuilder) -> Result<RenderedReport, ReportError> {
    debug!("Built without the bookmarks feature; skipping the outline");
    Ok(builder.render()?)
}

/// Runs the whole report and opens the result.
///
/// Only loading, font lookup, PDF assembly and writing are fatal. Chart and
/// viewer failures are logged and reported in the [`ReportOutcome`].
pub fn run(config: &ReportConfig) -> Result<ReportOutcome, ReportError> {
    let report = render_report(config)?;
    let output_path = builder::write_report(config.output_path(), &report.bytes).map_err(
        |source| ReportError::Write {
            path: config.output_path().to_path_buf(),
            source,
        },
    )?;
    println!("All plots saved as {}", output_path.display());

    let viewer = config.viewer().open_or_warn(&output_path);
    Ok(ReportOutcome {
        output_path,
        page_count: report.page_count(),
        failed_charts: report.notice_titles,
        viewer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Name,Author,User Rating,Reviews,Price,Year,Genre
Becoming,Michelle Obama,4.8,61133,11,2018,Non Fiction
Becoming,Michelle Obama,4.8,61133,11,2019,Non Fiction
The Martian,Andy Weir,4.7,39459,9,2015,Fiction
";

    fn table() -> BookTable {
        features::derive_features(dataset::read_books(SAMPLE.as_bytes()).unwrap())
    }

    #[test]
    fn charts_follow_page_order() {
        let charts = charts(&table(), &(2009..=2019));
        let identifiers: Vec<&str> = charts.iter().map(|chart| chart.identifier()).collect();
        assert_eq!(
            identifiers,
            vec![
                "genre-share",
                "genre-by-year",
                "top-authors-by-genre",
                "top-authors"
            ]
        );
        assert_eq!(charts[0].title(), "Distribution of Genre (2009-2019)");
    }

    #[test]
    fn every_chart_has_a_caption() {
        let table = table();
        for chart in charts(&table, &(2009..=2019)) {
            assert!(caption(chart.identifier(), &table).is_some());
        }
        assert_eq!(
            caption("genre-share", &table).unwrap(),
            "Genre share over 2 distinct titles (3 rows in total)."
        );
        assert!(caption("unknown", &table).is_none());
    }

    struct BlankChart(&'static str);

    impl Chart for BlankChart {
        fn title(&self) -> &str {
            self.0
        }

        fn identifier(&self) -> &'static str {
            self.0
        }

        fn size(&self) -> (u32, u32) {
            (40, 30)
        }

        fn draw(&self, _canvas: &charts::Canvas<'_>) -> Result<(), charts::ChartError> {
            Ok(())
        }
    }

    struct BrokenChart;

    impl Chart for BrokenChart {
        fn title(&self) -> &str {
            "Broken Chart"
        }

        fn identifier(&self) -> &'static str {
            "broken"
        }

        fn size(&self) -> (u32, u32) {
            (40, 30)
        }

        fn draw(&self, _canvas: &charts::Canvas<'_>) -> Result<(), charts::ChartError> {
            Err(charts::ChartError::Drawing("backend refused".to_string()))
        }
    }

    fn charts_with_failure() -> Vec<Box<dyn Chart>> {
        vec![
            Box::new(BlankChart("first")),
            Box::new(BrokenChart),
            Box::new(BlankChart("third")),
            Box::new(BlankChart("fourth")),
        ]
    }

    #[test]
    fn failed_chart_becomes_notice_in_place() {
        let pages = chart_pages(&charts_with_failure(), &table());

        assert_eq!(pages.len(), 4);
        let titles: Vec<&str> = pages.iter().map(|page| page.title()).collect();
        assert_eq!(titles, vec!["first", "Broken Chart", "third", "fourth"]);
        let has_chart: Vec<bool> = pages.iter().map(|page| page.has_chart()).collect();
        assert_eq!(has_chart, vec![true, false, true, true]);
        assert_eq!(pages[1].identifier(), Some("broken"));
    }

    #[test]
    fn failed_chart_is_listed_in_the_rendered_report() {
        if !fonts::report_fonts_available() {
            eprintln!("Skipping failed_chart_is_listed_in_the_rendered_report: no usable fonts");
            return;
        }
        let fonts = fonts::load_report_fonts().expect("load fonts");
        let report = ReportBuilder::new(fonts)
            .add_pages(chart_pages(&charts_with_failure(), &table()))
            .render()
            .expect("render report");

        assert_eq!(report.page_count(), 4);
        assert_eq!(report.notice_titles, vec!["Broken Chart".to_string()]);
        assert_eq!(
            report.page_titles,
            vec!["first", "Broken Chart", "third", "fourth"]
        );
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReportConfig::default()
            .with_input_path(dir.path().join("missing.csv"))
            .with_output_path(dir.path().join("out.pdf"));
        let err = run(&config).unwrap_err();
        assert!(matches!(err, ReportError::Load(_)));
        assert!(!dir.path().join("out.pdf").exists());
    }
}
