//! Run configuration for the report pipeline.

use std::env;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::viewer::Viewer;

/// Environment variable naming the viewer executable (`none` or empty disables it).
pub const VIEWER_ENV: &str = "BESTSELLER_REPORT_VIEWER";

/// Default location of the input CSV.
pub const DEFAULT_INPUT_PATH: &str = "bestsellers with categories.csv";

/// Default location of the generated PDF.
pub const DEFAULT_OUTPUT_PATH: &str = "all_plots.pdf";

/// Years covered by the per-year and top-author charts.
pub const DEFAULT_YEARS: RangeInclusive<i32> = 2009..=2019;

/// Everything [`crate::pipeline::run`] needs to produce a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    input_path: PathBuf,
    output_path: PathBuf,
    viewer: Viewer,
    bookmarks: bool,
    years: RangeInclusive<i32>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            viewer: Viewer::default(),
            bookmarks: true,
            years: DEFAULT_YEARS,
        }
    }
}

impl ReportConfig {
    /// Defaults adjusted by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_viewer_setting(env::var(VIEWER_ENV).ok().as_deref())
    }

    /// Applies an optional viewer setting, as read from [`VIEWER_ENV`].
    pub fn with_viewer_setting(self, setting: Option<&str>) -> Self {
        match setting {
            Some(value) => self.with_viewer(Viewer::from_setting(value)),
            None => self,
        }
    }

    /// Sets the CSV file to read.
    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    /// Sets where the PDF is written.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets how the finished PDF is opened.
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    /// Enables or disables the PDF outline.
    pub fn with_bookmarks(mut self, enabled: bool) -> Self {
        self.bookmarks = enabled;
        self
    }

    /// Sets the year range shown in the per-year grid and chart titles.
    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = years;
        self
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn bookmarks(&self) -> bool {
        self.bookmarks
    }

    pub fn years(&self) -> &RangeInclusive<i32> {
        &self.years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = ReportConfig::default();
        assert_eq!(config.input_path(), Path::new("bestsellers with categories.csv"));
        assert_eq!(config.output_path(), Path::new("all_plots.pdf"));
        assert_eq!(config.viewer(), &Viewer::SystemDefault);
        assert!(config.bookmarks());
        assert_eq!(config.years(), &(2009..=2019));
    }

    #[test]
    fn viewer_setting_overrides_default() {
        let config = ReportConfig::default().with_viewer_setting(Some("none"));
        assert_eq!(config.viewer(), &Viewer::Disabled);

        let config = ReportConfig::default().with_viewer_setting(Some("okular"));
        assert_eq!(config.viewer(), &Viewer::Command(PathBuf::from("okular")));

        let config = ReportConfig::default().with_viewer_setting(None);
        assert_eq!(config.viewer(), &Viewer::SystemDefault);
    }

    #[test]
    fn builder_methods_replace_fields() {
        let config = ReportConfig::default()
            .with_input_path("data.csv")
            .with_output_path("out/report.pdf")
            .with_bookmarks(false)
            .with_years(2010..=2012);
        assert_eq!(config.input_path(), Path::new("data.csv"));
        assert_eq!(config.output_path(), Path::new("out/report.pdf"));
        assert!(!config.bookmarks());
        assert_eq!(config.years(), &(2010..=2012));
    }
}
