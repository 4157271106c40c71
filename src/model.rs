//! Logical content of the report: an ordered list of pages.
//!
//! A page either carries a rendered chart or, when the chart could not be
//! drawn, a short notice explaining why. Keeping the failed page in place means
//! the remaining pages never shift position in the document.

use crate::charts::RenderedChart;

/// What a report page shows.
#[derive(Clone, Debug)]
pub enum PageContent {
    /// A rasterised chart.
    Chart(RenderedChart),
    /// A text notice standing in for a chart that failed to render.
    Notice(String),
}

/// One page of the report.
#[derive(Clone, Debug)]
pub struct ReportPage {
    title: String,
    identifier: Option<String>,
    caption: Option<String>,
    content: PageContent,
}

impl ReportPage {
    /// Creates a page showing `chart`, titled after it.
    pub fn chart(chart: RenderedChart) -> Self {
        Self {
            title: chart.title.clone(),
            identifier: Some(chart.identifier.to_string()),
            caption: None,
            content: PageContent::Chart(chart),
        }
    }

    /// Creates a page that reports why its chart is missing.
    pub fn notice(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            identifier: None,
            caption: None,
            content: PageContent::Notice(message.into()),
        }
    }

    /// Returns the page title used for the outline.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the identifier stored with the outline entry, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Returns the caption printed under the chart, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Returns the page content.
    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Whether the page holds a chart rather than a notice.
    pub fn has_chart(&self) -> bool {
        matches!(self.content, PageContent::Chart(_))
    }

    /// Sets the identifier and returns the updated page.
    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Sets the caption and returns the updated page.
    pub fn with_caption(mut self, caption: impl Into<Option<String>>) -> Self {
        self.caption = caption.into();
        self
    }
}
