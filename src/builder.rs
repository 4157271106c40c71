//! Assembly of report pages into a PDF document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::elements::{PageBreak, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Style, StyledString};
use genpdf::{self, Alignment, Element, Margins, Mm, PageDecorator, Position, Size};
use log::{debug, info};

use crate::elements::ChartImage;
use crate::fonts::ReportFonts;
use crate::model::{PageContent, ReportPage};

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError};

/// Paper size of the report: A4 landscape.
pub const A4_LANDSCAPE_MM: (f64, f64) = (297.0, 210.0);

/// Area left for a chart image on an A4 landscape page, in millimetres.
pub const CHART_BOUNDS_MM: (f64, f64) = (257.0, 145.0);

const DEFAULT_MARGIN_MM: f64 = 10.0;
const FOOTER_HEIGHT_MM: f64 = 8.0;

/// Errors that can occur while producing the PDF bytes.
#[derive(Debug)]
pub enum ReportBuildError {
    /// The font family could not be turned into PDF fonts.
    FontLoad(Error),
    /// A chart image could not be embedded.
    Image(Error),
    /// `genpdf` failed to lay out or serialise the document.
    Render(Error),
    /// The outline could not be added to the rendered document.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl std::fmt::Display for ReportBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load report fonts"),
            Self::Image(_) => write!(f, "Failed to embed chart image"),
            Self::Render(_) => write!(f, "Failed to render PDF document"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "Failed to add page bookmarks"),
        }
    }
}

impl std::error::Error for ReportBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Image(err) | Self::Render(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for ReportBuildError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

/// The rendered PDF together with the page titles it contains.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    /// PDF file contents.
    pub bytes: Vec<u8>,
    /// Titles of the report pages, in order.
    pub page_titles: Vec<String>,
    /// Titles of pages that carry a notice instead of a chart.
    pub notice_titles: Vec<String>,
}

impl RenderedReport {
    /// Number of report pages.
    pub fn page_count(&self) -> usize {
        self.page_titles.len()
    }
}

/// Builder that lays out report pages, one page per chart.
pub struct ReportBuilder {
    fonts: ReportFonts,
    title: String,
    running_heading: Option<String>,
    pages: Vec<ReportPage>,
}

impl ReportBuilder {
    /// Creates a builder with A4 landscape paper and the given fonts.
    pub fn new(fonts: ReportFonts) -> Self {
        Self {
            fonts,
            title: String::new(),
            running_heading: None,
            pages: Vec::new(),
        }
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Prints `heading` at the top of every page and a "Page N of M" footer.
    pub fn with_running_heading(mut self, heading: impl Into<String>) -> Self {
        self.running_heading = Some(heading.into());
        self
    }

    /// Appends pages in order.
    pub fn add_pages<I>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = ReportPage>,
    {
        self.pages.extend(pages);
        self
    }

    /// Lays out every page and returns the PDF bytes.
    pub fn render(self) -> Result<RenderedReport, ReportBuildError> {
        let font_family = self
            .fonts
            .to_font_family()
            .map_err(ReportBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);
        document.set_title(self.title);
        document.set_paper_size(Size::new(A4_LANDSCAPE_MM.0, A4_LANDSCAPE_MM.1));
        document.set_page_decorator(ReportPageDecorator::new(
            self.running_heading,
            self.pages.len(),
        ));

        let mut page_titles = Vec::with_capacity(self.pages.len());
        let mut notice_titles = Vec::new();
        for (index, page) in self.pages.into_iter().enumerate() {
            if index > 0 {
                document.push(PageBreak::new());
            }
            debug!("Laying out page {} '{}'", index + 1, page.title());
            push_page(&mut document, &page)?;
            if !page.has_chart() {
                notice_titles.push(page.title().to_string());
            }
            page_titles.push(page.title().to_string());
        }

        let mut bytes = Vec::new();
        document
            .render(&mut bytes)
            .map_err(ReportBuildError::Render)?;
        info!(
            "Rendered {} report pages ({} bytes)",
            page_titles.len(),
            bytes.len()
        );

        Ok(RenderedReport {
            bytes,
            page_titles,
            notice_titles,
        })
    }

    /// Renders the document and adds one outline entry per page.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(self) -> Result<RenderedReport, ReportBuildError> {
        let identifiers: Vec<Option<String>> = self
            .pages
            .iter()
            .map(|page| page.identifier().map(str::to_string))
            .collect();
        let mut report = self.render()?;

        let entries: Vec<bookmarks::OutlineTarget> = report
            .page_titles
            .iter()
            .zip(identifiers)
            .enumerate()
            .map(|(index, (title, identifier))| bookmarks::OutlineTarget {
                title: title.clone(),
                identifier,
                page_number: index + 1,
            })
            .collect();
        report.bytes = bookmarks::apply_page_bookmarks(&report.bytes, &entries)?;
        Ok(report)
    }
}

fn push_page(document: &mut genpdf::Document, page: &ReportPage) -> Result<(), ReportBuildError> {
    match page.content() {
        PageContent::Chart(chart) => {
            let caption = Paragraph::new(StyledString::new(
                page.caption().unwrap_or_default(),
                Style::new().italic().with_font_size(9),
            ));
            let element = ChartImage::from_rgb(chart.image.clone(), caption)
                .map_err(ReportBuildError::Image)?
                .with_bounds(CHART_BOUNDS_MM.0, CHART_BOUNDS_MM.1);
            document.push(element);
        }
        PageContent::Notice(message) => {
            document.push(
                Paragraph::new(page.title().to_string())
                    .styled(Style::new().bold().with_font_size(18)),
            );
            document.push(Paragraph::new(format!("This chart could not be rendered: {message}")));
        }
    }
    Ok(())
}

/// Writes the rendered report to `path` and returns its absolute location.
pub fn write_report(path: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::write(path, bytes)?;
    match fs::canonicalize(path) {
        Ok(absolute) => Ok(absolute),
        Err(_) if path.is_absolute() => Ok(path.to_path_buf()),
        Err(_) => Ok(std::env::current_dir()?.join(path)),
    }
}

fn page_label(page: usize, total_pages: usize) -> String {
    format!("Page {page} of {total_pages}")
}

/// Applies the report margins and, with a running heading, the header line
/// and page footer.
struct ReportPageDecorator {
    page: usize,
    total_pages: usize,
    heading: Option<String>,
}

impl ReportPageDecorator {
    fn new(heading: Option<String>, total_pages: usize) -> Self {
        Self {
            page: 0,
            total_pages,
            heading,
        }
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(Margins::trbl(
            DEFAULT_MARGIN_MM,
            DEFAULT_MARGIN_MM,
            DEFAULT_MARGIN_MM,
            DEFAULT_MARGIN_MM,
        ));
        let Some(heading) = &self.heading else {
            return Ok(area);
        };

        let heading_style = Style::new()
            .with_font_size(9)
            .with_color(style::Color::Rgb(90, 90, 90));
        let header = Paragraph::new(heading.as_str())
            .styled(heading_style)
            .render(context, area.clone(), style)?;
        area.add_offset(Position::new(0, header.size.height));

        let footer_height = Mm::from(FOOTER_HEIGHT_MM);
        let available = area.size().height;
        if footer_height > available {
            return Err(Error::new(
                "Page too small for the report footer",
                ErrorKind::PageSizeExceeded,
            ));
        }
        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - footer_height));
        let mut footer = Paragraph::new(page_label(self.page, self.total_pages));
        footer.set_alignment(Alignment::Right);
        footer
            .styled(Style::new().with_font_size(9))
            .render(context, footer_area, style)?;

        area.set_height(available - footer_height);
        Ok(area)
    }
}
