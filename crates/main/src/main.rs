use std::error::Error;
use std::path::PathBuf;

use bestseller_report::viewer::Viewer;
use bestseller_report::ReportConfig;
use clap::Parser;
use env_logger::Env;

/// Renders the Amazon bestsellers charts into a single PDF and opens it.
///
/// Fonts are looked up under `BESTSELLER_REPORT_FONTS_DIR`, then `assets/fonts`
/// next to the executable or in the crate, then common system families.
#[derive(Parser)]
#[command(author, version, about = "Bestsellers CSV to PDF chart report")]
struct Cli {
    /// CSV file with the bestsellers dataset.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Where to write the PDF.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Executable used to open the PDF instead of the system default.
    #[arg(long, value_name = "EXE", conflicts_with = "no_open")]
    viewer: Option<PathBuf>,

    /// Do not open the PDF after writing it.
    #[arg(long)]
    no_open: bool,

    /// Leave the outline out of the PDF.
    #[arg(long)]
    no_bookmarks: bool,
}

impl Cli {
    fn into_config(self) -> ReportConfig {
        let mut config = ReportConfig::from_env().with_bookmarks(!self.no_bookmarks);
        if let Some(input) = self.input {
            config = config.with_input_path(input);
        }
        if let Some(output) = self.output {
            config = config.with_output_path(output);
        }
        if let Some(viewer) = self.viewer {
            config = config.with_viewer(Viewer::Command(viewer));
        }
        if self.no_open {
            config = config.with_viewer(Viewer::Disabled);
        }
        config
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = Cli::parse().into_config();
    log::debug!("Running with {:?}", config);

    if let Err(err) = bestseller_report::run(&config) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
