//! Font discovery shared by the PDF writer and the chart renderer.
//!
//! The report needs the raw font bytes twice: `genpdf` embeds them into the
//! document and `plotters` rasterises chart labels with them. Fonts are therefore
//! resolved to files once and read into a [`ReportFonts`] value.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable pointing at a directory with the bundled font files.
pub const FONTS_DIR_ENV: &str = "BESTSELLER_REPORT_FONTS_DIR";

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// File names of one font family, by style.
#[derive(Clone, Copy, Debug)]
struct FamilyFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }

    fn missing_in(&self, directory: &Path) -> Vec<&'static str> {
        self.all()
            .into_iter()
            .filter(|file| !directory.join(file).is_file())
            .collect()
    }
}

const BUNDLED_FAMILY: FamilyFiles = FamilyFiles {
    name: DEFAULT_FONT_FAMILY_NAME,
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const ARIAL_FAMILY: FamilyFiles = FamilyFiles {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const DEJAVU_FAMILY: FamilyFiles = FamilyFiles {
    name: "DejaVu Sans",
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const LIBERATION_FAMILY: FamilyFiles = FamilyFiles {
    name: "Liberation Sans",
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

/// Raw font bytes for the four styles of one family.
#[derive(Clone, Debug)]
pub struct ReportFonts {
    family_name: &'static str,
    directory: PathBuf,
    regular: Vec<u8>,
    bold: Vec<u8>,
    italic: Vec<u8>,
    bold_italic: Vec<u8>,
}

impl ReportFonts {
    fn read(directory: &Path, files: &FamilyFiles) -> Result<Self, Error> {
        let read = |file: &str| {
            let path = directory.join(file);
            fs::read(&path).map_err(|err| {
                Error::new(format!("Failed to read font file {}", path.display()), err)
            })
        };

        Ok(Self {
            family_name: files.name,
            directory: directory.to_path_buf(),
            regular: read(files.regular)?,
            bold: read(files.bold)?,
            italic: read(files.italic)?,
            bold_italic: read(files.bold_italic)?,
        })
    }

    /// Name of the resolved family, e.g. `Roboto`.
    pub fn family_name(&self) -> &'static str {
        self.family_name
    }

    /// Directory the family was loaded from.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Bytes of the regular style.
    pub fn regular(&self) -> &[u8] {
        &self.regular
    }

    /// Bytes of the bold style.
    pub fn bold(&self) -> &[u8] {
        &self.bold
    }

    /// Builds the `genpdf` font family from the loaded bytes.
    pub fn to_font_family(&self) -> Result<FontFamily<FontData>, Error> {
        let load = |bytes: &[u8], style: &str| {
            FontData::new(bytes.to_vec(), None).map_err(|err| {
                Error::new(
                    format!(
                        "Failed to parse {} {} font from {}: {}",
                        self.family_name,
                        style,
                        self.directory.display(),
                        err
                    ),
                    ErrorKind::InvalidFont,
                )
            })
        };

        Ok(FontFamily {
            regular: load(&self.regular, "regular")?,
            bold: load(&self.bold, "bold")?,
            italic: load(&self.italic, "italic")?,
            bold_italic: load(&self.bold_italic, "bold italic")?,
        })
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn bundled_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

/// Directory inside the crate sources where the bundled fonts are expected.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn system_fallbacks() -> Vec<(PathBuf, FamilyFiles)> {
    let mut fallbacks = Vec::new();

    for var in ["WINDIR", "SystemRoot"] {
        if let Some(root) = env_path(var) {
            fallbacks.push((root.join("Fonts"), ARIAL_FAMILY));
        }
    }

    for directory in [
        "/usr/share/fonts/truetype/dejavu",
        "/usr/share/fonts/dejavu",
        "/usr/share/fonts/TTF",
    ] {
        fallbacks.push((PathBuf::from(directory), DEJAVU_FAMILY));
    }

    for directory in [
        "/usr/share/fonts/truetype/liberation",
        "/usr/share/fonts/liberation-sans",
        "/usr/share/fonts/liberation",
    ] {
        fallbacks.push((PathBuf::from(directory), LIBERATION_FAMILY));
    }

    fallbacks.push((PathBuf::from("/Library/Fonts"), ARIAL_FAMILY));
    fallbacks
}

fn describe_attempt(directory: &Path, files: &FamilyFiles) -> Option<String> {
    if !directory.is_dir() {
        return Some(format!("{} (directory missing)", directory.display()));
    }

    let missing = files.missing_in(directory);
    if missing.is_empty() {
        None
    } else {
        Some(format!(
            "{} (missing files [{}])",
            directory.display(),
            missing.join(", ")
        ))
    }
}

/// Locates and reads a usable font family.
///
/// The bundled Roboto family is searched in [`FONTS_DIR_ENV`], next to the
/// executable and in the crate's `assets/fonts` directory. When none of these
/// hold all four styles, common system families are tried instead.
pub fn load_report_fonts() -> Result<ReportFonts, Error> {
    let mut attempts = Vec::new();

    for directory in bundled_directory_candidates() {
        match describe_attempt(&directory, &BUNDLED_FAMILY) {
            None => {
                debug!("Using bundled fonts from {}", directory.display());
                return ReportFonts::read(&directory, &BUNDLED_FAMILY);
            }
            Some(reason) => attempts.push(reason),
        }
    }

    for (directory, family) in system_fallbacks() {
        match describe_attempt(&directory, &family) {
            None => {
                warn!(
                    "Bundled fonts unavailable; falling back to system '{}' family in {}",
                    family.name,
                    directory.display()
                );
                return ReportFonts::read(&directory, &family);
            }
            Some(reason) => attempts.push(reason),
        }
    }

    Err(Error::new(
        format!(
            "Unable to locate a usable font family. Checked: {}. Place the Roboto files in assets/fonts or set {}.",
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "no font family found"),
    ))
}

/// Indicates whether [`load_report_fonts`] would find a complete family.
pub fn report_fonts_available() -> bool {
    bundled_directory_candidates()
        .iter()
        .any(|directory| describe_attempt(directory, &BUNDLED_FAMILY).is_none())
        || system_fallbacks()
            .iter()
            .any(|(directory, family)| describe_attempt(directory, family).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_described() {
        let reason = describe_attempt(Path::new("/__no_such_fonts__"), &BUNDLED_FAMILY).unwrap();
        assert!(reason.contains("directory missing"));
    }

    #[test]
    fn incomplete_directory_lists_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Roboto-Regular.ttf"), b"not a font").unwrap();
        let reason = describe_attempt(dir.path(), &BUNDLED_FAMILY).unwrap();
        assert!(reason.contains("Roboto-Bold.ttf"));
        assert!(!reason.contains("Roboto-Regular.ttf"));
    }

    #[test]
    fn unreadable_font_bytes_fail_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        for file in BUNDLED_FAMILY.all() {
            fs::write(dir.path().join(file), b"not a font").unwrap();
        }
        assert!(describe_attempt(dir.path(), &BUNDLED_FAMILY).is_none());
        let fonts = ReportFonts::read(dir.path(), &BUNDLED_FAMILY).unwrap();
        assert_eq!(fonts.family_name(), "Roboto");
        assert!(fonts.to_font_family().is_err());
    }
}
