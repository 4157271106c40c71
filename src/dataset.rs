//! Loading of the bestsellers CSV into typed records.
//!
//! The loader validates the header row against [`REQUIRED_COLUMNS`] before any
//! row is parsed, so a renamed or missing column is reported up front instead of
//! surfacing as a deserialization failure halfway through the file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::{debug, info};
use serde::Deserialize;

/// Columns the input file must provide, in the order they appear in the dataset.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Name",
    "Author",
    "User Rating",
    "Reviews",
    "Price",
    "Year",
    "Genre",
];

/// Author spellings rewritten to their canonical form after loading.
pub const AUTHOR_ALIASES: &[(&str, &str)] = &[("J. K. Rowling", "J.K. Rowling")];

/// Label used by the dataset for fiction titles.
pub const GENRE_FICTION: &str = "Fiction";

/// Label used by the dataset for non-fiction titles.
pub const GENRE_NON_FICTION: &str = "Non Fiction";

/// One row of the bestsellers dataset.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BookRecord {
    /// Book title.
    #[serde(rename = "Name")]
    pub name: String,
    /// Author as printed in the dataset.
    #[serde(rename = "Author")]
    pub author: String,
    /// Average user rating. Stored under `User Rating` in the file.
    #[serde(rename = "User Rating")]
    pub user_rating: f64,
    /// Number of written reviews.
    #[serde(rename = "Reviews")]
    pub reviews: u64,
    /// Price in US dollars.
    #[serde(rename = "Price")]
    pub price: f64,
    /// Bestseller list year.
    #[serde(rename = "Year")]
    pub year: i32,
    /// Genre label, `Fiction` or `Non Fiction` in the shipped dataset.
    #[serde(rename = "Genre")]
    pub genre: String,
}

/// Errors raised while reading the input table.
#[derive(Debug)]
pub enum LoadError {
    /// The input file could not be opened.
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The header row could not be read.
    Csv(csv::Error),
    /// The header row lacks one or more required columns.
    MissingColumns(Vec<&'static str>),
    /// A data row could not be parsed into a [`BookRecord`].
    Row {
        /// 1-based line number in the input file.
        line: u64,
        /// Parser failure for the row.
        source: csv::Error,
    },
}

impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, .. } => write!(f, "Failed to open dataset {}", path.display()),
            Self::Csv(err) => write!(f, "Failed to read dataset header: {err}"),
            Self::MissingColumns(columns) => write!(
                f,
                "Dataset is missing required columns: {}",
                columns.join(", ")
            ),
            Self::Row { line, .. } => write!(f, "Failed to parse dataset row on line {line}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Csv(err) | Self::Row { source: err, .. } => Some(err),
            Self::MissingColumns(_) => None,
        }
    }
}

/// Returns the required columns absent from `headers`, preserving the order of
/// [`REQUIRED_COLUMNS`].
pub fn missing_columns(headers: &StringRecord) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect()
}

/// Reads and validates all records from `reader`.
pub fn read_books<R: io::Read>(reader: R) -> Result<Vec<BookRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let mut books = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(source) => return Err(LoadError::Row { line, source }),
        }

        let line = record.position().map_or(line, |position| position.line());
        let book = record
            .deserialize::<BookRecord>(Some(&headers))
            .map_err(|source| LoadError::Row { line, source })?;
        books.push(book);
    }

    Ok(books)
}

/// Opens the dataset at `path`, reads every record and applies the author
/// corrections from [`AUTHOR_ALIASES`].
pub fn load_books(path: impl AsRef<Path>) -> Result<Vec<BookRecord>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut books = read_books(file)?;
    let renamed = normalize_authors(&mut books);
    info!(
        "Loaded {} rows from {} ({} author names normalised)",
        books.len(),
        path.display(),
        renamed
    );
    Ok(books)
}

/// Rewrites author aliases in place and returns the number of changed rows.
pub fn normalize_authors(books: &mut [BookRecord]) -> usize {
    let mut changed = 0;
    for book in books.iter_mut() {
        if let Some((_, canonical)) = AUTHOR_ALIASES
            .iter()
            .find(|(alias, _)| *alias == book.author)
        {
            debug!("Renaming author '{}' to '{}'", book.author, canonical);
            book.author = (*canonical).to_string();
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Name,Author,User Rating,Reviews,Price,Year,Genre
\"Harry Potter and the Cursed Child, Parts 1 & 2\",J. K. Rowling,4,23973,12,2016,Fiction
Life of Pi,Yann Martel,4.2,1000,9.5,2010,Fiction
";

    #[test]
    fn reads_records_with_quoted_titles() {
        let books = read_books(SAMPLE.as_bytes()).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(
            books[0].name,
            "Harry Potter and the Cursed Child, Parts 1 & 2"
        );
        assert_eq!(books[0].reviews, 23973);
        assert_eq!(books[1].user_rating, 4.2);
        assert_eq!(books[1].price, 9.5);
        assert_eq!(books[1].year, 2010);
    }

    #[test]
    fn reports_every_missing_column() {
        let input = "Name,Author,Rating,Reviews,Price,Year\nA,B,4,1,1,2010\n";
        match read_books(input.as_bytes()) {
            Err(LoadError::MissingColumns(columns)) => {
                assert_eq!(columns, vec!["User Rating", "Genre"]);
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_a_schema_error() {
        assert!(matches!(
            read_books("".as_bytes()),
            Err(LoadError::MissingColumns(columns)) if columns.len() == REQUIRED_COLUMNS.len()
        ));
    }

    #[test]
    fn bad_row_reports_line_number() {
        let input = "\
Name,Author,User Rating,Reviews,Price,Year,Genre
A,B,4.5,10,8,2011,Fiction
C,D,4.5,lots,8,2012,Fiction
";
        match read_books(input.as_bytes()) {
            Err(LoadError::Row { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected row error, got {other:?}"),
        }
    }

    #[test]
    fn extra_columns_are_ignored() {
        let input = "\
Genre,Year,Price,Reviews,User Rating,Author,Name,Format
Fiction,2012,8,10,4.5,B,A,Hardcover
";
        let books = read_books(input.as_bytes()).unwrap();
        assert_eq!(books[0].name, "A");
        assert_eq!(books[0].genre, "Fiction");
    }

    #[test]
    fn normalizes_rowling_alias() {
        let mut books = read_books(SAMPLE.as_bytes()).unwrap();
        assert_eq!(normalize_authors(&mut books), 1);
        assert_eq!(books[0].author, "J.K. Rowling");
        assert_eq!(books[1].author, "Yann Martel");
        assert_eq!(normalize_authors(&mut books), 0);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_books("/__bestseller_report_missing__.csv").unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
