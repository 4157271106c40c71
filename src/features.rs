//! Title-derived features attached to every loaded record.

use log::{debug, warn};

use crate::dataset::BookRecord;

/// Number of decimals kept for [`TitleFeatures::punctuation_pct`].
const PERCENT_DECIMALS: i32 = 3;

/// Features computed from a book title.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TitleFeatures {
    /// Character count of the title excluding space characters.
    pub name_len: usize,
    /// Share of ASCII punctuation among the non-space characters, in percent.
    pub punctuation_pct: f64,
}

impl TitleFeatures {
    /// Computes both features for `title`.
    pub fn from_title(title: &str) -> Self {
        Self {
            name_len: name_length(title),
            punctuation_pct: punctuation_percentage(title),
        }
    }
}

/// A loaded record together with its derived features.
#[derive(Clone, Debug, PartialEq)]
pub struct Book {
    /// The record as read from the dataset.
    pub record: BookRecord,
    /// Features derived from the record title.
    pub features: TitleFeatures,
}

impl Book {
    /// Title of the book.
    pub fn title(&self) -> &str {
        &self.record.name
    }

    /// Author of the book.
    pub fn author(&self) -> &str {
        &self.record.author
    }

    /// Genre label of the book.
    pub fn genre(&self) -> &str {
        &self.record.genre
    }
}

/// The loaded dataset with derived columns, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookTable {
    books: Vec<Book>,
}

impl BookTable {
    /// Returns all rows, including repeated titles.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl FromIterator<Book> for BookTable {
    fn from_iter<I: IntoIterator<Item = Book>>(iter: I) -> Self {
        Self {
            books: iter.into_iter().collect(),
        }
    }
}

/// Length of `title` in characters, not counting `' '`.
pub fn name_length(title: &str) -> usize {
    title.chars().filter(|c| *c != ' ').count()
}

/// Number of ASCII punctuation characters in `title`.
pub fn punctuation_count(title: &str) -> usize {
    title.chars().filter(char::is_ascii_punctuation).count()
}

/// Percentage of punctuation among the non-space characters of `title`,
/// rounded to three decimals.
///
/// Titles without any non-space character yield `0.0`.
pub fn punctuation_percentage(title: &str) -> f64 {
    let len = name_length(title);
    if len == 0 {
        return 0.0;
    }
    round_to(punctuation_count(title) as f64 / len as f64 * 100.0, PERCENT_DECIMALS)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Attaches [`TitleFeatures`] to every record.
pub fn derive_features(records: Vec<BookRecord>) -> BookTable {
    let table: BookTable = records
        .into_iter()
        .map(|record| {
            let features = TitleFeatures::from_title(&record.name);
            if features.name_len == 0 {
                warn!(
                    "Title {:?} by {} has no non-space characters; punctuation share set to 0",
                    record.name, record.author
                );
            }
            Book { record, features }
        })
        .collect();

    if !table.is_empty() {
        let count = table.len() as f64;
        let mean_len = table
            .books()
            .iter()
            .map(|book| book.features.name_len as f64)
            .sum::<f64>()
            / count;
        let mean_punct = table
            .books()
            .iter()
            .map(|book| book.features.punctuation_pct)
            .sum::<f64>()
            / count;
        debug!(
            "Derived title features for {} rows (mean length {:.2}, mean punctuation {:.3}%)",
            table.len(),
            mean_len,
            mean_punct
        );
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn life_animated_example() {
        let features = TitleFeatures::from_title("Life, Animated");
        assert_eq!(features.name_len, 13);
        assert_eq!(features.punctuation_pct, 7.692);
    }

    #[test]
    fn length_ignores_only_spaces() {
        assert_eq!(name_length("a b\tc"), 4);
        assert_eq!(name_length("   "), 0);
        assert_eq!(name_length(""), 0);
        assert_eq!(name_length("Café Olé"), 7);
    }

    #[test]
    fn blank_titles_default_to_zero() {
        assert_eq!(punctuation_percentage(""), 0.0);
        assert_eq!(punctuation_percentage("    "), 0.0);
    }

    #[test]
    fn percentage_stays_in_range_with_three_decimals() {
        let titles = [
            "Harry Potter and the Cursed Child, Parts 1 & 2",
            "Oh, the Places You'll Go!",
            "!!!",
            "The 5 Love Languages: The Secret to Love that Lasts",
            "Wonder",
        ];
        for title in titles {
            let pct = punctuation_percentage(title);
            assert!((0.0..=100.0).contains(&pct), "{title}: {pct}");
            let scaled = pct * 1000.0;
            assert!((scaled - scaled.round()).abs() < 1e-6, "{title}: {pct}");
        }
        assert_eq!(punctuation_percentage("!!!"), 100.0);
        assert_eq!(punctuation_percentage("Wonder"), 0.0);
    }

    #[test]
    fn derive_keeps_row_order() {
        let record = |name: &str| BookRecord {
            name: name.to_string(),
            author: "Someone".to_string(),
            user_rating: 4.5,
            reviews: 10,
            price: 5.0,
            year: 2015,
            genre: "Fiction".to_string(),
        };
        let table = derive_features(vec![record("B-side"), record(" "), record("A")]);
        let titles: Vec<_> = table.books().iter().map(Book::title).collect();
        assert_eq!(titles, vec!["B-side", " ", "A"]);
        assert_eq!(table.books()[0].features.name_len, 6);
        assert_eq!(table.books()[1].features, TitleFeatures::default());
    }
}
