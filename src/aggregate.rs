//! Grouped and ranked views over a [`BookTable`].
//!
//! Every ranking here is a stable sort on the counted value, so ties keep the
//! order in which keys first appear in the table. Running the same input twice
//! therefore always produces the same sequence.

use std::collections::{HashMap, HashSet};

use crate::features::{Book, BookTable};

/// Ordered `(label, value)` pairs produced by the grouping helpers.
pub type Counts = Vec<(String, usize)>;

/// Counter that remembers the order in which keys were first seen.
#[derive(Debug, Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Counts,
}

impl Tally {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    fn get(&self, key: &str) -> usize {
        self.index
            .get(key)
            .map_or(0, |&position| self.entries[position].1)
    }

    /// Entries sorted by count, highest first, ties in first-seen order.
    fn into_ranked(mut self) -> Counts {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
    }
}

fn tally<'a, I>(keys: I) -> Tally
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = Tally::default();
    for key in keys {
        tally.add(key);
    }
    tally
}

/// Keeps the first row of every distinct title.
pub fn unique_titles(table: &BookTable) -> Vec<&Book> {
    let mut seen = HashSet::new();
    table
        .books()
        .iter()
        .filter(|book| seen.insert(book.title()))
        .collect()
}

/// Genre counts over the given rows, most common genre first.
pub fn genre_counts<'a, I>(books: I) -> Counts
where
    I: IntoIterator<Item = &'a Book>,
{
    tally(books.into_iter().map(Book::genre)).into_ranked()
}

/// Genre counts over every row of `table` listed for `year`.
pub fn genre_counts_for_year(table: &BookTable, year: i32) -> Counts {
    genre_counts(table.books().iter().filter(|book| book.record.year == year))
}

/// The `limit` authors with the most distinct titles in `genre`.
pub fn top_authors_in_genre(unique: &[&Book], genre: &str, limit: usize) -> Counts {
    let mut ranked = tally(
        unique
            .iter()
            .filter(|book| book.genre() == genre)
            .map(|book| book.author()),
    )
    .into_ranked();
    ranked.truncate(limit);
    ranked
}

/// The `limit` authors with the most rows across the whole table.
pub fn top_authors_by_appearances(table: &BookTable, limit: usize) -> Counts {
    let mut ranked = tally(table.books().iter().map(Book::author)).into_ranked();
    ranked.truncate(limit);
    ranked
}

/// Per-author metrics shown on the top authors page.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorMetrics {
    /// Author name.
    pub author: String,
    /// Number of rows listing the author, repeated titles included.
    pub appearances: usize,
    /// Number of distinct titles by the author.
    pub unique_books: usize,
    /// Review count summed over distinct titles, divided by 1000.
    pub reviews_thousands: f64,
}

/// Builds [`AuthorMetrics`] for the `limit` most frequently listed authors.
pub fn author_metrics(table: &BookTable, limit: usize) -> Vec<AuthorMetrics> {
    let unique = unique_titles(table);
    let unique_counts = tally(unique.iter().map(|book| book.author()));

    let mut reviews: HashMap<&str, u64> = HashMap::new();
    for book in &unique {
        *reviews.entry(book.author()).or_default() += book.record.reviews;
    }

    top_authors_by_appearances(table, limit)
        .into_iter()
        .map(|(author, appearances)| {
            let total = reviews.get(author.as_str()).copied().unwrap_or(0);
            AuthorMetrics {
                unique_books: unique_counts.get(&author),
                reviews_thousands: total as f64 / 1000.0,
                appearances,
                author,
            }
        })
        .collect()
}

/// Sum of all counts in `counts`.
pub fn total(counts: &[(String, usize)]) -> usize {
    counts.iter().map(|(_, count)| count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::BookRecord;
    use crate::features::derive_features;

    fn record(name: &str, author: &str, year: i32, genre: &str, reviews: u64) -> BookRecord {
        BookRecord {
            name: name.to_string(),
            author: author.to_string(),
            user_rating: 4.6,
            reviews,
            price: 10.0,
            year,
            genre: genre.to_string(),
        }
    }

    fn sample_table() -> BookTable {
        let mut records = Vec::new();
        // Ten rows, three distinct titles.
        for (offset, title) in ["Wimpy 1", "Wimpy 2", "Wimpy 3"].iter().enumerate() {
            records.push(record(title, "Jeff Kinney", 2009 + offset as i32, "Fiction", 1000));
        }
        for year in 2012..2019 {
            records.push(record("Wimpy 1", "Jeff Kinney", year, "Fiction", 1000));
        }
        records.push(record("Outliers", "Malcolm Gladwell", 2009, "Non Fiction", 2500));
        records.push(record("Blink", "Malcolm Gladwell", 2010, "Non Fiction", 1500));
        records.push(record("Outliers", "Malcolm Gladwell", 2010, "Non Fiction", 2500));
        records.push(record("Educated", "Tara Westover", 2018, "Non Fiction", 900));
        records.push(record("Wonder", "R. J. Palacio", 2014, "Fiction", 300));
        derive_features(records)
    }

    #[test]
    fn deduplication_keeps_first_occurrence() {
        let table = sample_table();
        let unique = unique_titles(&table);
        assert!(unique.len() <= table.len());
        let titles: Vec<_> = unique.iter().map(|book| book.title()).collect();
        assert_eq!(
            titles,
            vec!["Wimpy 1", "Wimpy 2", "Wimpy 3", "Outliers", "Blink", "Educated", "Wonder"]
        );
        assert_eq!(unique[0].record.year, 2009);
    }

    #[test]
    fn genre_counts_cover_every_unique_title() {
        let table = sample_table();
        let unique = unique_titles(&table);
        let counts = genre_counts(unique.iter().copied());
        assert_eq!(total(&counts), unique.len());
        assert_eq!(
            counts,
            vec![("Fiction".to_string(), 4), ("Non Fiction".to_string(), 3)]
        );
    }

    #[test]
    fn yearly_counts_use_every_row() {
        let table = sample_table();
        assert_eq!(
            genre_counts_for_year(&table, 2010),
            vec![("Non Fiction".to_string(), 2), ("Fiction".to_string(), 1)]
        );
        assert!(genre_counts_for_year(&table, 2019).is_empty());
    }

    #[test]
    fn appearances_and_unique_books_differ_for_repeat_titles() {
        let metrics = author_metrics(&sample_table(), 20);
        let kinney = &metrics[0];
        assert_eq!(kinney.author, "Jeff Kinney");
        assert_eq!(kinney.appearances, 10);
        assert_eq!(kinney.unique_books, 3);
        assert_eq!(kinney.reviews_thousands, 3.0);

        let gladwell = &metrics[1];
        assert_eq!(gladwell.appearances, 3);
        assert_eq!(gladwell.unique_books, 2);
        assert_eq!(gladwell.reviews_thousands, 4.0);
    }

    #[test]
    fn rankings_are_descending_and_stable() {
        let table = sample_table();
        let ranked = top_authors_by_appearances(&table, 20);
        assert!(ranked.windows(2).all(|pair| pair[0].1 >= pair[1].1));
        // Westover and Palacio tie on one row each; file order decides.
        assert_eq!(ranked[2].0, "Tara Westover");
        assert_eq!(ranked[3].0, "R. J. Palacio");

        let limited = top_authors_by_appearances(&table, 2);
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn genre_ranking_filters_and_truncates() {
        let table = sample_table();
        let unique = unique_titles(&table);
        let fiction = top_authors_in_genre(&unique, "Fiction", 11);
        assert_eq!(
            fiction,
            vec![("Jeff Kinney".to_string(), 3), ("R. J. Palacio".to_string(), 1)]
        );
        assert_eq!(top_authors_in_genre(&unique, "Non Fiction", 1).len(), 1);
        assert!(top_authors_in_genre(&unique, "Poetry", 11).is_empty());
    }

    #[test]
    fn aggregation_is_deterministic() {
        let first = author_metrics(&sample_table(), 20);
        let second = author_metrics(&sample_table(), 20);
        assert_eq!(first, second);
    }
}
