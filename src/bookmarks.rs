//! Per-page outline entries added to a rendered report with `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    Parse(lopdf::Error),
    /// A required catalog entry was missing from the document trailer.
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    InvalidCatalog,
    /// A referenced page number did not exist in the rendered document.
    MissingPage {
        /// Index of the outline entry whose page is missing.
        entry_index: usize,
        /// The requested (1-indexed) page number that could not be resolved.
        page_number: usize,
    },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for BookmarkError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(err.into())
    }
}

impl std::fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse PDF bytes: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing"),
            Self::InvalidCatalog => write!(f, "PDF catalog entry is not a dictionary"),
            Self::MissingPage {
                entry_index,
                page_number,
            } => write!(
                f,
                "Outline entry {} refers to missing page {}",
                entry_index, page_number
            ),
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MissingCatalog | Self::InvalidCatalog | Self::MissingPage { .. } => None,
        }
    }
}

/// A page that should receive an outline entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineTarget {
    /// Text shown in the viewer's outline pane.
    pub title: String,
    /// Optional identifier stored under `/NM`.
    pub identifier: Option<String>,
    /// 1-indexed page number the entry jumps to.
    pub page_number: usize,
}

/// Adds a flat outline with one `/Dest [page /Fit]` entry per target.
///
/// An empty target list returns the bytes unchanged.
pub fn apply_page_bookmarks(
    pdf_bytes: &[u8],
    targets: &[OutlineTarget],
) -> Result<Vec<u8>, BookmarkError> {
    if targets.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let entries = collect_outline_entries(&mut document, targets, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &entries);
    insert_outlines_root(outlines_id, &mut document, &entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Titles of the outline entries found in `pdf_bytes`, in order.
pub fn outline_titles(pdf_bytes: &[u8]) -> Result<Vec<String>, BookmarkError> {
    let document = Document::load_mem(pdf_bytes)?;
    let catalog = document.catalog()?;
    let Ok(outlines_id) = catalog.get(b"Outlines").and_then(Object::as_reference) else {
        return Ok(Vec::new());
    };

    let mut titles = Vec::new();
    let mut next = document
        .get_dictionary(outlines_id)?
        .get(b"First")
        .and_then(Object::as_reference)
        .ok();
    while let Some(entry_id) = next {
        let entry = document.get_dictionary(entry_id)?;
        let title = entry.get(b"Title")?.as_str()?;
        titles.push(String::from_utf8_lossy(title).into_owned());
        next = entry.get(b"Next").and_then(Object::as_reference).ok();
    }
    Ok(titles)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
    name: Option<String>,
}

fn collect_outline_entries(
    document: &mut Document,
    targets: &[OutlineTarget],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    targets
        .iter()
        .enumerate()
        .map(|(index, target)| {
            let page_ref = u32::try_from(target.page_number)
                .ok()
                .and_then(|number| pages.get(&number).copied())
                .ok_or(BookmarkError::MissingPage {
                    entry_index: index,
                    page_number: target.page_number,
                })?;

            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: target.title.clone(),
                name: target.identifier.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(outlines_id: ObjectId, document: &mut Document, entries: &[OutlineEntry]) {
    for (index, entry) in entries.iter().enumerate() {
        let mut dictionary = Dictionary::new();
        dictionary.set("Title", Object::string_literal(entry.title.as_str()));
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entry.page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if let Some(name) = &entry.name {
            dictionary.set("NM", Object::string_literal(name.as_str()));
        }
        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }
        if let Some(next) = entries.get(index + 1) {
            dictionary.set("Next", Object::Reference(next.object_id));
        }

        document
            .objects
            .insert(entry.object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;
    catalog.set("Outlines", Object::Reference(outlines_id));
    catalog.set("PageMode", Object::Name("UseOutlines".into()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn blank_pdf(page_count: usize) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                let page_id = document.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 842.into(), 595.into()],
                });
                Object::Reference(page_id)
            })
            .collect();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        bytes
    }

    fn target(title: &str, page_number: usize) -> OutlineTarget {
        OutlineTarget {
            title: title.to_string(),
            identifier: Some(title.to_lowercase()),
            page_number,
        }
    }

    #[test]
    fn adds_one_entry_per_page_in_order() {
        let bytes = blank_pdf(2);
        let with_outline = apply_page_bookmarks(
            &bytes,
            &[target("Genre Share", 1), target("Top Authors", 2)],
        )
        .unwrap();
        assert_eq!(
            outline_titles(&with_outline).unwrap(),
            vec!["Genre Share".to_string(), "Top Authors".to_string()]
        );
    }

    #[test]
    fn missing_page_is_reported() {
        let bytes = blank_pdf(1);
        let err = apply_page_bookmarks(&bytes, &[target("A", 1), target("B", 3)]).unwrap_err();
        assert!(matches!(
            err,
            BookmarkError::MissingPage {
                entry_index: 1,
                page_number: 3
            }
        ));

        let err = apply_page_bookmarks(&bytes, &[target("Far", usize::MAX)]).unwrap_err();
        assert!(matches!(
            err,
            BookmarkError::MissingPage {
                entry_index: 0,
                page_number: usize::MAX
            }
        ));
    }

    #[test]
    fn empty_targets_leave_bytes_untouched() {
        let bytes = blank_pdf(1);
        assert_eq!(apply_page_bookmarks(&bytes, &[]).unwrap(), bytes);
        assert!(outline_titles(&bytes).unwrap().is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = apply_page_bookmarks(b"not a pdf", &[target("A", 1)]).unwrap_err();
        assert!(matches!(err, BookmarkError::Parse(_)));
    }
}
