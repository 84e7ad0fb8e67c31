//! Pagination: slicing a result list into linked output documents.
//!
//! Every collection becomes at least one document. Page 1 is written under
//! the plain collection name; later pages get a `-<page>` suffix. Each
//! document carries its slice plus metadata with the page count and
//! `previousPage`/`nextPage` links, present only when such a page exists.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Extension appended to every output document key.
pub const DOCUMENT_EXTENSION: &str = ".json";

/// Output key for one page of a collection.
pub fn document_key(name: &str, page: usize) -> String {
    if page == 1 {
        format!("{name}{DOCUMENT_EXTENSION}")
    } else {
        format!("{name}-{page}{DOCUMENT_EXTENSION}")
    }
}

/// Absolute URL of one page, as written into the navigation links.
pub fn page_url(name: &str, page: usize) -> String {
    format!("/{}", document_key(name, page))
}

/// Slice `results` into paginated documents under `name`, inserting one
/// entry per page into `documents`. An empty result list still produces a
/// single empty page.
pub fn paginate(
    results: &[Value],
    name: &str,
    items_per_page: usize,
    documents: &mut BTreeMap<String, Value>,
) {
    let pages = results.len().div_ceil(items_per_page).max(1);

    for page in 1..=pages {
        let start = (page - 1) * items_per_page;
        let end = (start + items_per_page).min(results.len());

        let mut metadata = Map::new();
        metadata.insert(
            "itemsPerPage".to_string(),
            Value::Number(items_per_page.into()),
        );
        metadata.insert("pages".to_string(), Value::Number(pages.into()));
        if page > 1 {
            metadata.insert(
                "previousPage".to_string(),
                Value::String(page_url(name, page - 1)),
            );
        }
        if page < pages {
            metadata.insert(
                "nextPage".to_string(),
                Value::String(page_url(name, page + 1)),
            );
        }

        let mut document = Map::new();
        document.insert("results".to_string(), Value::Array(results[start..end].to_vec()));
        document.insert("metadata".to_string(), Value::Object(metadata));
        documents.insert(document_key(name, page), Value::Object(document));
    }
}
